//! Batch import workflow.
//!
//! A batch import submits files as one job, follows the job's progress
//! stream, and settles into a single result:
//!
//! ```text
//! Submitted -> Connected -> Progressing* -> Completed | Failed
//! ```
//!
//! Stream handlers only forward typed signals over an mpsc channel; the
//! workflow task owns all state and performs every transition. Each run gets
//! its own [`EventChannel`], so concurrent imports never share handlers.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::error::{LibraryError, Operation};
use super::store::LibraryStore;
use crate::api::UploadFile;
use crate::stream::{
    CompletePayload, ErrorPayload, EventChannel, FileCompletePayload, FileErrorPayload,
    ProgressDemux, ProgressPayload,
};

/// Workflow state of one batch import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// The job was accepted and has an id.
    Submitted,
    /// Handlers are registered and the progress stream is opening.
    Connected,
    /// At least one progress event arrived.
    Progressing,
    Completed,
    Failed,
}

impl ImportPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Submitted => "submitted",
            Self::Connected => "connected",
            Self::Progressing => "progressing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// Result of a successful batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub import_id: String,
    /// `file_complete` payloads in arrival order.
    pub completed_files: Vec<FileCompletePayload>,
    /// `file_error` payloads in arrival order. Per-file failures never fail the job.
    pub failed_files: Vec<FileErrorPayload>,
}

/// Cancellation and timeout controls for [`LibraryStore::batch_import_with`].
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Cancelling the token abandons the import at its next suspension point.
    pub cancel: CancellationToken,
    /// Upper bound on the wait for a terminal event. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// What the stream handlers tell the workflow.
#[derive(Debug)]
enum ImportSignal {
    Progress(ProgressPayload),
    FileComplete(FileCompletePayload),
    FileError(FileErrorPayload),
    Complete(CompletePayload),
    Error(ErrorPayload),
}

/// Percentage for a progress payload, rounded half up.
///
/// `current` defaults to 0; a missing or zero `total` falls back to the
/// number of submitted files. A zero total yields 0.
#[must_use]
pub fn progress_percent(payload: &ProgressPayload, file_count: usize) -> u32 {
    let current = payload.current.unwrap_or(0);
    let total = payload
        .total
        .filter(|&total| total > 0)
        .unwrap_or_else(|| u64::try_from(file_count).unwrap_or(u64::MAX));
    if total == 0 {
        return 0;
    }
    let percent = (current.saturating_mul(200).saturating_add(total)) / (2 * total);
    u32::try_from(percent).unwrap_or(u32::MAX)
}

struct ImportRun {
    import_id: String,
    phase: ImportPhase,
    outcome: ImportOutcome,
}

impl ImportRun {
    fn new(import_id: String) -> Self {
        Self {
            outcome: ImportOutcome {
                import_id: import_id.clone(),
                ..ImportOutcome::default()
            },
            import_id,
            phase: ImportPhase::Submitted,
        }
    }

    fn transition(&mut self, next: ImportPhase) {
        if self.phase != next {
            debug!(import_id = %self.import_id, from = %self.phase, to = %next, "import phase");
            self.phase = next;
        }
    }

    fn fail(&mut self, err: LibraryError) -> LibraryError {
        self.transition(ImportPhase::Failed);
        err
    }
}

impl LibraryStore {
    /// Imports `files` as one job and waits for it to finish.
    ///
    /// `on_progress` receives percentages (0..=100) as progress events
    /// arrive. On completion the current page is refetched before this
    /// returns. Pass `None::<fn(u32)>` when no progress callback is needed.
    ///
    /// # Errors
    ///
    /// See [`Self::batch_import_with`].
    pub async fn batch_import_literature<F>(
        &self,
        files: &[UploadFile],
        on_progress: Option<F>,
    ) -> Result<ImportOutcome, LibraryError>
    where
        F: FnMut(u32) + Send,
    {
        self.batch_import_with(files, on_progress, ImportOptions::default())
            .await
    }

    /// [`Self::batch_import_literature`] with cancellation and an optional timeout.
    ///
    /// `loading` is set for the whole run; on failure `error` holds the
    /// failure's user message.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::NoFiles`] for an empty batch
    /// - [`LibraryError::Request`] if the job is not accepted (no stream is opened)
    /// - [`LibraryError::ImportRejected`] on a terminal `error` event
    /// - [`LibraryError::StreamClosed`] if the stream ends without a terminal event
    /// - [`LibraryError::Cancelled`] / [`LibraryError::TimedOut`]
    /// - [`LibraryError::Refresh`] if the post-completion refetch fails
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn batch_import_with<F>(
        &self,
        files: &[UploadFile],
        on_progress: Option<F>,
        options: ImportOptions,
    ) -> Result<ImportOutcome, LibraryError>
    where
        F: FnMut(u32) + Send,
    {
        self.begin();
        match self.run_import(files, on_progress, &options).await {
            Ok(outcome) => {
                self.finish();
                info!(
                    import_id = %outcome.import_id,
                    completed = outcome.completed_files.len(),
                    failed = outcome.failed_files.len(),
                    "batch import finished"
                );
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn run_import<F>(
        &self,
        files: &[UploadFile],
        mut on_progress: Option<F>,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, LibraryError>
    where
        F: FnMut(u32) + Send,
    {
        if files.is_empty() {
            return Err(LibraryError::NoFiles);
        }

        let ticket = tokio::select! {
            biased;
            () = options.cancel.cancelled() => {
                return Err(LibraryError::Cancelled { import_id: None });
            }
            result = self.api().start_batch_import(files) => {
                result.map_err(|e| LibraryError::request(Operation::BatchImport, e))?
            }
        };
        let mut run = ImportRun::new(ticket.import_id);
        info!(import_id = %run.import_id, "batch import accepted");

        let url = self
            .api()
            .progress_url(&run.import_id)
            .map_err(|e| LibraryError::request(Operation::BatchImport, e))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut channel = EventChannel::new(self.event_source());
        subscribe(&ProgressDemux::new(&channel), &tx, on_progress.is_some());
        // Only the handlers hold senders now, so a cleared registry closes `rx`.
        drop(tx);

        channel.connect(url.as_str());
        run.transition(ImportPhase::Connected);

        let result = self
            .follow(&mut run, &mut rx, &mut on_progress, files.len(), options)
            .await;
        channel.disconnect();
        result.map(|()| run.outcome)
    }

    async fn follow<F>(
        &self,
        run: &mut ImportRun,
        rx: &mut mpsc::UnboundedReceiver<ImportSignal>,
        on_progress: &mut Option<F>,
        file_count: usize,
        options: &ImportOptions,
    ) -> Result<(), LibraryError>
    where
        F: FnMut(u32) + Send,
    {
        let deadline = options.timeout.map(|t| Instant::now() + t);
        let expired = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);

        loop {
            let signal = tokio::select! {
                biased;
                () = options.cancel.cancelled() => {
                    return Err(run.fail(LibraryError::Cancelled {
                        import_id: Some(run.import_id.clone()),
                    }));
                }
                () = &mut expired => {
                    return Err(run.fail(LibraryError::TimedOut {
                        import_id: run.import_id.clone(),
                        timeout: options.timeout.unwrap_or_default(),
                    }));
                }
                signal = rx.recv() => signal,
            };

            let Some(signal) = signal else {
                warn!(import_id = %run.import_id, "progress stream closed before a terminal event");
                return Err(run.fail(LibraryError::StreamClosed {
                    import_id: run.import_id.clone(),
                }));
            };

            match signal {
                ImportSignal::Progress(payload) => {
                    run.transition(ImportPhase::Progressing);
                    // Status text without counters must not move the percentage.
                    if !payload.has_counts() {
                        debug!(import_id = %run.import_id, message = ?payload.message, "import status");
                        continue;
                    }
                    if let Some(callback) = on_progress.as_mut() {
                        callback(progress_percent(&payload, file_count));
                    }
                }
                ImportSignal::FileComplete(payload) => {
                    debug!(import_id = %run.import_id, file = ?payload.file_name, "file imported");
                    run.outcome.completed_files.push(payload);
                }
                ImportSignal::FileError(payload) => {
                    warn!(
                        import_id = %run.import_id,
                        file = ?payload.file_name,
                        reason = payload.reason(),
                        "file failed during batch import"
                    );
                    run.outcome.failed_files.push(payload);
                }
                ImportSignal::Complete(_) => {
                    return self.refresh_after_import(run, &options.cancel).await;
                }
                ImportSignal::Error(payload) => {
                    return Err(run.fail(LibraryError::ImportRejected {
                        import_id: run.import_id.clone(),
                        message: payload.reason().to_string(),
                    }));
                }
            }
        }
    }

    async fn refresh_after_import(
        &self,
        run: &mut ImportRun,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        let refreshed = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(run.fail(LibraryError::Cancelled {
                    import_id: Some(run.import_id.clone()),
                }));
            }
            result = self.refresh_current_page() => result,
        };

        match refreshed {
            Ok(()) => {
                run.transition(ImportPhase::Completed);
                Ok(())
            }
            Err(e) => Err(run.fail(LibraryError::Refresh {
                import_id: run.import_id.clone(),
                source: Box::new(e),
            })),
        }
    }
}

fn subscribe(demux: &ProgressDemux<'_>, tx: &mpsc::UnboundedSender<ImportSignal>, progress: bool) {
    if progress {
        let tx = tx.clone();
        demux.on_progress_update(move |p| {
            let _ = tx.send(ImportSignal::Progress(p.clone()));
        });
    }
    let sender = tx.clone();
    demux.on_file_complete(move |p| {
        let _ = sender.send(ImportSignal::FileComplete(p.clone()));
    });
    let sender = tx.clone();
    demux.on_file_error(move |p| {
        let _ = sender.send(ImportSignal::FileError(p.clone()));
    });
    let sender = tx.clone();
    demux.on_complete(move |p| {
        let _ = sender.send(ImportSignal::Complete(p.clone()));
    });
    let sender = tx.clone();
    demux.on_error(move |p| {
        let _ = sender.send(ImportSignal::Error(p.clone()));
    });
}
