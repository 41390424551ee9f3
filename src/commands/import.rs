//! Batch import command: submit files and follow progress until the job settles.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use literature_core::{ImportOptions, LibraryStore, UploadFile};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::output::render_import_summary;
use crate::terminal;

pub async fn run_import_command(
    store: &LibraryStore,
    paths: &[PathBuf],
    timeout: Option<Duration>,
    quiet: bool,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        files.push(file);
    }
    info!(files = files.len(), "Starting batch import");

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling import");
            cancel_on_signal.cancel();
        }
    });

    let show_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        quiet,
        terminal::is_dumb_terminal(),
    );
    let bar = progress_bar(show_progress);
    let bar_for_updates = bar.clone();

    let result = store
        .batch_import_with(
            &files,
            Some(move |percent: u32| bar_for_updates.set_position(u64::from(percent.min(100)))),
            ImportOptions { cancel, timeout },
        )
        .await;

    signal_task.abort();
    bar.finish_and_clear();

    let outcome = result.context("Batch import failed")?;
    for line in render_import_summary(&outcome) {
        println!("{line}");
    }
    Ok(())
}

fn progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos:>3}% {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
