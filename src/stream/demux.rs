//! Typed subscriptions for batch import progress.

use std::sync::Arc;

use super::channel::EventChannel;
use super::event::{
    CompletePayload, ErrorPayload, EventKind, FileCompletePayload, FileErrorPayload,
    ProgressPayload, StreamEvent,
};
use super::registry::CallbackId;

/// Subscribes typed handlers to the five import event kinds of a channel.
///
/// Each method registers under exactly one kind and hands the handler only
/// that kind's payload. Registrations accumulate; none replaces another.
#[derive(Debug, Clone, Copy)]
pub struct ProgressDemux<'a> {
    channel: &'a EventChannel,
}

impl<'a> ProgressDemux<'a> {
    #[must_use]
    pub fn new(channel: &'a EventChannel) -> Self {
        Self { channel }
    }

    /// `progress` events (including the `progress_update` alias).
    pub fn on_progress_update<F>(&self, handler: F) -> CallbackId
    where
        F: Fn(&ProgressPayload) + Send + Sync + 'static,
    {
        self.channel.on(
            EventKind::Progress,
            Arc::new(move |event: &StreamEvent| {
                if let StreamEvent::Progress(payload) = event {
                    handler(payload);
                }
            }),
        )
    }

    pub fn on_file_complete<F>(&self, handler: F) -> CallbackId
    where
        F: Fn(&FileCompletePayload) + Send + Sync + 'static,
    {
        self.channel.on(
            EventKind::FileComplete,
            Arc::new(move |event: &StreamEvent| {
                if let StreamEvent::FileComplete(payload) = event {
                    handler(payload);
                }
            }),
        )
    }

    pub fn on_file_error<F>(&self, handler: F) -> CallbackId
    where
        F: Fn(&FileErrorPayload) + Send + Sync + 'static,
    {
        self.channel.on(
            EventKind::FileError,
            Arc::new(move |event: &StreamEvent| {
                if let StreamEvent::FileError(payload) = event {
                    handler(payload);
                }
            }),
        )
    }

    /// Terminal success.
    pub fn on_complete<F>(&self, handler: F) -> CallbackId
    where
        F: Fn(&CompletePayload) + Send + Sync + 'static,
    {
        self.channel.on(
            EventKind::Complete,
            Arc::new(move |event: &StreamEvent| {
                if let StreamEvent::Complete(payload) = event {
                    handler(payload);
                }
            }),
        )
    }

    /// Terminal failure.
    pub fn on_error<F>(&self, handler: F) -> CallbackId
    where
        F: Fn(&ErrorPayload) + Send + Sync + 'static,
    {
        self.channel.on(
            EventKind::Error,
            Arc::new(move |event: &StreamEvent| {
                if let StreamEvent::Error(payload) = event {
                    handler(payload);
                }
            }),
        )
    }

    /// Removes one registration made through this demux.
    pub fn remove(&self, kind: &EventKind, id: CallbackId) -> bool {
        self.channel.off(kind, id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stream::channel::tests::ScriptedSource;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_handlers_receive_only_their_kind() {
        let source = ScriptedSource::new(&[
            "data: {\"type\":\"progress\",\"payload\":{\"current\":1,\"total\":3}}\n\n",
            "data: {\"type\":\"file_error\",\"payload\":{\"fileName\":\"b.pdf\",\"error\":\"bad\"}}\n\n",
            "data: {\"type\":\"file_complete\",\"payload\":{\"fileName\":\"a.pdf\"}}\n\n",
            "data: {\"type\":\"complete\",\"payload\":{\"message\":\"done\"}}\n\n",
        ])
        .hold_open();
        let mut channel = EventChannel::new(Arc::new(source));
        let demux = ProgressDemux::new(&channel);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let t = tx.clone();
        demux.on_progress_update(move |p| {
            let _ = t.send(format!("progress {}/{}", p.current.unwrap(), p.total.unwrap()));
        });
        let t = tx.clone();
        demux.on_file_error(move |p| {
            let _ = t.send(format!("file_error {} {}", p.file_name.as_deref().unwrap(), p.reason()));
        });
        let t = tx.clone();
        demux.on_file_complete(move |p| {
            let _ = t.send(format!("file_complete {}", p.file_name.as_deref().unwrap()));
        });
        let t = tx.clone();
        demux.on_complete(move |p| {
            let _ = t.send(format!("complete {}", p.message.as_deref().unwrap()));
        });
        demux.on_error(move |p| {
            let _ = tx.send(format!("error {}", p.reason()));
        });
        assert_eq!(channel.handler_count(), 5);

        channel.connect("http://test/progress/job");
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(rx.recv().await.unwrap());
        }
        assert_eq!(
            seen,
            vec![
                "progress 1/3",
                "file_error b.pdf bad",
                "file_complete a.pdf",
                "complete done",
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_unsubscribes() {
        let channel = EventChannel::new(Arc::new(ScriptedSource::new(&[])));
        let demux = ProgressDemux::new(&channel);
        let id = demux.on_complete(|_| {});
        demux.on_complete(|_| {});
        assert!(demux.remove(&EventKind::Complete, id));
        assert_eq!(channel.handler_count(), 1);
    }
}
