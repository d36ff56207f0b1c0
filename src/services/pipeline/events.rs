//! Progress/failure side channel and cancellation for the pipeline.
//!
//! Observers replace the original UI event wiring: the pipeline reports
//! through a trait it is handed, and callers decide whether that logs, feeds
//! a channel, or goes nowhere.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A unit of work started on this file.
    FileStarted(PathBuf),
    /// Descriptor text was found but matched no known schema; a blank record
    /// was produced instead.
    DescriptorParseFailed(PathBuf),
    /// Remote enrichment failed; the record stays incomplete.
    RemoteLookupFailed(PathBuf),
}

pub trait PipelineObserver: Send + Sync {
    fn notify(&self, event: PipelineEvent);
}

/// Observer that drops every event.
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn notify(&self, _event: PipelineEvent) {}
}

/// Observer delivering events over an unbounded channel, for callers that
/// want to consume progress asynchronously.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PipelineObserver for ChannelObserver {
    fn notify(&self, event: PipelineEvent) {
        // A closed receiver just means nobody is listening anymore.
        let _ = self.tx.send(event);
    }
}

/// Cooperative cancellation flag. Cancelling aborts units that have not
/// started yet; records already produced are kept and persisted.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_delivers_events() {
        let (observer, mut rx) = ChannelObserver::new();
        observer.notify(PipelineEvent::FileStarted(PathBuf::from("a.jar")));
        let event = rx.try_recv().unwrap();
        assert!(matches!(event, PipelineEvent::FileStarted(p) if p == PathBuf::from("a.jar")));
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
