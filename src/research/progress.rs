//! Research Progress Events
//!
//! Batch progress is published over a broadcast channel so any number of
//! observers (terminal renderer, tests) can follow along without blocking the
//! orchestrator. Cancellation travels the other way through [`CancelFlag`].

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use crate::constants::research as research_constants;

use super::BatchSummary;

/// Progress events emitted during a research batch
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    /// Batch accepted
    BatchStarted { total: usize, provider: String },
    /// Provider call about to start for the `position`-th package of `total`
    Analyzing {
        position: usize,
        total: usize,
        key: String,
    },
    /// Provider call finished
    Analyzed {
        position: usize,
        total: usize,
        key: String,
        failed: bool,
    },
    /// Package not started because the batch was cancelled
    Skipped { key: String },
    /// Result completed after cancellation and was dropped
    Discarded { key: String },
    /// Batch finished
    BatchFinished { summary: BatchSummary },
}

impl ResearchEvent {
    /// Status label shown for a package while this event is current
    pub fn status_label(&self) -> Option<String> {
        match self {
            Self::Analyzing {
                position, total, ..
            } => Some(format!("Analyzing ({}/{})", position, total)),
            Self::Analyzed { failed: false, .. } => Some("Analyzed".to_string()),
            Self::Analyzed { failed: true, .. } => Some("Analysis failed".to_string()),
            _ => None,
        }
    }
}

/// Broadcast sender for research events
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: broadcast::Sender<ResearchEvent>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(research_constants::EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Send an event through the broadcast channel.
    /// Silently discards if no receivers are listening.
    #[inline]
    pub fn emit(&self, event: ResearchEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to research events
    pub fn subscribe(&self) -> broadcast::Receiver<ResearchEvent> {
        self.sender.subscribe()
    }
}

/// Shared cancellation flag for a research batch
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
