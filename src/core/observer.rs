use std::sync::Mutex;

/// Which pipeline produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Matchmaking,
    Starters,
}

/// Something the reconciler noticed while repairing a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileEvent {
    UnparseableReply { pipeline: Pipeline, detail: String, raw: String },
    MissingIndex { entry: usize },
    IndexOutOfRange { entry: usize, index: i64, pool_size: usize },
    DuplicateIndex { index: usize },
    MissingScore { index: usize },
    BelowThreshold { index: usize, score: f64 },
    ScoreClamped { index: usize, from: f64, to: u8 },
    ReasonDefaulted { index: usize },
    StarterFallback { reason: String },
}

/// Sink for reconciler diagnostics
pub trait ReconcileObserver: Send + Sync {
    fn observe(&self, event: ReconcileEvent);
}

/// Forwards every event to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn observe(&self, event: ReconcileEvent) {
        match event {
            ReconcileEvent::UnparseableReply { pipeline, detail, raw } => {
                tracing::error!(?pipeline, %detail, raw = %raw, "Failed to parse model reply");
            }
            ReconcileEvent::MissingIndex { entry } => {
                tracing::warn!(entry, "Model match has no candidateIndex, skipping");
            }
            ReconcileEvent::IndexOutOfRange { entry, index, pool_size } => {
                tracing::warn!(entry, index, pool_size, "Candidate not found for index, skipping");
            }
            ReconcileEvent::DuplicateIndex { index } => {
                tracing::warn!(index, "Model repeated a candidate, keeping the last entry");
            }
            ReconcileEvent::MissingScore { index } => {
                tracing::warn!(index, "Model match has no score, skipping");
            }
            ReconcileEvent::BelowThreshold { index, score } => {
                tracing::debug!(index, score, "Dropping match below threshold");
            }
            ReconcileEvent::ScoreClamped { index, from, to } => {
                tracing::debug!(index, from, to, "Clamped out-of-range score");
            }
            ReconcileEvent::ReasonDefaulted { index } => {
                tracing::debug!(index, "Model match has no reason, using default");
            }
            ReconcileEvent::StarterFallback { reason } => {
                tracing::warn!(%reason, "Using fallback conversation starters");
            }
        }
    }
}

/// Keeps events in memory so tests can assert on them
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ReconcileEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReconcileEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ReconcileObserver for RecordingObserver {
    fn observe(&self, event: ReconcileEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
