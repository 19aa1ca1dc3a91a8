//! Run Context: per-run identity and progress reporting
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline: pipeline.into(),
            started_at: Utc::now(),
        }
    }
}

/// Status line emitted right before a stage's generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage_key: String,
    /// Zero-based position among the executed stages
    pub index: usize,
    pub total: usize,
    pub message: String,
}

/// Fire-and-forget progress callback.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn notify(&self, event: &ProgressEvent) {
        self(event)
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self, _event: &ProgressEvent) {}
}

/// Keeps every event so a caller can hand them back after the run.
#[derive(Default)]
pub struct CollectingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl ProgressSink for CollectingProgress {
    fn notify(&self, event: &ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(key: &str) -> ProgressEvent {
        ProgressEvent {
            stage_key: key.to_string(),
            index: 0,
            total: 1,
            message: format!("Running {key}"),
        }
    }

    #[test]
    fn test_collecting_progress() {
        let sink = CollectingProgress::new();
        sink.notify(&event("a"));
        sink.notify(&event("b"));
        assert_eq!(sink.messages(), vec!["Running a", "Running b"]);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(0usize);
        let sink = |_: &ProgressEvent| {
            *seen.lock().unwrap() += 1;
        };
        sink.notify(&event("a"));
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
