//! Coarse progress reporting for long-running pipeline invocations.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Lifecycle of one task. Transitions go `Pending → Success` or `Pending → Failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Pending,
    Success,
    Failure,
}

/// A status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    /// Human-readable description of the current phase.
    pub desc: String,
    /// Failure message, set only for [`TaskState::Failure`].
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl TaskStatus {
    pub fn pending(desc: impl Into<String>) -> Self {
        Self {
            state: TaskState::Pending,
            desc: desc.into(),
            error: None,
        }
    }

    pub fn success(desc: impl Into<String>) -> Self {
        Self {
            state: TaskState::Success,
            desc: desc.into(),
            error: None,
        }
    }

    pub fn failure(desc: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            state: TaskState::Failure,
            desc: desc.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state != TaskState::Pending
    }
}

/// Receives status updates from the pipeline.
pub trait StatusReporter: Send + Sync {
    fn report(&self, status: TaskStatus);
}

/// Emits each update as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, status: TaskStatus) {
        match status.state {
            TaskState::Failure => error!(
                desc = %status.desc,
                error = status.error.as_deref().unwrap_or(""),
                "task failed"
            ),
            state => info!(?state, desc = %status.desc, "task status"),
        }
    }
}

/// Collects every update in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    updates: Mutex<Vec<TaskStatus>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<TaskStatus> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<TaskStatus> {
        self.updates.lock().ok().and_then(|u| u.last().cloned())
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, status: TaskStatus) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.report(TaskStatus::pending("detecting types"));
        reporter.report(TaskStatus::failure("saving", "disk full"));

        let updates = reporter.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].state, TaskState::Pending);
        assert!(!updates[0].is_terminal());
        assert_eq!(reporter.last().unwrap().error.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_serialized_state() {
        let json = serde_json::to_value(TaskStatus::success("done")).unwrap();
        assert_eq!(json["state"], "SUCCESS");
        assert!(json.get("error").is_none());
    }
}
