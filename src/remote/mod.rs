//! Remote task service boundary

mod client;

pub use client::{HttpTaskClient, TaskServiceClient};

use serde::{Deserialize, Serialize};

use crate::types::Task;

/// Terminal notification pushed by the task service
///
/// Exactly one arrives per submitted task, arbitrarily delayed, unless the
/// bridge cancelled the task first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "task", rename_all = "snake_case")]
pub enum TaskNotification {
    /// The task finished and carries a `task_result`
    Succeeded(Task),
    /// The task failed and carries a `task_error`
    Failed(Task),
}

impl TaskNotification {
    /// The task the notification refers to
    pub fn task(&self) -> &Task {
        match self {
            TaskNotification::Succeeded(task) | TaskNotification::Failed(task) => task,
        }
    }

    /// Name of the terminal status, for diagnostics
    pub fn status_name(&self) -> &'static str {
        match self {
            TaskNotification::Succeeded(_) => "succeeded",
            TaskNotification::Failed(_) => "failed",
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
