//! Task and identifier types
//!
//! The `Task` is the bridge's representation of a work item on the wire:
//! it is what gets submitted to the task service and what comes back in
//! terminal notifications.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────

/// Engine-local identifier of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(pub i64);

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote identifier of a submitted task, used as the correlation key on
/// the service side
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Derive a task id from the engine-side identifiers.
    ///
    /// The process instance and work item ids give traceability; the uuid
    /// suffix makes every submission unique.
    pub fn derive(process_instance_id: &str, work_item_id: WorkItemId) -> Self {
        TaskId(format!(
            "{}:{}:{}",
            process_instance_id,
            work_item_id,
            Uuid::new_v4()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────

/// The unit of remote work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Correlation key on the remote side, assigned at dispatch
    pub task_id: TaskId,

    /// Owning process instance; informational, not used for correlation
    pub process_id: String,

    /// Engine-local work item this task was built from; echoed back in
    /// notifications so the bridge can find its correlation entry
    pub work_item_id: WorkItemId,

    /// Engine deployment the work item belongs to; scopes the engine
    /// session acquired when resolving the work item
    pub deployment_id: String,

    /// Remote capability that executes the task
    pub task_type: String,

    /// Version of the remote capability
    pub task_version: u32,

    /// Converted input parameters
    #[serde(default)]
    pub task_data: HashMap<String, serde_json::Value>,

    /// Output values; present only after successful completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_result: Option<HashMap<String, serde_json::Value>>,

    /// Diagnostic payload; present only after failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_error: Option<serde_json::Value>,

    /// When the task was created by the bridge
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with empty data and no terminal payloads
    pub fn new(
        task_id: TaskId,
        process_id: impl Into<String>,
        work_item_id: WorkItemId,
        deployment_id: impl Into<String>,
        task_type: impl Into<String>,
        task_version: u32,
    ) -> Self {
        Self {
            task_id,
            process_id: process_id.into(),
            work_item_id,
            deployment_id: deployment_id.into(),
            task_type: task_type.into(),
            task_version,
            task_data: HashMap::new(),
            task_result: None,
            task_error: None,
            created_at: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_derive_is_unique_per_submission() {
        let a = TaskId::derive("proc-1", WorkItemId(7));
        let b = TaskId::derive("proc-1", WorkItemId(7));
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("proc-1:7:"));
    }

    #[test]
    fn test_task_serialize_shape() {
        let task = Task::new(
            TaskId::derive("proc-1", WorkItemId(7)),
            "proc-1",
            WorkItemId(7),
            "deploy-a",
            "echo",
            1,
        );
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["task_type"], "echo");
        assert_eq!(json["task_version"], 1);
        assert_eq!(json["work_item_id"], 7);
        // terminal payloads are absent before resolution
        assert!(json.get("task_result").is_none());
        assert!(json.get("task_error").is_none());
    }

    #[test]
    fn test_task_roundtrip_with_result() {
        let mut task = Task::new(
            TaskId::derive("proc-1", WorkItemId(7)),
            "proc-1",
            WorkItemId(7),
            "deploy-a",
            "echo",
            1,
        );
        task.task_result = Some(HashMap::from([(
            "msg".to_string(),
            serde_json::json!("hi"),
        )]));

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.task_result.unwrap()["msg"], "hi");
    }
}
