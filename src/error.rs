//! Error types for the work item bridge
//!
//! Failures are isolated per work item: every variant here describes why a
//! single dispatch or resolution could not proceed, never a bridge-wide
//! condition. Any failure that would otherwise leave a work item stuck
//! results in a local abort.

use std::fmt;

use thiserror::Error;

use crate::types::{TaskId, WorkItemId};

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Direction of a value conversion, for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionDirection {
    /// Work item parameter being converted into task data
    Input,
    /// Task result entry being converted back for the engine
    Output,
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDirection::Input => write!(f, "input"),
            ConversionDirection::Output => write!(f, "output"),
        }
    }
}

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// No task service endpoint was provided
    #[error("no task service endpoint configured")]
    MissingEndpoint,

    /// The task service endpoint is not a usable URL
    #[error("invalid task service endpoint '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },

    /// Neither the configuration nor the work item supplied a task type
    #[error("work item {work_item_id} has no task type")]
    MissingTaskType { work_item_id: WorkItemId },

    /// Neither the configuration nor the work item supplied a task version
    #[error("work item {work_item_id} has no task version")]
    MissingTaskVersion { work_item_id: WorkItemId },

    /// The work item carried a task version that is not an integer
    #[error("work item {work_item_id} has invalid task version '{value}'")]
    InvalidTaskVersion {
        work_item_id: WorkItemId,
        value: String,
        #[source]
        source: Option<std::num::ParseIntError>,
    },

    // ─────────────────────────────────────────────────────────────
    // Conversion Errors
    // ─────────────────────────────────────────────────────────────

    /// A value could not be represented on the other side of the bridge
    #[error("cannot convert {direction} value '{key}': {detail}")]
    Conversion {
        key: String,
        direction: ConversionDirection,
        detail: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Submission Errors
    // ─────────────────────────────────────────────────────────────

    /// The task service rejected or never received the submission
    #[error("failed to submit task {task_id}: {message}")]
    Submission { task_id: TaskId, message: String },

    /// Transport-level failure talking to the task service
    #[error("task service request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ─────────────────────────────────────────────────────────────
    // Correlation Errors
    // ─────────────────────────────────────────────────────────────

    /// A second dispatch was attempted while a task is still in flight
    #[error("work item {work_item_id} already has a task in flight")]
    DuplicateDispatch { work_item_id: WorkItemId },

    // ─────────────────────────────────────────────────────────────
    // Engine Errors
    // ─────────────────────────────────────────────────────────────

    /// An engine session could not be acquired or an engine call failed
    #[error("engine session error: {message}")]
    Engine { message: String },
}

impl Error {
    /// Whether this error stems from configuration (of the bridge or of a
    /// single work item's reserved parameters)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingEndpoint
                | Error::InvalidEndpoint { .. }
                | Error::MissingTaskType { .. }
                | Error::MissingTaskVersion { .. }
                | Error::InvalidTaskVersion { .. }
        )
    }

    /// Convenience constructor for engine-side failures
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
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
    fn test_is_configuration() {
        assert!(Error::MissingEndpoint.is_configuration());
        assert!(Error::MissingTaskType {
            work_item_id: WorkItemId(1)
        }
        .is_configuration());
        assert!(!Error::engine("boom").is_configuration());
    }

    #[test]
    fn test_conversion_display() {
        let err = Error::Conversion {
            key: "msg".to_string(),
            direction: ConversionDirection::Output,
            detail: "null has no engine representation".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("output"));
        assert!(text.contains("msg"));
    }
}
