//! taskbridge
//!
//! Correlation bridge between a process engine's work items and a remote
//! task execution service. When the engine reaches a step that must run
//! outside its own control flow, the bridge translates the step's
//! parameters into a task, submits it, and later resolves the work item —
//! complete with converted outputs, or abort — when the asynchronous
//! terminal notification arrives or the engine cancels first.
//!
//! The moving parts:
//!
//! - [`bridge::WorkItemBridge`] — the orchestrator
//! - [`correlation::CorrelationTable`] — local-id to remote-id mapping
//!   with the atomic `take` that guarantees exactly-once resolution
//! - [`convert`] — value conversion between the two type models
//! - [`remote::TaskServiceClient`] — submission and best-effort
//!   cancellation, with [`remote::HttpTaskClient`] as the HTTP adapter
//! - [`engine`] — the work item and per-call session traits the host
//!   engine implements

pub mod bridge;
pub mod config;
pub mod convert;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod remote;
pub mod types;

pub use bridge::{WorkItemBridge, TASK_TYPE_KEY, TASK_VERSION_KEY};
pub use config::{BridgeConfig, SERVICE_URL_ENV};
pub use correlation::CorrelationTable;
pub use engine::{EngineSession, SessionProvider, WorkItem};
pub use error::{Error, Result};
pub use remote::{HttpTaskClient, TaskNotification, TaskServiceClient};
pub use types::{EngineValue, Task, TaskId, WorkItemId};
