//! Process engine boundary
//!
//! The engine itself is an external collaborator; the bridge only needs a
//! work item to dispatch and a way to report terminal outcomes back. An
//! engine session is acquired per call and released when the handle is
//! dropped; the bridge never holds one across a remote submit or cancel.

use std::collections::HashMap;

use crate::error::Result;
use crate::types::{EngineValue, WorkItemId};

// ─────────────────────────────────────────────────────────────────
// Work Item
// ─────────────────────────────────────────────────────────────────

/// A unit of work the engine delegates to external execution
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Engine-local identifier
    pub id: WorkItemId,

    /// Owning process instance
    pub process_instance_id: String,

    /// Deployment the work item belongs to; scopes engine sessions
    pub deployment_id: String,

    /// Flat parameter mapping, including the reserved `task_type` and
    /// `task_version` keys when not predefined on the bridge
    pub parameters: HashMap<String, EngineValue>,
}

// ─────────────────────────────────────────────────────────────────
// Engine Session
// ─────────────────────────────────────────────────────────────────

/// A live handle into the engine, scoped to a single bridge call
///
/// Both calls are synchronous and safe to invoke once per work item.
/// Dropping the session releases whatever the provider acquired for it.
pub trait EngineSession: Send {
    /// Report the work item as completed with the given output values
    fn complete(
        &mut self,
        work_item_id: WorkItemId,
        results: HashMap<String, EngineValue>,
    ) -> Result<()>;

    /// Report the work item as aborted
    fn abort(&mut self, work_item_id: WorkItemId) -> Result<()>;
}

/// Hands out engine sessions, one per engine-facing call
pub trait SessionProvider: Send + Sync {
    /// Acquire a session for the given deployment
    fn session(&self, deployment_id: &str) -> Result<Box<dyn EngineSession>>;
}
