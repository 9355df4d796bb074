//! Work item bridge
//!
//! Orchestrates the lifecycle of a delegated work item: dispatch builds
//! and submits a task, records the correlation entry, and the three
//! resolution paths (success notification, failure notification,
//! engine-driven cancellation) race on the table's atomic `take` so that
//! exactly one of them resolves the work item against the engine.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::convert;
use crate::correlation::CorrelationTable;
use crate::engine::{SessionProvider, WorkItem};
use crate::error::{Error, Result};
use crate::remote::{TaskNotification, TaskServiceClient};
use crate::types::{EngineValue, Task, TaskId, WorkItemId};

/// Reserved parameter key selecting the remote capability
pub const TASK_TYPE_KEY: &str = "task_type";

/// Reserved parameter key selecting the capability version
pub const TASK_VERSION_KEY: &str = "task_version";

// ─────────────────────────────────────────────────────────────────
// Work Item Bridge
// ─────────────────────────────────────────────────────────────────

/// Correlation bridge between the process engine and the task service
pub struct WorkItemBridge {
    config: BridgeConfig,
    client: Arc<dyn TaskServiceClient>,
    sessions: Arc<dyn SessionProvider>,
    table: CorrelationTable,
}

impl WorkItemBridge {
    /// Create a bridge over a validated configuration
    pub fn new(
        config: BridgeConfig,
        client: Arc<dyn TaskServiceClient>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            sessions,
            table: CorrelationTable::new(),
        })
    }

    /// Number of work items with a task currently in flight
    pub fn in_flight(&self) -> usize {
        self.table.in_flight()
    }

    // ─────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────

    /// Dispatch a work item to the task service.
    ///
    /// Any failure before or during submission aborts the work item
    /// locally and leaves no correlation entry behind; other work items
    /// are unaffected.
    pub async fn dispatch(&self, work_item: WorkItem) -> Result<()> {
        let WorkItem {
            id,
            process_instance_id,
            deployment_id,
            mut parameters,
        } = work_item;

        // Reserved metadata keys never reach task_data, even when the
        // configured override wins.
        let param_type = parameters.remove(TASK_TYPE_KEY);
        let param_version = parameters.remove(TASK_VERSION_KEY);

        let task = match self.build_task(
            id,
            &process_instance_id,
            &deployment_id,
            param_type,
            param_version,
            &parameters,
        ) {
            Ok(task) => task,
            Err(e) => {
                error!(work_item_id = %id, error = %e, "dispatch failed before submission");
                self.abort_locally(id, &deployment_id);
                return Err(e);
            }
        };

        if let Err(e) = self.client.submit(&task).await {
            error!(
                work_item_id = %id,
                task_id = %task.task_id,
                error = %e,
                "task submission failed"
            );
            self.abort_locally(id, &deployment_id);
            return Err(e);
        }

        if let Err(e) = self.table.put(id, task.task_id.clone()) {
            // Contract breach: a task for this work item is already in
            // flight. Don't orphan the one just submitted, and leave the
            // existing entry (and its pending resolution) untouched.
            error!(
                work_item_id = %id,
                task_id = %task.task_id,
                "duplicate dispatch, cancelling the extra task"
            );
            if let Err(cancel_err) = self.client.cancel(&task.task_id).await {
                warn!(
                    task_id = %task.task_id,
                    error = %cancel_err,
                    "failed to cancel extra task"
                );
            }
            return Err(e);
        }
        info!(
            work_item_id = %id,
            task_id = %task.task_id,
            task_type = %task.task_type,
            task_version = task.task_version,
            "work item dispatched"
        );
        Ok(())
    }

    fn build_task(
        &self,
        id: WorkItemId,
        process_instance_id: &str,
        deployment_id: &str,
        param_type: Option<EngineValue>,
        param_version: Option<EngineValue>,
        parameters: &HashMap<String, EngineValue>,
    ) -> Result<Task> {
        let task_type = resolve_task_type(self.config.task_type.as_deref(), param_type.as_ref(), id)?;
        let task_version =
            resolve_task_version(self.config.task_version, param_version.as_ref(), id)?;
        let task_data = convert::parameters_to_task_data(parameters)?;

        let mut task = Task::new(
            TaskId::derive(process_instance_id, id),
            process_instance_id,
            id,
            deployment_id,
            task_type,
            task_version,
        );
        task.task_data = task_data;
        Ok(task)
    }

    // ─────────────────────────────────────────────────────────────
    // Remote Callbacks
    // ─────────────────────────────────────────────────────────────

    /// Handle a success notification from the task service.
    ///
    /// Output values are converted best-effort: unconvertible entries are
    /// logged and skipped, the rest still reach the engine.
    pub fn on_task_succeeded(&self, task: Task) -> Result<()> {
        let Some(task_id) = self.table.take(task.work_item_id) else {
            debug!(
                work_item_id = %task.work_item_id,
                task_id = %task.task_id,
                "success notification for already resolved work item, ignoring"
            );
            return Ok(());
        };

        let results = task
            .task_result
            .as_ref()
            .map(convert::task_result_to_engine)
            .unwrap_or_default();

        // The entry is already taken: if the engine call fails the work
        // item must still reach a terminal state, so fall back to abort.
        let completion = self
            .sessions
            .session(&task.deployment_id)
            .and_then(|mut session| session.complete(task.work_item_id, results));
        if let Err(e) = completion {
            error!(
                work_item_id = %task.work_item_id,
                task_id = %task_id,
                error = %e,
                "engine completion failed, aborting work item instead"
            );
            self.abort_locally(task.work_item_id, &task.deployment_id);
            return Err(e);
        }

        info!(work_item_id = %task.work_item_id, task_id = %task_id, "work item completed");
        Ok(())
    }

    /// Handle a failure notification from the task service.
    ///
    /// A remote failure is a first-class terminal outcome: the work item
    /// is aborted and the diagnostic payload is recorded.
    pub fn on_task_failed(&self, task: Task) -> Result<()> {
        let Some(task_id) = self.table.take(task.work_item_id) else {
            debug!(
                work_item_id = %task.work_item_id,
                task_id = %task.task_id,
                "failure notification for already resolved work item, ignoring"
            );
            return Ok(());
        };

        error!(
            work_item_id = %task.work_item_id,
            task_id = %task_id,
            task_error = ?task.task_error,
            "remote task failed, aborting work item"
        );

        // Same terminal-state guarantee as the success path: retry the
        // abort through a fresh session if the first attempt fails.
        let abort = self
            .sessions
            .session(&task.deployment_id)
            .and_then(|mut session| session.abort(task.work_item_id));
        if let Err(e) = abort {
            error!(
                work_item_id = %task.work_item_id,
                error = %e,
                "engine abort failed, retrying with a fresh session"
            );
            self.abort_locally(task.work_item_id, &task.deployment_id);
            return Err(e);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Cancellation
    // ─────────────────────────────────────────────────────────────

    /// Handle an engine-driven cancellation.
    ///
    /// The remote cancel is advisory and only sent while the correlation
    /// entry is still present; the local abort is authoritative and
    /// happens unconditionally.
    pub async fn cancel(&self, work_item_id: WorkItemId, deployment_id: &str) -> Result<()> {
        if let Some(task_id) = self.table.take(work_item_id) {
            if let Err(e) = self.client.cancel(&task_id).await {
                warn!(
                    work_item_id = %work_item_id,
                    task_id = %task_id,
                    error = %e,
                    "failed to deliver cancellation to task service"
                );
            }
        }

        // Session acquired only after the remote call has returned.
        let mut session = self.sessions.session(deployment_id)?;
        session.abort(work_item_id)?;
        info!(work_item_id = %work_item_id, "work item aborted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Notification Pump
    // ─────────────────────────────────────────────────────────────

    /// Consume terminal notifications until the channel closes.
    ///
    /// Resolution failures are logged and isolated; one bad notification
    /// never stops the loop or affects other work items.
    pub async fn run(&self, mut notifications: mpsc::Receiver<TaskNotification>) {
        while let Some(notification) = notifications.recv().await {
            let status = notification.status_name();
            let work_item_id = notification.task().work_item_id;
            let result = match notification {
                TaskNotification::Succeeded(task) => self.on_task_succeeded(task),
                TaskNotification::Failed(task) => self.on_task_failed(task),
            };
            if let Err(e) = result {
                error!(
                    work_item_id = %work_item_id,
                    status = status,
                    error = %e,
                    "failed to resolve work item"
                );
            }
        }
        debug!("notification channel closed, bridge loop ending");
    }

    // ─────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────

    /// Abort a work item that never made it into flight.
    fn abort_locally(&self, work_item_id: WorkItemId, deployment_id: &str) {
        match self.sessions.session(deployment_id) {
            Ok(mut session) => {
                if let Err(e) = session.abort(work_item_id) {
                    error!(work_item_id = %work_item_id, error = %e, "failed to abort work item");
                }
            }
            Err(e) => {
                error!(work_item_id = %work_item_id, error = %e, "failed to acquire engine session");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Reserved Parameter Resolution
// ─────────────────────────────────────────────────────────────────

/// Resolve the task type: configured value first, work item parameter
/// second.
fn resolve_task_type(
    configured: Option<&str>,
    parameter: Option<&EngineValue>,
    work_item_id: WorkItemId,
) -> Result<String> {
    if let Some(task_type) = configured {
        return Ok(task_type.to_string());
    }
    parameter
        .and_then(EngineValue::as_text)
        .map(str::to_string)
        .ok_or(Error::MissingTaskType { work_item_id })
}

/// Resolve the task version: configured value first, then the work item's
/// string-encoded (or integer) parameter.
fn resolve_task_version(
    configured: Option<u32>,
    parameter: Option<&EngineValue>,
    work_item_id: WorkItemId,
) -> Result<u32> {
    if let Some(version) = configured {
        return Ok(version);
    }
    match parameter {
        Some(EngineValue::Text(value)) => {
            value
                .parse::<u32>()
                .map_err(|e| Error::InvalidTaskVersion {
                    work_item_id,
                    value: value.clone(),
                    source: Some(e),
                })
        }
        Some(EngineValue::Int(value)) => {
            u32::try_from(*value).map_err(|_| Error::InvalidTaskVersion {
                work_item_id,
                value: value.to_string(),
                source: None,
            })
        }
        Some(other) => Err(Error::InvalidTaskVersion {
            work_item_id,
            value: other.type_name().to_string(),
            source: None,
        }),
        None => Err(Error::MissingTaskVersion { work_item_id }),
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
