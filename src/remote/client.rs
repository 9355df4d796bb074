//! Task service client
//!
//! Submission is fire-and-forget: `submit` returns once the service has
//! acknowledged the enqueue and never waits for the task to run.
//! Cancellation is best-effort by contract; a task that already finished
//! or never existed is not an error.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::types::{Task, TaskId};

// ─────────────────────────────────────────────────────────────────
// Client Trait
// ─────────────────────────────────────────────────────────────────

/// Client for the remote task execution service
#[async_trait]
pub trait TaskServiceClient: Send + Sync {
    /// Submit a task for remote execution.
    ///
    /// Returns once the service acknowledged the enqueue; the terminal
    /// outcome arrives later as a [`TaskNotification`](super::TaskNotification).
    async fn submit(&self, task: &Task) -> Result<()>;

    /// Request cancellation of a previously submitted task.
    ///
    /// Best-effort: the task may already have finished remotely. An error
    /// here means the request could not be delivered, not that the task
    /// kept running.
    async fn cancel(&self, task_id: &TaskId) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────
// HTTP Adapter
// ─────────────────────────────────────────────────────────────────

/// HTTP adapter for the task service
///
/// Tasks are posted as JSON to `{base}/tasks`; cancellation deletes
/// `{base}/tasks/{task_id}`.
pub struct HttpTaskClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpTaskClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Build a client from a validated bridge configuration
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Ok(Self::new(config.endpoint()?))
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url.as_str().trim_end_matches('/'))
    }

    fn task_url(&self, task_id: &TaskId) -> String {
        format!("{}/{}", self.tasks_url(), task_id)
    }
}

#[async_trait]
impl TaskServiceClient for HttpTaskClient {
    async fn submit(&self, task: &Task) -> Result<()> {
        let response = self
            .http
            .post(self.tasks_url())
            .json(task)
            .send()
            .await
            .map_err(|e| Error::Submission {
                task_id: task.task_id.clone(),
                message: e.to_string(),
            })?;

        if let Err(e) = response.error_for_status_ref() {
            return Err(Error::Submission {
                task_id: task.task_id.clone(),
                message: e.to_string(),
            });
        }

        debug!(task_id = %task.task_id, "task accepted by service");
        Ok(())
    }

    async fn cancel(&self, task_id: &TaskId) -> Result<()> {
        let response = self.http.delete(self.task_url(task_id)).send().await?;
        // 404 just means the task already finished or was never known
        debug!(
            task_id = %task_id,
            status = response.status().as_u16(),
            "cancellation requested"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
