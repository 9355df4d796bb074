//! Common test utilities and fixtures
//!
//! Recording doubles for the two external collaborators: the task
//! service and the process engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use taskbridge::{
    BridgeConfig, EngineSession, EngineValue, Error, Result, SessionProvider, Task,
    TaskId, TaskServiceClient, WorkItem, WorkItemBridge, WorkItemId,
};

// ─────────────────────────────────────────────────────────────────
// Recording Task Service
// ─────────────────────────────────────────────────────────────────

/// Task service double recording every submit and cancel
#[derive(Default)]
pub struct RecordingClient {
    pub submitted: Mutex<Vec<Task>>,
    pub cancelled: Mutex<Vec<TaskId>>,
    fail_submissions: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent submit fail
    pub fn fail_submissions(&self) {
        self.fail_submissions.store(true, Ordering::SeqCst);
    }

    /// The single submitted task, for tests dispatching exactly one
    pub fn only_submission(&self) -> Task {
        let submitted = self.submitted.lock();
        assert_eq!(submitted.len(), 1, "expected exactly one submission");
        submitted[0].clone()
    }
}

#[async_trait]
impl TaskServiceClient for RecordingClient {
    async fn submit(&self, task: &Task) -> Result<()> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(Error::Submission {
                task_id: task.task_id.clone(),
                message: "service unavailable".to_string(),
            });
        }
        self.submitted.lock().push(task.clone());
        Ok(())
    }

    async fn cancel(&self, task_id: &TaskId) -> Result<()> {
        self.cancelled.lock().push(task_id.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Recording Engine
// ─────────────────────────────────────────────────────────────────

/// One terminal signal delivered to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Completed {
        work_item_id: WorkItemId,
        results: HashMap<String, EngineValue>,
    },
    Aborted {
        work_item_id: WorkItemId,
    },
}

/// Session provider double recording every engine-facing call
#[derive(Default)]
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    fail_completions: Arc<AtomicBool>,
    abort_failures_remaining: Arc<AtomicUsize>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent complete() fail
    pub fn fail_completions(&self) {
        self.fail_completions.store(true, Ordering::SeqCst);
    }

    /// Make the next `count` abort() calls fail
    pub fn fail_aborts(&self, count: usize) {
        self.abort_failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Calls recorded for a single work item
    pub fn calls_for(&self, work_item_id: WorkItemId) -> Vec<EngineCall> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                EngineCall::Completed { work_item_id: id, .. }
                | EngineCall::Aborted { work_item_id: id } => *id == work_item_id,
            })
            .collect()
    }
}

impl SessionProvider for RecordingEngine {
    fn session(&self, _deployment_id: &str) -> Result<Box<dyn EngineSession>> {
        Ok(Box::new(RecordingSession {
            calls: self.calls.clone(),
            fail_completions: self.fail_completions.clone(),
            abort_failures_remaining: self.abort_failures_remaining.clone(),
        }))
    }
}

struct RecordingSession {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    fail_completions: Arc<AtomicBool>,
    abort_failures_remaining: Arc<AtomicUsize>,
}

impl EngineSession for RecordingSession {
    fn complete(
        &mut self,
        work_item_id: WorkItemId,
        results: HashMap<String, EngineValue>,
    ) -> Result<()> {
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(Error::engine("session lost before completion"));
        }
        self.calls.lock().push(EngineCall::Completed {
            work_item_id,
            results,
        });
        Ok(())
    }

    fn abort(&mut self, work_item_id: WorkItemId) -> Result<()> {
        if self
            .abort_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
        {
            return Err(Error::engine("session lost before abort"));
        }
        self.calls.lock().push(EngineCall::Aborted { work_item_id });
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────

/// A bridge over recording doubles, plus the doubles for assertions
pub fn bridge_fixture(
    config: BridgeConfig,
) -> (Arc<WorkItemBridge>, Arc<RecordingClient>, Arc<RecordingEngine>) {
    let client = RecordingClient::new();
    let engine = RecordingEngine::new();
    let bridge = WorkItemBridge::new(config, client.clone(), engine.clone())
        .expect("bridge construction");
    (Arc::new(bridge), client, engine)
}

pub fn test_config() -> BridgeConfig {
    BridgeConfig::new("http://tasks.test.invalid").expect("test config")
}

/// Work item with the given id and parameters
pub fn work_item(id: i64, parameters: &[(&str, EngineValue)]) -> WorkItem {
    WorkItem {
        id: WorkItemId(id),
        process_instance_id: format!("proc-{id}"),
        deployment_id: "deploy-test".to_string(),
        parameters: parameters
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    }
}

/// The submitted task flipped into a success notification payload
pub fn succeeded(mut task: Task, result: &[(&str, serde_json::Value)]) -> Task {
    task.task_result = Some(
        result
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    );
    task
}

/// The submitted task flipped into a failure notification payload
pub fn failed(mut task: Task, error: serde_json::Value) -> Task {
    task.task_error = Some(error);
    task
}
