//! Work-item to task correlation
//!
//! The single source of truth for which work items have a task in flight.
//! An entry exists exactly between successful submission and terminal
//! resolution; the atomic `take` decides which of the racing resolution
//! paths (success callback, failure callback, cancellation) acts.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::types::{TaskId, WorkItemId};

/// Concurrent map from local work item id to remote task id
///
/// Only `put` and `take` are exposed; callers never see the lock. The
/// lock is held for the map operation only, never across I/O.
pub struct CorrelationTable {
    entries: Mutex<HashMap<WorkItemId, TaskId>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record the mapping for a freshly submitted task.
    ///
    /// Errors if an entry already exists; dispatch guarantees one dispatch
    /// per work item, so a duplicate means the caller broke that contract.
    pub fn put(&self, work_item_id: WorkItemId, task_id: TaskId) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&work_item_id) {
            return Err(Error::DuplicateDispatch { work_item_id });
        }
        entries.insert(work_item_id, task_id);
        Ok(())
    }

    /// Atomically remove and return the entry, if present.
    ///
    /// Whichever caller observes the entry wins the right to resolve the
    /// work item; every later caller sees `None` and must not act.
    pub fn take(&self, work_item_id: WorkItemId) -> Option<TaskId> {
        self.entries.lock().remove(&work_item_id)
    }

    /// Number of work items currently in flight
    pub fn in_flight(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn task_id(n: u32) -> TaskId {
        TaskId::derive(&format!("proc-{n}"), WorkItemId(n as i64))
    }

    #[test]
    fn test_put_then_take() {
        let table = CorrelationTable::new();
        let id = task_id(1);
        table.put(WorkItemId(1), id.clone()).unwrap();
        assert_eq!(table.in_flight(), 1);

        assert_eq!(table.take(WorkItemId(1)), Some(id));
        assert_eq!(table.in_flight(), 0);
    }

    #[test]
    fn test_take_absent_is_none() {
        let table = CorrelationTable::new();
        assert_eq!(table.take(WorkItemId(99)), None);
    }

    #[test]
    fn test_duplicate_put_fails() {
        let table = CorrelationTable::new();
        table.put(WorkItemId(1), task_id(1)).unwrap();
        let err = table.put(WorkItemId(1), task_id(2)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDispatch { .. }));
        // original entry untouched
        assert_eq!(table.in_flight(), 1);
    }

    #[test]
    fn test_concurrent_take_single_winner() {
        let table = Arc::new(CorrelationTable::new());
        table.put(WorkItemId(1), task_id(1)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || table.take(WorkItemId(1)).is_some())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(table.in_flight(), 0);
    }
}
