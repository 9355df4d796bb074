//! Data model shared across the bridge

mod task;
mod value;

pub use task::{Task, TaskId, WorkItemId};
pub use value::EngineValue;
