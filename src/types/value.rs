//! Engine-native value model
//!
//! The process engine exchanges parameters and results as a small, closed
//! set of value shapes. Anything outside this set is rejected at the
//! conversion boundary rather than smuggled through.

use std::collections::BTreeMap;

/// A value in the engine's own type model
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    /// Boolean flag
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating-point scalar
    Float(f64),
    /// Text value
    Text(String),
    /// Ordered collection
    List(Vec<EngineValue>),
    /// Keyed collection
    Map(BTreeMap<String, EngineValue>),
}

impl EngineValue {
    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            EngineValue::Bool(_) => "bool",
            EngineValue::Int(_) => "int",
            EngineValue::Float(_) => "float",
            EngineValue::Text(_) => "text",
            EngineValue::List(_) => "list",
            EngineValue::Map(_) => "map",
        }
    }

    /// Borrow the text content if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EngineValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for EngineValue {
    fn from(v: bool) -> Self {
        EngineValue::Bool(v)
    }
}

impl From<i64> for EngineValue {
    fn from(v: i64) -> Self {
        EngineValue::Int(v)
    }
}

impl From<f64> for EngineValue {
    fn from(v: f64) -> Self {
        EngineValue::Float(v)
    }
}

impl From<&str> for EngineValue {
    fn from(v: &str) -> Self {
        EngineValue::Text(v.to_string())
    }
}

impl From<String> for EngineValue {
    fn from(v: String) -> Self {
        EngineValue::Text(v)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
