//! Value conversion between the engine and the task service
//!
//! Both directions enumerate the supported shapes explicitly and fail
//! closed on anything else. Input conversion (work item parameters into
//! task data) is strict: one bad parameter fails the whole dispatch.
//! Output conversion (task results back to the engine) degrades
//! gracefully: a failing entry is logged and skipped so the remaining
//! results still reach the engine.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value as RemoteValue;
use tracing::{debug, error};

use crate::error::{ConversionDirection, Error, Result};
use crate::types::EngineValue;

// ─────────────────────────────────────────────────────────────────
// Single-value conversion
// ─────────────────────────────────────────────────────────────────

/// Convert an engine value into its remote representation.
///
/// `key` is the parameter name the value belongs to, carried into the
/// error for diagnostics.
pub fn to_remote(key: &str, value: &EngineValue) -> Result<RemoteValue> {
    remote_value(value).map_err(|detail| Error::Conversion {
        key: key.to_string(),
        direction: ConversionDirection::Input,
        detail,
    })
}

/// Convert a remote value into its engine representation.
pub fn to_engine(key: &str, value: &RemoteValue) -> Result<EngineValue> {
    engine_value(value).map_err(|detail| Error::Conversion {
        key: key.to_string(),
        direction: ConversionDirection::Output,
        detail,
    })
}

fn remote_value(value: &EngineValue) -> std::result::Result<RemoteValue, String> {
    match value {
        EngineValue::Bool(b) => Ok(RemoteValue::Bool(*b)),
        EngineValue::Int(i) => Ok(RemoteValue::from(*i)),
        EngineValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(RemoteValue::Number)
            .ok_or_else(|| format!("non-finite float {f} has no JSON representation")),
        EngineValue::Text(s) => Ok(RemoteValue::String(s.clone())),
        EngineValue::List(items) => items
            .iter()
            .map(remote_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(RemoteValue::Array),
        EngineValue::Map(entries) => entries
            .iter()
            .map(|(k, v)| remote_value(v).map(|rv| (k.clone(), rv)))
            .collect::<std::result::Result<serde_json::Map<_, _>, _>>()
            .map(RemoteValue::Object),
    }
}

fn engine_value(value: &RemoteValue) -> std::result::Result<EngineValue, String> {
    match value {
        RemoteValue::Bool(b) => Ok(EngineValue::Bool(*b)),
        RemoteValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(EngineValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(EngineValue::Float(f))
            } else {
                Err(format!("number {n} does not fit the engine value model"))
            }
        }
        RemoteValue::String(s) => Ok(EngineValue::Text(s.clone())),
        RemoteValue::Array(items) => items
            .iter()
            .map(engine_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(EngineValue::List),
        RemoteValue::Object(entries) => entries
            .iter()
            .map(|(k, v)| engine_value(v).map(|ev| (k.clone(), ev)))
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map(EngineValue::Map),
        RemoteValue::Null => Err("null has no engine representation".to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────
// Keyed-map conversion
// ─────────────────────────────────────────────────────────────────

/// Convert a full work-item parameter set into task data.
///
/// Strict: the first unconvertible parameter fails the conversion, since
/// a bad input is a dispatch-time configuration problem.
pub fn parameters_to_task_data(
    parameters: &HashMap<String, EngineValue>,
) -> Result<HashMap<String, RemoteValue>> {
    let mut data = HashMap::with_capacity(parameters.len());
    for (key, value) in parameters {
        let converted = to_remote(key, value)?;
        debug!(key = %key, value_type = value.type_name(), "converted input parameter");
        data.insert(key.clone(), converted);
    }
    Ok(data)
}

/// Convert a task result mapping back into engine values.
///
/// Lossy: entries that cannot be represented engine-side are logged and
/// skipped; everything else is still delivered. The remote work already
/// happened, so a partial result beats an aborted work item.
pub fn task_result_to_engine(
    result: &HashMap<String, RemoteValue>,
) -> HashMap<String, EngineValue> {
    let mut converted = HashMap::with_capacity(result.len());
    for (key, value) in result {
        match to_engine(key, value) {
            Ok(engine_side) => {
                debug!(key = %key, value_type = engine_side.type_name(), "converted output value");
                converted.insert(key.clone(), engine_side);
            }
            Err(e) => {
                error!(key = %key, error = %e, "skipping unconvertible output value");
            }
        }
    }
    converted
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
