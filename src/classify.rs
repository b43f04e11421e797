//! Response classification
//!
//! Invoked when the transport collaborator delivers a parsed response. The
//! gateway answers bookmark calls with an HTTP success even when the call
//! failed at the application level; the real signal sits in a nested
//! `result` envelope. Malformed payloads degrade to a no-op, never a panic,
//! since this runs on the transport's delivery context.

use crate::types::Outcome;
use serde_json::Value;
use tracing::trace;

/// Error code reserved by the gateway for the concurrency-conflict
/// condition: the session is already bound to concurrent playback elsewhere
pub const CONCURRENCY_CONFLICT_CODE: &str = "4001";

/// Classify a delivered response payload
///
/// Returns `None` when the payload carries no error envelope (silent
/// success) or the envelope is malformed.
pub fn classify(payload: &Value) -> Option<Outcome> {
    let result = payload.get("result")?;
    let (code, message) = error_envelope(result)?;

    trace!(code = %code, "Bookmark response carried an error envelope");

    if code == CONCURRENCY_CONFLICT_CODE {
        Some(Outcome::ConcurrencyConflict)
    } else {
        Some(Outcome::ReportedError { code, message })
    }
}

/// Extract a code/message pair from the result envelope
///
/// Accepts both `result.error.{code,message}` and flat
/// `result.{code,message}` shapes.
fn error_envelope(result: &Value) -> Option<(String, String)> {
    let error = result.get("error").unwrap_or(result);
    let code = error.get("code").and_then(code_string)?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, message))
}

/// Normalize a JSON error code to its string form
///
/// Gateways emit both `"4001"` and `4001`; the sentinel comparison works on
/// the string form.
fn code_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
