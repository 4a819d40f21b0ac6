//! Recording adapters that capture interactions to cassettes.
//!
//! Each adapter wraps a live (or in-memory) implementation, forwards every
//! call, and records the input with the outcome.

pub mod auth;
pub mod clock;
pub mod storage;
pub mod tables;

use std::sync::PoisonError;

use serde::Serialize;
use serde_json::Value;

pub use auth::RecordingAuth;
pub use clock::RecordingClock;
pub use storage::RecordingStorage;
pub use tables::RecordingTables;

use crate::cassette::session::SharedRecorder;

fn to_json<T: Serialize>(value: &T, port: &str, method: &str) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!(%e, port, method, "recording a value that does not serialize");
        Value::Null
    })
}

/// Record an interaction with a plain return value.
///
/// Mirror of `replaying::next_output`.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input = to_json(input, port, method);
    let output = to_json(output, port, method);
    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
///
/// Mirror of `replaying::replay_result`:
/// - `Ok(v)` is serialized as `{"Ok": v}`
/// - `Err(e)` is serialized as `{"Err": e.to_string()}`
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let input = to_json(input, port, method);
    let output = match result {
        Ok(v) => serde_json::json!({ "Ok": to_json(v, port, method) }),
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };
    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}
