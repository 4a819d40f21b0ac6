//! Replaying adapters that serve recorded interactions.
//!
//! Adapters built with `unconfigured()` have no cassette and panic on first
//! use, naming the port that was left out of the `CassetteConfig`.

pub mod auth;
pub mod clock;
pub mod storage;
pub mod tables;

use std::sync::PoisonError;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use auth::ReplayingAuth;
pub use clock::ReplayingClock;
pub use storage::ReplayingStorage;
pub use tables::ReplayingTables;

use crate::cassette::config::SharedReplayer;
use crate::error::{RemoteError, RemoteResult};

/// Takes the output of the next recorded `port::method` interaction.
///
/// # Panics
///
/// Panics when no cassette is configured for the port or the cassette has
/// no interaction left for this method.
pub(crate) fn next_output(replayer: Option<&SharedReplayer>, port: &str, method: &str) -> Value {
    let Some(replayer) = replayer else {
        panic!("{port} port not configured in CassetteConfig: no cassette loaded for {port}");
    };
    let mut guard = replayer.lock().unwrap_or_else(PoisonError::into_inner);
    guard.next_interaction(port, method).output
}

/// Decodes a recorded `{"Ok": v}` / `{"Err": message}` outcome.
///
/// # Errors
///
/// Returns `Replayed` for a recorded error and `Decode` for an output that
/// does not fit `T`.
pub(crate) fn replay_result<T: DeserializeOwned>(output: Value) -> RemoteResult<T> {
    match output {
        Value::Object(mut map) if map.contains_key("Ok") => {
            let value = map.remove("Ok").unwrap_or(Value::Null);
            serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
        }
        Value::Object(map) if map.contains_key("Err") => {
            let message = match map.get("Err") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Err(RemoteError::Replayed(message))
        }
        other => Err(RemoteError::Decode(format!("recorded output is not an Ok/Err outcome: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_outcome_decodes_value() {
        let rows: Vec<Value> = replay_result(json!({"Ok": [{"id": 1}]})).unwrap();
        assert_eq!(rows, vec![json!({"id": 1})]);
    }

    #[test]
    fn err_outcome_becomes_replayed_error() {
        let err = replay_result::<Vec<Value>>(json!({"Err": "API error (500): boom"})).unwrap_err();
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn malformed_outcome_is_a_decode_error() {
        let err = replay_result::<String>(json!(42)).unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[test]
    #[should_panic(expected = "not configured in CassetteConfig")]
    fn missing_cassette_panics() {
        let _ = next_output(None, "tables", "select");
    }
}
