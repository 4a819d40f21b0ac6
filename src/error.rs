//! Error types for the remote boundary and the application layer.

use thiserror::Error;

use crate::milestones::SyncReport;

/// Failures reported by a port adapter talking to the hosted backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}{}", .details.as_deref().map(|d| format!(" / {d}")).unwrap_or_default())]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the service.
        message: String,
        /// Optional detail string reported by the service.
        details: Option<String>,
    },

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The table, view or procedure is not known to the adapter.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An error recorded in a cassette and served back during replay.
    #[error("{0}")]
    Replayed(String),
}

/// Result alias for port operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors surfaced by the query functions and the state store.
#[derive(Debug, Error)]
pub enum AppError {
    /// The remote call failed.
    #[error("{context}: {source}")]
    Remote {
        /// Which query failed (e.g. `fetch_tasks`).
        context: &'static str,
        /// Underlying adapter error.
        #[source]
        source: RemoteError,
    },

    /// A row came back in a shape the model does not accept.
    #[error("{context}: failed to decode row: {message}")]
    Decode {
        /// Which query produced the row.
        context: &'static str,
        /// Deserializer message.
        message: String,
    },

    /// A single row was expected but none matched.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (task, contract, ...).
        entity: &'static str,
        /// Requested id.
        id: String,
    },

    /// Input rejected before any remote call.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The current user may not perform the action in the entity's state.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// Milestone reconciliation stopped part-way.
    #[error("milestone sync stopped after {} change(s): {source}", .report.applied())]
    PartialSync {
        /// Changes already applied remotely.
        report: SyncReport,
        /// The failure that stopped the loop.
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wraps a port error with the name of the failing query.
    #[must_use]
    pub fn remote(context: &'static str, source: RemoteError) -> Self {
        Self::Remote { context, source }
    }

    /// Wraps a row decoding error.
    #[must_use]
    pub fn decode(context: &'static str, err: &serde_json::Error) -> Self {
        Self::Decode { context, message: err.to_string() }
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
