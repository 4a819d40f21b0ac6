//! Client configuration read from the environment.
//!
//! `.env` is loaded first (via `dotenvy`) so local setups can keep the
//! service URL and keys out of the shell profile.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default storage bucket holding task documents and contract files.
pub const DEFAULT_BUCKET: &str = "files";

/// Default lifetime of signed download URLs.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(180);

/// Which adapter set backs the service context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The hosted service over HTTP.
    Live,
    /// A process-local in-memory backend (offline demo and tests).
    Memory,
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the project, e.g. `https://abc.example.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Access token of the signed-in user, if any.
    pub access_token: Option<String>,
}

/// Settings the query layer needs regardless of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Storage bucket for documents and contract files.
    pub bucket: String,
    /// Lifetime of signed download URLs.
    pub signed_url_ttl: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self { bucket: DEFAULT_BUCKET.to_string(), signed_url_ttl: DEFAULT_SIGNED_URL_TTL }
    }
}

/// Full client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Selected backend.
    pub backend: BackendKind,
    /// Remote connection; `None` when the memory backend is selected.
    pub remote: Option<RemoteConfig>,
    /// Query-layer settings.
    pub settings: ClientSettings,
    /// Directory to record cassettes into, when recording.
    pub record_dir: Option<PathBuf>,
    /// YAML seed for the memory backend.
    pub seed_path: Option<PathBuf>,
}

impl Config {
    /// Loads `.env` (if present) and reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case outside local development.
        let _ = dotenvy::dotenv();
        Self::from_vars(&std::env::vars().collect())
    }

    /// Builds a configuration from an explicit variable map.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot be parsed.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(String::as_str).filter(|v| !v.is_empty());

        let backend = match get("PROJECTDESK_BACKEND") {
            None | Some("live") => BackendKind::Live,
            Some("memory") => BackendKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "PROJECTDESK_BACKEND",
                    value: other.to_string(),
                    reason: "expected `live` or `memory`".into(),
                })
            }
        };

        let remote = match backend {
            BackendKind::Memory => None,
            BackendKind::Live => Some(RemoteConfig {
                url: get("PROJECTDESK_URL")
                    .ok_or(ConfigError::Missing("PROJECTDESK_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
                anon_key: get("PROJECTDESK_ANON_KEY")
                    .ok_or(ConfigError::Missing("PROJECTDESK_ANON_KEY"))?
                    .to_string(),
                access_token: get("PROJECTDESK_ACCESS_TOKEN").map(String::from),
            }),
        };

        let signed_url_ttl = match get("PROJECTDESK_SIGNED_URL_TTL") {
            None => DEFAULT_SIGNED_URL_TTL,
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::Invalid {
                    name: "PROJECTDESK_SIGNED_URL_TTL",
                    value: raw.to_string(),
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Self {
            backend,
            remote,
            settings: ClientSettings {
                bucket: get("PROJECTDESK_BUCKET").unwrap_or(DEFAULT_BUCKET).to_string(),
                signed_url_ttl,
            },
            record_dir: get("PROJECTDESK_RECORD").map(PathBuf::from),
            seed_path: get("PROJECTDESK_SEED").map(PathBuf::from),
        })
    }
}
