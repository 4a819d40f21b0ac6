//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::{LiveAuth, LiveClock, LiveStorage, LiveTables, RestClient};
use crate::adapters::memory::MemoryBackend;
use crate::adapters::recording::{RecordingAuth, RecordingClock, RecordingStorage, RecordingTables};
use crate::adapters::replaying::{ReplayingAuth, ReplayingClock, ReplayingStorage, ReplayingTables};
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::config::{ClientSettings, RemoteConfig};
use crate::error::RemoteError;
use crate::ports::{AuthSession, Clock, ObjectStorage, RemoteTables};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire
/// up different adapter implementations (live, memory, recording, replaying).
pub struct ServiceContext {
    /// Table reads and writes.
    pub tables: Box<dyn RemoteTables>,
    /// Object storage for documents and contract files.
    pub storage: Box<dyn ObjectStorage>,
    /// The current session.
    pub auth: Box<dyn AuthSession>,
    /// Clock for client-stamped times.
    pub clock: Box<dyn Clock>,
    /// Bucket and URL lifetime used by the query layer.
    pub settings: ClientSettings,
}

impl ServiceContext {
    /// Creates a live context talking to the hosted backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn live(remote: &RemoteConfig, settings: ClientSettings) -> Result<Self, RemoteError> {
        let rest = RestClient::new(remote)?;
        Ok(Self {
            tables: Box::new(LiveTables::new(rest.clone())),
            storage: Box::new(LiveStorage::new(rest.clone())),
            auth: Box::new(LiveAuth::new(rest)),
            clock: Box::new(LiveClock),
            settings,
        })
    }

    /// Creates a context over an in-memory backend with the system clock.
    ///
    /// The backend's handles stay usable by the caller; clones share state.
    #[must_use]
    pub fn memory(backend: &MemoryBackend, settings: ClientSettings) -> Self {
        Self {
            tables: Box::new(backend.tables.clone()),
            storage: Box::new(backend.storage.clone()),
            auth: Box::new(backend.auth.clone()),
            clock: Box::new(LiveClock),
            settings,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Wraps every port of `inner` so its interactions land in `session`.
    ///
    /// Drop the returned context before calling [`RecordingSession::finish`].
    #[must_use]
    pub fn recording(inner: Self, session: &RecordingSession) -> Self {
        Self {
            tables: Box::new(RecordingTables::new(inner.tables, Arc::clone(&session.tables))),
            storage: Box::new(RecordingStorage::new(inner.storage, Arc::clone(&session.storage))),
            auth: Box::new(RecordingAuth::new(inner.auth, Arc::clone(&session.auth))),
            clock: Box::new(RecordingClock::new(inner.clock, Arc::clone(&session.clock))),
            settings: inner.settings,
        }
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// All ports share one replayer; interactions are dispatched by
    /// port/method pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path, settings: ClientSettings) -> Result<Self, String> {
        let replayer = CassetteConfig::load_replayer(path)?;
        Ok(Self {
            tables: Box::new(ReplayingTables::new(Arc::clone(&replayer))),
            storage: Box::new(ReplayingStorage::new(Arc::clone(&replayer))),
            auth: Box::new(ReplayingAuth::new(Arc::clone(&replayer))),
            clock: Box::new(ReplayingClock::new(replayer)),
            settings,
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette panic with a clear message when
    /// called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig, settings: ClientSettings) -> Result<Self, String> {
        let replayers = config.load_all()?;
        Ok(Self {
            tables: Box::new(replayers.tables.map_or_else(ReplayingTables::unconfigured, ReplayingTables::new)),
            storage: Box::new(
                replayers.storage.map_or_else(ReplayingStorage::unconfigured, ReplayingStorage::new),
            ),
            auth: Box::new(replayers.auth.map_or_else(ReplayingAuth::unconfigured, ReplayingAuth::new)),
            clock: Box::new(replayers.clock.map_or_else(ReplayingClock::unconfigured, ReplayingClock::new)),
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn write_cassette(path: &Path, interactions: Vec<Interaction>) {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            endpoint: "memory".into(),
            interactions,
        };
        std::fs::write(path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
    }

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: port.into(), method: method.into(), input: json!({}), output }
    }

    #[tokio::test]
    async fn replaying_context_from_monolithic_cassette() {
        let dir = std::env::temp_dir().join("projectdesk_ctx_test_mono");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("full.cassette.yaml");
        write_cassette(
            &path,
            vec![
                interaction(0, "clock", "now", json!("2024-06-15T10:30:00Z")),
                interaction(1, "auth", "current_user", json!({"Ok": {"id": "u1", "email": null, "role": null}})),
                interaction(2, "tables", "select", json!({"Ok": [{"id": "t1"}]})),
            ],
        );

        let ctx = ServiceContext::replaying(&path, ClientSettings::default()).unwrap();
        assert_eq!(ctx.clock.now().to_rfc3339(), "2024-06-15T10:30:00+00:00");
        let user = ctx.auth.current_user().await.unwrap().unwrap();
        assert_eq!(user.id, "u1");
        let rows = ctx.tables.select(&crate::ports::TableQuery::from("tasks")).await.unwrap();
        assert_eq!(rows, vec![json!({"id": "t1"})]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_from_per_port_cassettes() {
        let dir = std::env::temp_dir().join("projectdesk_ctx_test_ports");
        std::fs::create_dir_all(&dir).unwrap();
        let clock_path = dir.join("clock.cassette.yaml");
        write_cassette(&clock_path, vec![interaction(0, "clock", "now", json!("2024-01-01T00:00:00Z"))]);

        let config = CassetteConfig { clock: Some(clock_path), ..CassetteConfig::default() };
        let ctx = ServiceContext::replaying_from(&config, ClientSettings::default()).unwrap();
        assert_eq!(ctx.clock.now().to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[should_panic(expected = "not configured in CassetteConfig")]
    fn unspecified_port_panics_with_clear_message() {
        let ctx =
            ServiceContext::replaying_from(&CassetteConfig::panic_on_unspecified(), ClientSettings::default())
                .unwrap();
        let _ = ctx.clock.now();
    }

    #[tokio::test]
    async fn recording_wraps_memory_backend() {
        let dir = std::env::temp_dir().join("projectdesk_ctx_test_record");
        let _ = std::fs::remove_dir_all(&dir);
        let session = RecordingSession::at(&dir, "memory").unwrap();

        let backend = MemoryBackend::default();
        backend.tables.seed("tasks", vec![json!({"id": "t1"})]);
        let ctx = ServiceContext::recording(
            ServiceContext::memory(&backend, ClientSettings::default()),
            &session,
        );
        ctx.tables.select(&crate::ports::TableQuery::from("tasks")).await.unwrap();
        drop(ctx);

        let out = session.finish().unwrap();
        let replayed = ServiceContext::replaying_from(&CassetteConfig::from_dir(&out), ClientSettings::default())
            .unwrap();
        let rows = replayed.tables.select(&crate::ports::TableQuery::from("tasks")).await.unwrap();
        assert_eq!(rows[0]["id"], "t1");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
