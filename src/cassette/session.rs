//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Shared handle on a recorder, cloned into the recording adapter of one port.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Default root for recordings, relative to the working directory.
pub const DEFAULT_CASSETTE_ROOT: &str = ".projectdesk/cassettes";

/// Per-port recorders writing to one directory.
///
/// Each port gets its own `<port>.cassette.yaml`, so a recording can later
/// be replayed port by port through
/// [`CassetteConfig::from_dir`](super::config::CassetteConfig::from_dir).
pub struct RecordingSession {
    /// Recorder for the tables port.
    pub tables: SharedRecorder,
    /// Recorder for the object storage port.
    pub storage: SharedRecorder,
    /// Recorder for the auth port.
    pub auth: SharedRecorder,
    /// Recorder for the clock port.
    pub clock: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Starts a session in a fresh timestamped directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn timestamped(root: &Path, endpoint: &str) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.join(&timestamp);
        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        Self::at(output_dir, endpoint)
    }

    /// Starts a session writing into `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn at(output_dir: impl Into<PathBuf>, endpoint: &str) -> Result<Self, String> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let stem = output_dir
            .file_name()
            .map_or_else(|| "session".to_string(), |n| n.to_string_lossy().into_owned());
        let make_recorder = |port: &str| -> SharedRecorder {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(path, format!("{stem}-{port}"), endpoint)))
        };

        Ok(Self {
            tables: make_recorder("tables"),
            storage: make_recorder("storage"),
            auth: make_recorder("auth"),
            clock: make_recorder("clock"),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every port's cassette and returns the output directory.
    ///
    /// The recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: SharedRecorder, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.tables, "tables")?;
        finish_one(self.storage, "storage")?;
        finish_one(self.auth, "auth")?;
        finish_one(self.clock, "clock")?;
        Ok(self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_writes_one_cassette_per_port() {
        let dir = std::env::temp_dir().join("projectdesk_session_test");
        let _ = std::fs::remove_dir_all(&dir);

        let session = RecordingSession::at(&dir, "memory").unwrap();
        assert!(dir.exists());
        session.tables.lock().unwrap().record(
            "tables",
            "select",
            serde_json::json!({}),
            serde_json::json!({"Ok": []}),
        );

        let out = session.finish().unwrap();
        assert_eq!(out, dir);
        for port in ["tables", "storage", "auth", "clock"] {
            assert!(dir.join(format!("{port}.cassette.yaml")).is_file(), "{port} cassette missing");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn finish_fails_while_an_adapter_holds_a_recorder() {
        let dir = std::env::temp_dir().join("projectdesk_session_held");
        let session = RecordingSession::at(&dir, "memory").unwrap();
        let held = Arc::clone(&session.storage);

        let err = session.finish().unwrap_err();
        assert!(err.contains("storage"));

        drop(held);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
