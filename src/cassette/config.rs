//! Cassette configuration for composable per-port replay.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Shared handle on a replayer, cloned into every adapter reading from it.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Per-port cassette file paths. Ports without a cassette path panic if
/// called during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Cassette for the tables port.
    pub tables: Option<PathBuf>,
    /// Cassette for the object storage port.
    pub storage: Option<PathBuf>,
    /// Cassette for the auth port.
    pub auth: Option<PathBuf>,
    /// Cassette for the clock port.
    pub clock: Option<PathBuf>,
}

/// Per-port replayers, each with its own interaction stream.
pub struct PortReplayers {
    /// Replayer for the tables port.
    pub tables: Option<SharedReplayer>,
    /// Replayer for the object storage port.
    pub storage: Option<SharedReplayer>,
    /// Replayer for the auth port.
    pub auth: Option<SharedReplayer>,
    /// Replayer for the clock port.
    pub clock: Option<SharedReplayer>,
}

impl CassetteConfig {
    /// A config with every port unset.
    #[must_use]
    pub fn panic_on_unspecified() -> Self {
        Self::default()
    }

    /// Looks for `<port>.cassette.yaml` files in a recording directory.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let find = |port: &str| {
            let path = dir.join(format!("{port}.cassette.yaml"));
            path.is_file().then_some(path)
        };
        Self {
            tables: find("tables"),
            storage: find("storage"),
            auth: find("auth"),
            clock: find("clock"),
        }
    }

    /// Reads and parses one cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cassette(path: &Path) -> Result<Cassette, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Loads a cassette file into a shareable replayer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_replayer(path: &Path) -> Result<SharedReplayer, String> {
        let cassette = Self::load_cassette(path)?;
        Ok(Arc::new(Mutex::new(CassetteReplayer::new(&cassette))))
    }

    /// Loads all configured per-port cassette files.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |p: &Option<PathBuf>| p.as_deref().map(Self::load_replayer).transpose();
        Ok(PortReplayers {
            tables: load(&self.tables)?,
            storage: load(&self.storage)?,
            auth: load(&self.auth)?,
            clock: load(&self.clock)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
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

    #[test]
    fn from_dir_picks_up_existing_port_files() {
        let dir = std::env::temp_dir().join("projectdesk_config_from_dir");
        std::fs::create_dir_all(&dir).unwrap();
        write_cassette(&dir.join("tables.cassette.yaml"), vec![]);
        write_cassette(&dir.join("clock.cassette.yaml"), vec![]);

        let config = CassetteConfig::from_dir(&dir);
        assert!(config.tables.is_some());
        assert!(config.clock.is_some());
        assert!(config.storage.is_none());
        assert!(config.auth.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_per_port_cassettes() {
        let dir = std::env::temp_dir().join("projectdesk_config_ports");
        std::fs::create_dir_all(&dir).unwrap();
        let tables = dir.join("tables.cassette.yaml");
        write_cassette(
            &tables,
            vec![Interaction {
                seq: 0,
                port: "tables".into(),
                method: "select".into(),
                input: json!({"table": "tasks"}),
                output: json!({"Ok": []}),
            }],
        );

        let config = CassetteConfig { tables: Some(tables), ..CassetteConfig::default() };
        let replayers = config.load_all().unwrap();

        let tables = replayers.tables.unwrap();
        let mut guard = tables.lock().unwrap();
        assert_eq!(guard.next_interaction("tables", "select").output, json!({"Ok": []}));
        assert!(replayers.storage.is_none());

        drop(guard);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = CassetteConfig::load_cassette(Path::new("/nonexistent/x.cassette.yaml"))
            .err()
            .unwrap();
        assert!(err.contains("Failed to read cassette file"));
    }
}
