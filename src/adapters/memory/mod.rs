//! In-memory backend used offline and in tests.

pub mod auth;
pub mod clock;
pub mod storage;
pub mod tables;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

pub use auth::MemoryAuth;
pub use clock::FixedClock;
pub use storage::MemoryStorage;
pub use tables::MemoryTables;

use crate::config::DEFAULT_BUCKET;
use crate::ports::auth::SessionUser;
use crate::ports::storage::content_type_for;

/// Starting data for the in-memory backend, usually read from YAML.
///
/// ```yaml
/// user: { id: u1, email: dana@site.test }
/// tables:
///   tasks:
///     - { id: p1, title: House, type: PROJECT, creator_id: u1,
///         start_date: 2025-01-01, end_date: 2025-06-30, status: PENDING }
/// files:
///   - { path: tasks/p1/plan.pdf, content: "..." }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySeed {
    /// Signed-in user; absent means no session.
    #[serde(default)]
    pub user: Option<SessionUser>,
    /// Rows per table, in backend column names.
    #[serde(default)]
    pub tables: HashMap<String, Vec<Value>>,
    /// Stored objects.
    #[serde(default)]
    pub files: Vec<SeedFile>,
}

/// One stored object of a seed.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedFile {
    /// Bucket; defaults to the standard bucket.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Object path.
    pub path: String,
    /// Text content.
    #[serde(default)]
    pub content: String,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

/// The three stateful halves of the in-memory backend.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    /// Tables.
    pub tables: MemoryTables,
    /// Object storage.
    pub storage: MemoryStorage,
    /// Session.
    pub auth: MemoryAuth,
}

impl MemoryBackend {
    /// Builds a backend holding the seed's rows, files and user.
    #[must_use]
    pub fn from_seed(seed: MemorySeed) -> Self {
        let tables = MemoryTables::new();
        for (table, rows) in seed.tables {
            tables.seed(&table, rows);
        }
        let storage = MemoryStorage::new();
        for file in seed.files {
            storage.put(&file.bucket, &file.path, file.content, content_type_for(&file.path));
        }
        let auth = seed.user.map_or_else(MemoryAuth::anonymous, MemoryAuth::signed_in);
        Self { tables, storage, auth }
    }

    /// Reads a YAML seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read seed file {}: {e}", path.display()))?;
        let seed: MemorySeed = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse seed file {}: {e}", path.display()))?;
        Ok(Self::from_seed(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_yaml_populates_every_part() {
        let yaml = r"
user: { id: u1, email: dana@site.test }
tables:
  tasks:
    - { id: p1, title: House, type: PROJECT }
files:
  - { path: tasks/p1/plan.txt, content: hello }
";
        let seed: MemorySeed = serde_yaml::from_str(yaml).unwrap();
        let backend = MemoryBackend::from_seed(seed);

        assert_eq!(backend.tables.rows("tasks").len(), 1);
        assert_eq!(backend.storage.get("files", "tasks/p1/plan.txt"), Some(b"hello".to_vec()));
    }
}
