//! Replaying adapter for the `ObjectStorage` port.

use super::{next_output, replay_result};
use crate::cassette::config::SharedReplayer;
use crate::ports::storage::{FileObject, ObjectStorage};
use crate::ports::tables::RemoteFuture;

/// Serves recorded storage calls in order, per method.
pub struct ReplayingStorage {
    replayer: Option<SharedReplayer>,
}

impl ReplayingStorage {
    /// A storage port reading from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer: Some(replayer) }
    }

    /// A storage port with no cassette. Panics when called.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { replayer: None }
    }
}

impl ObjectStorage for ReplayingStorage {
    fn list(&self, _bucket: &str, _prefix: &str) -> RemoteFuture<'_, Vec<FileObject>> {
        let output = next_output(self.replayer.as_ref(), "storage", "list");
        Box::pin(async move { replay_result(output) })
    }

    fn upload(
        &self,
        _bucket: &str,
        _path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
        _upsert: bool,
    ) -> RemoteFuture<'_, ()> {
        let output = next_output(self.replayer.as_ref(), "storage", "upload");
        Box::pin(async move { replay_result(output) })
    }

    fn signed_url(&self, _bucket: &str, _path: &str, _expires_in_secs: u64) -> RemoteFuture<'_, String> {
        let output = next_output(self.replayer.as_ref(), "storage", "signed_url");
        Box::pin(async move { replay_result(output) })
    }

    fn public_url(&self, _bucket: &str, _path: &str) -> String {
        let output = next_output(self.replayer.as_ref(), "storage", "public_url");
        match output {
            serde_json::Value::String(url) => url,
            other => panic!("storage::public_url: recorded value is not a string: {other}"),
        }
    }

    fn remove(&self, _bucket: &str, _paths: &[String]) -> RemoteFuture<'_, Vec<String>> {
        let output = next_output(self.replayer.as_ref(), "storage", "remove");
        Box::pin(async move { replay_result(output) })
    }
}
