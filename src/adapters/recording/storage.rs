//! Recording adapter for the `ObjectStorage` port.

use std::sync::Arc;

use serde_json::json;

use super::{record_interaction, record_result};
use crate::cassette::session::SharedRecorder;
use crate::ports::storage::{FileObject, ObjectStorage};
use crate::ports::tables::RemoteFuture;

/// Records storage calls while delegating to an inner implementation.
///
/// Uploaded bytes are not stored in the cassette, only their length.
pub struct RecordingStorage {
    inner: Box<dyn ObjectStorage>,
    recorder: SharedRecorder,
}

impl RecordingStorage {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn ObjectStorage>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl ObjectStorage for RecordingStorage {
    fn list(&self, bucket: &str, prefix: &str) -> RemoteFuture<'_, Vec<FileObject>> {
        let input = json!({ "bucket": bucket, "prefix": prefix });
        let (bucket, prefix) = (bucket.to_string(), prefix.to_string());
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.list(&bucket, &prefix).await;
            record_result(&recorder, "storage", "list", &input, &result);
            result
        })
    }

    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> RemoteFuture<'_, ()> {
        let input = json!({
            "bucket": bucket,
            "path": path,
            "size": bytes.len(),
            "content_type": content_type,
            "upsert": upsert,
        });
        let (bucket, path, content_type) =
            (bucket.to_string(), path.to_string(), content_type.to_string());
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.upload(&bucket, &path, bytes, &content_type, upsert).await;
            record_result(&recorder, "storage", "upload", &input, &result);
            result
        })
    }

    fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> RemoteFuture<'_, String> {
        let input = json!({ "bucket": bucket, "path": path, "expires_in": expires_in_secs });
        let (bucket, path) = (bucket.to_string(), path.to_string());
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.signed_url(&bucket, &path, expires_in_secs).await;
            record_result(&recorder, "storage", "signed_url", &input, &result);
            result
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let url = self.inner.public_url(bucket, path);
        record_interaction(
            &self.recorder,
            "storage",
            "public_url",
            &json!({ "bucket": bucket, "path": path }),
            &url,
        );
        url
    }

    fn remove(&self, bucket: &str, paths: &[String]) -> RemoteFuture<'_, Vec<String>> {
        let input = json!({ "bucket": bucket, "paths": paths });
        let (bucket, paths) = (bucket.to_string(), paths.to_vec());
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.remove(&bucket, &paths).await;
            record_result(&recorder, "storage", "remove", &input, &result);
            result
        })
    }
}
