//! Live adapter for the `ObjectStorage` port over `/storage/v1`.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::http::RestClient;
use crate::error::RemoteError;
use crate::ports::storage::{FileObject, ObjectStorage};
use crate::ports::tables::RemoteFuture;

/// Most entries returned by one listing call.
const LIST_LIMIT: u32 = 100;

/// Live object storage client.
pub struct LiveStorage {
    rest: RestClient,
}

impl LiveStorage {
    /// Creates a storage client sharing `rest`.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[derive(Deserialize)]
struct ListEntry {
    name: String,
    id: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    metadata: Option<EntryMetadata>,
}

#[derive(Deserialize)]
struct EntryMetadata {
    size: Option<u64>,
    mimetype: Option<String>,
}

impl From<ListEntry> for FileObject {
    fn from(entry: ListEntry) -> Self {
        let (size, mime_type) = entry.metadata.map_or((None, None), |m| (m.size, m.mimetype));
        Self { name: entry.name, id: entry.id, size, mime_type, updated_at: entry.updated_at }
    }
}

#[derive(Deserialize)]
struct SignedUrl {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Deserialize)]
struct RemovedEntry {
    name: String,
}

fn decode<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> Result<T, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
}

impl ObjectStorage for LiveStorage {
    fn list(&self, bucket: &str, prefix: &str) -> RemoteFuture<'_, Vec<FileObject>> {
        let path = format!("/storage/v1/object/list/{bucket}");
        let body = json!({
            "prefix": prefix,
            "limit": LIST_LIMIT,
            "offset": 0,
            "sortBy": { "column": "name", "order": "asc" },
        });
        Box::pin(async move {
            tracing::debug!(%path, "list objects");
            let request = self.rest.request(Method::POST, &path).json(&body);
            let entries: Vec<ListEntry> = decode(self.rest.send_json(request).await?)?;
            Ok(entries.into_iter().map(FileObject::from).collect())
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
        let url_path = format!("/storage/v1/object/{bucket}/{path}");
        let content_type = content_type.to_string();
        Box::pin(async move {
            tracing::debug!(path = %url_path, bytes = bytes.len(), upsert, "upload object");
            let request = self
                .rest
                .request(Method::POST, &url_path)
                .header("content-type", content_type)
                .header("x-upsert", if upsert { "true" } else { "false" })
                .body(bytes);
            self.rest.send_json(request).await?;
            Ok(())
        })
    }

    fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> RemoteFuture<'_, String> {
        let url_path = format!("/storage/v1/object/sign/{bucket}/{path}");
        Box::pin(async move {
            let request =
                self.rest.request(Method::POST, &url_path).json(&json!({ "expiresIn": expires_in_secs }));
            let signed: SignedUrl = decode(self.rest.send_json(request).await?)?;
            Ok(self.rest.url(&format!("/storage/v1{}", signed.signed_url)))
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.rest.url(&format!("/storage/v1/object/public/{bucket}/{path}"))
    }

    fn remove(&self, bucket: &str, paths: &[String]) -> RemoteFuture<'_, Vec<String>> {
        let url_path = format!("/storage/v1/object/{bucket}");
        let body = json!({ "prefixes": paths });
        Box::pin(async move {
            tracing::debug!(path = %url_path, "remove objects");
            let request = self.rest.request(Method::DELETE, &url_path).json(&body);
            let removed: Vec<RemovedEntry> = decode(self.rest.send_json(request).await?)?;
            Ok(removed.into_iter().map(|r| r.name).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;

    #[test]
    fn list_entry_maps_metadata() {
        let entry: ListEntry = serde_json::from_value(json!({
            "name": "plan.pdf",
            "id": "obj-1",
            "updated_at": "2025-01-02T03:04:05Z",
            "metadata": { "size": 2048, "mimetype": "application/pdf" }
        }))
        .unwrap();
        let file = FileObject::from(entry);
        assert_eq!(file.size, Some(2048));
        assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
        assert!(!file.is_folder());
    }

    #[test]
    fn public_url_is_built_locally() {
        let rest = RestClient::new(&RemoteConfig {
            url: "https://demo.example.co".into(),
            anon_key: "anon".into(),
            access_token: None,
        })
        .unwrap();
        let storage = LiveStorage::new(rest);
        assert_eq!(
            storage.public_url("files", "contracts/a_b_c/x.pdf"),
            "https://demo.example.co/storage/v1/object/public/files/contracts/a_b_c/x.pdf"
        );
    }
}
