//! Object storage port for task documents and contract files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tables::RemoteFuture;

/// A stored object as returned by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    /// Name relative to the listed prefix.
    pub name: String,
    /// Object id; `None` for folder placeholders.
    #[serde(default)]
    pub id: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileObject {
    /// Whether the entry is a sub-folder rather than a file.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.id.is_none()
    }
}

/// Bucket operations on the hosted object store.
pub trait ObjectStorage: Send + Sync {
    /// Lists the direct children of `prefix`, sorted by name ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list(&self, bucket: &str, prefix: &str) -> RemoteFuture<'_, Vec<FileObject>>;

    /// Uploads `bytes` to `path`; replaces an existing object when `upsert` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the object exists and `upsert` is off.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> RemoteFuture<'_, ()>;

    /// Creates a time-limited download URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or signing fails.
    fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> RemoteFuture<'_, String>;

    /// Public URL of an object. No remote call is made.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Removes objects and returns the paths actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn remove(&self, bucket: &str, paths: &[String]) -> RemoteFuture<'_, Vec<String>>;
}

/// Guesses a MIME type from a file name.
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("contract.PDF"), "application/pdf");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
