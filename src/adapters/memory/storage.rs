//! In-memory implementation of the `ObjectStorage` port.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::error::RemoteError;
use crate::ports::storage::{FileObject, ObjectStorage};
use crate::ports::tables::RemoteFuture;

#[derive(Debug, Clone)]
struct StoredObject {
    id: String,
    bytes: Vec<u8>,
    content_type: String,
    updated_at: DateTime<Utc>,
}

type Objects = BTreeMap<(String, String), StoredObject>;

/// Buckets of objects held in process memory, keyed by `(bucket, path)`.
///
/// Listing shows the direct children of a folder: files with their id and
/// size, sub-folders as id-less entries. URLs use a `memory://` scheme.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Objects>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Objects> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores an object directly, replacing any previous one.
    pub fn put(&self, bucket: &str, path: &str, bytes: impl Into<Vec<u8>>, content_type: &str) {
        self.lock().insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                id: uuid::Uuid::new_v4().to_string(),
                bytes: bytes.into(),
                content_type: content_type.to_string(),
                updated_at: Utc::now(),
            },
        );
    }

    /// Contents of an object, if present.
    #[must_use]
    pub fn get(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.lock().get(&(bucket.to_string(), path.to_string())).map(|o| o.bytes.clone())
    }

    fn children(&self, bucket: &str, prefix: &str) -> Vec<FileObject> {
        let folder = prefix.trim_end_matches('/');
        let objects = self.lock();
        let mut entries: BTreeMap<String, FileObject> = BTreeMap::new();
        for ((b, path), object) in objects.iter() {
            if b != bucket {
                continue;
            }
            let rest = if folder.is_empty() {
                path.as_str()
            } else {
                match path.strip_prefix(folder).and_then(|r| r.strip_prefix('/')) {
                    Some(rest) => rest,
                    None => continue,
                }
            };
            match rest.split_once('/') {
                Some((sub, _)) => {
                    entries.entry(sub.to_string()).or_insert_with(|| FileObject {
                        name: sub.to_string(),
                        id: None,
                        size: None,
                        mime_type: None,
                        updated_at: None,
                    });
                }
                None => {
                    entries.insert(
                        rest.to_string(),
                        FileObject {
                            name: rest.to_string(),
                            id: Some(object.id.clone()),
                            size: Some(object.bytes.len() as u64),
                            mime_type: Some(object.content_type.clone()),
                            updated_at: Some(object.updated_at),
                        },
                    );
                }
            }
        }
        entries.into_values().collect()
    }

    fn store(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), RemoteError> {
        let key = (bucket.to_string(), path.to_string());
        if !upsert && self.lock().contains_key(&key) {
            return Err(RemoteError::Api {
                status: 409,
                message: "The resource already exists".into(),
                details: Some(path.to_string()),
            });
        }
        self.put(bucket, path, bytes, content_type);
        Ok(())
    }

    fn sign(&self, bucket: &str, path: &str, expires_in_secs: u64) -> Result<String, RemoteError> {
        if !self.lock().contains_key(&(bucket.to_string(), path.to_string())) {
            return Err(RemoteError::Api {
                status: 404,
                message: "Object not found".into(),
                details: None,
            });
        }
        Ok(format!(
            "memory://{bucket}/{path}?token={}&expires_in={expires_in_secs}",
            uuid::Uuid::new_v4()
        ))
    }

    fn remove_all(&self, bucket: &str, paths: &[String]) -> Vec<String> {
        let mut objects = self.lock();
        paths
            .iter()
            .filter(|p| objects.remove(&(bucket.to_string(), (*p).clone())).is_some())
            .cloned()
            .collect()
    }
}

impl ObjectStorage for MemoryStorage {
    fn list(&self, bucket: &str, prefix: &str) -> RemoteFuture<'_, Vec<FileObject>> {
        let entries = self.children(bucket, prefix);
        Box::pin(async move { Ok(entries) })
    }

    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> RemoteFuture<'_, ()> {
        let result = self.store(bucket, path, bytes, content_type, upsert);
        Box::pin(async move { result })
    }

    fn signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> RemoteFuture<'_, String> {
        let result = self.sign(bucket, path, expires_in_secs);
        Box::pin(async move { result })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://public/{bucket}/{path}")
    }

    fn remove(&self, bucket: &str, paths: &[String]) -> RemoteFuture<'_, Vec<String>> {
        let removed = self.remove_all(bucket, paths);
        Box::pin(async move { Ok(removed) })
    }
}
