//! Documents per task.

use std::collections::HashMap;

use crate::api::documents::{self, task_folder};
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::ports::FileObject;

use super::tracked;

/// Cached document listings keyed by task id.
#[derive(Debug, Default)]
pub struct DocumentsSlice {
    /// Listing per task, without the folder placeholder.
    pub by_task: HashMap<String, Vec<FileObject>>,
    /// A request is in flight.
    pub loading: bool,
}

impl DocumentsSlice {
    /// Cached listing of a task; empty if never loaded.
    #[must_use]
    pub fn documents(&self, task_id: &str) -> &[FileObject] {
        self.by_task.get(task_id).map_or(&[], Vec::as_slice)
    }

    /// Lists a task's documents and caches the listing.
    ///
    /// # Errors
    ///
    /// Returns the listing error; the cache is untouched.
    pub async fn get_task_documents(
        &mut self,
        ctx: &ServiceContext,
        task_id: &str,
    ) -> Result<&[FileObject], AppError> {
        let files = tracked(
            &mut self.loading,
            "get_task_documents",
            documents::fetch_task_documents(ctx, task_id),
        )
        .await?;
        self.by_task.insert(task_id.to_string(), files);
        Ok(self.documents(task_id))
    }

    /// Uploads a document and reloads the task's listing. Returns the stored path.
    ///
    /// # Errors
    ///
    /// Returns the upload or listing error.
    pub async fn upload(
        &mut self,
        ctx: &ServiceContext,
        task_id: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let path = tracked(
            &mut self.loading,
            "upload_document",
            documents::upload_task_document(ctx, task_id, name, bytes),
        )
        .await?;
        self.get_task_documents(ctx, task_id).await?;
        Ok(path)
    }

    /// Removes a document and drops it from the cached listing.
    ///
    /// # Errors
    ///
    /// Returns the removal error; the cache is untouched.
    pub async fn remove(&mut self, ctx: &ServiceContext, task_id: &str, name: &str) -> Result<(), AppError> {
        tracked(
            &mut self.loading,
            "remove_document",
            documents::remove_task_document(ctx, task_id, name),
        )
        .await?;
        if let Some(files) = self.by_task.get_mut(task_id) {
            files.retain(|f| f.name != name);
        }
        Ok(())
    }

    /// Signed download URL for one of a task's documents.
    ///
    /// # Errors
    ///
    /// Returns the signing error.
    pub async fn signed_url(&mut self, ctx: &ServiceContext, task_id: &str, name: &str) -> Result<String, AppError> {
        let path = format!("{}/{name}", task_folder(task_id));
        tracked(&mut self.loading, "document_url", documents::document_url(ctx, &path)).await
    }
}
