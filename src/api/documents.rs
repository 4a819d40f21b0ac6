//! Task documents kept in object storage under `tasks/<task id>/`.

use crate::context::ServiceContext;
use crate::error::AppError;
use crate::ports::storage::content_type_for;
use crate::ports::FileObject;

/// Placeholder object that keeps an empty folder alive.
pub const KEEP_FILE: &str = ".keep";

/// Storage folder of a task's documents.
#[must_use]
pub fn task_folder(task_id: &str) -> String {
    format!("tasks/{task_id}")
}

/// Lists a task's documents by name, without the folder placeholder.
///
/// # Errors
///
/// Returns an error if the listing fails.
pub async fn fetch_task_documents(
    ctx: &ServiceContext,
    task_id: &str,
) -> Result<Vec<FileObject>, AppError> {
    let mut files = ctx
        .storage
        .list(&ctx.settings.bucket, &task_folder(task_id))
        .await
        .map_err(|e| AppError::remote("fetch_task_documents", e))?;
    files.retain(|f| f.name != KEEP_FILE);
    Ok(files)
}

/// Signed download URL for a document, valid for the configured lifetime.
///
/// # Errors
///
/// Returns an error if signing fails.
pub async fn document_url(ctx: &ServiceContext, full_path: &str) -> Result<String, AppError> {
    let ttl = ctx.settings.signed_url_ttl.as_secs();
    ctx.storage
        .signed_url(&ctx.settings.bucket, full_path, ttl)
        .await
        .map_err(|e| AppError::remote("document_url", e))
}

/// Uploads a document into a task's folder and returns its full path.
///
/// # Errors
///
/// Returns `Invalid` for an unusable file name, or an error if the upload fails.
pub async fn upload_task_document(
    ctx: &ServiceContext,
    task_id: &str,
    name: &str,
    bytes: Vec<u8>,
) -> Result<String, AppError> {
    if name.is_empty() || name.contains('/') || name == KEEP_FILE {
        return Err(AppError::Invalid(format!("unusable document name {name:?}")));
    }
    let path = format!("{}/{name}", task_folder(task_id));
    ctx.storage
        .upload(&ctx.settings.bucket, &path, bytes, content_type_for(name), true)
        .await
        .map_err(|e| AppError::remote("upload_task_document", e))?;
    Ok(path)
}

/// Removes a document from a task's folder.
///
/// # Errors
///
/// Returns `NotFound` if nothing was removed, or an error if the call fails.
pub async fn remove_task_document(
    ctx: &ServiceContext,
    task_id: &str,
    name: &str,
) -> Result<(), AppError> {
    let path = format!("{}/{name}", task_folder(task_id));
    let removed = ctx
        .storage
        .remove(&ctx.settings.bucket, std::slice::from_ref(&path))
        .await
        .map_err(|e| AppError::remote("remove_task_document", e))?;
    if removed.is_empty() {
        return Err(AppError::NotFound { entity: "document", id: path });
    }
    Ok(())
}
