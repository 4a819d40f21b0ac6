//! `projectdesk documents` command.

use serde_json::json;

use crate::cli::DocumentsCommand;
use crate::context::ServiceContext;
use crate::model::FileObject;
use crate::store::AppStore;

use super::{or_dash, read_bytes, render_table, Output};

/// Execute a `documents` subcommand.
///
/// # Errors
///
/// Returns an error string if a storage call fails or the local file cannot be read.
pub async fn run(
    ctx: &ServiceContext,
    store: &mut AppStore,
    command: &DocumentsCommand,
    out: Output,
) -> Result<String, String> {
    match command {
        DocumentsCommand::List { task } => {
            let files = store.documents.get_task_documents(ctx, task).await.map_err(|e| e.to_string())?;
            out.render(files, || file_table(files))
        }
        DocumentsCommand::Url { task, name } => {
            let url = store.documents.signed_url(ctx, task, name).await.map_err(|e| e.to_string())?;
            out.render(&json!({ "url": url }), || url.clone())
        }
        DocumentsCommand::Upload { task, path, name } => {
            let name = match name {
                Some(name) => name.clone(),
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| format!("{} has no file name", path.display()))?,
            };
            let bytes = read_bytes(path)?;
            let stored = store.documents.upload(ctx, task, &name, bytes).await.map_err(|e| e.to_string())?;
            out.render(&json!({ "path": stored }), || format!("Uploaded {stored}."))
        }
        DocumentsCommand::Remove { task, name } => {
            store.documents.remove(ctx, task, name).await.map_err(|e| e.to_string())?;
            out.render(&json!({ "removed": name }), || format!("Removed {name}."))
        }
    }
}

fn file_table(files: &[FileObject]) -> String {
    let rows: Vec<Vec<String>> = files
        .iter()
        .map(|f| {
            vec![
                f.name.clone(),
                or_dash(f.size),
                or_dash(f.mime_type.as_ref()),
                f.updated_at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
            ]
        })
        .collect();
    render_table(&["NAME", "SIZE", "TYPE", "UPDATED"], &rows, "No documents.")
}
