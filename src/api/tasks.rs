//! Task, project and measurement-unit queries.

use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{MeasurementUnit, MilestonePatch, Task, TaskDraft, TaskPatch, TaskType};
use crate::ports::{Embed, Filter, Selection, TableQuery};

use super::{decode_rows, decode_single, encode_row};

/// Tasks table.
pub const TASKS: &str = "tasks";
/// Measurement units table.
pub const MEASUREMENT_UNITS: &str = "measurement_units";

/// Columns read for every task, with the measurement unit embedded.
#[must_use]
pub fn task_selection() -> Selection {
    Selection::columns(&[
        "id",
        "created_at",
        "title",
        "description",
        "creator_id",
        "start_date",
        "end_date",
        "amount",
        "status",
        "type",
        "parent_id",
        "files",
        "late_penalty_per_day",
    ])
    .embed(Embed::new(MEASUREMENT_UNITS, MEASUREMENT_UNITS, "measurement_unit_id", &["id", "title"]))
}

/// Fetches every task of the given type.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_tasks(ctx: &ServiceContext, kind: TaskType) -> Result<Vec<Task>, AppError> {
    let query = TableQuery::from(TASKS).select(task_selection()).eq("type", kind.as_str());
    tracing::debug!(kind = kind.as_str(), "fetching tasks");
    let rows = ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_tasks", e))?;
    decode_rows("fetch_tasks", rows)
}

/// Fetches one task.
///
/// # Errors
///
/// Returns `NotFound` if no task has this id, or an error if the query fails.
pub async fn fetch_task_by_id(ctx: &ServiceContext, id: &str) -> Result<Task, AppError> {
    let query = TableQuery::from(TASKS).select(task_selection()).eq("id", id).limit(1);
    let rows =
        ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_task_by_id", e))?;
    decode_single("fetch_task_by_id", "task", id, rows)
}

/// Fetches the milestones of a project, earliest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_milestones(ctx: &ServiceContext, parent_id: &str) -> Result<Vec<Task>, AppError> {
    let query = TableQuery::from(TASKS)
        .select(task_selection())
        .eq("parent_id", parent_id)
        .order("start_date", true);
    let rows =
        ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_milestones", e))?;
    decode_rows("fetch_milestones", rows)
}

/// Inserts a task and returns the stored row.
///
/// # Errors
///
/// Returns an error if the draft is inconsistent or the insert fails.
pub async fn create_task(ctx: &ServiceContext, draft: &TaskDraft) -> Result<Task, AppError> {
    if draft.end_date < draft.start_date {
        return Err(AppError::Invalid(format!(
            "task {:?} ends before it starts",
            draft.title
        )));
    }
    let row = encode_row("create_task", draft)?;
    let rows = ctx
        .tables
        .insert(TASKS, vec![row], &task_selection())
        .await
        .map_err(|e| AppError::remote("create_task", e))?;
    decode_single("create_task", "task", &draft.title, rows)
}

/// Applies a partial update and returns the stored row.
///
/// # Errors
///
/// Returns `NotFound` if no task has this id, or an error if the update fails.
pub async fn update_task(ctx: &ServiceContext, id: &str, patch: &TaskPatch) -> Result<Task, AppError> {
    if patch.is_empty() {
        return fetch_task_by_id(ctx, id).await;
    }
    let patch = encode_row("update_task", patch)?;
    let rows = ctx
        .tables
        .update(TASKS, &[Filter::eq("id", id)], patch, &task_selection())
        .await
        .map_err(|e| AppError::remote("update_task", e))?;
    decode_single("update_task", "task", id, rows)
}

/// Rewrites a milestone's editable columns, clearing the ones left empty.
///
/// # Errors
///
/// Returns `NotFound` if no task has this id, or an error if the update fails.
pub async fn update_milestone(ctx: &ServiceContext, id: &str, patch: &MilestonePatch) -> Result<Task, AppError> {
    let patch = encode_row("update_milestone", patch)?;
    let rows = ctx
        .tables
        .update(TASKS, &[Filter::eq("id", id)], patch, &task_selection())
        .await
        .map_err(|e| AppError::remote("update_milestone", e))?;
    decode_single("update_milestone", "task", id, rows)
}

/// Deletes a task and returns the deleted id.
///
/// # Errors
///
/// Returns `NotFound` if nothing was deleted, or an error if the call fails.
pub async fn delete_task_by_id(ctx: &ServiceContext, id: &str) -> Result<String, AppError> {
    let rows = ctx
        .tables
        .delete(TASKS, &[Filter::eq("id", id)], &Selection::columns(&["id"]))
        .await
        .map_err(|e| AppError::remote("delete_task_by_id", e))?;
    let deleted: Deleted = decode_single("delete_task_by_id", "task", id, rows)?;
    Ok(deleted.id)
}

/// Fetches every measurement unit.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_units(ctx: &ServiceContext) -> Result<Vec<MeasurementUnit>, AppError> {
    let query = TableQuery::from(MEASUREMENT_UNITS).select(Selection::columns(&["id", "title"]));
    let rows = ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_units", e))?;
    decode_rows("fetch_units", rows)
}

#[derive(serde::Deserialize)]
struct Deleted {
    id: String,
}
