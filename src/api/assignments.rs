//! Assignment queries over the paired-row model.

use chrono::NaiveDate;

use crate::context::ServiceContext;
use crate::error::AppError;
use crate::intervals::assignment_rows;
use crate::model::{AssignmentInterval, AssignmentRow, AssignmentStatus, IntervalIds};
use crate::ports::{Filter, Selection, TableQuery};

use super::{decode_row, decode_rows, encode_row};

/// Raw assignment rows.
pub const TASK_ASSIGNMENT: &str = "task_assignment";
/// View pairing raw rows into intervals.
pub const TASK_ASSIGNMENT_INTERVALS: &str = "task_assignment_intervals";

fn row_selection() -> Selection {
    Selection::columns(&["id", "task_id", "user_id", "status", "assigned_at"])
}

fn interval_selection() -> Selection {
    Selection::columns(&[
        "active_assignment_id",
        "removed_assignment_id",
        "task_id",
        "task_title",
        "user_id",
        "user_first_name",
        "user_last_name",
        "user_email",
        "creator_first_name",
        "creator_last_name",
        "creator_email",
        "start_date",
        "end_date",
    ])
}

/// Assigns a user to a task from `start`, optionally until `end`.
///
/// Inserts the ACTIVE row and, when `end` is given, the REMOVED row in one
/// batch. No uniqueness check is made: assigning an already assigned user
/// opens a second interval.
///
/// # Errors
///
/// Returns `Invalid` if `end` precedes `start`, or an error if the insert fails.
pub async fn create_assignment(
    ctx: &ServiceContext,
    task_id: &str,
    user_id: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<AssignmentInterval, AppError> {
    let new_rows = assignment_rows(task_id, user_id, start, end).map_err(AppError::Invalid)?;
    let rows = new_rows
        .iter()
        .map(|r| encode_row("create_assignment", r))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(task = task_id, user = user_id, rows = rows.len(), "inserting assignment rows");
    let inserted = ctx
        .tables
        .insert(TASK_ASSIGNMENT, rows, &row_selection())
        .await
        .map_err(|e| AppError::remote("create_assignment", e))?;
    let inserted: Vec<AssignmentRow> = decode_rows("create_assignment", inserted)?;

    let active = inserted
        .iter()
        .find(|r| r.status == AssignmentStatus::Active)
        .ok_or_else(|| AppError::Decode {
            context: "create_assignment",
            message: "insert returned no ACTIVE row".into(),
        })?;
    let removed = inserted.iter().find(|r| r.status == AssignmentStatus::Removed);

    Ok(AssignmentInterval {
        active_assignment_id: active.id.clone(),
        removed_assignment_id: removed.map(|r| r.id.clone()),
        task_id: active.task_id.clone(),
        task_title: None,
        user_id: active.user_id.clone(),
        user_first_name: None,
        user_last_name: None,
        user_email: None,
        creator_first_name: None,
        creator_last_name: None,
        creator_email: None,
        start_date: active.assigned_at,
        end_date: removed.map(|r| r.assigned_at),
    })
}

/// Fetches the assignment intervals of a task, by user then start date.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_assignments(
    ctx: &ServiceContext,
    task_id: &str,
) -> Result<Vec<AssignmentInterval>, AppError> {
    let query = TableQuery::from(TASK_ASSIGNMENT_INTERVALS)
        .select(interval_selection())
        .eq("task_id", task_id)
        .order("user_id", true)
        .order("start_date", true);
    let rows =
        ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_assignments", e))?;
    decode_rows("fetch_assignments", rows)
}

/// Fetches the raw ACTIVE/REMOVED rows of a task.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_assignment_rows(
    ctx: &ServiceContext,
    task_id: &str,
) -> Result<Vec<AssignmentRow>, AppError> {
    let query = TableQuery::from(TASK_ASSIGNMENT)
        .select(row_selection())
        .eq("task_id", task_id)
        .order("assigned_at", true);
    let rows = ctx
        .tables
        .select(&query)
        .await
        .map_err(|e| AppError::remote("fetch_assignment_rows", e))?;
    decode_rows("fetch_assignment_rows", rows)
}

/// Deletes the rows backing one interval in a single call.
///
/// Returns the rows actually deleted.
///
/// # Errors
///
/// Returns `NotFound` if none of the ids exist, or an error if the call fails.
pub async fn delete_assignment(
    ctx: &ServiceContext,
    ids: &IntervalIds,
) -> Result<Vec<AssignmentRow>, AppError> {
    let id_list = ids.to_vec();
    let rows = ctx
        .tables
        .delete(TASK_ASSIGNMENT, &[Filter::within("id", id_list)], &row_selection())
        .await
        .map_err(|e| AppError::remote("delete_assignment", e))?;
    if rows.is_empty() {
        return Err(AppError::NotFound { entity: "assignment", id: ids.active.clone() });
    }
    rows.into_iter().map(|r| decode_row("delete_assignment", r)).collect()
}
