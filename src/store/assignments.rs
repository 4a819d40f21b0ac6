//! Assignment intervals per task.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::api::assignments;
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{retain_surviving, AssignmentInterval, AssignmentRow, IntervalIds};

use super::tracked;

/// Cached intervals keyed by task id.
#[derive(Debug, Default)]
pub struct AssignmentsSlice {
    /// Intervals per task, by user then start date.
    pub by_task: HashMap<String, Vec<AssignmentInterval>>,
    /// A request is in flight.
    pub loading: bool,
}

impl AssignmentsSlice {
    /// Cached intervals of a task; empty if never loaded.
    #[must_use]
    pub fn intervals(&self, task_id: &str) -> &[AssignmentInterval] {
        self.by_task.get(task_id).map_or(&[], Vec::as_slice)
    }

    /// Loads a task's intervals.
    ///
    /// # Errors
    ///
    /// Returns the query error; the cache is untouched.
    pub async fn get_assignments(
        &mut self,
        ctx: &ServiceContext,
        task_id: &str,
    ) -> Result<&[AssignmentInterval], AppError> {
        let intervals = tracked(
            &mut self.loading,
            "get_assignments",
            assignments::fetch_assignments(ctx, task_id),
        )
        .await?;
        self.by_task.insert(task_id.to_string(), intervals);
        Ok(self.intervals(task_id))
    }

    /// Assigns a user and reloads the task's intervals so joined names are present.
    ///
    /// # Errors
    ///
    /// Returns the insert or reload error.
    pub async fn create_assignment(
        &mut self,
        ctx: &ServiceContext,
        task_id: &str,
        user_id: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<AssignmentInterval, AppError> {
        let created = tracked(
            &mut self.loading,
            "create_assignment",
            assignments::create_assignment(ctx, task_id, user_id, start, end),
        )
        .await?;
        self.get_assignments(ctx, task_id).await?;
        Ok(created)
    }

    /// Deletes the rows of one interval and drops the matching cached intervals.
    ///
    /// Only intervals whose own ids were deleted go away; other open
    /// intervals of the same user survive.
    ///
    /// # Errors
    ///
    /// Returns the delete error; the cache is untouched.
    pub async fn delete_assignment(
        &mut self,
        ctx: &ServiceContext,
        task_id: &str,
        ids: &IntervalIds,
    ) -> Result<Vec<AssignmentRow>, AppError> {
        let deleted = tracked(
            &mut self.loading,
            "delete_assignment",
            assignments::delete_assignment(ctx, ids),
        )
        .await?;
        let deleted_ids: Vec<String> = deleted.iter().map(|r| r.id.clone()).collect();
        if let Some(intervals) = self.by_task.get_mut(task_id) {
            retain_surviving(intervals, &deleted_ids);
        }
        Ok(deleted)
    }
}
