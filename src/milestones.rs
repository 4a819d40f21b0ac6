//! Milestone set reconciliation.
//!
//! A project's milestones are edited as one list. Saving diffs that list
//! against the stored milestones: items with a known id are updated, items
//! without one are inserted, and stored milestones missing from the list are
//! deleted. Nothing is transactional; a failure part-way reports which
//! changes already reached the backend.

use std::collections::HashSet;

use serde::Serialize;

use crate::api::tasks::{create_task, delete_task_by_id, fetch_milestones, update_milestone};
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{MilestoneItem, MilestonePatch, Task, TaskDraft, TaskStatus, TaskType};

/// Remote changes needed to make the stored milestones match a desired list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonePlan {
    /// Existing milestones whose content changes.
    pub updates: Vec<(String, MilestonePatch)>,
    /// New milestones.
    pub inserts: Vec<TaskDraft>,
    /// Stored milestones no longer wanted.
    pub deletes: Vec<String>,
    /// Existing milestones already matching the desired content.
    pub unchanged: Vec<String>,
}

impl MilestonePlan {
    /// Number of remote writes the plan needs.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.updates.len() + self.inserts.len() + self.deletes.len()
    }

    /// True when the stored list already matches.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.change_count() == 0
    }
}

/// Changes applied by a sync, complete or stopped part-way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Ids of updated milestones.
    pub updated: Vec<String>,
    /// Ids assigned to inserted milestones.
    pub inserted: Vec<String>,
    /// Ids of deleted milestones.
    pub deleted: Vec<String>,
    /// Ids left untouched.
    pub unchanged: Vec<String>,
}

impl SyncReport {
    /// Number of remote writes that went through.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.updated.len() + self.inserted.len() + self.deleted.len()
    }
}

/// Three-way diff of `desired` against `stored`.
///
/// An item whose id is not among the stored milestones is treated as new;
/// its id is discarded and the backend assigns a fresh one.
#[must_use]
pub fn plan_milestone_sync(
    parent_id: &str,
    creator_id: &str,
    stored: &[Task],
    desired: &[MilestoneItem],
) -> MilestonePlan {
    let mut plan = MilestonePlan::default();
    let mut kept: HashSet<&str> = HashSet::new();

    for item in desired {
        let existing = item
            .id
            .as_deref()
            .and_then(|id| stored.iter().find(|t| t.id == id));
        match existing {
            Some(task) => {
                kept.insert(task.id.as_str());
                if item.matches(task) {
                    plan.unchanged.push(task.id.clone());
                } else {
                    plan.updates.push((task.id.clone(), MilestonePatch::from(item)));
                }
            }
            None => plan.inserts.push(draft_for(parent_id, creator_id, item)),
        }
    }

    plan.deletes = stored
        .iter()
        .filter(|t| !kept.contains(t.id.as_str()))
        .map(|t| t.id.clone())
        .collect();
    plan
}

fn draft_for(parent_id: &str, creator_id: &str, item: &MilestoneItem) -> TaskDraft {
    TaskDraft {
        title: item.title.clone(),
        description: item.description.clone(),
        creator_id: creator_id.to_string(),
        start_date: item.start_date,
        end_date: item.end_date,
        amount: item.amount,
        status: TaskStatus::Pending,
        kind: TaskType::Task,
        parent_id: Some(parent_id.to_string()),
        measurement_unit_id: None,
        late_penalty_per_day: item.late_penalty_per_day,
    }
}

/// Makes the stored milestones of `parent_id` equal to `desired`.
///
/// Updates run first, then inserts, then deletes.
///
/// # Errors
///
/// Returns `Invalid` before any call if an item fails
/// [`MilestoneItem::validate`], the fetch error if the stored list cannot be
/// read, or `PartialSync` carrying the report of applied changes when a
/// write fails.
pub async fn upsert_milestones_for_parent(
    ctx: &ServiceContext,
    parent_id: &str,
    creator_id: &str,
    desired: &[MilestoneItem],
) -> Result<SyncReport, AppError> {
    for item in desired {
        item.validate().map_err(AppError::Invalid)?;
    }
    let stored = fetch_milestones(ctx, parent_id).await?;
    let plan = plan_milestone_sync(parent_id, creator_id, &stored, desired);
    tracing::debug!(
        parent = parent_id,
        updates = plan.updates.len(),
        inserts = plan.inserts.len(),
        deletes = plan.deletes.len(),
        "syncing milestones"
    );

    let mut report = SyncReport { unchanged: plan.unchanged.clone(), ..SyncReport::default() };
    if let Err(e) = apply(ctx, plan, &mut report).await {
        tracing::warn!(%e, applied = report.applied(), parent = parent_id, "milestone sync stopped");
        return Err(AppError::PartialSync { report, source: Box::new(e) });
    }
    Ok(report)
}

async fn apply(
    ctx: &ServiceContext,
    plan: MilestonePlan,
    report: &mut SyncReport,
) -> Result<(), AppError> {
    for (id, patch) in &plan.updates {
        let task = update_milestone(ctx, id, patch).await?;
        report.updated.push(task.id);
    }
    for draft in &plan.inserts {
        let task = create_task(ctx, draft).await?;
        report.inserted.push(task.id);
    }
    for id in &plan.deletes {
        report.deleted.push(delete_task_by_id(ctx, id).await?);
    }
    Ok(())
}
