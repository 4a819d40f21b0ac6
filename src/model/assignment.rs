//! Worker assignments stored as paired status rows.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tag of a raw assignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// The user starts working on the task at `assigned_at`.
    Active,
    /// The user stops working on the task at `assigned_at`.
    Removed,
}

/// A raw `task_assignment` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    /// Row id.
    pub id: String,
    /// Task the user is assigned to.
    pub task_id: String,
    /// Assigned user.
    pub user_id: String,
    /// ACTIVE or REMOVED.
    pub status: AssignmentStatus,
    /// Date the status takes effect.
    pub assigned_at: NaiveDate,
}

/// Insert payload for one `task_assignment` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssignmentRow {
    /// Task id.
    pub task_id: String,
    /// User id.
    pub user_id: String,
    /// ACTIVE or REMOVED.
    pub status: AssignmentStatus,
    /// Effective date.
    pub assigned_at: NaiveDate,
}

/// A reconstructed assignment period of one user on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInterval {
    /// Id of the ACTIVE row opening the interval.
    pub active_assignment_id: String,
    /// Id of the REMOVED row closing it, if closed.
    pub removed_assignment_id: Option<String>,
    /// Task id.
    pub task_id: String,
    /// Task title.
    pub task_title: Option<String>,
    /// Assigned user id.
    pub user_id: String,
    /// Assigned user's first name.
    pub user_first_name: Option<String>,
    /// Assigned user's last name.
    pub user_last_name: Option<String>,
    /// Assigned user's email.
    pub user_email: Option<String>,
    /// Task creator's first name.
    pub creator_first_name: Option<String>,
    /// Task creator's last name.
    pub creator_last_name: Option<String>,
    /// Task creator's email.
    pub creator_email: Option<String>,
    /// First assigned day.
    pub start_date: NaiveDate,
    /// Day the assignment ends; `None` while open.
    pub end_date: Option<NaiveDate>,
}

impl AssignmentInterval {
    /// Whether the interval covers `day` (end inclusive).
    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && self.end_date.is_none_or(|end| day <= end)
    }

    /// The row ids backing this interval.
    #[must_use]
    pub fn ids(&self) -> IntervalIds {
        IntervalIds {
            active: self.active_assignment_id.clone(),
            removed: self.removed_assignment_id.clone(),
        }
    }
}

/// Row ids of one interval: the ACTIVE row and, when closed, the REMOVED row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalIds {
    /// ACTIVE row id.
    pub active: String,
    /// REMOVED row id.
    pub removed: Option<String>,
}

impl IntervalIds {
    /// All row ids to delete, active first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        let mut ids = vec![self.active.clone()];
        ids.extend(self.removed.clone());
        ids
    }
}

/// Drops the intervals whose rows were deleted.
///
/// An interval goes when its active id was deleted, or when it has a removed
/// id and that id was deleted. A missing removed id never matches, so other
/// open intervals of the same user survive.
pub fn retain_surviving(intervals: &mut Vec<AssignmentInterval>, deleted_ids: &[String]) {
    let deleted: HashSet<&str> = deleted_ids.iter().map(String::as_str).collect();
    intervals.retain(|interval| {
        let active_gone = deleted.contains(interval.active_assignment_id.as_str());
        let removed_gone =
            interval.removed_assignment_id.as_deref().is_some_and(|id| deleted.contains(id));
        !(active_gone || removed_gone)
    });
}
