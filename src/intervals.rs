//! Assignment intervals built from paired ACTIVE/REMOVED rows.
//!
//! An assignment of user U to task T from S until E is stored as two
//! independent rows: `{T, U, ACTIVE, S}` and, once the end is known,
//! `{T, U, REMOVED, E}`. This module produces those rows and pairs them back
//! into intervals.

use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{AssignmentRow, AssignmentStatus, NewAssignmentRow};

/// An interval reconstructed from raw rows, before display fields are joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedInterval {
    /// Task id.
    pub task_id: String,
    /// User id.
    pub user_id: String,
    /// Id of the opening ACTIVE row.
    pub active_id: String,
    /// Id of the closing REMOVED row.
    pub removed_id: Option<String>,
    /// Start day.
    pub start_date: NaiveDate,
    /// End day.
    pub end_date: Option<NaiveDate>,
}

/// Rows to insert for a new assignment: ACTIVE at `start`, plus REMOVED at `end` if given.
///
/// # Errors
///
/// Returns an error if `end` precedes `start`.
pub fn assignment_rows(
    task_id: &str,
    user_id: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<Vec<NewAssignmentRow>, String> {
    if let Some(end) = end {
        if end < start {
            return Err(format!("assignment ends ({end}) before it starts ({start})"));
        }
    }

    let row = |status, assigned_at| NewAssignmentRow {
        task_id: task_id.to_string(),
        user_id: user_id.to_string(),
        status,
        assigned_at,
    };

    let mut rows = vec![row(AssignmentStatus::Active, start)];
    if let Some(end) = end {
        rows.push(row(AssignmentStatus::Removed, end));
    }
    Ok(rows)
}

/// Pairs raw rows into intervals.
///
/// Rows are grouped per (task, user) and walked in date order, ACTIVE before
/// REMOVED on the same day. A REMOVED row closes the earliest still-open
/// ACTIVE row; a REMOVED row with nothing open is ignored. The result is
/// ordered by user id, then start date.
#[must_use]
pub fn pair_intervals(rows: &[AssignmentRow]) -> Vec<PairedInterval> {
    let mut groups: BTreeMap<(&str, &str), Vec<&AssignmentRow>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.task_id.as_str(), row.user_id.as_str())).or_default().push(row);
    }

    let mut intervals = Vec::new();
    for ((task_id, user_id), mut group) in groups {
        group.sort_by(|a, b| {
            a.assigned_at
                .cmp(&b.assigned_at)
                .then_with(|| status_rank(a.status).cmp(&status_rank(b.status)))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut open: VecDeque<usize> = VecDeque::new();
        for row in group {
            match row.status {
                AssignmentStatus::Active => {
                    open.push_back(intervals.len());
                    intervals.push(PairedInterval {
                        task_id: task_id.to_string(),
                        user_id: user_id.to_string(),
                        active_id: row.id.clone(),
                        removed_id: None,
                        start_date: row.assigned_at,
                        end_date: None,
                    });
                }
                AssignmentStatus::Removed => {
                    if let Some(idx) = open.pop_front() {
                        intervals[idx].removed_id = Some(row.id.clone());
                        intervals[idx].end_date = Some(row.assigned_at);
                    } else {
                        tracing::debug!(
                            row = %row.id,
                            task = task_id,
                            user = user_id,
                            "REMOVED row without an open assignment, ignored"
                        );
                    }
                }
            }
        }
    }

    intervals.sort_by(|a, b| {
        a.user_id
            .cmp(&b.user_id)
            .then_with(|| a.start_date.cmp(&b.start_date))
            .then_with(|| a.active_id.cmp(&b.active_id))
    });
    intervals
}

fn status_rank(status: AssignmentStatus) -> u8 {
    match status {
        AssignmentStatus::Active => 0,
        AssignmentStatus::Removed => 1,
    }
}
