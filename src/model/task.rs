//! Tasks, projects and milestones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Work under way.
    InProgress,
    /// Waiting for review.
    Review,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Review => "REVIEW",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "REVIEW" => Ok(Self::Review),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Distinguishes top-level projects from their sub-items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// A sub-item; milestones are tasks with a parent.
    Task,
    /// A top-level project.
    Project,
}

impl TaskType {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "TASK",
            Self::Project => "PROJECT",
        }
    }
}

/// Unit a task's quantity is measured in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementUnit {
    /// Unit id.
    pub id: String,
    /// Display title (e.g. "m²").
    pub title: String,
}

/// A task, project or milestone as read from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Row id.
    pub id: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// User who created the task.
    pub creator_id: String,
    /// First day of work.
    pub start_date: NaiveDate,
    /// Last day of work.
    pub end_date: NaiveDate,
    /// Agreed amount.
    pub amount: Option<f64>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Project or task.
    #[serde(rename = "type")]
    pub kind: TaskType,
    /// Parent project for milestones.
    pub parent_id: Option<String>,
    /// Attached file reference.
    pub files: Option<String>,
    /// Embedded measurement unit.
    pub measurement_units: Option<MeasurementUnit>,
    /// Penalty charged per day past `end_date`.
    pub late_penalty_per_day: Option<f64>,
}

impl Task {
    /// Whether this task is a milestone of some project.
    #[must_use]
    pub fn is_milestone(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Insert payload for a new task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creator user id.
    pub creator_id: String,
    /// First day of work.
    pub start_date: NaiveDate,
    /// Last day of work.
    pub end_date: NaiveDate,
    /// Agreed amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Initial status.
    pub status: TaskStatus,
    /// Project or task.
    #[serde(rename = "type")]
    pub kind: TaskType,
    /// Parent project for milestones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Measurement unit id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_unit_id: Option<String>,
    /// Penalty per late day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_penalty_per_day: Option<f64>,
}

/// Partial update of a task. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// New end date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// New amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New measurement unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_unit_id: Option<String>,
    /// New late penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_penalty_per_day: Option<f64>,
}

impl TaskPatch {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Full rewrite of a milestone's editable columns.
///
/// Unlike [`TaskPatch`], absent values are sent as `null` so a cleared
/// description, amount or penalty is cleared remotely too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestonePatch {
    /// Title.
    pub title: String,
    /// Description; `None` clears it.
    pub description: Option<String>,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Amount; `None` clears it.
    pub amount: Option<f64>,
    /// Penalty per late day; `None` clears it.
    pub late_penalty_per_day: Option<f64>,
}

impl From<&MilestoneItem> for MilestonePatch {
    fn from(item: &MilestoneItem) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone(),
            start_date: item.start_date,
            end_date: item.end_date,
            amount: item.amount,
            late_penalty_per_day: item.late_penalty_per_day,
        }
    }
}

/// One entry of the desired milestone list for a project.
///
/// `id` is set for milestones that already exist remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneItem {
    /// Existing milestone id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Amount paid on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Penalty per late day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_penalty_per_day: Option<f64>,
}

impl MilestoneItem {
    /// Checks the item on its own: a non-empty title, an ordered period and
    /// non-negative money.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("milestone title is empty".into());
        }
        if self.end_date < self.start_date {
            return Err(format!(
                "milestone {:?} ends ({}) before it starts ({})",
                self.title, self.end_date, self.start_date
            ));
        }
        if self.amount.is_some_and(|a| a < 0.0) || self.late_penalty_per_day.is_some_and(|p| p < 0.0)
        {
            return Err(format!("milestone {:?} has a negative amount", self.title));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), then checks the item against the
    /// enclosing contract period.
    ///
    /// The start may not precede `contract_start`; when the contract has an
    /// end, the milestone end may not exceed it.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first violated rule.
    pub fn validate_within(
        &self,
        contract_start: NaiveDate,
        contract_end: Option<NaiveDate>,
    ) -> Result<(), String> {
        self.validate()?;
        if self.start_date < contract_start {
            return Err(format!(
                "milestone {:?} starts ({}) before the contract ({contract_start})",
                self.title, self.start_date
            ));
        }
        if let Some(end) = contract_end {
            if self.end_date > end {
                return Err(format!(
                    "milestone {:?} ends ({}) after the contract ({end})",
                    self.title, self.end_date
                ));
            }
        }
        Ok(())
    }

    /// Whether a stored milestone already carries this item's content.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.title == task.title
            && self.description == task.description
            && self.start_date == task.start_date
            && self.end_date == task.end_date
            && self.amount == task.amount
            && self.late_penalty_per_day == task.late_penalty_per_day
    }
}
