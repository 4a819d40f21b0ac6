//! Contracts between two parties over a project.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Editable by the creator, not yet signed.
    Draft,
    /// Signed by party A, waiting for party B.
    Pending,
    /// Signed by both parties.
    Signed,
    /// Withdrawn.
    Cancelled,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Signed => "SIGNED",
            Self::Cancelled => "CANCELLED",
        })
    }
}

/// Project summary embedded in contract listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTaskSummary {
    /// Project title.
    pub title: String,
    /// Project start.
    pub start_date: Option<NaiveDate>,
    /// Project end.
    pub end_date: Option<NaiveDate>,
}

/// A contract as read from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Row id.
    pub id: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Author of the contract.
    pub creator_id: String,
    /// Party A (the commissioning side).
    pub user_a: String,
    /// Party B (the contractor).
    pub user_b: String,
    /// Project the contract covers.
    pub task_id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Start of the contract period.
    pub start_date: NaiveDate,
    /// End of the contract period; open-ended when `None`.
    pub end_date: Option<NaiveDate>,
    /// When party A signed.
    pub date_signed_a: Option<DateTime<Utc>>,
    /// When party B signed.
    pub date_signed_b: Option<DateTime<Utc>>,
    /// Lifecycle state.
    pub status: ContractStatus,
    /// Storage path of the contract document, relative to the bucket.
    pub file_url: Option<String>,
    /// Contract value.
    pub amount: Option<f64>,
    /// Embedded project summary (listings only).
    #[serde(rename = "tasks", default)]
    pub task: Option<ContractTaskSummary>,
}

impl Contract {
    /// Storage folder for this contract's files.
    #[must_use]
    pub fn file_folder(&self) -> String {
        format!("contracts/{}_{}_{}", self.user_a, self.user_b, self.id)
    }

    /// Whether `user_id` may sign as party A now.
    #[must_use]
    pub fn can_sign_as_a(&self, user_id: &str) -> bool {
        self.status == ContractStatus::Draft && self.creator_id == user_id
    }

    /// Whether `user_id` may sign as party B now.
    #[must_use]
    pub fn can_sign_as_b(&self, user_id: &str) -> bool {
        self.status == ContractStatus::Pending && self.user_b == user_id
    }
}

/// Insert payload for a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractPayload {
    /// Project id.
    pub task_id: String,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Period start.
    pub start_date: NaiveDate,
    /// Period end.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Party A.
    pub user_a: String,
    /// Party B.
    pub user_b: String,
    /// Document path; empty until a file is uploaded.
    #[serde(default)]
    pub file_url: String,
    /// Author; filled with the session user when empty.
    #[serde(default)]
    pub creator_id: String,
    /// Contract value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Partial update of a contract. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractPatch {
    /// New project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// New end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// New party B.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_b: Option<String>,
    /// New document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Party A signature time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_signed_a: Option<DateTime<Utc>>,
    /// Party B signature time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_signed_b: Option<DateTime<Utc>>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContractStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract(status: ContractStatus) -> Contract {
        serde_json::from_value(json!({
            "id": "c1",
            "createdAt": "2025-01-01T00:00:00Z",
            "creatorId": "ua",
            "userA": "ua",
            "userB": "ub",
            "taskId": "p1",
            "title": "Build",
            "description": "",
            "startDate": "2025-01-01",
            "endDate": null,
            "dateSignedA": null,
            "dateSignedB": null,
            "status": status,
            "fileUrl": "",
            "tasks": { "title": "House", "startDate": "2025-01-01", "endDate": "2025-12-31" }
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_with_embedded_project() {
        let c = contract(ContractStatus::Draft);
        assert_eq!(c.task.unwrap().title, "House");
        assert!(c.amount.is_none());
    }

    #[test]
    fn signing_rules_follow_status_and_party() {
        let draft = contract(ContractStatus::Draft);
        assert!(draft.can_sign_as_a("ua"));
        assert!(!draft.can_sign_as_a("ub"));
        assert!(!draft.can_sign_as_b("ub"));

        let pending = contract(ContractStatus::Pending);
        assert!(!pending.can_sign_as_a("ua"));
        assert!(pending.can_sign_as_b("ub"));
        assert!(!pending.can_sign_as_b("ua"));
    }

    #[test]
    fn file_folder_combines_parties_and_id() {
        assert_eq!(contract(ContractStatus::Draft).file_folder(), "contracts/ua_ub_c1");
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = ContractPatch { file_url: Some("a/b.pdf".into()), ..ContractPatch::default() };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "file_url": "a/b.pdf" }));
    }
}
