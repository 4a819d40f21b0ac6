//! Payments between project parties and the wallets they draw on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Created, not yet settled.
    Pending,
    /// Money moved.
    Captured,
    /// Settlement failed.
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Captured => "captured",
            Self::Failed => "failed",
        })
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "captured" => Ok(Self::Captured),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// What a payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentObjectType {
    /// A signed contract.
    Contract,
    /// An invoice document.
    Invoice,
}

/// Email of a payment party, embedded from profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyEmail {
    /// Email address.
    pub email: String,
}

/// A payment as read from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Row id.
    pub id: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Paying user.
    pub payer_id: String,
    /// Receiving user.
    pub payee_id: String,
    /// Project the payment belongs to.
    pub task_id: String,
    /// Contract or invoice.
    pub object_type: PaymentObjectType,
    /// Contract id or invoice path.
    pub object_id: Option<String>,
    /// Wallet debited.
    pub wallet_id: String,
    /// Amount in the wallet's currency.
    pub amount: f64,
    /// Free-form note.
    pub description: Option<String>,
    /// Settlement state.
    pub status: PaymentStatus,
    /// Payer email.
    pub payer: Option<PartyEmail>,
    /// Payee email.
    pub payee: Option<PartyEmail>,
}

/// Insert payload for a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPayload {
    /// Paying user; filled with the session user when empty.
    #[serde(default)]
    pub payer_id: String,
    /// Receiving user.
    pub payee_id: String,
    /// Project id.
    pub task_id: String,
    /// Contract or invoice.
    pub object_type: PaymentObjectType,
    /// Contract id or invoice path.
    #[serde(default)]
    pub object_id: Option<String>,
    /// Wallet debited.
    pub wallet_id: String,
    /// Amount.
    pub amount: f64,
    /// Note.
    #[serde(default)]
    pub description: Option<String>,
}

impl PaymentPayload {
    /// Rejects payloads the backend would accept but that make no sense.
    ///
    /// # Errors
    ///
    /// Returns a message when the amount is not positive or payer and payee coincide.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(format!("payment amount must be positive, got {}", self.amount));
        }
        if self.payer_id == self.payee_id {
            return Err("payer and payee are the same user".into());
        }
        if self.object_type == PaymentObjectType::Contract && self.object_id.is_none() {
            return Err("a contract payment needs the contract id".into());
        }
        Ok(())
    }
}

/// A per-user, per-currency balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Row id.
    pub id: String,
    /// Owner.
    pub user_id: String,
    /// ISO currency code.
    pub currency: String,
    /// Current balance.
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> PaymentPayload {
        PaymentPayload {
            payer_id: "a".into(),
            payee_id: "b".into(),
            task_id: "p".into(),
            object_type: PaymentObjectType::Contract,
            object_id: Some("c".into()),
            wallet_id: "w".into(),
            amount: 100.0,
            description: None,
        }
    }

    #[test]
    fn payload_serializes_nulls_for_optional_columns() {
        let mut p = payload();
        p.object_type = PaymentObjectType::Invoice;
        p.object_id = None;
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["object_type"], "INVOICE");
        assert_eq!(value["object_id"], serde_json::Value::Null);
        assert_eq!(value["description"], serde_json::Value::Null);
    }

    #[test]
    fn validation_catches_bad_payloads() {
        assert!(payload().validate().is_ok());

        let mut zero = payload();
        zero.amount = 0.0;
        assert!(zero.validate().is_err());

        let mut same = payload();
        same.payee_id = "a".into();
        assert!(same.validate().is_err());

        let mut no_contract = payload();
        no_contract.object_id = None;
        assert!(no_contract.validate().is_err());
    }

    #[test]
    fn payment_deserializes_with_party_emails() {
        let p: Payment = serde_json::from_value(json!({
            "id": "pay1",
            "createdAt": "2025-03-01T12:00:00Z",
            "payerId": "a",
            "payeeId": "b",
            "taskId": "p",
            "objectType": "CONTRACT",
            "objectId": "c",
            "walletId": "w",
            "amount": 12.5,
            "description": null,
            "status": "captured",
            "payer": { "email": "a@x.test" },
            "payee": { "email": "b@x.test" }
        }))
        .unwrap();
        assert_eq!(p.status, PaymentStatus::Captured);
        assert_eq!(p.payee.unwrap().email, "b@x.test");
    }

    #[test]
    fn status_round_trips_through_text() {
        for s in [PaymentStatus::Pending, PaymentStatus::Captured, PaymentStatus::Failed] {
            assert_eq!(s.to_string().parse::<PaymentStatus>().unwrap(), s);
        }
    }
}
