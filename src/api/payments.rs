//! Payment and wallet queries.

use std::collections::HashSet;

use serde_json::json;

use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{Contract, ContractStatus, Payment, PaymentPayload, PaymentStatus, Wallet};
use crate::ports::{Embed, Filter, Selection, TableQuery};

use super::{decode_rows, decode_single, encode_row};

/// Payments table.
pub const PAYMENTS: &str = "payments";
/// Wallets table.
pub const WALLETS: &str = "wallets";
/// Profiles table, embedded for party emails.
pub const PROFILES: &str = "profiles";

fn payment_selection() -> Selection {
    Selection::all()
        .embed(Embed::new("payer", PROFILES, "payer_id", &["email"]))
        .embed(Embed::new("payee", PROFILES, "payee_id", &["email"]))
}

/// Creates a payment in `pending` state.
///
/// # Errors
///
/// Returns `Invalid` for a nonsensical payload, or an error if the insert fails.
pub async fn create_payment(
    ctx: &ServiceContext,
    payload: &PaymentPayload,
) -> Result<Payment, AppError> {
    payload.validate().map_err(AppError::Invalid)?;
    let row = encode_row("create_payment", payload)?;
    let rows = ctx
        .tables
        .insert(PAYMENTS, vec![row], &payment_selection())
        .await
        .map_err(|e| AppError::remote("create_payment", e))?;
    decode_single("create_payment", "payment", &payload.task_id, rows)
}

/// Sets the settlement status of a payment.
///
/// # Errors
///
/// Returns `NotFound` if no payment has this id, or an error if the update fails.
pub async fn update_payment_status(
    ctx: &ServiceContext,
    id: &str,
    status: PaymentStatus,
) -> Result<Payment, AppError> {
    let rows = ctx
        .tables
        .update(PAYMENTS, &[Filter::eq("id", id)], json!({ "status": status }), &payment_selection())
        .await
        .map_err(|e| AppError::remote("update_payment_status", e))?;
    decode_single("update_payment_status", "payment", id, rows)
}

/// Fetches the payments of a project, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_payments_by_project(
    ctx: &ServiceContext,
    task_id: &str,
) -> Result<Vec<Payment>, AppError> {
    let query = TableQuery::from(PAYMENTS)
        .select(payment_selection())
        .eq("task_id", task_id)
        .order("created_at", false);
    let rows = ctx
        .tables
        .select(&query)
        .await
        .map_err(|e| AppError::remote("fetch_payments_by_project", e))?;
    decode_rows("fetch_payments_by_project", rows)
}

/// Fetches the payments a user sent or received, newest first.
///
/// # Errors
///
/// Returns an error if either query fails or a row cannot be decoded.
pub async fn fetch_my_payments(ctx: &ServiceContext, user_id: &str) -> Result<Vec<Payment>, AppError> {
    let mut payments: Vec<Payment> = Vec::new();
    for column in ["payer_id", "payee_id"] {
        let query = TableQuery::from(PAYMENTS)
            .select(payment_selection())
            .eq(column, user_id)
            .order("created_at", false);
        let rows = ctx
            .tables
            .select(&query)
            .await
            .map_err(|e| AppError::remote("fetch_my_payments", e))?;
        payments.extend(decode_rows::<Payment>("fetch_my_payments", rows)?);
    }

    let mut seen = HashSet::new();
    payments.retain(|p| seen.insert(p.id.clone()));
    payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(payments)
}

/// Fetches a user's wallets.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_wallets(ctx: &ServiceContext, user_id: &str) -> Result<Vec<Wallet>, AppError> {
    let query = TableQuery::from(WALLETS).eq("user_id", user_id).order("currency", true);
    let rows = ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_wallets", e))?;
    decode_rows("fetch_wallets", rows)
}

/// Contracts of a project that a payment may settle: only signed ones.
#[must_use]
pub fn payable_contracts<'a>(contracts: &'a [Contract], task_id: &str) -> Vec<&'a Contract> {
    contracts
        .iter()
        .filter(|c| c.task_id == task_id && c.status == ContractStatus::Signed)
        .collect()
}
