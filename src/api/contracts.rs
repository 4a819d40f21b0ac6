//! Contract queries, file upload and signing.

use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::{Contract, ContractPatch, ContractPayload, ContractStatus};
use crate::ports::storage::content_type_for;
use crate::ports::{Embed, Filter, Selection, TableQuery};

use super::{decode_rows, decode_single, encode_row};
use crate::api::tasks::TASKS;

/// Contracts table.
pub const CONTRACTS: &str = "contracts";

/// Which side of the contract is signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The creator's side.
    A,
    /// The contractor's side.
    B,
}

fn listing_selection() -> Selection {
    Selection::all().embed(Embed::new(TASKS, TASKS, "task_id", &["title", "start_date", "end_date"]))
}

/// Fetches every visible contract, newest first, with its project summary.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub async fn fetch_contracts(ctx: &ServiceContext) -> Result<Vec<Contract>, AppError> {
    let query = TableQuery::from(CONTRACTS).select(listing_selection()).order("created_at", false);
    let rows =
        ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_contracts", e))?;
    decode_rows("fetch_contracts", rows)
}

/// Fetches one contract.
///
/// # Errors
///
/// Returns `NotFound` if no contract has this id, or an error if the query fails.
pub async fn fetch_contract_by_id(ctx: &ServiceContext, id: &str) -> Result<Contract, AppError> {
    let query = TableQuery::from(CONTRACTS).eq("id", id).limit(1);
    let rows = ctx
        .tables
        .select(&query)
        .await
        .map_err(|e| AppError::remote("fetch_contract_by_id", e))?;
    decode_single("fetch_contract_by_id", "contract", id, rows)
}

/// Creates a contract in DRAFT.
///
/// # Errors
///
/// Returns `Invalid` for an inverted period or identical parties, or an error if the insert fails.
pub async fn create_contract(
    ctx: &ServiceContext,
    payload: &ContractPayload,
) -> Result<Contract, AppError> {
    if payload.end_date.is_some_and(|end| end < payload.start_date) {
        return Err(AppError::Invalid(format!("contract {:?} ends before it starts", payload.title)));
    }
    if payload.user_a == payload.user_b {
        return Err(AppError::Invalid("contract parties must differ".into()));
    }
    let mut row = encode_row("create_contract", payload)?;
    row["status"] = serde_json::to_value(ContractStatus::Draft)
        .map_err(|e| AppError::decode("create_contract", &e))?;
    let rows = ctx
        .tables
        .insert(CONTRACTS, vec![row], &Selection::all())
        .await
        .map_err(|e| AppError::remote("create_contract", e))?;
    decode_single("create_contract", "contract", &payload.title, rows)
}

/// Applies a partial update.
///
/// # Errors
///
/// Returns `NotFound` if no contract has this id, or an error if the update fails.
pub async fn update_contract(
    ctx: &ServiceContext,
    id: &str,
    patch: &ContractPatch,
) -> Result<Contract, AppError> {
    let patch = encode_row("update_contract", patch)?;
    let rows = ctx
        .tables
        .update(CONTRACTS, &[Filter::eq("id", id)], patch, &Selection::all())
        .await
        .map_err(|e| AppError::remote("update_contract", e))?;
    decode_single("update_contract", "contract", id, rows)
}

/// Deletes a contract.
///
/// # Errors
///
/// Returns an error if the call fails.
pub async fn delete_contract(ctx: &ServiceContext, id: &str) -> Result<(), AppError> {
    ctx.tables
        .delete(CONTRACTS, &[Filter::eq("id", id)], &Selection::columns(&["id"]))
        .await
        .map_err(|e| AppError::remote("delete_contract", e))?;
    Ok(())
}

/// Uploads a contract file (replacing any previous one) and returns its public URL.
///
/// # Errors
///
/// Returns an error if the upload fails.
pub async fn upload_contract_file(
    ctx: &ServiceContext,
    path: &str,
    bytes: Vec<u8>,
) -> Result<String, AppError> {
    let bucket = &ctx.settings.bucket;
    ctx.storage
        .upload(bucket, path, bytes, content_type_for(path), true)
        .await
        .map_err(|e| AppError::remote("upload_contract_file", e))?;
    Ok(ctx.storage.public_url(bucket, path))
}

/// Signs a contract on behalf of `user_id`.
///
/// Party A (the creator) signs a DRAFT, moving it to PENDING; party B signs a
/// PENDING contract, moving it to SIGNED. The signature time comes from the
/// context clock.
///
/// # Errors
///
/// Returns `NotPermitted` without a remote call when the user or the status
/// does not allow the signature, or an error if the update fails.
pub async fn sign_contract(
    ctx: &ServiceContext,
    contract: &Contract,
    party: Party,
    user_id: &str,
) -> Result<Contract, AppError> {
    let now = ctx.clock.now();
    let patch = match party {
        Party::A if contract.can_sign_as_a(user_id) => ContractPatch {
            date_signed_a: Some(now),
            status: Some(ContractStatus::Pending),
            ..ContractPatch::default()
        },
        Party::B if contract.can_sign_as_b(user_id) => ContractPatch {
            date_signed_b: Some(now),
            status: Some(ContractStatus::Signed),
            ..ContractPatch::default()
        },
        _ => {
            return Err(AppError::NotPermitted(format!(
                "user {user_id} cannot sign contract {} as party {party:?} while it is {}",
                contract.id, contract.status
            )))
        }
    };
    tracing::debug!(contract = %contract.id, ?party, "signing contract");
    update_contract(ctx, &contract.id, &patch).await
}
