//! `projectdesk contracts` command.

use serde_json::json;

use crate::api::users::current_user;
use crate::cli::{ContractsCommand, SignAs};
use crate::context::ServiceContext;
use crate::model::{Contract, ContractPatch, ContractPayload};
use crate::money::{format_money, DEFAULT_CURRENCY};
use crate::store::AppStore;

use super::{or_dash, read_bytes, read_yaml, render_table, Output};

/// Execute a `contracts` subcommand.
///
/// # Errors
///
/// Returns an error string if a remote call fails, an input file is invalid,
/// or the session user may not sign.
pub async fn run(
    ctx: &ServiceContext,
    store: &mut AppStore,
    command: &ContractsCommand,
    out: Output,
) -> Result<String, String> {
    match command {
        ContractsCommand::List => {
            let list = store.contracts.get_list(ctx).await.map_err(|e| e.to_string())?;
            out.render(list, || contract_table(list))
        }
        ContractsCommand::Show { id } => {
            let contract = store.contracts.get_by_id(ctx, id).await.map_err(|e| e.to_string())?;
            out.render(contract, || describe(contract))
        }
        ContractsCommand::Create { file } => {
            let mut payload: ContractPayload = read_yaml(file)?;
            if payload.creator_id.is_empty() {
                payload.creator_id = current_user(ctx).await.map_err(|e| e.to_string())?.id;
            }
            let contract = store.contracts.create(ctx, &payload).await.map_err(|e| e.to_string())?;
            out.render(contract, || format!("Created contract {} ({}).", contract.id, contract.status))
        }
        ContractsCommand::Update { id, file } => {
            let patch: ContractPatch = read_yaml(file)?;
            if patch == ContractPatch::default() {
                return Err("Nothing to update.".into());
            }
            let contract = store.contracts.save(ctx, id, &patch).await.map_err(|e| e.to_string())?;
            out.render(contract, || format!("Updated contract {}.", contract.id))
        }
        ContractsCommand::Sign { id, party } => {
            let user = current_user(ctx).await.map_err(|e| e.to_string())?;
            let contract = match party {
                SignAs::A => store.contracts.sign_as_party_a(ctx, id, &user.id).await,
                SignAs::B => store.contracts.sign_as_party_b(ctx, id, &user.id).await,
            }
            .map_err(|e| e.to_string())?;
            out.render(contract, || format!("Signed contract {}; it is now {}.", contract.id, contract.status))
        }
        ContractsCommand::Delete { id } => {
            store.contracts.delete(ctx, id).await.map_err(|e| e.to_string())?;
            out.render(&json!({ "deleted": id }), || format!("Deleted contract {id}."))
        }
        ContractsCommand::Upload { id, path } => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| format!("{} has no file name", path.display()))?;
            let bytes = read_bytes(path)?;
            let contract = store.contracts.get_by_id(ctx, id).await.map_err(|e| e.to_string())?.clone();
            let url = store
                .contracts
                .upload_file(ctx, &contract, &file_name, bytes)
                .await
                .map_err(|e| e.to_string())?;
            let patch = ContractPatch { file_url: Some(url.clone()), ..ContractPatch::default() };
            store.contracts.save(ctx, id, &patch).await.map_err(|e| e.to_string())?;
            out.render(&json!({ "fileUrl": url }), || format!("Uploaded {file_name}: {url}"))
        }
    }
}

fn contract_table(contracts: &[Contract]) -> String {
    let rows: Vec<Vec<String>> = contracts
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.title.clone(),
                c.status.to_string(),
                c.task.as_ref().map_or_else(|| c.task_id.clone(), |t| t.title.clone()),
                c.start_date.to_string(),
                or_dash(c.end_date),
                c.amount.map_or_else(|| "-".into(), |a| format_money(a, DEFAULT_CURRENCY)),
            ]
        })
        .collect();
    render_table(&["ID", "TITLE", "STATUS", "PROJECT", "START", "END", "AMOUNT"], &rows, "No contracts found.")
}

fn describe(contract: &Contract) -> String {
    let mut lines = vec![
        format!("Contract: {}", contract.id),
        format!("Title: {}", contract.title),
        format!("Status: {}", contract.status),
        format!("Project: {}", contract.task.as_ref().map_or(&contract.task_id, |t| &t.title)),
        format!("Period: {} .. {}", contract.start_date, or_dash(contract.end_date)),
        format!("Party A: {} (signed {})", contract.user_a, or_dash(contract.date_signed_a)),
        format!("Party B: {} (signed {})", contract.user_b, or_dash(contract.date_signed_b)),
    ];
    if let Some(amount) = contract.amount {
        lines.push(format!("Amount: {}", format_money(amount, DEFAULT_CURRENCY)));
    }
    if let Some(url) = contract.file_url.as_deref().filter(|u| !u.is_empty()) {
        lines.push(format!("File: {url}"));
    }
    if let Some(description) = contract.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {description}"));
    }
    lines.join("\n")
}
