//! `projectdesk dashboard` command.

use std::collections::BTreeMap;

use serde_json::json;

use crate::api::users::current_user;
use crate::context::ServiceContext;
use crate::model::Contract;
use crate::money::format_money;
use crate::store::AppStore;

use super::Output;

/// Execute the `dashboard` command.
///
/// Shows project counts per status, the contracts waiting for the session
/// user's signature and the user's wallet balances.
///
/// # Errors
///
/// Returns an error string if any of the loads fails.
pub async fn run(ctx: &ServiceContext, store: &mut AppStore, out: Output) -> Result<String, String> {
    let user = current_user(ctx).await.map_err(|e| e.to_string())?;
    store.tasks.get_tasks(ctx).await.map_err(|e| e.to_string())?;
    store.contracts.get_list(ctx).await.map_err(|e| e.to_string())?;
    store.payments.get_wallets(ctx, &user).await.map_err(|e| e.to_string())?;

    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    for task in &store.tasks.tasks {
        *by_status.entry(task.status.to_string()).or_default() += 1;
    }
    let to_sign: Vec<&Contract> = store
        .contracts
        .list
        .iter()
        .filter(|c| c.can_sign_as_a(&user.id) || c.can_sign_as_b(&user.id))
        .collect();
    let wallets = &store.payments.wallets;

    out.render(
        &json!({
            "user": user,
            "projects": store.tasks.tasks.len(),
            "projectsByStatus": by_status,
            "awaitingSignature": to_sign,
            "wallets": wallets,
        }),
        || {
            let mut lines = vec![
                format!("Signed in as {}", user.email.as_deref().unwrap_or(&user.id)),
                String::new(),
                format!("Projects: {}", store.tasks.tasks.len()),
            ];
            lines.extend(by_status.iter().map(|(status, n)| format!("  {status}: {n}")));
            lines.push(String::new());
            if to_sign.is_empty() {
                lines.push("No contracts awaiting your signature.".into());
            } else {
                lines.push("Awaiting your signature:".into());
                lines.extend(to_sign.iter().map(|c| format!("  {} {} ({})", c.id, c.title, c.status)));
            }
            if !wallets.is_empty() {
                lines.push(String::new());
                lines.push("Wallets:".into());
                lines.extend(wallets.iter().map(|w| format!("  {}", format_money(w.balance, &w.currency))));
            }
            lines.join("\n")
        },
    )
}
