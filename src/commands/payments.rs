//! `projectdesk payments` and `projectdesk wallets` commands.

use crate::api::users::current_user;
use crate::cli::PaymentsCommand;
use crate::context::ServiceContext;
use crate::model::{Payment, PaymentPayload, Wallet};
use crate::money::{format_money, DEFAULT_CURRENCY};
use crate::store::AppStore;

use super::{or_dash, read_yaml, render_table, Output};

/// Execute a `payments` subcommand.
///
/// # Errors
///
/// Returns an error string if a remote call fails or the payload is invalid.
pub async fn run(
    ctx: &ServiceContext,
    store: &mut AppStore,
    command: &PaymentsCommand,
    out: Output,
) -> Result<String, String> {
    match command {
        PaymentsCommand::List { project } => {
            store.payments.get_project_payments(ctx, project).await.map_err(|e| e.to_string())?;
            let payments = store.payments.project_payments(project);
            out.render(payments, || payment_table(payments, &store.payments.wallets))
        }
        PaymentsCommand::Mine => {
            let user = current_user(ctx).await.map_err(|e| e.to_string())?;
            if user.is_guest() {
                return Err("Sign in to see your payments.".into());
            }
            store.payments.get_wallets(ctx, &user).await.map_err(|e| e.to_string())?;
            store.payments.get_my_payments(ctx, &user.id).await.map_err(|e| e.to_string())?;
            let mine = &store.payments.mine;
            out.render(mine, || payment_table(mine, &store.payments.wallets))
        }
        PaymentsCommand::Create { file } => {
            let mut payload: PaymentPayload = read_yaml(file)?;
            if payload.payer_id.is_empty() {
                payload.payer_id = current_user(ctx).await.map_err(|e| e.to_string())?.id;
            }
            let payment = store.payments.create_payment(ctx, &payload).await.map_err(|e| e.to_string())?;
            out.render(&payment, || {
                format!(
                    "Created payment {} of {} ({}).",
                    payment.id,
                    format_money(payment.amount, currency_of(&payment, &store.payments.wallets)),
                    payment.status
                )
            })
        }
        PaymentsCommand::Status { id, status } => {
            let payment = store
                .payments
                .update_payment_status(ctx, id, *status)
                .await
                .map_err(|e| e.to_string())?;
            out.render(&payment, || format!("Payment {} is now {}.", payment.id, payment.status))
        }
    }
}

/// Execute the `wallets` command.
///
/// # Errors
///
/// Returns an error string if the session or the wallets cannot be loaded.
pub async fn wallets(ctx: &ServiceContext, store: &mut AppStore, out: Output) -> Result<String, String> {
    let user = current_user(ctx).await.map_err(|e| e.to_string())?;
    let wallets = store.payments.get_wallets(ctx, &user).await.map_err(|e| e.to_string())?;
    out.render(wallets, || wallet_table(wallets))
}

/// Table of wallets with formatted balances.
#[must_use]
pub fn wallet_table(wallets: &[Wallet]) -> String {
    let rows: Vec<Vec<String>> = wallets
        .iter()
        .map(|w| vec![w.id.clone(), w.currency.clone(), format_money(w.balance, &w.currency)])
        .collect();
    render_table(&["ID", "CURRENCY", "BALANCE"], &rows, "No wallets.")
}

/// Table of payments; amounts use the currency of their wallet when known.
#[must_use]
pub fn payment_table(payments: &[Payment], wallets: &[Wallet]) -> String {
    let rows: Vec<Vec<String>> = payments
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.created_at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string()),
                or_dash(p.payer.as_ref().map(|e| &e.email)),
                or_dash(p.payee.as_ref().map(|e| &e.email)),
                format_money(p.amount, currency_of(p, wallets)),
                p.status.to_string(),
                or_dash(p.description.as_ref()),
            ]
        })
        .collect();
    render_table(&["ID", "DATE", "PAYER", "PAYEE", "AMOUNT", "STATUS", "NOTE"], &rows, "No payments.")
}

fn currency_of<'a>(payment: &Payment, wallets: &'a [Wallet]) -> &'a str {
    wallets
        .iter()
        .find(|w| w.id == payment.wallet_id)
        .map_or(DEFAULT_CURRENCY, |w| w.currency.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentStatus;
    use crate::commands::test_support;

    const TEXT: Output = Output { json: false };

    fn payload_file(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("projectdesk_cmd_payments");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const PAYMENT: &str = "payee_id: u2\ntask_id: p1\nobject_type: CONTRACT\nobject_id: c1\nwallet_id: w1\namount: 2500\n";

    #[tokio::test]
    async fn create_then_capture() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        store.payments.get_wallets(&ctx, &current_user(&ctx).await.unwrap()).await.unwrap();

        let file = payload_file("create.yaml", &format!("payer_id: u1\n{PAYMENT}"));
        let out = run(&ctx, &mut store, &PaymentsCommand::Create { file }, TEXT).await.unwrap();
        assert!(out.contains("₪2,500.00"));
        assert!(out.ends_with("(pending)."));

        let id = store.payments.mine[0].id.clone();
        assert_eq!(store.payments.project_payments("p1")[0].id, id);

        let status = PaymentsCommand::Status { id: id.clone(), status: PaymentStatus::Captured };
        let out = run(&ctx, &mut store, &status, TEXT).await.unwrap();
        assert_eq!(out, format!("Payment {id} is now captured."));
        assert_eq!(store.payments.mine[0].status, PaymentStatus::Captured);
        assert_eq!(store.payments.project_payments("p1")[0].status, PaymentStatus::Captured);
    }

    #[tokio::test]
    async fn create_defaults_payer_to_session_user() {
        let (backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let file = payload_file("default_payer.yaml", PAYMENT);
        run(&ctx, &mut store, &PaymentsCommand::Create { file }, TEXT).await.unwrap();
        assert_eq!(backend.tables.rows("payments")[0]["payer_id"], "u1");
    }

    #[tokio::test]
    async fn list_of_project_without_payments() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let out = run(&ctx, &mut store, &PaymentsCommand::List { project: "p1".into() }, TEXT)
            .await
            .unwrap();
        assert_eq!(out, "No payments.");
    }

    #[tokio::test]
    async fn wallets_show_balance() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let out = wallets(&ctx, &mut store, TEXT).await.unwrap();
        assert!(out.contains("₪120,000.00"));
    }
}
