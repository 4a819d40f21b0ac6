//! `projectdesk projects` and `projectdesk units` commands.

use serde_json::json;

use crate::api::payments::payable_contracts;
use crate::api::tasks::fetch_milestones;
use crate::api::users::current_user;
use crate::cli::ProjectsCommand;
use crate::context::ServiceContext;
use crate::model::{PaymentStatus, Task, TaskDraft, TaskPatch, TaskStatus, TaskType};
use crate::money::{format_money, total, DEFAULT_CURRENCY};
use crate::store::{AppStore, TaskChange};

use super::{assignments, or_dash, render_table, Output};

/// Execute a `projects` subcommand.
///
/// # Errors
///
/// Returns an error string if a remote call fails or the input is rejected.
pub async fn run(
    ctx: &ServiceContext,
    store: &mut AppStore,
    command: &ProjectsCommand,
    out: Output,
) -> Result<String, String> {
    match command {
        ProjectsCommand::List => {
            let tasks = store.tasks.get_tasks(ctx).await.map_err(|e| e.to_string())?;
            out.render(tasks, || task_table(tasks, "No projects found."))
        }
        ProjectsCommand::Show { id } => {
            let task = store.tasks.get_task_by_id(ctx, id).await.map_err(|e| e.to_string())?;
            out.render(task, || describe(task))
        }
        ProjectsCommand::Create { title, start, end, description, amount, unit } => {
            let user = current_user(ctx).await.map_err(|e| e.to_string())?;
            if user.is_guest() {
                return Err("Sign in to create projects.".into());
            }
            if end < start {
                return Err(format!("Project ends ({end}) before it starts ({start})."));
            }
            let draft = TaskDraft {
                title: title.clone(),
                description: description.clone(),
                creator_id: user.id,
                start_date: *start,
                end_date: *end,
                amount: *amount,
                status: TaskStatus::Pending,
                kind: TaskType::Project,
                parent_id: None,
                measurement_unit_id: unit.clone(),
                late_penalty_per_day: None,
            };
            let task = store
                .tasks
                .save_task(ctx, TaskChange::Create(draft))
                .await
                .map_err(|e| e.to_string())?;
            out.render(task, || format!("Created project {} ({}).", task.id, task.title))
        }
        ProjectsCommand::Update { id, title, description, start, end, amount, status } => {
            let patch = TaskPatch {
                title: title.clone(),
                description: description.clone(),
                start_date: *start,
                end_date: *end,
                amount: *amount,
                status: *status,
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                return Err("Nothing to update.".into());
            }
            let change = TaskChange::Update { id: id.clone(), patch };
            let task = store.tasks.save_task(ctx, change).await.map_err(|e| e.to_string())?;
            out.render(task, || format!("Updated project {}.", task.id))
        }
        ProjectsCommand::Delete { id } => {
            store.tasks.delete_task(ctx, id).await.map_err(|e| e.to_string())?;
            out.render(&json!({ "deleted": id }), || format!("Deleted project {id}."))
        }
        ProjectsCommand::Schedule { id } => schedule(ctx, store, id, out).await,
        ProjectsCommand::Finance { id } => finance(ctx, store, id, out).await,
    }
}

/// Execute the `units` command.
///
/// # Errors
///
/// Returns an error string if the units cannot be loaded.
pub async fn units(ctx: &ServiceContext, store: &mut AppStore, out: Output) -> Result<String, String> {
    let units = store.tasks.get_units(ctx).await.map_err(|e| e.to_string())?;
    out.render(units, || {
        let rows: Vec<Vec<String>> = units.iter().map(|u| vec![u.id.clone(), u.title.clone()]).collect();
        render_table(&["ID", "TITLE"], &rows, "No measurement units.")
    })
}

async fn schedule(ctx: &ServiceContext, store: &mut AppStore, id: &str, out: Output) -> Result<String, String> {
    let project = store.tasks.get_task_by_id(ctx, id).await.map_err(|e| e.to_string())?.clone();
    let milestones = fetch_milestones(ctx, id).await.map_err(|e| e.to_string())?;
    let intervals = store.assignments.get_assignments(ctx, id).await.map_err(|e| e.to_string())?;

    out.render(
        &json!({ "project": project, "milestones": milestones, "assignments": intervals }),
        || {
            format!(
                "{} ({} .. {})\n\nMilestones:\n{}\n\nAssignments:\n{}",
                project.title,
                project.start_date,
                project.end_date,
                task_table(&milestones, "No milestones."),
                assignments::interval_table(intervals),
            )
        },
    )
}

async fn finance(ctx: &ServiceContext, store: &mut AppStore, id: &str, out: Output) -> Result<String, String> {
    let user = current_user(ctx).await.map_err(|e| e.to_string())?;
    store.payments.get_wallets(ctx, &user).await.map_err(|e| e.to_string())?;
    store.payments.get_project_payments(ctx, id).await.map_err(|e| e.to_string())?;
    store.contracts.get_list(ctx).await.map_err(|e| e.to_string())?;

    let payments = store.payments.project_payments(id);
    let eligible = payable_contracts(&store.contracts.list, id);
    let captured = total(
        payments.iter().filter(|p| p.status == PaymentStatus::Captured).map(|p| Some(p.amount)),
    );
    let wallets = &store.payments.wallets;

    out.render(
        &json!({
            "wallets": wallets,
            "payments": payments,
            "payableContracts": eligible,
            "captured": captured,
        }),
        || {
            format!(
                "Wallets:\n{}\n\nPayments:\n{}\n\nCaptured: {}\nContracts open for payment: {}",
                super::payments::wallet_table(wallets),
                super::payments::payment_table(payments, wallets),
                format_money(captured, DEFAULT_CURRENCY),
                if eligible.is_empty() {
                    "-".to_string()
                } else {
                    eligible.iter().map(|c| c.id.as_str()).collect::<Vec<_>>().join(", ")
                },
            )
        },
    )
}

fn task_table(tasks: &[Task], empty: &str) -> String {
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.title.clone(),
                t.status.to_string(),
                t.start_date.to_string(),
                t.end_date.to_string(),
                t.amount.map_or_else(|| "-".into(), |a| format_money(a, DEFAULT_CURRENCY)),
            ]
        })
        .collect();
    render_table(&["ID", "TITLE", "STATUS", "START", "END", "AMOUNT"], &rows, empty)
}

fn describe(task: &Task) -> String {
    let mut lines = vec![
        format!("Project: {}", task.id),
        format!("Title: {}", task.title),
        format!("Status: {}", task.status),
        format!("Period: {} .. {}", task.start_date, task.end_date),
        format!("Amount: {}", task.amount.map_or_else(|| "-".into(), |a| format_money(a, DEFAULT_CURRENCY))),
        format!("Unit: {}", or_dash(task.measurement_units.as_ref().map(|u| &u.title))),
    ];
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {description}"));
    }
    if let Some(penalty) = task.late_penalty_per_day {
        lines.push(format!("Late penalty per day: {}", format_money(penalty, DEFAULT_CURRENCY)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use chrono::NaiveDate;

    const TEXT: Output = Output { json: false };

    #[tokio::test]
    async fn list_shows_only_projects() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let out = run(&ctx, &mut store, &ProjectsCommand::List, TEXT).await.unwrap();
        assert!(out.contains("House"));
        assert!(out.contains("IN_PROGRESS"));
        assert!(out.contains("₪50,000.00"));
        assert!(!out.contains("Foundation"));
        assert!(store.tasks.fetched);
    }

    #[tokio::test]
    async fn create_uses_session_user_as_creator() {
        let (backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let command = ProjectsCommand::Create {
            title: "Garage".into(),
            start: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            description: None,
            amount: Some(900.0),
            unit: Some("m1".into()),
        };
        let out = run(&ctx, &mut store, &command, TEXT).await.unwrap();
        assert!(out.starts_with("Created project"));

        let rows = backend.tables.rows("tasks");
        let garage = rows.iter().find(|r| r["title"] == "Garage").unwrap();
        assert_eq!(garage["creator_id"], "u1");
        assert_eq!(garage["type"], "PROJECT");
        assert_eq!(store.tasks.selected.as_ref().unwrap().title, "Garage");
    }

    #[tokio::test]
    async fn create_rejects_inverted_period() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let command = ProjectsCommand::Create {
            title: "Garage".into(),
            start: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            description: None,
            amount: None,
            unit: None,
        };
        assert!(run(&ctx, &mut store, &command, TEXT).await.is_err());
    }

    #[tokio::test]
    async fn update_without_fields_is_rejected() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let command = ProjectsCommand::Update {
            id: "p1".into(),
            title: None,
            description: None,
            start: None,
            end: None,
            amount: None,
            status: None,
        };
        let err = run(&ctx, &mut store, &command, TEXT).await.unwrap_err();
        assert_eq!(err, "Nothing to update.");
    }

    #[tokio::test]
    async fn schedule_lists_milestones() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let out = run(&ctx, &mut store, &ProjectsCommand::Schedule { id: "p1".into() }, TEXT)
            .await
            .unwrap();
        assert!(out.contains("Foundation"));
        assert!(out.contains("No assignments."));
    }

    #[tokio::test]
    async fn finance_lists_only_signed_contracts() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let out = run(&ctx, &mut store, &ProjectsCommand::Finance { id: "p1".into() }, Output { json: true })
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let eligible = value["payableContracts"].as_array().unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0]["id"], "c1");
        assert_eq!(value["wallets"][0]["currency"], "ILS");
    }
}
