//! `projectdesk milestones` command.

use std::path::Path;

use serde_json::json;

use crate::api::contracts::fetch_contract_by_id;
use crate::api::tasks::fetch_milestones;
use crate::api::users::current_user;
use crate::cli::MilestonesCommand;
use crate::context::ServiceContext;
use crate::milestones::{plan_milestone_sync, upsert_milestones_for_parent, MilestonePlan, SyncReport};
use crate::model::{MilestoneItem, Task};

use super::{read_yaml, render_table, Output};

/// Execute a `milestones` subcommand.
///
/// # Errors
///
/// Returns an error string if a remote call fails, the milestone file is
/// invalid, or a milestone falls outside the contract period.
pub async fn run(ctx: &ServiceContext, command: &MilestonesCommand, out: Output) -> Result<String, String> {
    match command {
        MilestonesCommand::List { project } => {
            let milestones = fetch_milestones(ctx, project).await.map_err(|e| e.to_string())?;
            out.render(&milestones, || milestone_table(&milestones))
        }
        MilestonesCommand::Sync { project, file, contract, dry_run } => {
            let desired = load_items(file)?;
            if let Some(contract_id) = contract {
                let contract = fetch_contract_by_id(ctx, contract_id).await.map_err(|e| e.to_string())?;
                for item in &desired {
                    item.validate_within(contract.start_date, contract.end_date)?;
                }
            }
            let creator = current_user(ctx).await.map_err(|e| e.to_string())?;

            if *dry_run {
                let stored = fetch_milestones(ctx, project).await.map_err(|e| e.to_string())?;
                let plan = plan_milestone_sync(project, &creator.id, &stored, &desired);
                return out.render(&plan_json(&plan), || describe_plan(&plan));
            }

            let report = upsert_milestones_for_parent(ctx, project, &creator.id, &desired)
                .await
                .map_err(|e| e.to_string())?;
            out.render(&report, || describe_report(&report))
        }
    }
}

fn load_items(path: &Path) -> Result<Vec<MilestoneItem>, String> {
    let items: Vec<MilestoneItem> = read_yaml(path)?;
    for item in &items {
        item.validate().map_err(|e| format!("{}: {e}", path.display()))?;
    }
    Ok(items)
}

fn milestone_table(milestones: &[Task]) -> String {
    let rows: Vec<Vec<String>> = milestones
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.title.clone(),
                t.status.to_string(),
                t.start_date.to_string(),
                t.end_date.to_string(),
                t.amount.map_or_else(|| "-".into(), |a| format!("{a:.2}")),
            ]
        })
        .collect();
    render_table(&["ID", "TITLE", "STATUS", "START", "END", "AMOUNT"], &rows, "No milestones.")
}

fn plan_json(plan: &MilestonePlan) -> serde_json::Value {
    json!({
        "update": plan.updates.iter().map(|(id, _)| id).collect::<Vec<_>>(),
        "insert": plan.inserts.iter().map(|d| &d.title).collect::<Vec<_>>(),
        "delete": plan.deletes,
        "unchanged": plan.unchanged,
    })
}

fn describe_plan(plan: &MilestonePlan) -> String {
    if plan.is_noop() {
        return "Milestones already up to date.".to_string();
    }
    let mut lines = vec![format!("{} change(s) planned:", plan.change_count())];
    lines.extend(plan.updates.iter().map(|(id, _)| format!("  update {id}")));
    lines.extend(plan.inserts.iter().map(|d| format!("  insert {:?}", d.title)));
    lines.extend(plan.deletes.iter().map(|id| format!("  delete {id}")));
    lines.join("\n")
}

fn describe_report(report: &SyncReport) -> String {
    format!(
        "Milestones synced: {} updated, {} inserted, {} deleted, {} unchanged.",
        report.updated.len(),
        report.inserted.len(),
        report.deleted.len(),
        report.unchanged.len()
    )
}
