//! `projectdesk assignments` command.

use crate::cli::AssignmentsCommand;
use crate::context::ServiceContext;
use crate::model::{AssignmentInterval, IntervalIds};
use crate::store::AppStore;

use super::{or_dash, render_table, Output};

/// Execute an `assignments` subcommand.
///
/// # Errors
///
/// Returns an error string if a remote call fails or the dates are rejected.
pub async fn run(
    ctx: &ServiceContext,
    store: &mut AppStore,
    command: &AssignmentsCommand,
    out: Output,
) -> Result<String, String> {
    match command {
        AssignmentsCommand::List { task } => {
            let intervals = store.assignments.get_assignments(ctx, task).await.map_err(|e| e.to_string())?;
            out.render(intervals, || interval_table(intervals))
        }
        AssignmentsCommand::Add { task, user, start, end } => {
            let start = start.unwrap_or_else(|| ctx.clock.today());
            let interval = store
                .assignments
                .create_assignment(ctx, task, user, start, *end)
                .await
                .map_err(|e| e.to_string())?;
            out.render(&interval, || {
                format!(
                    "Assigned {user} to {task} from {start} until {}.",
                    interval.end_date.map_or_else(|| "further notice".to_string(), |d| d.to_string())
                )
            })
        }
        AssignmentsCommand::Remove { task, active, removed } => {
            let ids = IntervalIds { active: active.clone(), removed: removed.clone() };
            let deleted = store
                .assignments
                .delete_assignment(ctx, task, &ids)
                .await
                .map_err(|e| e.to_string())?;
            out.render(&deleted, || format!("Deleted {} assignment row(s).", deleted.len()))
        }
    }
}

/// Table of intervals: ids, worker, period.
#[must_use]
pub fn interval_table(intervals: &[AssignmentInterval]) -> String {
    let rows: Vec<Vec<String>> = intervals
        .iter()
        .map(|i| {
            let name = [i.user_first_name.as_deref(), i.user_last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            vec![
                i.active_assignment_id.clone(),
                or_dash(i.removed_assignment_id.as_ref()),
                if name.is_empty() { i.user_id.clone() } else { name },
                or_dash(i.user_email.as_ref()),
                i.start_date.to_string(),
                or_dash(i.end_date),
            ]
        })
        .collect();
    render_table(&["ACTIVE", "REMOVED", "USER", "EMAIL", "FROM", "UNTIL"], &rows, "No assignments.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use chrono::NaiveDate;

    const TEXT: Output = Output { json: false };

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn add_then_list_shows_closed_interval() {
        let (backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let add = AssignmentsCommand::Add {
            task: "p1".into(),
            user: "u2".into(),
            start: Some(date("2025-01-01")),
            end: Some(date("2025-01-10")),
        };
        let out = run(&ctx, &mut store, &add, TEXT).await.unwrap();
        assert_eq!(out, "Assigned u2 to p1 from 2025-01-01 until 2025-01-10.");
        assert_eq!(backend.tables.rows("task_assignment").len(), 2);

        let out = run(&ctx, &mut store, &AssignmentsCommand::List { task: "p1".into() }, TEXT)
            .await
            .unwrap();
        assert!(out.contains("Omer Katz"));
        assert!(out.contains("2025-01-10"));
    }

    #[tokio::test]
    async fn add_without_start_opens_today() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let add = AssignmentsCommand::Add { task: "p1".into(), user: "u2".into(), start: None, end: None };
        let out = run(&ctx, &mut store, &add, TEXT).await.unwrap();
        assert_eq!(out, "Assigned u2 to p1 from 2025-03-01 until further notice.");
    }

    #[tokio::test]
    async fn remove_deletes_both_rows() {
        let (backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let add = AssignmentsCommand::Add {
            task: "p1".into(),
            user: "u2".into(),
            start: Some(date("2025-01-01")),
            end: Some(date("2025-01-10")),
        };
        run(&ctx, &mut store, &add, TEXT).await.unwrap();
        let ids = store.assignments.intervals("p1")[0].ids();

        let remove = AssignmentsCommand::Remove { task: "p1".into(), active: ids.active, removed: ids.removed };
        let out = run(&ctx, &mut store, &remove, TEXT).await.unwrap();
        assert_eq!(out, "Deleted 2 assignment row(s).");
        assert!(backend.tables.rows("task_assignment").is_empty());
        assert!(store.assignments.intervals("p1").is_empty());
    }

    #[test]
    fn open_interval_renders_dash() {
        let interval = AssignmentInterval {
            active_assignment_id: "a1".into(),
            removed_assignment_id: None,
            task_id: "p1".into(),
            task_title: None,
            user_id: "u9".into(),
            user_first_name: None,
            user_last_name: None,
            user_email: None,
            creator_first_name: None,
            creator_last_name: None,
            creator_email: None,
            start_date: date("2025-02-01"),
            end_date: None,
        };
        let table = interval_table(&[interval]);
        let last = table.lines().last().unwrap();
        assert!(last.starts_with("a1"));
        assert!(last.contains("u9"));
        assert!(last.ends_with('-'));
    }
}
