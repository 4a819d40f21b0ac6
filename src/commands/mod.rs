//! Command dispatch and handlers.
//!
//! Handlers are async, take the service context and the store, and return
//! the rendered output; `dispatch` prints it.

pub mod assignments;
pub mod contracts;
pub mod dashboard;
pub mod documents;
pub mod milestones;
pub mod payments;
pub mod projects;
pub mod users;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::memory::MemoryBackend;
use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::config::{BackendKind, Config};
use crate::context::ServiceContext;
use crate::store::AppStore;

/// Dispatch a parsed command to its handler.
///
/// The context is built from [`Config::load`]. When `PROJECTDESK_RECORD` is
/// set to a directory path, all port interactions are recorded to per-port
/// cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if the configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = Config::load().map_err(|e| e.to_string())?;
    let ctx = build_context(&config)?;

    let (ctx, session) = if let Some(dir) = &config.record_dir {
        let endpoint = config.remote.as_ref().map_or("memory", |r| r.url.as_str());
        let session = RecordingSession::at(dir, endpoint)?;
        (ServiceContext::recording(ctx, &session), Some(session))
    } else {
        (ctx, None)
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    let mut store = AppStore::new();
    let result = runtime.block_on(execute(&cli.command, &ctx, &mut store, cli.json));

    // Finish recording after the command completes, even on error.
    if let Some(session) = session {
        // Drop the context first to release the recorder handles.
        drop(ctx);
        let output_dir = session.finish()?;
        eprintln!("Recording saved to: {}", output_dir.display());
    }

    let output = result?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn build_context(config: &Config) -> Result<ServiceContext, String> {
    match config.backend {
        BackendKind::Live => {
            let remote = config
                .remote
                .as_ref()
                .ok_or("live backend selected without connection settings")?;
            ServiceContext::live(remote, config.settings.clone()).map_err(|e| e.to_string())
        }
        BackendKind::Memory => {
            let backend = match &config.seed_path {
                Some(path) => MemoryBackend::load(path)?,
                None => MemoryBackend::default(),
            };
            Ok(ServiceContext::memory(&backend, config.settings.clone()))
        }
    }
}

/// Run a command against an existing context and store.
///
/// # Errors
///
/// Returns an error string if the handler fails.
pub async fn execute(
    command: &Command,
    ctx: &ServiceContext,
    store: &mut AppStore,
    json: bool,
) -> Result<String, String> {
    let out = Output { json };
    match command {
        Command::Dashboard => dashboard::run(ctx, store, out).await,
        Command::Projects(cmd) => projects::run(ctx, store, cmd, out).await,
        Command::Units => projects::units(ctx, store, out).await,
        Command::Milestones(cmd) => milestones::run(ctx, cmd, out).await,
        Command::Assignments(cmd) => assignments::run(ctx, store, cmd, out).await,
        Command::Contracts(cmd) => contracts::run(ctx, store, cmd, out).await,
        Command::Payments(cmd) => payments::run(ctx, store, cmd, out).await,
        Command::Wallets => payments::wallets(ctx, store, out).await,
        Command::Documents(cmd) => documents::run(ctx, store, cmd, out).await,
        Command::Users(cmd) => users::run(ctx, cmd, out).await,
        Command::Whoami => users::whoami(ctx, out).await,
    }
}

/// Output mode shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Emit JSON instead of text.
    pub json: bool,
}

impl Output {
    /// Render `value` as JSON, or fall back to `text`.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON serialisation fails.
    pub fn render<T: Serialize + ?Sized>(self, value: &T, text: impl FnOnce() -> String) -> Result<String, String> {
        if self.json {
            serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {e}"))
        } else {
            Ok(text())
        }
    }
}

/// Render rows as a table with computed column widths.
///
/// `empty` is returned when there are no rows.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], empty: &str) -> String {
    if rows.is_empty() {
        return empty.to_string();
    }
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r.get(i).map_or(0, |c| c.chars().count()))
                .max()
                .unwrap_or(0)
                .max(h.len())
        })
        .collect();

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.iter().map(|h| (*h).to_string()).collect()));
    out.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        out.push(line(row.clone()));
    }
    out.join("\n")
}

/// Read and parse a YAML input file.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or parsed.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

/// Read a local file to upload.
///
/// # Errors
///
/// Returns an error string if the file cannot be read.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

/// `Some` values as text, `None` as a dash.
pub(crate) fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::adapters::memory::{FixedClock, MemoryBackend, MemorySeed};
    use crate::config::ClientSettings;
    use crate::context::ServiceContext;
    use chrono::{TimeZone, Utc};

    pub const SEED: &str = r"
user: { id: u1, email: dana@site.test }
tables:
  profiles:
    - { id: u1, email: dana@site.test, first_name: Dana, last_name: Levi, role: MANAGER }
    - { id: u2, email: omer@site.test, first_name: Omer, last_name: Katz, role: WORKER }
  measurement_units:
    - { id: m1, title: sqm }
  tasks:
    - { id: p1, title: House, type: PROJECT, creator_id: u1, status: IN_PROGRESS,
        start_date: 2025-01-01, end_date: 2025-06-30, amount: 50000 }
    - { id: ms1, title: Foundation, type: TASK, creator_id: u1, status: PENDING, parent_id: p1,
        start_date: 2025-01-01, end_date: 2025-01-31, amount: 10000 }
  contracts:
    - { id: c1, creator_id: u1, user_a: u1, user_b: u2, task_id: p1, title: Build,
        description: '', start_date: 2025-01-01, status: SIGNED, file_url: '', amount: 50000,
        created_at: '2025-01-02T00:00:00Z' }
    - { id: c2, creator_id: u1, user_a: u1, user_b: u2, task_id: p1, title: Extras,
        description: '', start_date: 2025-02-01, status: DRAFT, file_url: '',
        created_at: '2025-02-02T00:00:00Z' }
  wallets:
    - { id: w1, user_id: u1, currency: ILS, balance: 120000 }
files:
  - { path: tasks/p1/.keep }
  - { path: tasks/p1/plan.txt, content: ground floor }
";

    pub fn context() -> (MemoryBackend, ServiceContext) {
        let seed: MemorySeed = serde_yaml::from_str(SEED).unwrap();
        let backend = MemoryBackend::from_seed(seed);
        let ctx = ServiceContext::memory(&backend, ClientSettings::default())
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()));
        (backend, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_widths_follow_longest_cell() {
        let rows = vec![
            vec!["p1".to_string(), "House".to_string()],
            vec!["p22".to_string(), "Barn".to_string()],
        ];
        let table = render_table(&["ID", "TITLE"], &rows, "none");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID   TITLE");
        assert_eq!(lines[1], "---  -----");
        assert_eq!(lines[2], "p1   House");
        assert_eq!(lines[3], "p22  Barn");
    }

    #[test]
    fn empty_table_uses_placeholder() {
        assert_eq!(render_table(&["ID"], &[], "No projects."), "No projects.");
    }

    #[tokio::test]
    async fn execute_renders_json() {
        let (_backend, ctx) = test_support::context();
        let mut store = AppStore::new();
        let out = execute(&Command::Units, &ctx, &mut store, true).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["title"], "sqm");
    }
}
