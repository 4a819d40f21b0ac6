//! Core library entry for the `projectdesk` CLI.
//!
//! A client for a project-management backend hosted on a
//! backend-as-a-service: projects and their milestones, worker assignment
//! intervals, contracts, payments and project documents. All persistence and
//! authorization live in the hosted service; this crate issues typed queries
//! through [`ports`] and caches results in an explicit [`store::AppStore`].

pub mod adapters;
pub mod api;
pub mod camelize;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod intervals;
pub mod milestones;
pub mod model;
pub mod money;
pub mod ports;
pub mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    init_tracing(cli.verbose);
    commands::dispatch(&cli)
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PROJECTDESK_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    // Fails only when a subscriber is already installed, e.g. on a second run in one process.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["projectdesk", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_arguments() {
        let result = run(["projectdesk", "projects", "show"]);
        assert!(result.is_err());
    }
}
