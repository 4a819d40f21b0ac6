//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::model::{PaymentStatus, TaskStatus};

/// Top-level CLI parser for `projectdesk`.
#[derive(Debug, Parser)]
#[command(name = "projectdesk", version, about = "Projects, contracts and payments from the terminal")]
pub struct Cli {
    /// Log at debug level (overridden by `PROJECTDESK_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summary of projects, contracts awaiting a signature and wallets.
    Dashboard,
    /// Projects.
    #[command(subcommand)]
    Projects(ProjectsCommand),
    /// List measurement units.
    Units,
    /// Milestones of a project.
    #[command(subcommand)]
    Milestones(MilestonesCommand),
    /// Worker assignments.
    #[command(subcommand)]
    Assignments(AssignmentsCommand),
    /// Contracts.
    #[command(subcommand)]
    Contracts(ContractsCommand),
    /// Payments.
    #[command(subcommand)]
    Payments(PaymentsCommand),
    /// Wallets of the signed-in user.
    Wallets,
    /// Project documents.
    #[command(subcommand)]
    Documents(DocumentsCommand),
    /// User directory.
    #[command(subcommand)]
    Users(UsersCommand),
    /// Show the session user.
    Whoami,
}

/// `projects` subcommands.
#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List projects.
    List,
    /// Show one project.
    Show {
        /// Project id.
        id: String,
    },
    /// Create a project owned by the session user.
    Create {
        /// Title.
        #[arg(long)]
        title: String,
        /// First day (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD).
        #[arg(long)]
        end: NaiveDate,
        /// Description.
        #[arg(long)]
        description: Option<String>,
        /// Agreed amount.
        #[arg(long)]
        amount: Option<f64>,
        /// Measurement unit id.
        #[arg(long)]
        unit: Option<String>,
    },
    /// Change fields of a project.
    Update {
        /// Project id.
        id: String,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New first day.
        #[arg(long)]
        start: Option<NaiveDate>,
        /// New last day.
        #[arg(long)]
        end: Option<NaiveDate>,
        /// New amount.
        #[arg(long)]
        amount: Option<f64>,
        /// New status (PENDING, IN_PROGRESS, REVIEW, COMPLETED).
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Delete a project.
    Delete {
        /// Project id.
        id: String,
    },
    /// Milestones and assignment intervals of a project.
    Schedule {
        /// Project id.
        id: String,
    },
    /// Payments, eligible contracts and wallets of a project.
    Finance {
        /// Project id.
        id: String,
    },
}

/// `milestones` subcommands.
#[derive(Debug, Subcommand)]
pub enum MilestonesCommand {
    /// List the milestones of a project.
    List {
        /// Project id.
        project: String,
    },
    /// Make the stored milestones match a YAML list.
    Sync {
        /// Project id.
        project: String,
        /// YAML file holding a list of milestones.
        file: PathBuf,
        /// Check every milestone against this contract's period first.
        #[arg(long)]
        contract: Option<String>,
        /// Print the planned changes without applying them.
        #[arg(long)]
        dry_run: bool,
    },
}

/// `assignments` subcommands.
#[derive(Debug, Subcommand)]
pub enum AssignmentsCommand {
    /// List assignment intervals of a task.
    List {
        /// Task id.
        task: String,
    },
    /// Assign a user to a task.
    Add {
        /// Task id.
        task: String,
        /// User id.
        user: String,
        /// First day (YYYY-MM-DD); today when omitted.
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Delete one interval by its row ids.
    Remove {
        /// Task id.
        task: String,
        /// Id of the ACTIVE row.
        active: String,
        /// Id of the REMOVED row, if the interval is closed.
        #[arg(long)]
        removed: Option<String>,
    },
}

/// Which side of a contract signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignAs {
    /// The creator.
    A,
    /// The contractor.
    B,
}

/// `contracts` subcommands.
#[derive(Debug, Subcommand)]
pub enum ContractsCommand {
    /// List contracts.
    List,
    /// Show one contract.
    Show {
        /// Contract id.
        id: String,
    },
    /// Create a contract from a YAML payload.
    Create {
        /// YAML file with the contract fields.
        file: PathBuf,
    },
    /// Apply a YAML partial update.
    Update {
        /// Contract id.
        id: String,
        /// YAML file with the fields to change.
        file: PathBuf,
    },
    /// Sign as the session user.
    Sign {
        /// Contract id.
        id: String,
        /// Party to sign as.
        #[arg(long = "as", value_enum)]
        party: SignAs,
    },
    /// Delete a contract.
    Delete {
        /// Contract id.
        id: String,
    },
    /// Upload the contract document and link it.
    Upload {
        /// Contract id.
        id: String,
        /// Local file.
        path: PathBuf,
    },
}

/// `payments` subcommands.
#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// Payments of a project.
    List {
        /// Project id.
        project: String,
    },
    /// Payments the session user sent or received.
    Mine,
    /// Create a payment from a YAML payload.
    Create {
        /// YAML file with the payment fields.
        file: PathBuf,
    },
    /// Change a payment's status.
    Status {
        /// Payment id.
        id: String,
        /// New status (pending, captured, failed).
        status: PaymentStatus,
    },
}

/// `documents` subcommands.
#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List the documents of a task.
    List {
        /// Task id.
        task: String,
    },
    /// Print a signed download URL.
    Url {
        /// Task id.
        task: String,
        /// File name.
        name: String,
    },
    /// Upload a local file.
    Upload {
        /// Task id.
        task: String,
        /// Local file.
        path: PathBuf,
        /// Stored name; defaults to the local file name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a document.
    Remove {
        /// Task id.
        task: String,
        /// File name.
        name: String,
    },
}

/// `users` subcommands.
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Search profiles by email.
    Search {
        /// Part of an email address.
        query: String,
    },
}
