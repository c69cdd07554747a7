//! Perso CLI - identity-document requests and backend calls.
//!
//! Usage: perso [--base-dir <dir>] [--settings <file>] <command>

mod app;
mod commands;
mod notify;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use app::{App, StartupOptions};
use output::OutputFormat;

/// Perso - Manage identity-document requests and call the backend.
#[derive(Parser)]
#[command(name = "perso")]
#[command(about = "Identity-document requests, reviews and encrypted backend calls")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base directory for settings and data files
    #[arg(long, env = "PERSO_HOME", global = true)]
    base_dir: Option<PathBuf>,

    /// Settings file (INI)
    #[arg(long, env = "PERSO_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a backend function through the encrypted channel
    Call {
        /// Backend module
        module: String,
        /// Function within the module
        function: String,
        /// Arguments as JSON values; bare words are sent as strings
        args: Vec<String>,
    },

    /// Manage stored requests
    Records {
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Approve or deny a request
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },

    /// Manage submission cooldowns
    Locks {
        #[command(subcommand)]
        command: LockCommands,
    },

    /// Send a bug report
    Report {
        /// Reporting user
        #[arg(long)]
        user: String,
        /// What went wrong
        message: String,
    },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Submit a new request
    Submit {
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Full name
        #[arg(long)]
        name: String,
        /// Date of birth
        #[arg(long)]
        birth_date: String,
        /// Place of birth / nationality
        #[arg(long)]
        birth_place: String,
        /// Height
        #[arg(long)]
        height: String,
        /// Gender
        #[arg(long)]
        gender: String,
        /// Request a forged document
        #[arg(long)]
        forged: bool,
    },
    /// List an owner's requests
    List {
        /// Owner id
        #[arg(long)]
        owner: String,
    },
    /// Show a request
    Show {
        /// Request uuid
        id: String,
    },
    /// Delete a request
    Delete {
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Request uuid
        id: String,
    },
    /// Count an owner's requests
    Count {
        /// Owner id
        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Approve a request
    Approve {
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Request uuid
        id: String,
        /// Reviewer id, for the review log
        #[arg(long)]
        reviewer: Option<String>,
    },
    /// Deny and remove a request
    Deny {
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Request uuid
        id: String,
        /// Reviewer id, for the review log
        #[arg(long)]
        reviewer: Option<String>,
        /// Why the request was denied
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand)]
enum LockCommands {
    /// Block an owner from submitting
    Set {
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Lock duration in days
        #[arg(long)]
        days: u64,
    },
    /// Lift a lock
    Clear {
        /// Owner id
        #[arg(long)]
        owner: String,
    },
}

async fn run(app: &App, command: Commands, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Call {
            module,
            function,
            args,
        } => commands::call(app, &module, &function, &args, format).await,
        Commands::Records { command } => match command {
            RecordCommands::Submit {
                owner,
                name,
                birth_date,
                birth_place,
                height,
                gender,
                forged,
            } => {
                let args = commands::SubmitArgs {
                    name,
                    birth_date,
                    birth_place,
                    height,
                    gender,
                    forged,
                };
                commands::records_submit(app, &owner, &args, format)
                    .await
                    .map(|_| ())
            }
            RecordCommands::List { owner } => commands::records_list(app, &owner, format),
            RecordCommands::Show { id } => commands::records_show(app, &id, format),
            RecordCommands::Delete { owner, id } => {
                commands::records_delete(app, &owner, &id, format)
            }
            RecordCommands::Count { owner } => {
                commands::records_count(app, &owner, format).map(|_| ())
            }
        },
        Commands::Review { command } => match command {
            ReviewCommands::Approve {
                owner,
                id,
                reviewer,
            } => commands::review_approve(app, &owner, &id, reviewer.as_deref(), format).await,
            ReviewCommands::Deny {
                owner,
                id,
                reviewer,
                reason,
            } => {
                commands::review_deny(app, &owner, &id, reviewer.as_deref(), &reason, format)
                    .await
            }
        },
        Commands::Locks { command } => match command {
            LockCommands::Set { owner, days } => commands::locks_set(app, &owner, days, format),
            LockCommands::Clear { owner } => commands::locks_clear(app, &owner, format),
        },
        Commands::Report { user, message } => {
            commands::report(app, &user, &message, format).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let options = StartupOptions {
        base_dir: cli.base_dir,
        settings_file: cli.settings,
        log_level: cli.log_level,
    };

    let app = match App::build(&options) {
        Ok(app) => app,
        Err(e) => {
            output::print_error(&format!("startup failed: {:#}", e), cli.format);
            std::process::exit(1);
        }
    };
    debug!("Dispatching command");

    if let Err(e) = run(&app, cli.command, cli.format).await {
        output::print_error(&format!("{:#}", e), cli.format);
        std::process::exit(1);
    }
}
