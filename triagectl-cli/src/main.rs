//! triagectl - clinic triage queue
//!
//! Patients are admitted with a severity from 1 to 5 and called in order of
//! severity (highest first), then arrival. Every record is kept in a local
//! SQLite database, so served patients remain searchable as visit history.
//!
//! Running `triagectl` without a subcommand opens the interactive queue view.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use triagectl_core::{PatientStore, Queue};

mod commands;
mod tracing_setup;
mod tui;

use tracing_setup::{LogSink, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "triagectl",
    author,
    version,
    about = "Severity-ordered patient queue with searchable visit history",
    long_about = "Admit patients with a severity from 1 to 5 and call them highest severity \
                  first. Served patients stay in the local database as visit history."
)]
struct Cli {
    /// Database file (overrides config and TRIAGECTL_DB)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive queue view (default)
    Tui,
    /// Admit a new patient to the queue
    Add(commands::patients::AddArgs),
    /// List waiting patients in call order
    Queue(commands::patients::QueueArgs),
    /// Call (and serve) the patient at the head of the queue
    Next,
    /// Mark a waiting patient as served
    Serve(commands::patients::ServeArgs),
    /// Mark every waiting patient as served
    Clear,
    /// Show visit history, newest first
    History(commands::patients::HistoryArgs),
    /// Search all records by name
    Search(commands::patients::SearchArgs),
    /// Manage triagectl configuration (init, show, path)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Tui);

    // Commands that never touch the database run before the config file is
    // parsed, so a broken config can still be located and rewritten
    let command = match command {
        Commands::Config(args) => {
            init_tracing(cli.debug, LogSink::Stderr);
            return commands::run_config(args, cli.db.as_deref());
        }
        Commands::Completions(args) => return run_completions(args),
        other => other,
    };

    let config = commands::config::load_config(cli.db.as_deref())?;

    let sink = match command {
        Commands::Tui => LogSink::File(config.logging.file.clone()),
        _ => LogSink::Stderr,
    };
    init_tracing(cli.debug, sink);

    debug!(db = %config.storage.db_path.display(), "opening patient store");
    let store = PatientStore::open(&config.storage.db_path).with_context(|| {
        format!(
            "Cannot open patient database at {}",
            config.storage.db_path.display()
        )
    })?;
    let mut queue = Queue::new(store, config.queue.minutes_per_patient);

    match command {
        Commands::Tui => tui::run(&mut queue, config.history_limit())?,
        Commands::Add(args) => commands::run_add(&mut queue, args)?,
        Commands::Queue(args) => commands::run_queue(&mut queue, args)?,
        Commands::Next => commands::run_next(&mut queue)?,
        Commands::Serve(args) => commands::run_serve(&mut queue, args)?,
        Commands::Clear => commands::run_clear(&mut queue)?,
        Commands::History(args) => commands::run_history(&mut queue, args, config.history_limit())?,
        Commands::Search(args) => commands::run_search(&mut queue, args)?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }
    Ok(())
}

fn init_tracing(debug: bool, sink: LogSink) {
    if let Err(err) = tracing_setup::init(&TracingConfig { debug, sink }) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
