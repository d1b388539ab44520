//! agentic-pm - planner and worker agents over an MCP ticket store.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentic_pm::config::{expand_path, Config};
use agentic_pm::store::{format_ticket, McpTicketStore, TicketQuery, TicketStore};
use agentic_pm::{ai, Planner, Worker, WorkerSettings};

/// Planner and worker agents coordinating through a ticket store
#[derive(Parser)]
#[command(name = "agentic-pm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Break a requirement document into tickets
    Plan {
        /// Requirement text (or a path with --file)
        document: String,

        /// Worker emails to assign tickets to, round robin
        #[arg(short, long, value_delimiter = ',')]
        workers: Vec<String>,

        /// Read the requirement from the file at DOCUMENT
        #[arg(short, long)]
        file: bool,
    },

    /// Work tickets assigned to a worker
    Work {
        /// Worker email
        email: String,

        /// Keep polling instead of exiting after one ticket
        #[arg(long = "loop")]
        continuous: bool,

        /// Directory to execute tasks in
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// List tickets in the configured team
    Tickets {
        /// Only tickets assigned to this email
        #[arg(short, long)]
        assignee: Option<String>,

        /// Only tickets in this workflow state
        #[arg(short, long)]
        state: Option<String>,
    },

    /// Show one ticket with its comments
    Show {
        /// Ticket ID or identifier (e.g. AGT-3)
        id: String,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Plan { document, workers, file } => cmd_plan(&document, &workers, file),
        Commands::Work { email, continuous, dir } => cmd_work(&email, continuous, dir.as_deref()),
        Commands::Tickets { assignee, state } => cmd_tickets(assignee, state),
        Commands::Show { id } => cmd_show(&id),
        Commands::Config { path } => cmd_config(path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

async fn connect(config: &Config) -> Result<McpTicketStore> {
    McpTicketStore::connect(&config.store.url, config.store.timeout())
        .await
        .with_context(|| format!("Failed to connect to ticket store at {}", config.store.url))
}

/// Run the planner once.
fn cmd_plan(document: &str, workers: &[String], from_file: bool) -> Result<()> {
    let config = Config::load()?;

    let document = if from_file {
        let path = expand_path(document);
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read requirement {}", path.display()))?
    } else {
        document.to_string()
    };

    let generator = ai::generator_from_config(&config.ai)?;

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let store = connect(&config).await?;
        let mut planner = Planner::new(store, generator, config.team.clone());
        let created = planner.process_requirement(&document, workers).await?;

        println!("\nCreated {} tasks", created.len());
        for ticket in &created {
            println!("  {}", format_ticket(ticket, false));
        }
        Ok(())
    })
}

/// Run a worker once or forever.
fn cmd_work(email: &str, continuous: bool, dir: Option<&str>) -> Result<()> {
    let config = Config::load()?;

    let mut settings = WorkerSettings::from_config(&config);
    if let Some(dir) = dir {
        settings.working_dir = expand_path(dir);
    }
    let working_dir: PathBuf = settings.working_dir.clone();
    if !working_dir.is_dir() {
        anyhow::bail!("Working directory {} does not exist", working_dir.display());
    }

    let executor = ai::executor_from_config(&config.ai);

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let store = connect(&config).await?;
        let mut worker = Worker::new(email, store, executor, settings);

        if continuous {
            worker.run_forever().await;
            return Ok(());
        }

        if worker.run_once().await? {
            println!("Processed 1 ticket");
        } else {
            println!("No pending tickets for {email}");
        }
        Ok(())
    })
}

/// List tickets in the configured team.
fn cmd_tickets(assignee: Option<String>, state: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let mut store = connect(&config).await?;
        let query = TicketQuery { team: Some(config.team.key.clone()), assignee, state };

        let tickets = store.list_tickets(&query).await.context("Failed to list tickets")?;
        if tickets.is_empty() {
            println!("  No tickets found.");
        } else {
            for ticket in &tickets {
                println!("{}", format_ticket(ticket, false));
            }
            println!("\nShowing {} ticket(s)", tickets.len());
        }
        Ok(())
    })
}

/// Show one ticket.
fn cmd_show(id: &str) -> Result<()> {
    let config = Config::load()?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let mut store = connect(&config).await?;
        let ticket = store.get_ticket(id).await.with_context(|| format!("Failed to get ticket {id}"))?;
        println!("{}", format_ticket(&ticket, true));
        Ok(())
    })
}

/// Show the effective configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        match Config::source_path() {
            Some(path) => println!("{}", path.display()),
            None => {
                if let Some(dir) = Config::config_dir() {
                    println!("{} (not found, using defaults)", dir.join("config.toml").display());
                }
            }
        }
        return Ok(());
    }

    let config = Config::load()?;
    println!("{}", config.to_toml()?);

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "agentic-pm", &mut io::stdout());
}
