mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gameplan_core::sync::Strategy;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gameplan")]
#[command(about = "Mirror a club's basketball schedule into Google Calendar")]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a Google account
    Auth,
    /// Ingest, create calendars, reconcile and send the summary
    Run {
        /// Override the configured strategy
        #[arg(short, long)]
        strategy: Option<Strategy>,
    },
    /// Fetch the schedule and store its games
    Ingest,
    /// Create missing calendars and share them
    Bootstrap,
    /// Reconcile stored games with their calendar events
    Check {
        #[arg(short, long)]
        strategy: Option<Strategy>,
    },
    /// List stored games
    Games,
    /// List registered calendars
    Calendars,
    /// Manage calendars on the Google account
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    /// List every calendar of the account
    List,
    /// Delete every non-primary calendar of the account
    DeleteAll {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Auth => commands::auth::run().await,
        Commands::Run { strategy } => commands::run::run(strategy).await,
        Commands::Ingest => commands::ingest::run().await,
        Commands::Bootstrap => commands::bootstrap::run().await,
        Commands::Check { strategy } => commands::check::run(strategy).await,
        Commands::Games => commands::games::run(),
        Commands::Calendars => commands::calendars::run(),
        Commands::Remote { command } => match command {
            RemoteCommands::List => commands::remote::list().await,
            RemoteCommands::DeleteAll { yes } => commands::remote::delete_all(yes).await,
        },
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
