//! igwatch daemon CLI.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use igwatch::{Config, CycleOutcome, SessionStore, Watcher};
use instagram::{ContentSource, HttpSource};
use notify::Notifier;

/// Distinguished exit code signaling session invalidation to the
/// process supervisor, which restarts us into a fresh login.
const EXIT_SESSION_INVALIDATED: i32 = 10;

/// Instagram story/feed watcher.
#[derive(Parser)]
#[command(name = "igwatch")]
#[command(about = "Poll Instagram accounts and forward new stories/posts to a webhook")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the poll loop (the default)
    Run,

    /// Perform a fresh credential login and write the session file,
    /// without starting the poll loop
    Login,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("igwatch=debug,instagram=debug,notify=debug,info")
    } else {
        EnvFilter::new("igwatch=info,instagram=info,notify=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_watch().await,
        Commands::Login => run_login().await,
    }
}

/// Bootstrap and run the watcher until the session is invalidated.
async fn run_watch() -> Result<()> {
    let config = Config::from_env()?;
    let source = Arc::new(HttpSource::new(&config.username)?);
    let notifier = Notifier::from_env();

    let mut watcher = Watcher::bootstrap(config, source, notifier).await?;

    match watcher.run().await {
        CycleOutcome::SessionInvalidated => {
            tracing::error!(
                exit_code = EXIT_SESSION_INVALIDATED,
                "Session invalidated, exiting for supervised restart"
            );
            // The single intentional process exit: forced restart is
            // the session-recovery mechanism.
            std::process::exit(EXIT_SESSION_INVALIDATED);
        }
        CycleOutcome::Completed => Ok(()),
    }
}

/// Log in with the configured credentials and persist the session.
async fn run_login() -> Result<()> {
    let config = Config::from_env()?;
    let source = HttpSource::new(&config.username)?;

    tracing::info!(username = %config.username, "Logging in");
    source.login(&config.username, &config.password).await?;

    let blob = source.export_session().await?;
    let store = SessionStore::new(&config.session_file);
    store.save(&blob);

    println!("Session saved to {}", config.session_file.display());
    Ok(())
}
