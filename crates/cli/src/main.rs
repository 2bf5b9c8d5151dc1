//! luxroute CLI: the main entry point.
//!
//! Commands:
//! - `ask`: Route a single query
//! - `chat`: Interactive session with conversation context
//! - `import`: Load a JSON catalog export into the SQLite catalog
//! - `doctor`: Diagnose configuration, catalog and provider
//! - `config`: Print, show, locate or validate configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "luxroute",
    about = "luxroute — lighting catalog query router",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a single query and print the answer
    Ask {
        /// The query text
        text: String,

        /// A prior user turn, oldest first (repeatable)
        #[arg(short, long = "context")]
        context: Vec<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session; the last three turns are kept as context
    Chat,

    /// Import a JSON catalog export
    Import {
        /// Path to a JSON array of catalog items
        file: std::path::PathBuf,
    },

    /// Diagnose system health
    Doctor,

    /// Configuration management (prints the default TOML without a subcommand)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Validate the config file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask {
            text,
            context,
            json,
        } => commands::ask::run(&text, context, json).await?,
        Commands::Chat => commands::chat::run().await?,
        Commands::Import { file } => commands::import::run(&file).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { action } => match action {
            None => commands::config_cmd::print_default().await?,
            Some(ConfigAction::Show) => commands::config_cmd::show().await?,
            Some(ConfigAction::Path) => commands::config_cmd::path().await?,
            Some(ConfigAction::Validate) => commands::config_cmd::validate().await?,
        },
    }

    Ok(())
}
