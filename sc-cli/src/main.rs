//! Showcase CLI - Command-line administration for the site's data.
//!
//! Lists and edits offerings, manages the media gallery, reads contact
//! messages and manages the administrator session, all through the same
//! `DataService` the site uses.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use sc_core::config::{AppConfig, ConfigHandle};
use sc_core::error::ScResult;
use sc_core::logging;
use sc_core::platform::Platform;

/// Showcase - data administration for the portfolio site.
#[derive(Parser)]
#[command(
    name = "showcase",
    version,
    about = "Showcase site data CLI",
    long_about = "A command-line interface for the Showcase site's hosted backend.\n\
                   Manage offerings, gallery media and contact messages, and sign in as administrator."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List and manage offerings.
    Offerings {
        #[command(subcommand)]
        action: commands::offerings::OfferingsAction,
    },
    /// List, upload and delete gallery media.
    Media {
        #[command(subcommand)]
        action: commands::media::MediaAction,
    },
    /// Send and read contact messages.
    Contact {
        #[command(subcommand)]
        action: commands::contact::ContactAction,
    },
    /// Administrator session commands.
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Show or create the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> ScResult<()> {
    let cli = Cli::parse();

    // Resolve and load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_config_path()?,
    };
    let config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    // Initialize logging
    let level_override = cli.verbose.then_some("debug");
    let _guard = match config
        .effective_log_dir()
        .and_then(|dir| logging::init_logging(&config.logging, &dir, level_override))
    {
        Ok(guard) => Some(guard),
        Err(e) => {
            // No writable log directory; keep console output only.
            logging::init_console_logging(level_override.unwrap_or(&config.logging.level));
            warn!("file logging disabled: {e}");
            None
        }
    };

    info!("Showcase CLI v{}", sc_core::constants::APP_VERSION);
    debug!(
        "using config {} on {}",
        config_path.display(),
        Platform::current().name()
    );

    let config_handle = ConfigHandle::new(config);

    // Dispatch to command handlers
    match cli.command {
        Commands::Offerings { action } => {
            commands::offerings::run(config_handle, action, cli.format).await
        }
        Commands::Media { action } => {
            commands::media::run(config_handle, action, cli.format).await
        }
        Commands::Contact { action } => {
            commands::contact::run(config_handle, action, cli.format).await
        }
        Commands::Auth { action } => {
            commands::auth::run(config_handle, action, cli.format).await
        }
        Commands::Config { action } => {
            commands::config::run(config_handle, &config_path, action, cli.format).await
        }
    }
}
