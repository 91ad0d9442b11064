//! tabstore - CLI entry point
//!
//! Replays scripted tab commands against an in-memory host and prints the
//! resulting store snapshot, and manages the configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tabstore::config::{default, xdg, ConfigLoader};
use tabstore::replay::Replayer;
use tabstore::TabStore;

/// Tab/window state store driver
#[derive(Parser)]
#[command(name = "tabstore")]
#[command(version, about = "Tab/window state store driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the tabstore CLI
#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON Lines script and print the final store as JSON
    Replay {
        /// Script file, one step per line
        script: PathBuf,
        /// Window label to drive (overrides the configured window)
        #[arg(long)]
        window: Option<String>,
        /// Configuration file (defaults to the XDG location)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            script,
            window,
            config,
        } => run_replay_command(script, window, config).await,
        Commands::Config { action } => run_config_command(action),
    }
}

async fn run_replay_command(
    script: PathBuf,
    window: Option<String>,
    config_path: Option<PathBuf>,
) -> ExitCode {
    let config = match ConfigLoader::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tabstore::logging::init(config.logging.level);

    let window = window.unwrap_or(config.tabs.window);
    let store = TabStore::with_capacity(config.store.channel_capacity);

    let mut replayer = match Replayer::new(store.clone(), window, config.tabs.default_url).await {
        Ok(replayer) => replayer,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = replayer.run_file(&script).await {
        eprintln!("Replay error: {}", error_chain(&e));
        return ExitCode::FAILURE;
    }

    match serde_json::to_string_pretty(&store.snapshot().await) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to serialize snapshot: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_config_command(action: ConfigAction) -> ExitCode {
    let result = match action {
        ConfigAction::Init { force } => {
            default::create_default_config(&xdg::config_path(), force).map(|path| {
                println!("Created configuration at {}", path.display());
            })
        }
        ConfigAction::Path => {
            println!("{}", xdg::config_path().display());
            Ok(())
        }
        ConfigAction::Show => ConfigLoader::load_default()
            .and_then(|config| config.to_toml())
            .map(|rendered| print!("{rendered}")),
    };
    if let Err(e) = result {
        eprintln!("Config error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Renders an error and its sources as `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
