use clap::{Parser, Subcommand};
use std::path::PathBuf;

use foodtracker_core::MealCollection;

mod commands;
mod config;
mod rating;

use commands::{ConfigCommand, MealCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "foodtracker")]
#[command(version)]
#[command(about = "Keep a rated list of meals", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, edit, rate and delete meals
    Meal(MealCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for config init
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    tracing::debug!(
        "Using data dir {} ({})",
        config.data_dir.value.display(),
        config.data_dir.source
    );

    match &cli.command {
        Some(Commands::Meal(cmd)) => {
            let mut collection = MealCollection::load(config.archive());
            cmd.run(&mut collection, &config)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli_config_path)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
