//! Command-line interface for Flashgen

use clap::Parser;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod errors;
mod output;
mod runtime;

use cli::*;
use config::FlashctlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over -v
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let log_level = match args.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let config = match FlashctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);
    if let Err(e) = config.generator.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    info!("Starting flashctl with provider: {}", config.generator.provider);

    // Execute command
    let result = match args.command {
        Commands::Generate(generate_args) => {
            commands::generate::handle_generate_command(generate_args, &config).await
        }
        Commands::Schema => commands::schema::handle_schema_command(&config),
        Commands::Hash { input } => commands::hash::handle_hash_command(input, &config),
        Commands::Config => commands::config::handle_config_command(&config),
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
