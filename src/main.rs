//! Binary entry point for suggestd.
//!
//! This binary provides the CLI interface for the suggestion server.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr/print_stdout in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use suggestd::config::SuggestConfig;
use suggestd::observability::{self, ObservabilityConfig};
use suggestd::server;
use suggestd::service::{ReloadScheduler, SuggestionService};

/// Suggestd - a hot-reloading typeahead suggestion server.
#[derive(Parser)]
#[command(name = "suggestd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the suggestion server.
    Serve {
        /// Listen address, `host:port`.
        #[arg(short, long, env = "SUGGESTD_LISTEN")]
        listen: Option<SocketAddr>,

        /// Dataset file path (overrides config).
        #[arg(long, env = "SUGGESTD_SOURCE_PATH", conflicts_with = "source_url")]
        source_path: Option<PathBuf>,

        /// Dataset URL (overrides config).
        #[arg(long, env = "SUGGESTD_SOURCE_URL")]
        source_url: Option<String>,
    },

    /// Load the dataset once and print suggestions for an input.
    Query {
        /// The query input.
        input: String,

        /// Maximum number of suggestions.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Dataset file path (overrides config).
        #[arg(long, conflicts_with = "source_url")]
        source_path: Option<PathBuf>,

        /// Dataset URL (overrides config).
        #[arg(long)]
        source_url: Option<String>,
    },

    /// Manage configuration.
    Config {
        /// Show the effective configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let expose_metrics = matches!(cli.command, Commands::Serve { .. });
    let observability_config = ObservabilityConfig {
        json: config.log_json,
        verbose: cli.verbose,
        metrics_listen: if expose_metrics {
            observability::metrics_listen_from_env()
        } else {
            None
        },
    };
    if let Err(e) = observability::init(&observability_config) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: SuggestConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            listen,
            source_path,
            source_url,
        } => {
            let config = apply_overrides(config, listen, source_path, source_url);
            cmd_serve(config).await
        }

        Commands::Query {
            input,
            limit,
            source_path,
            source_url,
        } => {
            let config = apply_overrides(config, None, source_path, source_url);
            cmd_query(config, &input, limit).await
        }

        Commands::Config { show } => cmd_config(&config, show),
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> anyhow::Result<SuggestConfig> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return SuggestConfig::load_from_file(std::path::Path::new(config_path))
            .with_context(|| format!("loading config from {config_path}"));
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("SUGGESTD_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return SuggestConfig::load_from_file(std::path::Path::new(&config_path))
                .with_context(|| format!("loading config from {config_path}"));
        }
    }

    // Otherwise, load from default location
    Ok(SuggestConfig::load_default())
}

/// Applies CLI overrides on top of the loaded configuration.
fn apply_overrides(
    mut config: SuggestConfig,
    listen: Option<SocketAddr>,
    source_path: Option<PathBuf>,
    source_url: Option<String>,
) -> SuggestConfig {
    if let Some(listen) = listen {
        config = config.with_listen(listen);
    }
    if let Some(path) = source_path {
        config = config.with_source_path(path);
    }
    if let Some(url) = source_url {
        config = config.with_source_url(url);
    }
    config
}

/// Runs the reload scheduler and the HTTP server until interrupted.
async fn cmd_serve(config: SuggestConfig) -> anyhow::Result<()> {
    config.validate()?;

    let service = Arc::new(SuggestionService::new(config.max_results));
    let source = config.source.build_source();
    let scheduler = Arc::new(ReloadScheduler::new(
        source,
        Arc::clone(&service),
        config.reload_config(),
    ));

    // First cycle runs immediately inside the loop, so the first successful
    // load publishes before or shortly after traffic arrives.
    let reload_task = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run().await })
    };

    let result = server::serve(config.listen, service).await;
    reload_task.abort();
    result.context("running suggestion server")
}

/// Loads the dataset once, queries it, and prints the result.
async fn cmd_query(config: SuggestConfig, input: &str, limit: Option<usize>) -> anyhow::Result<()> {
    config.validate()?;

    let max_results = limit.unwrap_or(config.max_results);
    let service = Arc::new(SuggestionService::new(max_results));
    let scheduler = ReloadScheduler::new(
        config.source.build_source(),
        Arc::clone(&service),
        config.reload_config(),
    );
    scheduler.run_cycle().await.context("loading dataset")?;

    let hits = service.suggest(input);
    if hits.is_empty() {
        println!("No suggestions");
    } else {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    }
    Ok(())
}

/// Shows the effective configuration.
fn cmd_config(config: &SuggestConfig, show: bool) -> anyhow::Result<()> {
    if show {
        println!("{config:#?}");
    } else {
        println!("Use --show to print the effective configuration");
    }
    Ok(())
}
