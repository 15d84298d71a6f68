use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use modelgen_catalog::{ConnectionParams, PostgresConnector};
use modelgen_container::DockerEngine;
use modelgen_core::PipelineConfig;
use modelgen_engine::{CancellationToken, Pipeline};

/// modelgen - generate tsooq table models from a disposable PostgreSQL database
#[derive(Parser)]
#[command(name = "modelgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: $CONFIG, then ./.tsooq.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Validate the config and print it as JSON without running anything
    #[arg(long)]
    check_config: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(explicit: Option<&std::path::Path>, verbose: bool) -> Result<PipelineConfig> {
    let path = PipelineConfig::locate(explicit);
    if verbose {
        eprintln!("{} {}", "Loading config from:".cyan(), path.display());
    }

    let config = PipelineConfig::from_file(&path)
        .with_context(|| format!("Cannot load config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    if cli.check_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        eprintln!("{}", "✓ Config OK".green());
        return Ok(());
    }

    let engine = DockerEngine::connect()?;
    let connector = PostgresConnector::new(ConnectionParams::for_container(&config.database));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupted, tearing down (press Ctrl-C again to exit immediately)");
        trigger.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "✗ Aborted; the container may still be running".red().bold());
            std::process::exit(130);
        }
    });

    match Pipeline::new(&config, &engine, &connector)
        .with_cancellation(cancel)
        .run()
        .await
    {
        Ok(report) => {
            eprintln!(
                "{} {} ({} tables)",
                "✓ Generated".green().bold(),
                report.output_file.display(),
                report.tables.len()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗ Generation failed:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
