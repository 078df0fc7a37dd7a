// src/main.rs
// Checklist analyzer - polls inspection acts and writes an AI compliance analysis

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use checklist_analyzer::cli::Cli;
use checklist_analyzer::config::AnalyzerConfig;
use checklist_analyzer::db::Database;
use checklist_analyzer::llm::{OpenAIClient, TextGenerator};
use checklist_analyzer::services::AnalysisService;
use checklist_analyzer::tasks::CycleRunner;

/// Cancels `token` on Ctrl+C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Stop signal received, finishing current work");
    token.cancel();
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info,sqlx=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = AnalyzerConfig::from_cli(cli, std::env::var("OPENAI_API_KEY").ok())
        .context("invalid configuration")?;

    info!("Starting checklist analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("{}", config.summary());

    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAIClient::new(config.llm.clone())?);
    let analysis = AnalysisService::new(generator, config.prompt.clone());
    let database = Database::connect_lazy(&config.connection, config.schema_sql());
    let mut runner = CycleRunner::new(
        database,
        config.tables.clone(),
        analysis,
        config.poll_interval,
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    if config.once {
        let code = match runner.run_cycle().await {
            Ok(report) => {
                info!("Single cycle complete: {}", report);
                ExitCode::SUCCESS
            }
            Err(e) if e.started_work() => {
                error!("Single cycle failed: {}", e);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Single cycle failed: {}", e);
                ExitCode::FAILURE
            }
        };
        runner.close().await;
        return Ok(code);
    }

    runner.run_forever(shutdown).await;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
