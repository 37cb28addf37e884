//! Payroll engine command line.
//!
//! `serve` exposes the HTTP API over the demo store; `run` executes one
//! period and prints the outcome as JSON.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::engine::{CancelHandle, InMemoryStore, PayrollEngine, RunOptions};
use payroll_engine::models::PeriodKey;

#[derive(Parser, Debug)]
#[command(name = "payroll-engine")]
#[command(about = "Gross-to-net payroll computation", version)]
struct Cli {
    /// Directory holding the YAML configuration and roster.
    #[arg(long, env = "PAYROLL_CONFIG", default_value = "./config/demo")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "PAYROLL_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },
    /// Run payroll for one period and print the outcome.
    Run {
        /// Period as YYYY-MM.
        period: PeriodKey,
        /// Date to resolve statutory rates at; defaults to the period start.
        #[arg(long)]
        reference_date: Option<NaiveDate>,
        /// Who the run is attributed to.
        #[arg(long, default_value = payroll_engine::engine::DEFAULT_CREATED_BY)]
        created_by: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let (config, employees) = ConfigLoader::load(&cli.config)?.into_parts();

    match cli.command {
        Command::Serve { bind } => {
            let app = create_router(AppState::new(config, employees));
            let listener = tokio::net::TcpListener::bind(bind).await?;
            info!(%bind, "Payroll API listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Run {
            period,
            reference_date,
            created_by,
        } => {
            let engine = PayrollEngine::new(
                Arc::new(config),
                Arc::new(InMemoryStore::new(employees)),
            );

            let cancel = CancelHandle::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                warn!("Interrupt received, cancelling run after the current employee");
                on_interrupt.cancel();
            });

            let outcome = engine
                .run_period(
                    period,
                    RunOptions {
                        reference_date,
                        created_by,
                        cancel: Some(cancel),
                    },
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for interrupt");
        std::future::pending::<()>().await;
    }
}
