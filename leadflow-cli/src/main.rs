//! Leadflow CLI
//!
//! Host for the orchestration engine: starts pipelines and single-step runs
//! for an owner, renders their progress live, and resolves the phase a user
//! should resume into.

mod backend;
mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "leadflow")]
#[command(about = "Leadflow pipeline orchestration CLI", long_about = None)]
struct Cli {
    /// Job Store base URL
    #[arg(
        long,
        env = "LEADFLOW_STORE_URL",
        default_value = "http://localhost:54321"
    )]
    store_url: String,

    /// Job Executor endpoint
    #[arg(
        long,
        env = "LEADFLOW_EXECUTOR_URL",
        default_value = "http://localhost:54321/functions/run-job"
    )]
    executor_url: String,

    /// Bearer token for the store and the executor
    #[arg(long, env = "LEADFLOW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the poll interval (seconds)
    #[arg(long, env = "LEADFLOW_POLL_INTERVAL")]
    poll_interval: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadflow_cli=info,leadflow_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        store_url: cli.store_url,
        executor_url: cli.executor_url,
        api_key: cli.api_key,
        poll_interval: cli.poll_interval.map(std::time::Duration::from_secs),
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
