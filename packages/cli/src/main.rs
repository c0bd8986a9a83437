#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the ledger dashboard.
//!
//! Stands in for the rendering layer: it reads the dashboard's state
//! containers and feeds user input back into them, but never writes
//! selection state itself. Runs on a single-threaded runtime.

mod interactive;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lone_star_ledger_client::http::HttpDataService;
use lone_star_ledger_client::memory::InMemoryDataService;
use lone_star_ledger_client::{ClientError, DataService, ServiceConfig};
use lone_star_ledger_dashboard::Dashboard;
use lone_star_ledger_models::EntityRef;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "lone_star_ledger", about = "Explore district finances and campus outcomes")]
struct Cli {
    /// Data service base URL (overrides `LEDGER_BACKEND_URL`)
    #[arg(long)]
    backend_url: Option<String>,
    /// Answer queries from a local JSON dataset instead of the data service
    #[arg(long, conflicts_with = "backend_url")]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse interactively (default)
    Explore,
    /// Print the statewide summary
    Summary,
    /// Search districts by name
    Search {
        /// Name query (may be empty)
        #[arg(default_value = "")]
        query: String,
        /// Minimum per-pupil spending
        #[arg(long)]
        min_spend: Option<String>,
        /// Maximum total debt
        #[arg(long)]
        max_debt: Option<String>,
    },
    /// Show the detail drawer for one district or campus
    Show {
        /// Entity id (e.g., "048")
        id: String,
    },
    /// Check that the data service is reachable
    Health,
}

/// Errors that end the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The data service client could not be set up.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A prompt failed (e.g., no terminal attached).
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

fn build_service(cli: &Cli) -> Result<Arc<dyn DataService>, ClientError> {
    if let Some(path) = &cli.dataset {
        return Ok(Arc::new(InMemoryDataService::from_path(path)?));
    }

    let mut config = ServiceConfig::from_env();
    if let Some(url) = &cli.backend_url {
        config = config.with_base_url(url);
    }
    log::info!("Using data service at {}", config.base_url());
    Ok(Arc::new(HttpDataService::new(config)?))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let service = build_service(&cli)?;

    match cli.command.unwrap_or(Commands::Explore) {
        Commands::Explore => {
            let dashboard = Dashboard::start(service).await;
            interactive::run(dashboard).await?;
        }
        Commands::Summary => {
            let dashboard = Dashboard::start(service).await;
            render::summary(dashboard.summary());
            render::layers(dashboard.geo());
        }
        Commands::Search {
            query,
            min_spend,
            max_debt,
        } => {
            let mut dashboard = Dashboard::start(service).await;
            if let Some(raw) = min_spend {
                if let Err(e) = dashboard.filters_mut().set_min_spend(&raw) {
                    log::warn!("Ignoring --min-spend: {e}");
                }
            }
            if let Some(raw) = max_debt {
                if let Err(e) = dashboard.filters_mut().set_max_debt(&raw) {
                    log::warn!("Ignoring --max-debt: {e}");
                }
            }
            let results = dashboard.search(&query).await;
            render::options(results);
        }
        Commands::Show { id } => {
            let mut dashboard = Dashboard::start(service).await;
            dashboard.select(EntityRef::new(id.as_str(), id.as_str()));
            dashboard.selection_mut().settle().await;
            render::selection(&dashboard);
        }
        Commands::Health => match service.health().await {
            Ok(status) if status.is_healthy() => println!("Data service is healthy"),
            Ok(status) => println!("Data service reports status {:?}", status.status),
            Err(e) => println!("Data service unreachable: {e}"),
        },
    }

    Ok(())
}
