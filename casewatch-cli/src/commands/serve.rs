//! HTTP server command
//!
//! Starts the API even when the database is down; requests are then served
//! from the fallback dataset until the database comes back.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use casewatch_core::CasewatchConfig;
use casewatch_server::build_repository;
use casewatch_server::db::{create_pool, migrations, seed};
use casewatch_server::http::{run_server, ServerConfig};

use super::{load_config, SourceArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', env = "CASEWATCH_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Create the case tables before serving
    #[arg(long)]
    pub migrate: bool,

    /// Load the fallback dataset into an empty database (implies --migrate)
    #[arg(long)]
    pub seed_demo: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args.source)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    config.server.cors_permissive |= args.cors_permissive;

    if args.migrate || args.seed_demo {
        if let Err(error) = prepare_database(&config, args.seed_demo).await {
            tracing::warn!("Database preparation failed, continuing: {:#}", error);
        }
    }

    let repository = build_repository(&config).context("Failed to build case repository")?;
    if repository.has_primary() && !repository.is_available().await {
        tracing::warn!("Database unreachable at startup, serving fallback dataset until it returns");
    }

    tracing::info!("Starting casewatch server on {}", config.server.bind);

    // Run server (blocks until shutdown)
    run_server(repository, ServerConfig::from(&config.server))
        .await
        .context("Server error")?;

    Ok(())
}

async fn prepare_database(config: &CasewatchConfig, seed_demo: bool) -> Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or the config file")?;

    let pool = create_pool(url, &config.database)
        .await
        .context("Failed to connect to database")?;
    migrations::run(&pool).await.context("Failed to run migrations")?;

    if seed_demo {
        let dataset = config.fallback_dataset()?;
        let inserted = seed::seed(&pool, &dataset)
            .await
            .context("Failed to seed demo cases")?;
        tracing::info!(inserted, "Demo seed finished");
    }

    pool.close().await;
    Ok(())
}
