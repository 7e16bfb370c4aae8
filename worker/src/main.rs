//! Tidywave Worker - Scheduling and routing service for a cleaning business
//!
//! This worker connects to NATS and handles messages from the frontend:
//! client and job CRUD, recurring schedule reconciliation, day packing and
//! route summaries.

mod cli;
mod config;
mod db;
mod defaults;
mod handlers;
mod services;
mod storage;
mod types;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::PgPool;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::defaults::DEFAULT_HORIZON_WEEKS;
use crate::storage::{PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tidywave_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())  // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    let cli = Cli::parse();

    info!("Starting Tidywave Worker...");

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to PostgreSQL");

    // Run migrations
    db::run_migrations(&pool).await?;
    info!("Database migrations complete");

    match cli.command {
        Some(Command::Migrate) => {
            info!("Migrations applied, exiting");
            return Ok(());
        }
        Some(Command::SeedDemo { count }) => {
            seed_demo_clients(pool, count).await?;
            return Ok(());
        }
        Some(Command::Serve) | None => {}
    }

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    let handler_result = handlers::start_handlers(nats_client, pool, &config).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Seed `count` demo clients with their recurring schedules generated.
async fn seed_demo_clients(pool: PgPool, count: u32) -> Result<()> {
    let store = PgStore::new(pool);
    let settings = store.get_settings().await?;
    let today = Utc::now().date_naive();
    let mut rng = StdRng::from_entropy();
    let mut jobs_created = 0;

    for _ in 0..count {
        let candidate = services::demo::random_demo_client(&mut rng);
        let created = store.create_client(&candidate).await?;
        match services::reconciler::reconcile_client(
            &store,
            &created,
            &settings,
            today,
            DEFAULT_HORIZON_WEEKS,
        )
        .await
        {
            Ok(outcome) => {
                jobs_created += outcome.created;
                info!("Seeded {} in {}", created.name, created.suburb.as_deref().unwrap_or("?"));
            }
            Err(e) => {
                warn!("Seeded {} but schedule generation failed: {}", created.name, e);
            }
        }
    }

    info!("Seeded {} demo clients with {} jobs", count, jobs_created);
    Ok(())
}
