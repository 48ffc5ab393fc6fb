//! Crop Insurance NDVI Monitor - Backend Server

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use cim_backend::{
    config::{Config, LogFormat},
    create_app,
    error::AppError,
    jobs::{JobScheduler, NdviMonitoringJob},
    services::FarmRegistry,
    today, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long background jobs get to finish after shutdown is signalled
const JOB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;

    init_tracing(config.logging.format);

    tracing::info!("Starting Crop Insurance NDVI Monitor");
    tracing::info!("Environment: {}", config.environment);

    let farms = FarmRegistry::load(config.farms.data_file.as_deref())
        .map_err(|e| AppError::Configuration(e.to_string()))?;

    let state = AppState::new(config.clone(), farms);

    if config.simulation.seed_on_startup {
        let farms = state.farms.all().to_vec();
        let generated = state
            .simulate_farms(&farms, config.simulation.default_days, today())
            .await;
        tracing::info!(
            farms = farms.len(),
            points = generated,
            days = config.simulation.default_days,
            "Seeded NDVI history"
        );
    }

    // Background jobs
    let mut scheduler = JobScheduler::new();
    if config.monitoring.enabled {
        scheduler.register(NdviMonitoringJob::new(state.clone()));
        tracing::info!(
            interval_secs = config.monitoring.interval().as_secs(),
            jobs = scheduler.job_count(),
            "NDVI monitoring scheduled"
        );
    } else {
        tracing::info!("NDVI monitoring disabled");
    }
    scheduler.start();

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .context("invalid server host")?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(JOB_SHUTDOWN_TIMEOUT).await;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cim_server=debug,cim_backend=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
