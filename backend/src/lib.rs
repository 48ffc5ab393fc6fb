//! Crop Insurance NDVI Monitor - Backend
//!
//! Simulated satellite NDVI monitoring for insured farms: synthetic time
//! series, crop health classification and an alert lifecycle served over a
//! JSON API for the officer dashboard.

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;

use models::Farm;
use services::monitor::{self, MonitoringSummary};
use services::{AlertStore, FarmRegistry, NdviGenerator, NdviStore};

/// Application state shared across handlers and background jobs.
///
/// Locks are always taken in the order generator, NDVI store, alert store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub farms: Arc<FarmRegistry>,
    pub ndvi: Arc<RwLock<NdviStore>>,
    pub alerts: Arc<RwLock<AlertStore>>,
    pub generator: Arc<Mutex<NdviGenerator>>,
    pub last_sweep: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(config: Config, farms: FarmRegistry) -> Self {
        let generator = NdviGenerator::from_seed(config.simulation.seed);
        Self {
            config: Arc::new(config),
            farms: Arc::new(farms),
            ndvi: Arc::new(RwLock::new(NdviStore::new())),
            alerts: Arc::new(RwLock::new(AlertStore::new())),
            generator: Arc::new(Mutex::new(generator)),
            last_sweep: Arc::new(RwLock::new(None)),
        }
    }

    /// Regenerate `days` of history ending `today` for each farm; returns points stored
    pub async fn simulate_farms(&self, farms: &[Farm], days: u32, today: NaiveDate) -> usize {
        let mut generator = self.generator.lock().await;
        let mut ndvi = self.ndvi.write().await;

        farms
            .iter()
            .map(|farm| ndvi.store(generator.generate_series(farm, days, today)))
            .sum()
    }

    /// Run one monitoring sweep over every farm
    pub async fn run_monitoring_sweep(&self) -> MonitoringSummary {
        let summary = {
            let ndvi = self.ndvi.read().await;
            let mut alerts = self.alerts.write().await;
            monitor::monitor_all_farms(&self.farms, &ndvi, &mut alerts)
        };

        *self.last_sweep.write().await = Some(summary.timestamp);
        summary
    }
}

/// Today's date in UTC, the reference day for generated series
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Crop Insurance NDVI Monitor API is running"
}

/// Liveness probe
async fn health_check() -> &'static str {
    "OK"
}
