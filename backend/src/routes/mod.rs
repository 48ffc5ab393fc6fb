//! Route definitions for the Crop Insurance NDVI Monitor

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::api_health_check))
        .nest("/farms", farm_routes())
        .nest("/divisions", division_routes())
        .nest("/ndvi", ndvi_routes())
        .nest("/alerts", alert_routes())
        .nest("/monitoring", monitoring_routes())
}

/// Farm lookup and per-farm NDVI routes
fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms))
        .route("/by-division", get(handlers::list_farms_by_division))
        .route("/location/:location", get(handlers::get_farms_by_location))
        .route("/crop/:crop", get(handlers::get_farms_by_crop))
        .route("/:farm_id", get(handlers::get_farm))
        .route("/:farm_id/ndvi", get(handlers::get_farm_ndvi))
        .route("/:farm_id/ndvi/latest", get(handlers::get_latest_ndvi))
}

/// Administrative division routes
fn division_routes() -> Router<AppState> {
    Router::new()
        .route("/districts", get(handlers::list_districts))
        .route("/tehsils", get(handlers::list_tehsils))
        .route("/villages", get(handlers::list_villages))
        .route("/stats", get(handlers::get_division_stats))
}

/// NDVI simulation routes
fn ndvi_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(handlers::get_all_ndvi))
        .route("/simulate", post(handlers::simulate_ndvi))
        .route("/disaster", post(handlers::inject_disaster))
        .route("/stats", get(handlers::get_ndvi_stats))
        .route("/clear", delete(handlers::clear_ndvi))
}

/// Alert lifecycle routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/active", get(handlers::list_active_alerts))
        .route("/stats", get(handlers::get_alert_stats))
        .route("/test", post(handlers::create_test_alert))
        .route("/clear", delete(handlers::clear_alerts))
        .route("/farm/:farm_id", get(handlers::list_farm_alerts))
        .route("/:alert_id", get(handlers::get_alert))
        .route("/:alert_id/acknowledge", put(handlers::acknowledge_alert))
        .route("/:alert_id/resolve", put(handlers::resolve_alert))
}

/// Monitoring sweep routes
fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::get_monitoring_status))
        .route("/trigger", post(handlers::trigger_monitoring))
}
