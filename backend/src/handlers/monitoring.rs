//! HTTP handlers for the monitoring sweep

use axum::{extract::State, Json};
use serde::Serialize;

use super::ApiResponse;
use crate::services::monitor::{monitoring_status, MonitoringStatus, MonitoringSummary};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MonitoringStatusBody {
    pub status: MonitoringStatus,
}

/// Health distribution across farms plus the time of the last sweep
pub async fn get_monitoring_status(
    State(state): State<AppState>,
) -> Json<ApiResponse<MonitoringStatusBody>> {
    let last_check = *state.last_sweep.read().await;
    let status = {
        let ndvi = state.ndvi.read().await;
        let alerts = state.alerts.read().await;
        monitoring_status(&state.farms, &ndvi, &alerts, last_check)
    };

    ApiResponse::ok(MonitoringStatusBody { status })
}

#[derive(Debug, Serialize)]
pub struct MonitoringRunBody {
    pub message: String,
    pub results: MonitoringSummary,
}

/// Run a monitoring sweep immediately
pub async fn trigger_monitoring(
    State(state): State<AppState>,
) -> Json<ApiResponse<MonitoringRunBody>> {
    let results = state.run_monitoring_sweep().await;
    tracing::info!(
        farms_checked = results.farms_checked,
        alerts_generated = results.alerts_generated,
        alerts_resolved = results.alerts_resolved,
        "Manual monitoring sweep completed"
    );

    ApiResponse::ok(MonitoringRunBody {
        message: "Monitoring check completed".to_string(),
        results,
    })
}
