//! HTTP handlers for the alert lifecycle

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{json_or_default, ApiResponse, ClearedBody, DataBody, ListBody};
use crate::error::{AppError, AppResult};
use crate::models::{Alert, AlertFilter, AlertSeverity, AlertStats, AlertStatus};
use crate::services::alert_store::DEFAULT_FARM_ALERT_LIMIT;
use crate::services::monitor::{generate_test_alert, MonitorError};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub farm_id: Option<String>,
}

impl AlertQuery {
    fn into_filter(self) -> AppResult<AlertFilter> {
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<AlertStatus>()
                    .map_err(|e| AppError::validation("status", e))?,
            ),
            None => None,
        };
        let severity = match self.severity.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<AlertSeverity>()
                    .map_err(|e| AppError::validation("severity", e))?,
            ),
            None => None,
        };
        let farm_id = match self.farm_id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                AppError::validation("farmId", format!("Invalid farmId '{}'", raw))
            })?),
            None => None,
        };

        Ok(AlertFilter {
            status,
            severity,
            farm_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AlertListBody {
    pub count: usize,
    pub filters: AlertFilter,
    pub data: Vec<Alert>,
}

/// Alerts matching optional status, severity and farm filters, newest first
pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<AlertListBody>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let alerts = state.alerts.read().await.query(&filter);

    Ok(ApiResponse::ok(AlertListBody {
        count: alerts.len(),
        filters: filter,
        data: alerts,
    }))
}

/// Alerts still awaiting attention
pub async fn list_active_alerts(State(state): State<AppState>) -> Json<ApiResponse<ListBody<Alert>>> {
    ApiResponse::ok(state.alerts.read().await.active().into())
}

#[derive(Debug, Deserialize)]
pub struct FarmAlertQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmAlertsBody {
    pub farm_id: u32,
    pub count: usize,
    pub data: Vec<Alert>,
}

/// Most recent alerts for a single farm
pub async fn list_farm_alerts(
    State(state): State<AppState>,
    path: Result<Path<u32>, PathRejection>,
    query: Result<Query<FarmAlertQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<FarmAlertsBody>>> {
    let Path(farm_id) = path?;
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_FARM_ALERT_LIMIT);

    let alerts = state.alerts.read().await.farm_alerts(farm_id, limit);
    Ok(ApiResponse::ok(FarmAlertsBody {
        farm_id,
        count: alerts.len(),
        data: alerts,
    }))
}

#[derive(Debug, Serialize)]
pub struct AlertStatsBody {
    pub stats: AlertStats,
}

/// Alert counts by status and severity
pub async fn get_alert_stats(State(state): State<AppState>) -> Json<ApiResponse<AlertStatsBody>> {
    let stats = state.alerts.read().await.stats();
    ApiResponse::ok(AlertStatsBody { stats })
}

/// Get an alert by ID
pub async fn get_alert(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<DataBody<Alert>>>> {
    let not_found = || AppError::NotFound(format!("Alert {}", raw_id));
    let id = Uuid::parse_str(&raw_id).map_err(|_| not_found())?;

    let alert = state
        .alerts
        .read()
        .await
        .get(id)
        .cloned()
        .ok_or_else(not_found)?;
    Ok(ApiResponse::ok(DataBody { data: alert }))
}

#[derive(Debug, Serialize)]
pub struct AlertActionBody {
    pub message: String,
    pub alert: Alert,
}

fn parse_alert_id(raw_id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw_id)
        .map_err(|_| AppError::validation("id", format!("Invalid alert id '{}'", raw_id)))
}

/// Mark an active alert as acknowledged
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<AlertActionBody>>> {
    let id = parse_alert_id(&raw_id)?;
    let alert = state.alerts.write().await.acknowledge(id)?;
    tracing::info!(alert_id = %id, farm_id = alert.farm_id, "Alert acknowledged");

    Ok(ApiResponse::ok(AlertActionBody {
        message: "Alert acknowledged".to_string(),
        alert,
    }))
}

/// Resolve an active or acknowledged alert
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<AlertActionBody>>> {
    let id = parse_alert_id(&raw_id)?;
    let alert = state.alerts.write().await.resolve(id)?;
    tracing::info!(alert_id = %id, farm_id = alert.farm_id, "Alert resolved");

    Ok(ApiResponse::ok(AlertActionBody {
        message: "Alert resolved".to_string(),
        alert,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestAlertRequest {
    pub farm_id: u32,
    pub severity: String,
}

impl Default for TestAlertRequest {
    fn default() -> Self {
        Self {
            farm_id: 1,
            severity: AlertSeverity::Critical.to_string(),
        }
    }
}

/// Raise a synthetic alert to exercise the notification path
pub async fn create_test_alert(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<AlertActionBody>>> {
    let request: TestAlertRequest = json_or_default(&body)?;
    let severity: AlertSeverity = request
        .severity
        .parse()
        .map_err(|e: String| AppError::validation("severity", e))?;

    let alert = {
        let mut alerts = state.alerts.write().await;
        generate_test_alert(&state.farms, &mut alerts, request.farm_id, severity).map_err(
            |e| match e {
                MonitorError::FarmNotFound(id) => AppError::NotFound(format!("Farm with id {}", id)),
                other => AppError::Internal(other.to_string()),
            },
        )?
    };
    tracing::info!(alert_id = %alert.id, farm_id = alert.farm_id, %severity, "Test alert generated");

    Ok(ApiResponse::ok(AlertActionBody {
        message: "Test alert generated".to_string(),
        alert,
    }))
}

/// Drop every stored alert
pub async fn clear_alerts(State(state): State<AppState>) -> Json<ApiResponse<ClearedBody>> {
    let cleared = state.alerts.write().await.clear();
    tracing::info!(cleared, "Cleared alerts");

    ApiResponse::ok(ClearedBody {
        message: "All alerts cleared".to_string(),
        cleared_count: cleared,
    })
}
