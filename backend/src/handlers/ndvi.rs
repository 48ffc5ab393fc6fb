//! HTTP handlers for NDVI time series endpoints

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::{json_or_default, ApiResponse, ClearedBody};
use crate::config::MAX_SIMULATION_DAYS;
use crate::error::{AppError, AppResult};
use crate::models::{
    assess_ndvi_health, validate_disaster_event, validate_disaster_severity, DisasterEvent,
    DisasterType, Farm, HealthAssessment, NdviPoint, NdviStats,
};
use crate::{today, AppState};

/// Days of history returned when none is requested
const DEFAULT_HISTORY_DAYS: u32 = 60;

/// Widest history window a client may request
pub const MAX_HISTORY_DAYS: u32 = 3650;

fn find_farm(state: &AppState, farm_id: u32) -> AppResult<Farm> {
    state
        .farms
        .get(farm_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Farm with id {}", farm_id)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NdviHistoryBody {
    pub farm_id: u32,
    pub farmer_name: String,
    pub crop: String,
    #[serde(rename = "baselineNDVI")]
    pub baseline_ndvi: f64,
    pub data_points: usize,
    pub history: Vec<NdviPoint>,
}

/// NDVI history for a farm
pub async fn get_farm_ndvi(
    State(state): State<AppState>,
    path: Result<Path<u32>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<NdviHistoryBody>>> {
    let Path(farm_id) = path?;
    let Query(query) = query?;
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if days > MAX_HISTORY_DAYS {
        return Err(AppError::validation(
            "days",
            format!("days must be at most {}", MAX_HISTORY_DAYS),
        ));
    }
    let farm = find_farm(&state, farm_id)?;

    let history = state.ndvi.read().await.history(farm_id, days, today());

    Ok(ApiResponse::ok(NdviHistoryBody {
        farm_id,
        farmer_name: farm.farmer_name,
        crop: farm.crop,
        baseline_ndvi: farm.baseline_ndvi,
        data_points: history.len(),
        history,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestNdviBody {
    pub farm_id: u32,
    pub farmer_name: String,
    pub latest: NdviPoint,
    pub health: HealthAssessment,
}

/// Most recent NDVI reading for a farm with its health assessment
pub async fn get_latest_ndvi(
    State(state): State<AppState>,
    path: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<ApiResponse<LatestNdviBody>>> {
    let Path(farm_id) = path?;
    let farm = find_farm(&state, farm_id)?;

    let latest = state
        .ndvi
        .read()
        .await
        .latest(farm_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("NDVI data for farm {}", farm_id)))?;

    if !farm.has_baseline() {
        return Err(AppError::Internal(format!(
            "Farm {} has no baseline NDVI",
            farm_id
        )));
    }
    let health = assess_ndvi_health(latest.ndvi, farm.baseline_ndvi);

    Ok(ApiResponse::ok(LatestNdviBody {
        farm_id,
        farmer_name: farm.farmer_name,
        latest,
        health,
    }))
}

/// Latest reading enriched with farm details
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmNdviSnapshot {
    #[serde(flatten)]
    pub point: NdviPoint,
    pub farmer_name: Option<String>,
    pub crop: Option<String>,
    pub location: Option<String>,
    pub health: Option<HealthAssessment>,
}

#[derive(Debug, Serialize)]
pub struct AllNdviBody {
    pub count: usize,
    pub data: Vec<FarmNdviSnapshot>,
}

/// Latest reading of every farm
pub async fn get_all_ndvi(State(state): State<AppState>) -> Json<ApiResponse<AllNdviBody>> {
    let latest = state.ndvi.read().await.all_latest();

    let data: Vec<FarmNdviSnapshot> = latest
        .into_iter()
        .map(|point| {
            let farm = state.farms.get(point.farm_id);
            FarmNdviSnapshot {
                farmer_name: farm.map(|f| f.farmer_name.clone()),
                crop: farm.map(|f| f.crop.clone()),
                location: farm.map(|f| f.location.clone()),
                health: farm
                    .filter(|f| f.has_baseline())
                    .map(|f| assess_ndvi_health(point.ndvi, f.baseline_ndvi)),
                point,
            }
        })
        .collect();

    ApiResponse::ok(AllNdviBody {
        count: data.len(),
        data,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub farm_id: Option<u32>,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateBody {
    pub message: String,
    pub farms_processed: usize,
    pub data_points_generated: usize,
    pub days_per_farm: u32,
}

/// Regenerate NDVI history for one farm or all farms
pub async fn simulate_ndvi(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<SimulateBody>>> {
    let request: SimulateRequest = json_or_default(&body)?;
    let days = request.days.unwrap_or(state.config.simulation.default_days);
    if !(1..=MAX_SIMULATION_DAYS).contains(&days) {
        return Err(AppError::validation(
            "days",
            format!("days must be between 1 and {}", MAX_SIMULATION_DAYS),
        ));
    }

    let farms = match request.farm_id {
        Some(farm_id) => vec![find_farm(&state, farm_id)?],
        None => state.farms.all().to_vec(),
    };

    let generated = state.simulate_farms(&farms, days, today()).await;
    tracing::info!(farms = farms.len(), points = generated, days, "Simulated NDVI data");

    Ok(ApiResponse::ok(SimulateBody {
        message: format!("Generated NDVI data for {} farm(s)", farms.len()),
        farms_processed: farms.len(),
        data_points_generated: generated,
        days_per_farm: days,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterRequest {
    pub farm_id: Option<u32>,
    #[serde(rename = "type")]
    pub disaster_type: Option<String>,
    #[serde(default = "default_start_day")]
    pub start_day: usize,
    #[serde(default = "default_duration")]
    pub duration: usize,
    #[serde(default = "default_severity")]
    pub severity: f64,
}

fn default_start_day() -> usize {
    10
}

fn default_duration() -> usize {
    5
}

fn default_severity() -> f64 {
    0.8
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterSummary {
    #[serde(rename = "type")]
    pub disaster_type: DisasterType,
    pub farm_id: u32,
    pub farmer_name: String,
    pub start_day: usize,
    pub duration: usize,
    pub severity: f64,
    pub affected_data_points: usize,
    pub recovery_data_points: usize,
}

#[derive(Debug, Serialize)]
pub struct DisasterBody {
    pub message: String,
    pub disaster: DisasterSummary,
}

/// Inject a disaster scenario into a farm's stored series
pub async fn inject_disaster(
    State(state): State<AppState>,
    payload: Result<Json<DisasterRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<DisasterBody>>> {
    let Json(request) = payload?;

    let farm_id = request
        .farm_id
        .ok_or_else(|| AppError::validation("farmId", "farmId is required"))?;
    let disaster_type: DisasterType = request
        .disaster_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: String| AppError::validation("type", e))?;
    let event = DisasterEvent {
        disaster_type,
        start_day: request.start_day,
        duration: request.duration,
        severity: request.severity,
    };
    validate_disaster_severity(event.severity).map_err(|e| AppError::validation("severity", e))?;
    validate_disaster_event(&event).map_err(|e| AppError::validation("duration", e))?;

    let farm = find_farm(&state, farm_id)?;

    let impact = {
        let mut generator = state.generator.lock().await;
        let mut ndvi = state.ndvi.write().await;

        let mut series = ndvi.series(farm_id);
        if series.is_empty() {
            return Err(AppError::validation(
                "farmId",
                "No NDVI data exists for this farm. Generate NDVI data first using POST /api/ndvi/simulate",
            ));
        }

        let impact = generator.inject_disaster_event(&mut series, &event);
        ndvi.store(series);
        impact
    };

    tracing::info!(
        farm_id,
        disaster = %disaster_type,
        affected = impact.affected_points,
        recovering = impact.recovery_points,
        "Injected disaster scenario"
    );

    Ok(ApiResponse::ok(DisasterBody {
        message: format!("{} disaster injected into farm {}", disaster_type, farm_id),
        disaster: DisasterSummary {
            disaster_type,
            farm_id,
            farmer_name: farm.farmer_name,
            start_day: event.start_day,
            duration: event.duration,
            severity: event.severity,
            affected_data_points: impact.affected_points,
            recovery_data_points: impact.recovery_points,
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct NdviStatsBody {
    pub stats: NdviStats,
}

/// NDVI store summary
pub async fn get_ndvi_stats(State(state): State<AppState>) -> Json<ApiResponse<NdviStatsBody>> {
    let stats = state.ndvi.read().await.stats();
    ApiResponse::ok(NdviStatsBody { stats })
}

/// Drop every stored NDVI point
pub async fn clear_ndvi(State(state): State<AppState>) -> Json<ApiResponse<ClearedBody>> {
    let cleared = state.ndvi.write().await.clear();
    tracing::info!(cleared, "Cleared NDVI data");

    ApiResponse::ok(ClearedBody {
        message: "All NDVI data cleared".to_string(),
        cleared_count: cleared,
    })
}
