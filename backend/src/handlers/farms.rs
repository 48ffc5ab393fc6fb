//! HTTP handlers for farm lookup endpoints

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use super::{ApiResponse, DataBody, ListBody};
use crate::error::{AppError, AppResult};
use crate::models::Farm;
use crate::AppState;

/// List every insured farm
pub async fn list_farms(State(state): State<AppState>) -> Json<ApiResponse<ListBody<Farm>>> {
    ApiResponse::ok(state.farms.all().to_vec().into())
}

/// Get a farm by ID
pub async fn get_farm(
    State(state): State<AppState>,
    path: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<ApiResponse<DataBody<Farm>>>> {
    let Path(farm_id) = path?;
    let farm = state
        .farms
        .get(farm_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Farm with id {}", farm_id)))?;
    Ok(ApiResponse::ok(DataBody { data: farm }))
}

/// Farms in a location (case-insensitive)
pub async fn get_farms_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> AppResult<Json<ApiResponse<ListBody<Farm>>>> {
    let farms = state.farms.by_location(&location);
    if farms.is_empty() {
        return Err(AppError::NotFound(format!("Farms in location {}", location)));
    }
    Ok(ApiResponse::ok(farms.into()))
}

/// Farms growing a crop (case-insensitive)
pub async fn get_farms_by_crop(
    State(state): State<AppState>,
    Path(crop): Path<String>,
) -> AppResult<Json<ApiResponse<ListBody<Farm>>>> {
    let farms = state.farms.by_crop(&crop);
    if farms.is_empty() {
        return Err(AppError::NotFound(format!("Farms growing crop {}", crop)));
    }
    Ok(ApiResponse::ok(farms.into()))
}
