//! HTTP handlers for administrative division browsing

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ApiResponse, DataBody, ListBody};
use crate::error::AppResult;
use crate::models::{DivisionFilter, Farm, Pagination, PaginationMeta};
use crate::services::farm::DivisionStats;
use crate::AppState;

/// Distinct districts
pub async fn list_districts(State(state): State<AppState>) -> Json<ApiResponse<ListBody<String>>> {
    ApiResponse::ok(state.farms.districts().into())
}

#[derive(Debug, Deserialize)]
pub struct TehsilQuery {
    pub district: Option<String>,
}

/// Distinct tehsils, optionally within a district
pub async fn list_tehsils(
    State(state): State<AppState>,
    query: Result<Query<TehsilQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<ListBody<String>>>> {
    let Query(query) = query?;
    Ok(ApiResponse::ok(
        state.farms.tehsils(non_empty(&query.district)).into(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct VillageQuery {
    pub tehsil: Option<String>,
}

/// Distinct villages, optionally within a tehsil
pub async fn list_villages(
    State(state): State<AppState>,
    query: Result<Query<VillageQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<ListBody<String>>>> {
    let Query(query) = query?;
    Ok(ApiResponse::ok(
        state.farms.villages(non_empty(&query.tehsil)).into(),
    ))
}

/// Query parameters for division browsing
#[derive(Debug, Deserialize, Validate)]
pub struct DivisionQuery {
    pub district: Option<String>,
    pub tehsil: Option<String>,
    pub village: Option<String>,
    pub search: Option<String>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    #[serde(default = "default_page")]
    pub page: u32,
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    Pagination::default().page
}

fn default_limit() -> u32 {
    Pagination::default().limit
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionFarmsBody {
    pub count: usize,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
    pub data: Vec<Farm>,
    pub filters: DivisionFilter,
}

/// Farms filtered by division and farmer name, paginated
pub async fn list_farms_by_division(
    State(state): State<AppState>,
    query: Result<Query<DivisionQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<DivisionFarmsBody>>> {
    let Query(query) = query?;
    query.validate()?;

    let filter = DivisionFilter {
        district: non_empty(&query.district).map(str::to_string),
        tehsil: non_empty(&query.tehsil).map(str::to_string),
        village: non_empty(&query.village).map(str::to_string),
        search: non_empty(&query.search).map(str::to_string),
    };
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };

    let (farms, meta) = state.farms.by_division(&filter, &pagination);
    Ok(ApiResponse::ok(DivisionFarmsBody {
        count: farms.len(),
        pagination: meta,
        data: farms,
        filters: filter,
    }))
}

/// Farm count and area per district and tehsil
pub async fn get_division_stats(
    State(state): State<AppState>,
) -> Json<ApiResponse<DataBody<DivisionStats>>> {
    ApiResponse::ok(DataBody {
        data: state.farms.division_stats(),
    })
}

/// Blank query values count as absent
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
