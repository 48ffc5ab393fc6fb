//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A polygon vertex, serialized as a `[lat, lng]` pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint(pub f64, pub f64);

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(latitude, longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

impl Pagination {
    /// Index of the first item on this page (pages are 1-based)
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.limit as usize
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total: usize) -> Self {
        let total_pages = if pagination.limit == 0 {
            0
        } else {
            total.div_ceil(pagination.limit as usize)
        };
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages,
        }
    }
}

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
