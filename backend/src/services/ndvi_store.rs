//! In-memory NDVI time series storage

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::models::{DateRange, NdviPoint, NdviStats};

/// Time series points for every farm, kept in ascending timestamp order
#[derive(Debug, Default)]
pub struct NdviStore {
    points: Vec<NdviPoint>,
}

impl NdviStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the series of every farm in `points` and return how many were stored
    pub fn store(&mut self, points: Vec<NdviPoint>) -> usize {
        let farm_ids: HashSet<u32> = points.iter().map(|p| p.farm_id).collect();
        self.points.retain(|p| !farm_ids.contains(&p.farm_id));

        let count = points.len();
        self.points.extend(points);
        self.points.sort_by_key(|p| p.timestamp);

        tracing::debug!(
            stored = count,
            farms = farm_ids.len(),
            total = self.points.len(),
            "Stored NDVI points"
        );
        count
    }

    /// Points for a farm no older than `days` before `today`, oldest first
    pub fn history(&self, farm_id: u32, days: u32, today: NaiveDate) -> Vec<NdviPoint> {
        let cutoff = today
            .checked_sub_signed(Duration::days(days as i64))
            .unwrap_or(NaiveDate::MIN);
        self.points
            .iter()
            .filter(|p| p.farm_id == farm_id && p.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Entire stored series for a farm, oldest first
    pub fn series(&self, farm_id: u32) -> Vec<NdviPoint> {
        self.points
            .iter()
            .filter(|p| p.farm_id == farm_id)
            .cloned()
            .collect()
    }

    pub fn latest(&self, farm_id: u32) -> Option<&NdviPoint> {
        self.points
            .iter()
            .filter(|p| p.farm_id == farm_id)
            .max_by_key(|p| p.timestamp)
    }

    /// Most recent point of every farm, ordered by farm id
    pub fn all_latest(&self) -> Vec<NdviPoint> {
        let mut latest: BTreeMap<u32, &NdviPoint> = BTreeMap::new();
        for point in &self.points {
            match latest.get(&point.farm_id) {
                Some(current) if current.timestamp > point.timestamp => {}
                _ => {
                    latest.insert(point.farm_id, point);
                }
            }
        }
        latest.into_values().cloned().collect()
    }

    /// Drop every point and return how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.points.len();
        self.points.clear();
        count
    }

    pub fn stats(&self) -> NdviStats {
        let farms: HashSet<u32> = self.points.iter().map(|p| p.farm_id).collect();
        let date_range = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(DateRange {
                start: first.timestamp,
                end: last.timestamp,
            }),
            _ => None,
        };

        NdviStats {
            total_data_points: self.points.len(),
            farms_tracked: farms.len(),
            date_range,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
