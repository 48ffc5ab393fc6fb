//! Farm reference data and administrative division browsing

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{
    validate_farms, DivisionFilter, DivisionSummary, Farm, FarmValidationError, Pagination,
    PaginationMeta,
};

/// Farms shipped with the server
const BUILTIN_FARMS: &str = include_str!("../../data/farms.json");

/// Why a farm set could not be loaded
#[derive(Debug, Error)]
pub enum FarmLoadError {
    #[error("failed to read farm file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse farm records: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid farm record: {0}")]
    Invalid(#[from] FarmValidationError),
}

/// The built-in demo farms
pub fn seed_farms() -> Result<Vec<Farm>, FarmLoadError> {
    Ok(serde_json::from_str(BUILTIN_FARMS)?)
}

/// Farm and area totals per district and per tehsil
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DivisionStats {
    pub district: BTreeMap<String, DivisionSummary>,
    pub tehsil: BTreeMap<String, DivisionSummary>,
}

/// Immutable set of insured farms
#[derive(Debug, Clone)]
pub struct FarmRegistry {
    farms: Vec<Farm>,
}

impl FarmRegistry {
    /// Build a registry from validated farm records
    pub fn new(farms: Vec<Farm>) -> Result<Self, FarmLoadError> {
        validate_farms(&farms)?;
        Ok(Self { farms })
    }

    pub fn builtin() -> Result<Self, FarmLoadError> {
        Self::new(seed_farms()?)
    }

    /// Load farm records from a JSON array on disk
    pub fn from_json_file(path: &Path) -> Result<Self, FarmLoadError> {
        let contents = std::fs::read_to_string(path)?;
        let farms: Vec<Farm> = serde_json::from_str(&contents)?;
        Self::new(farms)
    }

    /// Farms from `data_file` when configured, the built-in set otherwise
    pub fn load(data_file: Option<&Path>) -> Result<Self, FarmLoadError> {
        let registry = match data_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading farms from file");
                Self::from_json_file(path)?
            }
            None => Self::builtin()?,
        };
        tracing::info!(farms = registry.len(), "Farm registry loaded");
        Ok(registry)
    }

    pub fn all(&self) -> &[Farm] {
        &self.farms
    }

    pub fn get(&self, id: u32) -> Option<&Farm> {
        self.farms.iter().find(|f| f.id == id)
    }

    pub fn by_location(&self, location: &str) -> Vec<Farm> {
        self.farms
            .iter()
            .filter(|f| f.location.eq_ignore_ascii_case(location))
            .cloned()
            .collect()
    }

    pub fn by_crop(&self, crop: &str) -> Vec<Farm> {
        self.farms
            .iter()
            .filter(|f| f.crop.eq_ignore_ascii_case(crop))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.farms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.farms.is_empty()
    }

    /// Distinct districts in first-seen order
    pub fn districts(&self) -> Vec<String> {
        distinct(self.farms.iter().map(|f| f.administrative_data.district.as_str()))
    }

    /// Distinct tehsils, optionally within one district
    pub fn tehsils(&self, district: Option<&str>) -> Vec<String> {
        distinct(
            self.farms
                .iter()
                .filter(|f| district.map_or(true, |d| f.administrative_data.district == d))
                .map(|f| f.administrative_data.tehsil.as_str()),
        )
    }

    /// Distinct villages, optionally within one tehsil
    pub fn villages(&self, tehsil: Option<&str>) -> Vec<String> {
        distinct(
            self.farms
                .iter()
                .filter(|f| tehsil.map_or(true, |t| f.administrative_data.tehsil == t))
                .map(|f| f.administrative_data.village.as_str()),
        )
    }

    /// One page of the farms matching `filter`
    pub fn by_division(
        &self,
        filter: &DivisionFilter,
        pagination: &Pagination,
    ) -> (Vec<Farm>, PaginationMeta) {
        let matching: Vec<&Farm> = self.farms.iter().filter(|f| filter.matches(f)).collect();
        let meta = PaginationMeta::new(pagination, matching.len());

        let page = matching
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit as usize)
            .cloned()
            .collect();
        (page, meta)
    }

    pub fn division_stats(&self) -> DivisionStats {
        let mut stats = DivisionStats::default();

        for farm in &self.farms {
            let admin = &farm.administrative_data;
            let district = non_empty_or_unknown(&admin.district);
            let tehsil = non_empty_or_unknown(&admin.tehsil);

            let entry = stats.district.entry(district.clone()).or_default();
            entry.count += 1;
            entry.area += farm.area;

            let entry = stats.tehsil.entry(tehsil).or_insert_with(|| DivisionSummary {
                count: 0,
                area: Decimal::ZERO,
                district: Some(district),
            });
            entry.count += 1;
            entry.area += farm.area;
        }

        stats
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values.filter(|v| !v.is_empty()) {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

fn non_empty_or_unknown(value: &str) -> String {
    if value.is_empty() {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}
