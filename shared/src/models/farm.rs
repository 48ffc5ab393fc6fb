//! Insured farm models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::GeoPoint;

/// An insured farm plot
///
/// Farms are reference data: they are loaded once at startup and never
/// mutated while the server runs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: u32,
    #[validate(length(min = 1, max = 200))]
    pub farmer_name: String,
    #[validate(length(min = 1))]
    pub crop: String,
    /// Crop with variety, e.g. "Soybean (JS 335 variety)"
    pub crop_type: String,
    pub location: String,
    /// Boundary vertices; not necessarily closed
    #[validate(length(min = 3))]
    pub polygon: Vec<GeoPoint>,
    /// Area in hectares
    pub area: Decimal,
    pub sowing_date: NaiveDate,
    pub expected_harvest_date: Option<NaiveDate>,
    /// NDVI of a healthy crop on this farm, the reference for drop percentages
    #[serde(rename = "baselineNDVI")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub baseline_ndvi: f64,
    /// Sum insured, in rupees
    pub insurance_value: Decimal,
    pub contact_info: Option<ContactInfo>,
    pub administrative_data: AdministrativeData,
}

impl Farm {
    /// Whether health math is defined for this farm
    pub fn has_baseline(&self) -> bool {
        self.baseline_ndvi.is_finite() && self.baseline_ndvi > 0.0
    }

    pub fn crop_label(&self) -> &str {
        if self.crop_type.is_empty() {
            &self.crop
        } else {
            &self.crop_type
        }
    }
}

/// Farmer contact details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: String,
    pub aadhar: Option<String>,
}

/// Administrative hierarchy a farm belongs to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeData {
    pub state: String,
    pub district: String,
    pub tehsil: String,
    pub village: String,
    pub pincode: Option<String>,
}

/// Filter for browsing farms by administrative division
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DivisionFilter {
    pub district: Option<String>,
    pub tehsil: Option<String>,
    pub village: Option<String>,
    /// Case-insensitive substring of the farmer name
    pub search: Option<String>,
}

impl DivisionFilter {
    pub fn matches(&self, farm: &Farm) -> bool {
        let admin = &farm.administrative_data;
        if self.district.as_deref().is_some_and(|d| d != admin.district) {
            return false;
        }
        if self.tehsil.as_deref().is_some_and(|t| t != admin.tehsil) {
            return false;
        }
        if self.village.as_deref().is_some_and(|v| v != admin.village) {
            return false;
        }
        match &self.search {
            Some(search) => farm
                .farmer_name
                .to_lowercase()
                .contains(&search.to_lowercase()),
            None => true,
        }
    }
}

/// Farm count and insured area within one division
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DivisionSummary {
    pub count: usize,
    pub area: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}
