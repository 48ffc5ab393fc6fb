//! NDVI time series models and the crop growth curve

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::DateRange;

/// Lowest NDVI the simulator produces (bare soil)
pub const SIMULATED_NDVI_MIN: f64 = 0.2;

/// Highest NDVI the simulator produces
pub const SIMULATED_NDVI_MAX: f64 = 0.9;

/// Weather tag attached to each reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Normal,
    Flood,
    Drought,
    PestAttack,
    Recovering,
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherCondition::Normal => write!(f, "normal"),
            WeatherCondition::Flood => write!(f, "flood"),
            WeatherCondition::Drought => write!(f, "drought"),
            WeatherCondition::PestAttack => write!(f, "pest_attack"),
            WeatherCondition::Recovering => write!(f, "recovering"),
        }
    }
}

impl WeatherCondition {
    /// The disaster this condition points at, if any
    pub fn disaster(&self) -> Option<DisasterType> {
        match self {
            WeatherCondition::Flood => Some(DisasterType::Flood),
            WeatherCondition::Drought => Some(DisasterType::Drought),
            WeatherCondition::PestAttack => Some(DisasterType::Pest),
            WeatherCondition::Normal | WeatherCondition::Recovering => None,
        }
    }
}

/// Ancillary observations captured with a reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NdviMetadata {
    /// Cloud cover, percent
    pub cloud_cover: f64,
    /// Air temperature, °C
    pub temperature: f64,
    /// Rainfall, mm
    pub rainfall: f64,
}

/// One daily NDVI observation for a farm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NdviPoint {
    pub farm_id: u32,
    pub timestamp: NaiveDate,
    pub ndvi: f64,
    pub weather_condition: WeatherCondition,
    pub satellite_image_url: String,
    pub metadata: NdviMetadata,
}

impl NdviPoint {
    pub fn satellite_image_url(farm_id: u32, date: NaiveDate) -> String {
        format!("/api/satellite-images/{}/{}.jpg", farm_id, date.format("%Y-%m-%d"))
    }
}

/// Kinds of disaster that can be injected into a series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisasterType {
    Flood,
    Drought,
    Pest,
}

impl DisasterType {
    pub const ALL: [DisasterType; 3] = [DisasterType::Flood, DisasterType::Drought, DisasterType::Pest];

    /// Weather condition stamped on points inside the disaster window
    pub fn weather_condition(&self) -> WeatherCondition {
        match self {
            DisasterType::Flood => WeatherCondition::Flood,
            DisasterType::Drought => WeatherCondition::Drought,
            DisasterType::Pest => WeatherCondition::PestAttack,
        }
    }
}

impl std::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisasterType::Flood => write!(f, "flood"),
            DisasterType::Drought => write!(f, "drought"),
            DisasterType::Pest => write!(f, "pest"),
        }
    }
}

impl std::str::FromStr for DisasterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flood" => Ok(DisasterType::Flood),
            "drought" => Ok(DisasterType::Drought),
            "pest" => Ok(DisasterType::Pest),
            other => Err(format!(
                "Invalid disaster type '{}'. Must be one of: flood, drought, pest",
                other
            )),
        }
    }
}

/// Parameters of a disaster perturbation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisasterEvent {
    #[serde(rename = "type")]
    pub disaster_type: DisasterType,
    /// Days back from the most recent point where the window ends (0 = last point)
    pub start_day: usize,
    /// Window length in days
    pub duration: usize,
    /// Impact strength, 0-1
    pub severity: f64,
}

/// What a disaster injection touched
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisasterImpact {
    pub affected_points: usize,
    pub recovery_points: usize,
}

/// Summary of the NDVI store contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NdviStats {
    pub total_data_points: usize,
    pub farms_tracked: usize,
    pub date_range: Option<DateRange>,
}

/// Soybean growth stages, keyed by days since sowing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    PreSowing,
    /// Days 0-15
    Germination,
    /// Days 15-30
    Vegetative,
    /// Days 30-60
    RapidGrowth,
    /// Days 60-90, peak canopy
    Flowering,
    /// Days 90-120
    Maturity,
    PostHarvest,
}

impl GrowthStage {
    pub fn from_days_since_sowing(days: i64) -> Self {
        match days {
            d if d < 0 => GrowthStage::PreSowing,
            0..=14 => GrowthStage::Germination,
            15..=29 => GrowthStage::Vegetative,
            30..=59 => GrowthStage::RapidGrowth,
            60..=89 => GrowthStage::Flowering,
            90..=119 => GrowthStage::Maturity,
            _ => GrowthStage::PostHarvest,
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthStage::PreSowing => write!(f, "Pre-sowing"),
            GrowthStage::Germination => write!(f, "Germination"),
            GrowthStage::Vegetative => write!(f, "Vegetative"),
            GrowthStage::RapidGrowth => write!(f, "Rapid Growth"),
            GrowthStage::Flowering => write!(f, "Flowering/Pod"),
            GrowthStage::Maturity => write!(f, "Maturity"),
            GrowthStage::PostHarvest => write!(f, "Post-harvest"),
        }
    }
}

/// Noise-free NDVI expected for a healthy crop `days_since_sowing` days in
pub fn growth_curve_ndvi(days_since_sowing: i64, baseline_ndvi: f64) -> f64 {
    let days = days_since_sowing as f64;
    match GrowthStage::from_days_since_sowing(days_since_sowing) {
        GrowthStage::PreSowing => 0.2,
        GrowthStage::Germination => 0.2 + 0.1 * (days / 15.0),
        GrowthStage::Vegetative => 0.3 + 0.3 * ((days - 15.0) / 15.0),
        GrowthStage::RapidGrowth => 0.6 + (baseline_ndvi - 0.6) * ((days - 30.0) / 30.0),
        GrowthStage::Flowering => baseline_ndvi,
        GrowthStage::Maturity => baseline_ndvi - 0.2 * ((days - 90.0) / 30.0),
        GrowthStage::PostHarvest => 0.3,
    }
}
