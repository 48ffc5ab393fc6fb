//! Crop health classification from NDVI readings

use serde::{Deserialize, Serialize};

use super::AlertSeverity;

/// Drop below baseline, in percent, under which a crop counts as healthy
pub const HEALTHY_MAX_DROP_PERCENT: f64 = 10.0;

/// Upper bound (exclusive) of the warning bucket
pub const WARNING_MAX_DROP_PERCENT: f64 = 25.0;

/// Upper bound (exclusive) of the critical bucket; anything above is severe
pub const CRITICAL_MAX_DROP_PERCENT: f64 = 50.0;

/// Fraction of baseline a reading must reach before active alerts auto-resolve.
///
/// The monitor only asks for auto-resolution on healthy readings, which are
/// already at or above `1 - HEALTHY_MAX_DROP_PERCENT / 100` of baseline, so
/// this ratio only matters for direct callers of the alert store.
pub const RECOVERY_RATIO: f64 = 0.8;

/// Four-tier crop health status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Severe,
}

impl HealthStatus {
    pub fn from_drop_percentage(drop_percentage: f64) -> Self {
        if drop_percentage < HEALTHY_MAX_DROP_PERCENT {
            HealthStatus::Healthy
        } else if drop_percentage < WARNING_MAX_DROP_PERCENT {
            HealthStatus::Warning
        } else if drop_percentage < CRITICAL_MAX_DROP_PERCENT {
            HealthStatus::Critical
        } else {
            HealthStatus::Severe
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        match self {
            HealthStatus::Healthy => AlertSeverity::Low,
            HealthStatus::Warning => AlertSeverity::Medium,
            HealthStatus::Critical => AlertSeverity::High,
            HealthStatus::Severe => AlertSeverity::Critical,
        }
    }

    /// Map color used by the dashboard
    pub fn color(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "#10b981",
            HealthStatus::Warning => "#f59e0b",
            HealthStatus::Critical => "#f97316",
            HealthStatus::Severe => "#ef4444",
        }
    }

    pub fn needs_alert(&self) -> bool {
        !matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Critical => write!(f, "critical"),
            HealthStatus::Severe => write!(f, "severe"),
        }
    }
}

/// Result of comparing a reading against the farm baseline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthAssessment {
    pub status: HealthStatus,
    pub severity: AlertSeverity,
    pub color: String,
    #[serde(rename = "currentNDVI")]
    pub current_ndvi: f64,
    #[serde(rename = "baselineNDVI")]
    pub baseline_ndvi: f64,
    pub drop_percentage: f64,
    pub message: String,
}

/// Percent drop of `current` below `baseline`; negative when above baseline
pub fn drop_percentage(current_ndvi: f64, baseline_ndvi: f64) -> f64 {
    (baseline_ndvi - current_ndvi) / baseline_ndvi * 100.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify a reading against the farm baseline.
///
/// `baseline_ndvi` must be positive; callers check `Farm::has_baseline` first.
pub fn assess_ndvi_health(current_ndvi: f64, baseline_ndvi: f64) -> HealthAssessment {
    let drop = drop_percentage(current_ndvi, baseline_ndvi);
    let status = HealthStatus::from_drop_percentage(drop);

    HealthAssessment {
        status,
        severity: status.severity(),
        color: status.color().to_string(),
        current_ndvi,
        baseline_ndvi,
        drop_percentage: round2(drop),
        message: health_message(status, drop),
    }
}

fn health_message(status: HealthStatus, drop: f64) -> String {
    match status {
        HealthStatus::Healthy => format!("Crop health is excellent ({:.1}% below baseline)", drop),
        HealthStatus::Warning => format!("Minor stress detected ({:.1}% below baseline)", drop),
        HealthStatus::Critical => {
            format!("Significant stress detected ({:.1}% below baseline)", drop)
        }
        HealthStatus::Severe => format!("Severe crop damage detected ({:.1}% below baseline)", drop),
    }
}

/// Whether a reading is high enough to auto-resolve a farm's alerts
pub fn has_recovered(current_ndvi: f64, baseline_ndvi: f64) -> bool {
    current_ndvi >= baseline_ndvi * RECOVERY_RATIO
}
