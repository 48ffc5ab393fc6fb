//! Crop health monitoring
//!
//! A sweep reads each farm's latest NDVI reading, classifies it against the
//! farm baseline and opens, refreshes or auto-resolves alerts accordingly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::{
    assess_ndvi_health, validate_ndvi_value, Alert, AlertMetadata, AlertSeverity, Farm,
    HealthAssessment, HealthStatus, NdviPoint, NewAlert, NDVI_DROP_ALERT_TYPE,
};
use crate::services::{AlertStore, FarmRegistry, NdviStore};

/// NDVI reported on synthetic test alerts
const TEST_ALERT_NDVI: f64 = 0.42;

/// Drop percentage reported on synthetic test alerts
const TEST_ALERT_DROP_PERCENT: f64 = 44.0;

/// Baseline used for test alerts when the farm has none
const FALLBACK_BASELINE_NDVI: f64 = 0.75;

/// Per-farm monitoring failure
#[derive(Debug, Error, PartialEq)]
pub enum MonitorError {
    #[error("invalid NDVI reading {ndvi} for farm {farm_id}: {reason}")]
    InvalidReading {
        farm_id: u32,
        ndvi: f64,
        reason: &'static str,
    },

    #[error("Farm {0} not found")]
    FarmNotFound(u32),
}

/// What a single farm check did
#[derive(Debug, Clone)]
pub enum HealthCheckOutcome {
    /// No reading, or the farm has no usable baseline
    Skipped,
    /// Healthy reading; `resolved` alerts were auto-resolved
    Recovered { resolved: usize },
    /// Stressed reading; `is_new` is false when an active alert was refreshed
    Alert { alert: Alert, is_new: bool },
}

/// A farm that failed during a sweep
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmCheckError {
    pub farm_id: u32,
    pub farmer_name: String,
    pub error: String,
}

/// Result of one monitoring sweep
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSummary {
    pub timestamp: DateTime<Utc>,
    pub farms_checked: usize,
    pub alerts_generated: usize,
    pub alerts_resolved: usize,
    pub new_alerts: Vec<Alert>,
    pub errors: Vec<FarmCheckError>,
}

/// Farms per health bucket
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthDistribution {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub severe: usize,
    pub no_data: usize,
}

impl HealthDistribution {
    fn increment(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Warning => self.warning += 1,
            HealthStatus::Critical => self.critical += 1,
            HealthStatus::Severe => self.severe += 1,
        }
    }
}

/// Snapshot of monitoring coverage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStatus {
    pub total_farms: usize,
    pub farms_with_data: usize,
    pub active_alerts: usize,
    pub farm_health_distribution: HealthDistribution,
    /// When the last sweep ran, if any has
    pub last_check: Option<DateTime<Utc>>,
}

/// Check one farm's latest reading and update its alerts
pub fn check_farm_health(
    farm: &Farm,
    latest: Option<&NdviPoint>,
    alerts: &mut AlertStore,
) -> Result<HealthCheckOutcome, MonitorError> {
    let reading = match latest {
        Some(reading) if farm.has_baseline() => reading,
        _ => return Ok(HealthCheckOutcome::Skipped),
    };

    validate_ndvi_value(reading.ndvi).map_err(|reason| MonitorError::InvalidReading {
        farm_id: farm.id,
        ndvi: reading.ndvi,
        reason,
    })?;

    let health = assess_ndvi_health(reading.ndvi, farm.baseline_ndvi);
    if !health.status.needs_alert() {
        let resolved = alerts.auto_resolve(farm.id, reading.ndvi, farm.baseline_ndvi);
        return Ok(HealthCheckOutcome::Recovered { resolved });
    }

    let new_alert = NewAlert {
        farm_id: farm.id,
        farmer_name: farm.farmer_name.clone(),
        alert_type: NDVI_DROP_ALERT_TYPE.to_string(),
        severity: health.severity,
        current_ndvi: reading.ndvi,
        baseline_ndvi: farm.baseline_ndvi,
        drop_percentage: health.drop_percentage,
        message: alert_message(farm, &health),
        estimated_cause: reading.weather_condition.disaster().map(|d| d.to_string()),
        metadata: AlertMetadata {
            crop_type: Some(farm.crop_type.clone()),
            area: Some(farm.area),
            insurance_value: Some(farm.insurance_value),
            health_status: Some(health.status),
            weather_condition: Some(reading.weather_condition),
            ..Default::default()
        },
    };

    let outcome = alerts.record(new_alert);
    Ok(HealthCheckOutcome::Alert {
        alert: outcome.alert,
        is_new: !outcome.is_duplicate,
    })
}

/// Operator-facing alert text for a stressed farm
pub fn alert_message(farm: &Farm, health: &HealthAssessment) -> String {
    let drop = health.drop_percentage;
    let crop = farm.crop_label();

    match health.status {
        HealthStatus::Severe => format!(
            "SEVERE ALERT: {}'s {} field showing {:.1}% NDVI drop. Immediate inspection recommended.",
            farm.farmer_name, crop, drop
        ),
        HealthStatus::Critical => format!(
            "CRITICAL: {}'s {} crop health deteriorating ({:.1}% below normal). Action required.",
            farm.farmer_name, crop, drop
        ),
        HealthStatus::Warning => format!(
            "WARNING: {}'s {} field NDVI declining ({:.1}% below baseline). Monitor closely.",
            farm.farmer_name, crop, drop
        ),
        HealthStatus::Healthy => {
            format!("Crop health issue detected for {}'s farm.", farm.farmer_name)
        }
    }
}

/// Check every farm that has a reading; failures are collected, not propagated
pub fn monitor_all_farms(
    farms: &FarmRegistry,
    ndvi: &NdviStore,
    alerts: &mut AlertStore,
) -> MonitoringSummary {
    let mut summary = MonitoringSummary {
        timestamp: Utc::now(),
        farms_checked: 0,
        alerts_generated: 0,
        alerts_resolved: 0,
        new_alerts: Vec::new(),
        errors: Vec::new(),
    };

    for farm in farms.all() {
        let Some(latest) = ndvi.latest(farm.id) else {
            continue;
        };
        summary.farms_checked += 1;

        match check_farm_health(farm, Some(latest), alerts) {
            Ok(HealthCheckOutcome::Alert { alert, is_new: true }) => {
                summary.alerts_generated += 1;
                summary.new_alerts.push(alert);
            }
            Ok(HealthCheckOutcome::Recovered { resolved }) => {
                summary.alerts_resolved += resolved;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(farm_id = farm.id, error = %e, "Farm health check failed");
                summary.errors.push(FarmCheckError {
                    farm_id: farm.id,
                    farmer_name: farm.farmer_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        farms_checked = summary.farms_checked,
        alerts_generated = summary.alerts_generated,
        alerts_resolved = summary.alerts_resolved,
        errors = summary.errors.len(),
        "NDVI monitoring sweep completed"
    );
    for alert in &summary.new_alerts {
        tracing::warn!(
            farm_id = alert.farm_id,
            farmer = %alert.farmer_name,
            severity = %alert.severity,
            drop_percentage = alert.drop_percentage,
            "New crop health alert"
        );
    }

    summary
}

/// Per-farm health classification without touching alerts
pub fn monitoring_status(
    farms: &FarmRegistry,
    ndvi: &NdviStore,
    alerts: &AlertStore,
    last_check: Option<DateTime<Utc>>,
) -> MonitoringStatus {
    let mut distribution = HealthDistribution::default();

    for farm in farms.all() {
        match ndvi.latest(farm.id) {
            Some(latest) if farm.has_baseline() => {
                distribution.increment(assess_ndvi_health(latest.ndvi, farm.baseline_ndvi).status)
            }
            _ => distribution.no_data += 1,
        }
    }

    MonitoringStatus {
        total_farms: farms.len(),
        farms_with_data: farms.len() - distribution.no_data,
        active_alerts: alerts.active().len(),
        farm_health_distribution: distribution,
        last_check,
    }
}

/// Record a synthetic alert for a farm, bypassing health assessment
pub fn generate_test_alert(
    farms: &FarmRegistry,
    alerts: &mut AlertStore,
    farm_id: u32,
    severity: AlertSeverity,
) -> Result<Alert, MonitorError> {
    let farm = farms.get(farm_id).ok_or(MonitorError::FarmNotFound(farm_id))?;
    let baseline_ndvi = if farm.has_baseline() {
        farm.baseline_ndvi
    } else {
        FALLBACK_BASELINE_NDVI
    };

    let new_alert = NewAlert {
        farm_id: farm.id,
        farmer_name: farm.farmer_name.clone(),
        alert_type: NDVI_DROP_ALERT_TYPE.to_string(),
        severity,
        current_ndvi: TEST_ALERT_NDVI,
        baseline_ndvi,
        drop_percentage: TEST_ALERT_DROP_PERCENT,
        message: format!(
            "TEST ALERT: {}'s {} showing simulated crop stress",
            farm.farmer_name,
            farm.crop_label()
        ),
        estimated_cause: Some("test_scenario".to_string()),
        metadata: AlertMetadata {
            is_test: true,
            crop_type: Some(farm.crop_type.clone()),
            area: Some(farm.area),
            ..Default::default()
        },
    };

    Ok(alerts.record(new_alert).alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NdviMetadata, WeatherCondition};
    use chrono::NaiveDate;

    fn reading(farm_id: u32, ndvi: f64, weather_condition: WeatherCondition) -> NdviPoint {
        let date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
        NdviPoint {
            farm_id,
            timestamp: date,
            ndvi,
            weather_condition,
            satellite_image_url: NdviPoint::satellite_image_url(farm_id, date),
            metadata: NdviMetadata {
                cloud_cover: 5.0,
                temperature: 30.0,
                rainfall: 1.0,
            },
        }
    }

    fn farm() -> Farm {
        FarmRegistry::builtin().unwrap().get(1).unwrap().clone()
    }

    #[test]
    fn test_no_reading_is_skipped() {
        let mut alerts = AlertStore::new();
        let outcome = check_farm_health(&farm(), None, &mut alerts).unwrap();
        assert!(matches!(outcome, HealthCheckOutcome::Skipped));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_zero_baseline_is_skipped() {
        let mut alerts = AlertStore::new();
        let mut farm = farm();
        farm.baseline_ndvi = 0.0;
        let latest = reading(1, 0.3, WeatherCondition::Normal);
        let outcome = check_farm_health(&farm, Some(&latest), &mut alerts).unwrap();
        assert!(matches!(outcome, HealthCheckOutcome::Skipped));
    }

    #[test]
    fn test_severe_reading_opens_critical_alert() {
        let mut alerts = AlertStore::new();
        let latest = reading(1, 0.30, WeatherCondition::Flood);
        let outcome = check_farm_health(&farm(), Some(&latest), &mut alerts).unwrap();

        let HealthCheckOutcome::Alert { alert, is_new } = outcome else {
            panic!("expected an alert");
        };
        assert!(is_new);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.drop_percentage, 60.0);
        assert_eq!(alert.estimated_cause.as_deref(), Some("flood"));
        assert_eq!(alert.metadata.health_status, Some(HealthStatus::Severe));
        assert_eq!(
            alert.message,
            "SEVERE ALERT: rajaram mane's Soybean (JS 335 variety) field showing 60.0% NDVI drop. \
             Immediate inspection recommended."
        );
    }

    #[test]
    fn test_repeat_reading_refreshes_alert() {
        let mut alerts = AlertStore::new();
        let farm = farm();
        check_farm_health(&farm, Some(&reading(1, 0.6, WeatherCondition::Normal)), &mut alerts)
            .unwrap();
        let outcome =
            check_farm_health(&farm, Some(&reading(1, 0.62, WeatherCondition::Normal)), &mut alerts)
                .unwrap();

        assert!(matches!(outcome, HealthCheckOutcome::Alert { is_new: false, .. }));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts.active()[0].current_ndvi, 0.62);
    }

    #[test]
    fn test_healthy_reading_resolves_alerts() {
        let mut alerts = AlertStore::new();
        let farm = farm();
        check_farm_health(&farm, Some(&reading(1, 0.3, WeatherCondition::Drought)), &mut alerts)
            .unwrap();

        let outcome =
            check_farm_health(&farm, Some(&reading(1, 0.74, WeatherCondition::Normal)), &mut alerts)
                .unwrap();
        assert!(matches!(outcome, HealthCheckOutcome::Recovered { resolved: 1 }));
        assert!(alerts.active().is_empty());
    }

    #[test]
    fn test_out_of_range_reading_is_error() {
        let mut alerts = AlertStore::new();
        let latest = reading(1, 1.7, WeatherCondition::Normal);
        let result = check_farm_health(&farm(), Some(&latest), &mut alerts);
        assert!(matches!(
            result,
            Err(MonitorError::InvalidReading { farm_id: 1, .. })
        ));
    }

    #[test]
    fn test_warning_message() {
        let farm = farm();
        let health = assess_ndvi_health(0.6, farm.baseline_ndvi);
        assert_eq!(
            alert_message(&farm, &health),
            "WARNING: rajaram mane's Soybean (JS 335 variety) field NDVI declining \
             (20.0% below baseline). Monitor closely."
        );
    }

    #[test]
    fn test_generate_test_alert() {
        let farms = FarmRegistry::builtin().unwrap();
        let mut alerts = AlertStore::new();

        let alert = generate_test_alert(&farms, &mut alerts, 2, AlertSeverity::High).unwrap();
        assert_eq!(alert.current_ndvi, 0.42);
        assert_eq!(alert.drop_percentage, 44.0);
        assert_eq!(alert.estimated_cause.as_deref(), Some("test_scenario"));
        assert!(alert.metadata.is_test);

        assert_eq!(
            generate_test_alert(&farms, &mut alerts, 999, AlertSeverity::High).unwrap_err(),
            MonitorError::FarmNotFound(999)
        );
    }
}
