//! Monitoring sweep tests
//!
//! Unit tests for:
//! - Alert generation from stressed readings
//! - Auto-resolution on recovery
//! - Per-farm failure isolation
//! - Health distribution reporting

use chrono::NaiveDate;

use cim_backend::models::{
    AlertSeverity, AlertStatus, NdviMetadata, NdviPoint, WeatherCondition,
};
use cim_backend::services::monitor::{
    check_farm_health, generate_test_alert, monitor_all_farms, monitoring_status,
    HealthCheckOutcome, MonitorError,
};
use cim_backend::services::{AlertStore, FarmRegistry, NdviStore};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
}

fn reading(farm_id: u32, ndvi: f64, weather_condition: WeatherCondition) -> NdviPoint {
    NdviPoint {
        farm_id,
        timestamp: today(),
        ndvi,
        weather_condition,
        satellite_image_url: NdviPoint::satellite_image_url(farm_id, today()),
        metadata: NdviMetadata {
            cloud_cover: 5.0,
            temperature: 30.0,
            rainfall: 1.0,
        },
    }
}

fn registry() -> FarmRegistry {
    FarmRegistry::builtin().unwrap()
}

// ============================================================================
// Single Farm Checks
// ============================================================================

#[test]
fn test_stressed_reading_opens_alert_with_cause() {
    let farms = registry();
    let farm = farms.get(1).unwrap();
    let mut alerts = AlertStore::new();

    let latest = reading(1, 0.30, WeatherCondition::Flood);
    let outcome = check_farm_health(farm, Some(&latest), &mut alerts).unwrap();

    match outcome {
        HealthCheckOutcome::Alert { alert, is_new } => {
            assert!(is_new);
            assert_eq!(alert.severity, AlertSeverity::Critical);
            assert_eq!(alert.drop_percentage, 60.0);
            assert_eq!(alert.estimated_cause.as_deref(), Some("flood"));
            assert!(alert.message.starts_with("SEVERE ALERT"));
        }
        other => panic!("expected an alert, got {:?}", other),
    }
}

#[test]
fn test_missing_reading_is_skipped() {
    let farms = registry();
    let mut alerts = AlertStore::new();

    let outcome = check_farm_health(farms.get(2).unwrap(), None, &mut alerts).unwrap();
    assert!(matches!(outcome, HealthCheckOutcome::Skipped));
    assert!(alerts.is_empty());
}

#[test]
fn test_out_of_range_reading_is_rejected() {
    let farms = registry();
    let mut alerts = AlertStore::new();

    let latest = reading(3, 1.5, WeatherCondition::Normal);
    let err = check_farm_health(farms.get(3).unwrap(), Some(&latest), &mut alerts).unwrap_err();
    assert!(matches!(err, MonitorError::InvalidReading { farm_id: 3, .. }));
    assert!(alerts.is_empty());
}

// ============================================================================
// Sweeps
// ============================================================================

#[test]
fn test_sweep_isolates_corrupt_reading() {
    let farms = registry();
    let mut ndvi = NdviStore::new();
    let mut alerts = AlertStore::new();

    ndvi.store(vec![reading(1, 0.30, WeatherCondition::Drought)]);
    ndvi.store(vec![reading(2, 1.7, WeatherCondition::Normal)]);
    ndvi.store(vec![reading(3, 0.45, WeatherCondition::PestAttack)]);

    let summary = monitor_all_farms(&farms, &ndvi, &mut alerts);

    assert_eq!(summary.farms_checked, 3);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].farm_id, 2);
    assert_eq!(summary.alerts_generated, 2);
    assert_eq!(alerts.active().len(), 2);
}

#[test]
fn test_repeated_sweep_does_not_duplicate() {
    let farms = registry();
    let mut ndvi = NdviStore::new();
    let mut alerts = AlertStore::new();
    ndvi.store(vec![reading(1, 0.30, WeatherCondition::Flood)]);

    let first = monitor_all_farms(&farms, &ndvi, &mut alerts);
    let second = monitor_all_farms(&farms, &ndvi, &mut alerts);

    assert_eq!(first.alerts_generated, 1);
    assert_eq!(second.alerts_generated, 0);
    assert_eq!(alerts.len(), 1);
}

#[test]
fn test_recovery_resolves_open_alerts() {
    let farms = registry();
    let mut ndvi = NdviStore::new();
    let mut alerts = AlertStore::new();

    ndvi.store(vec![reading(1, 0.30, WeatherCondition::Flood)]);
    monitor_all_farms(&farms, &ndvi, &mut alerts);
    assert_eq!(alerts.active().len(), 1);

    ndvi.store(vec![reading(1, 0.74, WeatherCondition::Recovering)]);
    let summary = monitor_all_farms(&farms, &ndvi, &mut alerts);

    assert_eq!(summary.alerts_resolved, 1);
    assert!(alerts.active().is_empty());
    assert_eq!(alerts.stats().resolved, 1);
}

#[test]
fn test_status_reports_health_distribution() {
    let farms = registry();
    let mut ndvi = NdviStore::new();
    let alerts = AlertStore::new();

    ndvi.store(vec![reading(1, 0.74, WeatherCondition::Normal)]);
    ndvi.store(vec![reading(2, 0.60, WeatherCondition::Normal)]);
    ndvi.store(vec![reading(3, 0.20, WeatherCondition::Flood)]);

    let status = monitoring_status(&farms, &ndvi, &alerts, None);

    assert_eq!(status.total_farms, 4);
    assert_eq!(status.farms_with_data, 3);
    assert_eq!(status.farm_health_distribution.healthy, 1);
    assert_eq!(status.farm_health_distribution.warning, 1);
    assert_eq!(status.farm_health_distribution.severe, 1);
    assert_eq!(status.farm_health_distribution.no_data, 1);
    assert!(status.last_check.is_none());
}

#[test]
fn test_test_alert_is_tagged() {
    let farms = registry();
    let mut alerts = AlertStore::new();

    let alert = generate_test_alert(&farms, &mut alerts, 2, AlertSeverity::High).unwrap();
    assert!(alert.metadata.is_test);
    assert_eq!(alert.status, AlertStatus::Active);
    assert_eq!(alert.severity, AlertSeverity::High);

    assert_eq!(
        generate_test_alert(&farms, &mut alerts, 99, AlertSeverity::High).unwrap_err(),
        MonitorError::FarmNotFound(99)
    );
}
