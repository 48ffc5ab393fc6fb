//! Alert lifecycle tests
//!
//! Property-based and unit tests for:
//! - Deduplication of active alerts per farm and severity
//! - Acknowledge / resolve transitions
//! - Auto-resolution once a farm recovers
//! - Query ordering and statistics

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use cim_backend::models::{
    AlertFilter, AlertMetadata, AlertSeverity, AlertStatus, NewAlert, NDVI_DROP_ALERT_TYPE,
    RECOVERY_RATIO,
};
use cim_backend::services::alert_store::AlertTransitionError;
use cim_backend::services::AlertStore;

fn new_alert(farm_id: u32, severity: AlertSeverity, current_ndvi: f64) -> NewAlert {
    NewAlert {
        farm_id,
        farmer_name: format!("farmer {}", farm_id),
        alert_type: NDVI_DROP_ALERT_TYPE.to_string(),
        severity,
        current_ndvi,
        baseline_ndvi: 0.75,
        drop_percentage: (0.75 - current_ndvi) / 0.75 * 100.0,
        message: format!("NDVI at {}", current_ndvi),
        estimated_cause: None,
        metadata: AlertMetadata::default(),
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn severity_strategy() -> impl Strategy<Value = AlertSeverity> {
    prop_oneof![
        Just(AlertSeverity::Low),
        Just(AlertSeverity::Medium),
        Just(AlertSeverity::High),
        Just(AlertSeverity::Critical),
    ]
}

fn alert_input_strategy() -> impl Strategy<Value = (u32, AlertSeverity, f64)> {
    (1u32..=4, severity_strategy(), 0.1f64..0.7)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_at_most_one_active_alert_per_farm_and_severity(
        inputs in prop::collection::vec(alert_input_strategy(), 1..40),
    ) {
        let mut store = AlertStore::new();
        for (farm_id, severity, ndvi) in inputs {
            store.record(new_alert(farm_id, severity, ndvi));
        }

        let active = store.active();
        for (i, a) in active.iter().enumerate() {
            for b in &active[i + 1..] {
                prop_assert!(!(a.farm_id == b.farm_id && a.severity == b.severity));
            }
        }
    }

    #[test]
    fn prop_recovered_reading_clears_farm_alerts(
        inputs in prop::collection::vec(alert_input_strategy(), 1..20),
        farm_id in 1u32..=4,
        baseline in 0.3f64..0.9,
        headroom in 0.0f64..0.2,
    ) {
        let mut store = AlertStore::new();
        for (id, severity, ndvi) in inputs {
            store.record(new_alert(id, severity, ndvi));
        }
        let others_before = store
            .active()
            .iter()
            .filter(|a| a.farm_id != farm_id)
            .count();

        let recovered_ndvi = baseline * RECOVERY_RATIO + headroom;
        store.auto_resolve(farm_id, recovered_ndvi, baseline);

        let active = store.active();
        prop_assert!(active.iter().all(|a| a.farm_id != farm_id));
        prop_assert_eq!(active.len(), others_before);
    }

    #[test]
    fn prop_query_is_newest_first(
        offsets in prop::collection::vec(0i64..10_000, 1..30),
    ) {
        let base = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let mut store = AlertStore::new();
        for (i, offset) in offsets.iter().enumerate() {
            // Distinct farms so nothing is deduplicated
            store.record_at(
                new_alert(i as u32 + 1, AlertSeverity::High, 0.4),
                base + Duration::seconds(*offset),
            );
        }

        let alerts = store.query(&AlertFilter::default());
        prop_assert_eq!(alerts.len(), offsets.len());
        for pair in alerts.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn test_duplicate_refreshes_existing_alert() {
    let mut store = AlertStore::new();
    let first_at = Utc.with_ymd_and_hms(2025, 9, 1, 6, 0, 0).unwrap();
    let second_at = first_at + Duration::minutes(5);

    let first = store.record_at(new_alert(1, AlertSeverity::Critical, 0.30), first_at);
    let second = store.record_at(new_alert(1, AlertSeverity::Critical, 0.25), second_at);

    assert!(!first.is_duplicate);
    assert!(second.is_duplicate);
    assert_eq!(store.len(), 1);

    let stored = store.get(first.alert.id).unwrap();
    assert_eq!(stored.id, second.alert.id);
    assert_eq!(stored.timestamp, second_at);
    assert_eq!(stored.current_ndvi, 0.25);
    assert_eq!(stored.message, "NDVI at 0.25");
}

#[test]
fn test_different_severity_opens_new_alert() {
    let mut store = AlertStore::new();
    store.record(new_alert(1, AlertSeverity::High, 0.45));
    store.record(new_alert(1, AlertSeverity::Critical, 0.30));

    assert_eq!(store.len(), 2);
    assert_eq!(store.active().len(), 2);
}

#[test]
fn test_acknowledged_alert_is_not_deduplicated() {
    let mut store = AlertStore::new();
    let first = store.record(new_alert(2, AlertSeverity::Medium, 0.6)).alert;
    store.acknowledge(first.id).unwrap();

    let second = store.record(new_alert(2, AlertSeverity::Medium, 0.6));
    assert!(!second.is_duplicate);
    assert_ne!(second.alert.id, first.id);
    assert_eq!(store.len(), 2);
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn test_acknowledge_requires_active() {
    let mut store = AlertStore::new();
    let alert = store.record(new_alert(1, AlertSeverity::High, 0.4)).alert;

    let acknowledged = store.acknowledge(alert.id).unwrap();
    assert_eq!(acknowledged.status, AlertStatus::Acknowledged);
    assert!(acknowledged.acknowledged_at.is_some());

    let err = store.acknowledge(alert.id).unwrap_err();
    assert_eq!(
        err,
        AlertTransitionError::NotActive {
            id: alert.id,
            status: AlertStatus::Acknowledged,
        }
    );
}

#[test]
fn test_resolve_twice_is_harmless() {
    let mut store = AlertStore::new();
    let alert = store.record(new_alert(3, AlertSeverity::Critical, 0.2)).alert;

    let once = store.resolve(alert.id).unwrap();
    let twice = store.resolve(alert.id).unwrap();

    assert_eq!(once.status, AlertStatus::Resolved);
    assert_eq!(twice.status, AlertStatus::Resolved);
    assert!(twice.resolved_at.is_some());
}

#[test]
fn test_unknown_alert_id() {
    let mut store = AlertStore::new();
    let id = uuid::Uuid::new_v4();

    assert_eq!(
        store.resolve(id).unwrap_err(),
        AlertTransitionError::NotFound(id)
    );
    assert!(store.get(id).is_none());
}

#[test]
fn test_auto_resolve_tags_metadata() {
    let mut store = AlertStore::new();
    let alert = store.record(new_alert(4, AlertSeverity::High, 0.4)).alert;

    assert_eq!(store.auto_resolve(4, 0.5, 0.75), 0);
    assert_eq!(store.auto_resolve(4, 0.7, 0.75), 1);

    let resolved = store.get(alert.id).unwrap();
    assert_eq!(resolved.status, AlertStatus::Resolved);
    assert_eq!(resolved.metadata.auto_resolved, Some(true));
    assert_eq!(resolved.metadata.recovery_ndvi, Some(0.7));
}

// ============================================================================
// Queries & Stats
// ============================================================================

#[test]
fn test_farm_alerts_respects_limit() {
    let mut store = AlertStore::new();
    for severity in [
        AlertSeverity::Low,
        AlertSeverity::Medium,
        AlertSeverity::High,
        AlertSeverity::Critical,
    ] {
        store.record(new_alert(1, severity, 0.3));
    }
    store.record(new_alert(2, AlertSeverity::High, 0.3));

    assert_eq!(store.farm_alerts(1, 50).len(), 4);
    assert_eq!(store.farm_alerts(1, 2).len(), 2);
    assert!(store.farm_alerts(9, 50).is_empty());
}

#[test]
fn test_stats_count_by_status_and_severity() {
    let mut store = AlertStore::new();
    let a = store.record(new_alert(1, AlertSeverity::Critical, 0.2)).alert;
    let b = store.record(new_alert(2, AlertSeverity::High, 0.4)).alert;
    store.record(new_alert(3, AlertSeverity::High, 0.4));
    store.acknowledge(a.id).unwrap();
    store.resolve(b.id).unwrap();

    let stats = store.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.acknowledged, 1);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.by_severity.high, 2);
    assert_eq!(stats.by_severity.critical, 1);
    assert_eq!(stats.active_by_severity.total(), 1);
    assert_eq!(stats.recent_alerts.len(), 3);

    assert_eq!(store.clear(), 3);
    assert!(store.is_empty());
}
