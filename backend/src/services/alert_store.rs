//! In-memory crop health alert storage
//!
//! Holds the alert lifecycle (active -> acknowledged/resolved) and keeps at
//! most one active alert per farm and severity.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    has_recovered, Alert, AlertFilter, AlertStats, AlertStatus, NewAlert, SeverityCounts,
};

/// Number of alerts listed under `recentAlerts` in the stats
const RECENT_ALERTS: usize = 10;

/// Default page size for per-farm alert history
pub const DEFAULT_FARM_ALERT_LIMIT: usize = 50;

/// Rejected operator transition
#[derive(Debug, Error, PartialEq)]
pub enum AlertTransitionError {
    #[error("Alert not found: {0}")]
    NotFound(Uuid),

    #[error("Alert {id} is not active (status: {status})")]
    NotActive { id: Uuid, status: AlertStatus },
}

/// Result of recording an alert
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub alert: Alert,
    /// An active alert for the same farm and severity was refreshed instead
    pub is_duplicate: bool,
}

#[derive(Debug, Default)]
pub struct AlertStore {
    alerts: Vec<Alert>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an alert now, refreshing any active alert with the same farm and severity
    pub fn record(&mut self, new_alert: NewAlert) -> RecordOutcome {
        self.record_at(new_alert, Utc::now())
    }

    pub fn record_at(&mut self, new_alert: NewAlert, now: DateTime<Utc>) -> RecordOutcome {
        if let Some(existing) = self.alerts.iter_mut().find(|a| {
            a.is_active() && a.farm_id == new_alert.farm_id && a.severity == new_alert.severity
        }) {
            existing.timestamp = now;
            existing.current_ndvi = new_alert.current_ndvi;
            existing.drop_percentage = new_alert.drop_percentage;
            existing.message = new_alert.message;

            tracing::debug!(
                alert_id = %existing.id,
                farm_id = existing.farm_id,
                severity = %existing.severity,
                "Refreshed active alert"
            );
            return RecordOutcome {
                alert: existing.clone(),
                is_duplicate: true,
            };
        }

        let alert = Alert::open(new_alert, Uuid::new_v4(), now);
        tracing::info!(
            alert_id = %alert.id,
            farm_id = alert.farm_id,
            severity = %alert.severity,
            "Opened alert"
        );
        self.alerts.push(alert.clone());

        RecordOutcome {
            alert,
            is_duplicate: false,
        }
    }

    /// Alerts matching `filter`, newest first
    pub fn query(&self, filter: &AlertFilter) -> Vec<Alert> {
        // Reverse first so equal timestamps list the later insert first
        let mut results: Vec<Alert> = self
            .alerts
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        results
    }

    pub fn active(&self) -> Vec<Alert> {
        self.query(&AlertFilter {
            status: Some(AlertStatus::Active),
            ..Default::default()
        })
    }

    /// Newest `limit` alerts for a farm
    pub fn farm_alerts(&self, farm_id: u32, limit: usize) -> Vec<Alert> {
        let mut alerts = self.query(&AlertFilter {
            farm_id: Some(farm_id),
            ..Default::default()
        });
        alerts.truncate(limit);
        alerts
    }

    pub fn get(&self, id: Uuid) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Alert, AlertTransitionError> {
        self.alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AlertTransitionError::NotFound(id))
    }

    /// Move an active alert to acknowledged
    pub fn acknowledge(&mut self, id: Uuid) -> Result<Alert, AlertTransitionError> {
        let alert = self.get_mut(id)?;
        if !alert.is_active() {
            return Err(AlertTransitionError::NotActive {
                id,
                status: alert.status,
            });
        }

        alert.status = AlertStatus::Acknowledged;
        alert.acknowledged_at = Some(Utc::now());
        Ok(alert.clone())
    }

    /// Resolve an alert from any state; resolving twice is harmless
    pub fn resolve(&mut self, id: Uuid) -> Result<Alert, AlertTransitionError> {
        let alert = self.get_mut(id)?;
        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(Utc::now());
        Ok(alert.clone())
    }

    /// Resolve every active alert of a farm whose reading is back near baseline.
    ///
    /// Returns how many alerts were resolved.
    pub fn auto_resolve(&mut self, farm_id: u32, current_ndvi: f64, baseline_ndvi: f64) -> usize {
        if !has_recovered(current_ndvi, baseline_ndvi) {
            return 0;
        }

        let now = Utc::now();
        let mut resolved = 0;
        for alert in self
            .alerts
            .iter_mut()
            .filter(|a| a.farm_id == farm_id && a.is_active())
        {
            alert.status = AlertStatus::Resolved;
            alert.resolved_at = Some(now);
            alert.metadata.auto_resolved = Some(true);
            alert.metadata.recovery_ndvi = Some(current_ndvi);
            resolved += 1;
        }

        if resolved > 0 {
            tracing::info!(farm_id, resolved, current_ndvi, "Auto-resolved recovered farm alerts");
        }
        resolved
    }

    pub fn stats(&self) -> AlertStats {
        let mut stats = AlertStats {
            total: self.alerts.len(),
            ..Default::default()
        };
        let mut by_severity = SeverityCounts::default();
        let mut active_by_severity = SeverityCounts::default();

        for alert in &self.alerts {
            by_severity.increment(alert.severity);
            match alert.status {
                AlertStatus::Active => {
                    stats.active += 1;
                    active_by_severity.increment(alert.severity);
                }
                AlertStatus::Acknowledged => stats.acknowledged += 1,
                AlertStatus::Resolved => stats.resolved += 1,
            }
        }

        stats.by_severity = by_severity;
        stats.active_by_severity = active_by_severity;
        stats.recent_alerts = self
            .query(&AlertFilter::default())
            .into_iter()
            .take(RECENT_ALERTS)
            .collect();
        stats
    }

    /// Drop every alert and return how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.alerts.len();
        self.alerts.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertMetadata, AlertSeverity, NDVI_DROP_ALERT_TYPE};
    use chrono::Duration;

    fn new_alert(farm_id: u32, severity: AlertSeverity, current_ndvi: f64) -> NewAlert {
        NewAlert {
            farm_id,
            farmer_name: format!("farmer {}", farm_id),
            alert_type: NDVI_DROP_ALERT_TYPE.to_string(),
            severity,
            current_ndvi,
            baseline_ndvi: 0.75,
            drop_percentage: 30.0,
            message: format!("ndvi {}", current_ndvi),
            estimated_cause: None,
            metadata: AlertMetadata::default(),
        }
    }

    #[test]
    fn test_different_severity_is_separate_alert() {
        let mut store = AlertStore::new();
        store.record(new_alert(1, AlertSeverity::High, 0.5));
        let outcome = store.record(new_alert(1, AlertSeverity::Critical, 0.3));

        assert!(!outcome.is_duplicate);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_acknowledged_alert_does_not_absorb_new_alert() {
        let mut store = AlertStore::new();
        let first = store.record(new_alert(1, AlertSeverity::High, 0.5)).alert;
        store.acknowledge(first.id).unwrap();

        let second = store.record(new_alert(1, AlertSeverity::High, 0.45));
        assert!(!second.is_duplicate);
        assert_ne!(second.alert.id, first.id);
    }

    #[test]
    fn test_query_newest_first_with_filters() {
        let mut store = AlertStore::new();
        let t0 = Utc::now();
        store.record_at(new_alert(1, AlertSeverity::High, 0.5), t0);
        store.record_at(new_alert(2, AlertSeverity::Medium, 0.6), t0 + Duration::seconds(5));
        store.record_at(new_alert(3, AlertSeverity::High, 0.4), t0 + Duration::seconds(10));

        let all = store.query(&AlertFilter::default());
        let farms: Vec<u32> = all.iter().map(|a| a.farm_id).collect();
        assert_eq!(farms, vec![3, 2, 1]);

        let high = store.query(&AlertFilter {
            severity: Some(AlertSeverity::High),
            ..Default::default()
        });
        assert_eq!(high.len(), 2);
    }

    #[test]
    fn test_equal_timestamps_list_latest_insert_first() {
        let mut store = AlertStore::new();
        let now = Utc::now();
        store.record_at(new_alert(1, AlertSeverity::High, 0.5), now);
        store.record_at(new_alert(2, AlertSeverity::High, 0.5), now);

        let farms: Vec<u32> = store.active().iter().map(|a| a.farm_id).collect();
        assert_eq!(farms, vec![2, 1]);
    }

    #[test]
    fn test_acknowledge_requires_active() {
        let mut store = AlertStore::new();
        let alert = store.record(new_alert(1, AlertSeverity::High, 0.5)).alert;

        let acked = store.acknowledge(alert.id).unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert!(acked.acknowledged_at.is_some());

        assert_eq!(
            store.acknowledge(alert.id),
            Err(AlertTransitionError::NotActive {
                id: alert.id,
                status: AlertStatus::Acknowledged
            })
        );

        let missing = Uuid::new_v4();
        assert_eq!(
            store.acknowledge(missing),
            Err(AlertTransitionError::NotFound(missing))
        );
    }

    #[test]
    fn test_resolve_from_acknowledged() {
        let mut store = AlertStore::new();
        let alert = store.record(new_alert(1, AlertSeverity::High, 0.5)).alert;
        store.acknowledge(alert.id).unwrap();

        let resolved = store.resolve(alert.id).unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
        assert!(store.resolve(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_auto_resolve_below_threshold_does_nothing() {
        let mut store = AlertStore::new();
        store.record(new_alert(1, AlertSeverity::High, 0.5));

        assert_eq!(store.auto_resolve(1, 0.5, 0.75), 0);
        assert_eq!(store.active().len(), 1);
    }

    #[test]
    fn test_auto_resolve_only_touches_farm() {
        let mut store = AlertStore::new();
        store.record(new_alert(1, AlertSeverity::High, 0.5));
        store.record(new_alert(1, AlertSeverity::Critical, 0.3));
        store.record(new_alert(2, AlertSeverity::High, 0.5));

        assert_eq!(store.auto_resolve(1, 0.7, 0.75), 2);

        let farm_one = store.farm_alerts(1, DEFAULT_FARM_ALERT_LIMIT);
        assert!(farm_one.iter().all(|a| a.status == AlertStatus::Resolved));
        assert!(farm_one
            .iter()
            .all(|a| a.metadata.auto_resolved == Some(true) && a.metadata.recovery_ndvi == Some(0.7)));
        assert_eq!(store.active().len(), 1);
    }

    #[test]
    fn test_stats_counts() {
        let mut store = AlertStore::new();
        let a = store.record(new_alert(1, AlertSeverity::High, 0.5)).alert;
        let b = store.record(new_alert(2, AlertSeverity::Critical, 0.3)).alert;
        store.record(new_alert(3, AlertSeverity::Medium, 0.6));
        store.acknowledge(a.id).unwrap();
        store.resolve(b.id).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.acknowledged, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.by_severity.total(), 3);
        assert_eq!(stats.active_by_severity.medium, 1);
        assert_eq!(stats.active_by_severity.total(), 1);
        assert_eq!(stats.recent_alerts.len(), 3);
    }

    #[test]
    fn test_farm_alerts_limit_and_clear() {
        let mut store = AlertStore::new();
        for farm_id in [1, 1, 1] {
            let alert = store.record(new_alert(farm_id, AlertSeverity::High, 0.5)).alert;
            store.resolve(alert.id).unwrap();
        }
        assert_eq!(store.farm_alerts(1, 2).len(), 2);
        assert_eq!(store.clear(), 3);
        assert!(store.is_empty());
    }
}
