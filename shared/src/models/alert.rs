//! Crop health alert models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{HealthStatus, WeatherCondition};

/// Alert type raised when NDVI falls below baseline
pub const NDVI_DROP_ALERT_TYPE: &str = "ndvi_drop";

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "low"),
            AlertSeverity::Medium => write!(f, "medium"),
            AlertSeverity::High => write!(f, "high"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(AlertSeverity::Low),
            "medium" => Ok(AlertSeverity::Medium),
            "high" => Ok(AlertSeverity::High),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(format!(
                "Invalid severity '{}'. Must be one of: low, medium, high, critical",
                other
            )),
        }
    }
}

/// Alert lifecycle: active -> acknowledged | resolved, acknowledged -> resolved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "active"),
            AlertStatus::Acknowledged => write!(f, "acknowledged"),
            AlertStatus::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AlertStatus::Active),
            "acknowledged" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            other => Err(format!(
                "Invalid status '{}'. Must be one of: active, acknowledged, resolved",
                other
            )),
        }
    }
}

/// Context captured with an alert
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_condition: Option<WeatherCondition>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_test: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_resolved: Option<bool>,
    #[serde(rename = "recoveryNDVI", skip_serializing_if = "Option::is_none")]
    pub recovery_ndvi: Option<f64>,
}

/// Data for an alert about to be recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub farm_id: u32,
    pub farmer_name: String,
    pub alert_type: String,
    pub severity: AlertSeverity,
    #[serde(rename = "currentNDVI")]
    pub current_ndvi: f64,
    #[serde(rename = "baselineNDVI")]
    pub baseline_ndvi: f64,
    pub drop_percentage: f64,
    pub message: String,
    pub estimated_cause: Option<String>,
    pub metadata: AlertMetadata,
}

/// A recorded crop health alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub farm_id: u32,
    pub farmer_name: String,
    pub alert_type: String,
    pub severity: AlertSeverity,
    #[serde(rename = "currentNDVI")]
    pub current_ndvi: f64,
    #[serde(rename = "baselineNDVI")]
    pub baseline_ndvi: f64,
    pub drop_percentage: f64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: AlertStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub estimated_cause: Option<String>,
    pub metadata: AlertMetadata,
}

impl Alert {
    /// Build an active alert from recorded data
    pub fn open(new_alert: NewAlert, id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            farm_id: new_alert.farm_id,
            farmer_name: new_alert.farmer_name,
            alert_type: new_alert.alert_type,
            severity: new_alert.severity,
            current_ndvi: new_alert.current_ndvi,
            baseline_ndvi: new_alert.baseline_ndvi,
            drop_percentage: new_alert.drop_percentage,
            message: new_alert.message,
            timestamp,
            status: AlertStatus::Active,
            acknowledged_at: None,
            resolved_at: None,
            estimated_cause: new_alert.estimated_cause,
            metadata: new_alert.metadata,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

/// Optional filters for alert queries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<u32>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.status.map_or(true, |s| alert.status == s)
            && self.severity.map_or(true, |s| alert.severity == s)
            && self.farm_id.map_or(true, |id| alert.farm_id == id)
    }
}

/// Alert counts per severity
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn increment(&mut self, severity: AlertSeverity) {
        match severity {
            AlertSeverity::Critical => self.critical += 1,
            AlertSeverity::High => self.high += 1,
            AlertSeverity::Medium => self.medium += 1,
            AlertSeverity::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Aggregate alert statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertStats {
    pub total: usize,
    pub active: usize,
    pub acknowledged: usize,
    pub resolved: usize,
    pub by_severity: SeverityCounts,
    pub active_by_severity: SeverityCounts,
    pub recent_alerts: Vec<Alert>,
}
