//! WebAssembly module for the Crop Insurance NDVI Monitor
//!
//! Provides client-side computation for:
//! - Crop health classification against a farm baseline
//! - Expected NDVI from the soybean growth curve
//! - Farm record validation before upload

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str("crop insurance monitor wasm loaded"));
}

fn parse_date(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", value, e)))
}

/// Today's date from the browser clock
#[cfg(target_arch = "wasm32")]
fn browser_today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("Browser clock returned an invalid date"))
}

/// Assess crop health; returns the assessment as JSON
#[wasm_bindgen]
pub fn assess_health_json(current_ndvi: f64, baseline_ndvi: f64) -> Result<String, JsValue> {
    validate_ndvi_value(current_ndvi).map_err(JsValue::from_str)?;
    validate_baseline_ndvi(baseline_ndvi).map_err(JsValue::from_str)?;

    serde_json::to_string(&assess_ndvi_health(current_ndvi, baseline_ndvi))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Health status label: healthy, warning, critical or severe
#[wasm_bindgen]
pub fn health_status(current_ndvi: f64, baseline_ndvi: f64) -> String {
    HealthStatus::from_drop_percentage(drop_percentage(current_ndvi, baseline_ndvi)).to_string()
}

/// Map marker color for a reading
#[wasm_bindgen]
pub fn health_color(current_ndvi: f64, baseline_ndvi: f64) -> String {
    HealthStatus::from_drop_percentage(drop_percentage(current_ndvi, baseline_ndvi))
        .color()
        .to_string()
}

/// Percent below baseline, rounded to two decimals
#[wasm_bindgen]
pub fn ndvi_drop_percentage(current_ndvi: f64, baseline_ndvi: f64) -> f64 {
    if baseline_ndvi <= 0.0 {
        return 0.0;
    }
    round2(drop_percentage(current_ndvi, baseline_ndvi))
}

/// Whether a reading would auto-resolve a farm's open alerts
#[wasm_bindgen]
pub fn is_recovered(current_ndvi: f64, baseline_ndvi: f64) -> bool {
    has_recovered(current_ndvi, baseline_ndvi)
}

/// Expected NDVI on `date` for a crop sown on `sowing_date` (both YYYY-MM-DD)
#[wasm_bindgen]
pub fn expected_ndvi(sowing_date: &str, date: &str, baseline_ndvi: f64) -> Result<f64, JsValue> {
    let days = (parse_date(date)? - parse_date(sowing_date)?).num_days();
    Ok(growth_curve_ndvi(days, baseline_ndvi))
}

/// Expected NDVI today according to the browser clock
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn expected_ndvi_today(sowing_date: &str, baseline_ndvi: f64) -> Result<f64, JsValue> {
    let days = (browser_today()? - parse_date(sowing_date)?).num_days();
    Ok(growth_curve_ndvi(days, baseline_ndvi))
}

/// Growth stage label for a crop `days_since_sowing` days old
#[wasm_bindgen]
pub fn growth_stage(days_since_sowing: i32) -> String {
    GrowthStage::from_days_since_sowing(days_since_sowing as i64).to_string()
}

/// Validate a farm record; returns an error message when invalid
#[wasm_bindgen]
pub fn validate_farm_json(farm_json: &str) -> Result<(), JsValue> {
    let farm: Farm = serde_json::from_str(farm_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid farm JSON: {}", e)))?;
    validate_farm(&farm).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate an Indian mobile number
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_indian_phone(phone).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_tiers() {
        assert_eq!(health_status(0.74, 0.75), "healthy");
        assert_eq!(health_status(0.60, 0.75), "warning");
        assert_eq!(health_status(0.45, 0.75), "critical");
        assert_eq!(health_status(0.30, 0.75), "severe");
    }

    #[test]
    fn test_drop_percentage() {
        assert_eq!(ndvi_drop_percentage(0.30, 0.75), 60.0);
        assert_eq!(ndvi_drop_percentage(0.5, 0.0), 0.0);
        assert!(ndvi_drop_percentage(0.8, 0.75) < 0.0);
    }

    #[test]
    fn test_expected_ndvi_peaks_at_flowering() {
        let ndvi = expected_ndvi("2025-07-15", "2025-09-20", 0.75).unwrap();
        assert_eq!(ndvi, 0.75);
        assert_eq!(expected_ndvi("2025-07-15", "2025-07-01", 0.75).unwrap(), 0.2);
    }

    #[test]
    fn test_growth_stage_labels() {
        assert_eq!(growth_stage(-3), "Pre-sowing");
        assert_eq!(growth_stage(70), "Flowering/Pod");
        assert_eq!(growth_stage(200), "Post-harvest");
    }

    #[test]
    fn test_recovery_threshold() {
        assert!(is_recovered(0.61, 0.75));
        assert!(!is_recovered(0.39, 0.5));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+91-9876543210"));
        assert!(!is_valid_phone("12345"));
    }
}
