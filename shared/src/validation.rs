//! Validation utilities for farm records and NDVI inputs
//!
//! Includes India-specific checks for farmer contact details.

use thiserror::Error;
use validator::Validate;

use crate::models::{DisasterEvent, Farm};
use crate::types::GeoPoint;

// ============================================================================
// NDVI Validations
// ============================================================================

/// Validate an NDVI reading is a finite value in [0, 1]
pub fn validate_ndvi_value(ndvi: f64) -> Result<(), &'static str> {
    if !ndvi.is_finite() {
        return Err("NDVI value must be a finite number");
    }
    if !(0.0..=1.0).contains(&ndvi) {
        return Err("NDVI value must be between 0 and 1");
    }
    Ok(())
}

/// Validate a baseline NDVI lies strictly inside (0, 1)
pub fn validate_baseline_ndvi(baseline: f64) -> Result<(), &'static str> {
    if !baseline.is_finite() || baseline <= 0.0 || baseline >= 1.0 {
        return Err("Baseline NDVI must be greater than 0 and less than 1");
    }
    Ok(())
}

/// Validate disaster severity is within [0, 1]
pub fn validate_disaster_severity(severity: f64) -> Result<(), &'static str> {
    if !severity.is_finite() || !(0.0..=1.0).contains(&severity) {
        return Err("Severity must be between 0 and 1");
    }
    Ok(())
}

/// Validate disaster window parameters
pub fn validate_disaster_event(event: &DisasterEvent) -> Result<(), &'static str> {
    validate_disaster_severity(event.severity)?;
    if event.duration > 365 {
        return Err("Disaster duration must be at most 365 days");
    }
    Ok(())
}

// ============================================================================
// Farm Validations
// ============================================================================

/// Validate a farm boundary polygon
pub fn validate_polygon(polygon: &[GeoPoint]) -> Result<(), &'static str> {
    if polygon.len() < 3 {
        return Err("Polygon must have at least 3 points");
    }
    for point in polygon {
        if !(-90.0..=90.0).contains(&point.latitude()) {
            return Err("Polygon latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&point.longitude()) {
            return Err("Polygon longitude must be between -180 and 180");
        }
    }
    Ok(())
}

/// Why a farm record was rejected
#[derive(Debug, Error, PartialEq)]
pub enum FarmValidationError {
    #[error("farm {farm_id}: {message}")]
    Invalid { farm_id: u32, message: String },

    #[error("duplicate farm id {0}")]
    DuplicateId(u32),
}

impl FarmValidationError {
    fn invalid(farm: &Farm, message: impl Into<String>) -> Self {
        FarmValidationError::Invalid {
            farm_id: farm.id,
            message: message.into(),
        }
    }
}

/// Validate a single farm record before it enters the registry
pub fn validate_farm(farm: &Farm) -> Result<(), FarmValidationError> {
    farm.validate()
        .map_err(|e| FarmValidationError::invalid(farm, e.to_string()))?;
    validate_baseline_ndvi(farm.baseline_ndvi).map_err(|e| FarmValidationError::invalid(farm, e))?;
    validate_polygon(&farm.polygon).map_err(|e| FarmValidationError::invalid(farm, e))?;

    if farm.area.is_sign_negative() {
        return Err(FarmValidationError::invalid(farm, "Area cannot be negative"));
    }
    if let Some(harvest) = farm.expected_harvest_date {
        if harvest < farm.sowing_date {
            return Err(FarmValidationError::invalid(
                farm,
                "Expected harvest date cannot precede sowing date",
            ));
        }
    }
    if let Some(contact) = &farm.contact_info {
        validate_indian_phone(&contact.phone).map_err(|e| FarmValidationError::invalid(farm, e))?;
        if let Some(aadhar) = &contact.aadhar {
            validate_aadhar(aadhar).map_err(|e| FarmValidationError::invalid(farm, e))?;
        }
    }
    if let Some(pincode) = &farm.administrative_data.pincode {
        validate_pincode(pincode).map_err(|e| FarmValidationError::invalid(farm, e))?;
    }
    Ok(())
}

/// Validate a full farm set: every record valid, ids unique
pub fn validate_farms(farms: &[Farm]) -> Result<(), FarmValidationError> {
    let mut seen = std::collections::HashSet::new();
    for farm in farms {
        validate_farm(farm)?;
        if !seen.insert(farm.id) {
            return Err(FarmValidationError::DuplicateId(farm.id));
        }
    }
    Ok(())
}

// ============================================================================
// India-Specific Validations
// ============================================================================

/// Validate Indian mobile number format
/// Accepts: 9876543210, +91-9876543210, 91 98765 43210
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        10 => digits.as_str(),
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Invalid Indian phone number format"),
    };

    // Mobile numbers start with 6-9
    match local.chars().next() {
        Some('6'..='9') => Ok(()),
        _ => Err("Invalid Indian phone number format"),
    }
}

/// Validate Aadhaar number shape (12 digits, optionally grouped 4-4-4)
pub fn validate_aadhar(aadhar: &str) -> Result<(), &'static str> {
    let digits: String = aadhar.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 12 {
        return Err("Aadhaar number must be 12 digits");
    }
    Ok(())
}

/// Validate Indian postal PIN code (6 digits, first digit 1-9)
pub fn validate_pincode(pincode: &str) -> Result<(), &'static str> {
    if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err("PIN code must be 6 digits");
    }
    if pincode.starts_with('0') {
        return Err("PIN code cannot start with 0");
    }
    Ok(())
}
