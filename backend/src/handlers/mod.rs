//! HTTP handlers for the Crop Insurance NDVI Monitor API

pub mod alerts;
pub mod divisions;
pub mod farms;
pub mod health;
pub mod monitoring;
pub mod ndvi;

pub use alerts::*;
pub use divisions::*;
pub use farms::*;
pub use health::*;
pub use monitoring::*;
pub use ndvi::*;

use axum::{body::Bytes, Json};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

/// Parse an optional JSON body; a missing or blank body yields `T::default()`
pub fn json_or_default<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        AppError::ValidationError(format!("Failed to parse the request body as JSON: {}", e))
    })
}

/// Success envelope: `{"success": true, ...body}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

/// `{count, data}` list body
#[derive(Debug, Serialize)]
pub struct ListBody<T: Serialize> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> From<Vec<T>> for ListBody<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// `{data}` single-item body
#[derive(Debug, Serialize)]
pub struct DataBody<T: Serialize> {
    pub data: T,
}

/// `{message, clearedCount}` body returned by the clear endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedBody {
    pub message: String,
    pub cleared_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Body {
        days: Option<u32>,
    }

    #[test]
    fn test_blank_body_uses_default() {
        assert_eq!(json_or_default::<Body>(&Bytes::new()).unwrap(), Body::default());
        assert_eq!(
            json_or_default::<Body>(&Bytes::from_static(b" \n")).unwrap(),
            Body::default()
        );
    }

    #[test]
    fn test_body_is_parsed() {
        let body = json_or_default::<Body>(&Bytes::from_static(b"{\"days\": 7}")).unwrap();
        assert_eq!(body.days, Some(7));
    }

    #[test]
    fn test_malformed_body_is_validation_error() {
        let err = json_or_default::<Body>(&Bytes::from_static(b"{\"days\": ")).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
