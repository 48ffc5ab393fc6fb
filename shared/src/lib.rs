//! Shared types and models for the Crop Insurance NDVI Monitor
//!
//! This crate contains the domain models and pure crop-health logic shared
//! between the backend and the dashboard (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
