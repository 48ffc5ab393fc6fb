//! Domain models for the Crop Insurance NDVI Monitor
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;
