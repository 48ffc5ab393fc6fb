//! Business logic services for the Crop Insurance NDVI Monitor

pub mod alert_store;
pub mod farm;
pub mod monitor;
pub mod ndvi_generator;
pub mod ndvi_store;

pub use alert_store::AlertStore;
pub use farm::FarmRegistry;
pub use ndvi_generator::NdviGenerator;
pub use ndvi_store::NdviStore;
