//! Domain models for the crop insurance monitor

mod alert;
mod farm;
mod health;
mod ndvi;

pub use alert::*;
pub use farm::*;
pub use health::*;
pub use ndvi::*;
