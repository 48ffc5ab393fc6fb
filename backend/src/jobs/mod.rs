//! Background job scheduler and job implementations.

mod ndvi_monitoring;
mod scheduler;

pub use ndvi_monitoring::NdviMonitoringJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
