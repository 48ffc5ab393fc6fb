//! Scheduled crop health sweep.

use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::AppState;

/// Runs the NDVI monitoring sweep on the configured interval.
pub struct NdviMonitoringJob {
    state: AppState,
    frequency: JobFrequency,
}

impl NdviMonitoringJob {
    pub fn new(state: AppState) -> Self {
        let frequency = JobFrequency::from_secs(state.config.monitoring.interval().as_secs());
        Self { state, frequency }
    }
}

#[async_trait::async_trait]
impl Job for NdviMonitoringJob {
    fn name(&self) -> &'static str {
        "ndvi_monitoring"
    }

    fn frequency(&self) -> JobFrequency {
        self.frequency
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self.state.run_monitoring_sweep().await;

        // Per-farm failures are reported in the summary, not as a job failure
        info!(
            job = self.name(),
            farms_checked = summary.farms_checked,
            new_alerts = summary.alerts_generated,
            farm_errors = summary.errors.len(),
            "Scheduled monitoring sweep finished"
        );
        Ok(())
    }
}
