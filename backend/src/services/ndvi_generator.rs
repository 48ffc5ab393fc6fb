//! Synthetic NDVI time series generation
//!
//! Produces daily readings that follow the soybean growth curve with a little
//! noise, and perturbs existing series with disaster scenarios.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{
    growth_curve_ndvi, DisasterEvent, DisasterImpact, DisasterType, Farm, NdviMetadata, NdviPoint,
    WeatherCondition, SIMULATED_NDVI_MAX, SIMULATED_NDVI_MIN,
};

/// Half-width of the uniform noise added to each reading
const NOISE_AMPLITUDE: f64 = 0.05;

/// Days after a disaster window that are tagged as recovering
pub const RECOVERY_DAYS: usize = 15;

/// Recovery never lifts a reading above this
const RECOVERY_CAP: f64 = 0.85;

/// NDVI series generator over an injected random source
pub struct NdviGenerator<R: Rng = StdRng> {
    rng: R,
}

impl NdviGenerator<StdRng> {
    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from `seed` when given, otherwise from OS entropy
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(StdRng::from_entropy()),
        }
    }
}

impl<R: Rng> NdviGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One reading per day from `today - days_history` to `today` inclusive
    pub fn generate_series(
        &mut self,
        farm: &Farm,
        days_history: u32,
        today: NaiveDate,
    ) -> Vec<NdviPoint> {
        (0..=days_history as i64)
            .rev()
            .map(|days_ago| {
                let date = today - Duration::days(days_ago);
                self.generate_point(farm, date)
            })
            .collect()
    }

    fn generate_point(&mut self, farm: &Farm, date: NaiveDate) -> NdviPoint {
        let days_since_sowing = (date - farm.sowing_date).num_days();
        let expected = growth_curve_ndvi(days_since_sowing, farm.baseline_ndvi);

        let noise = (self.rng.gen::<f64>() - 0.5) * 2.0 * NOISE_AMPLITUDE;
        let ndvi = round3((expected + noise).clamp(SIMULATED_NDVI_MIN, SIMULATED_NDVI_MAX));

        NdviPoint {
            farm_id: farm.id,
            timestamp: date,
            ndvi,
            weather_condition: WeatherCondition::Normal,
            satellite_image_url: NdviPoint::satellite_image_url(farm.id, date),
            metadata: NdviMetadata {
                cloud_cover: self.rng.gen_range(0.0..20.0),
                temperature: self.rng.gen_range(25.0..35.0),
                rainfall: self.rng.gen_range(0.0..5.0),
            },
        }
    }

    /// Apply a disaster to a contiguous window of `series`, then a recovery tail.
    ///
    /// `series` must be in ascending timestamp order. The window ends
    /// `start_day` points before the last one and spans `duration` points,
    /// clamped to the series. An empty window leaves the series untouched.
    pub fn inject_disaster_event(
        &mut self,
        series: &mut [NdviPoint],
        event: &DisasterEvent,
    ) -> DisasterImpact {
        let len = series.len();
        let start = len.saturating_sub(event.start_day.saturating_add(event.duration));
        let end = len.saturating_sub(event.start_day);

        if start >= end {
            return DisasterImpact::default();
        }

        for (day_in_window, point) in series[start..end].iter_mut().enumerate() {
            self.apply_disaster(point, event, day_in_window);
        }

        let recovery_end = (end + RECOVERY_DAYS).min(len);
        for (position, point) in series[end..recovery_end].iter_mut().enumerate() {
            let progress = position as f64 / RECOVERY_DAYS as f64;
            let boost = event.severity * 0.2 * progress;
            point.ndvi = (point.ndvi + boost).min(RECOVERY_CAP);
            point.weather_condition = WeatherCondition::Recovering;
        }

        DisasterImpact {
            affected_points: end - start,
            recovery_points: recovery_end - end,
        }
    }

    fn apply_disaster(&mut self, point: &mut NdviPoint, event: &DisasterEvent, day_in_window: usize) {
        point.weather_condition = event.disaster_type.weather_condition();

        match event.disaster_type {
            DisasterType::Flood => {
                // Sudden drop
                point.ndvi = (point.ndvi - event.severity * 0.5).max(0.2);
                point.metadata.rainfall = self.rng.gen_range(100.0..200.0);
            }
            DisasterType::Drought => {
                // Gradual decline across the window
                let progress = day_in_window as f64 / event.duration as f64;
                point.ndvi = (point.ndvi - event.severity * 0.4 * progress).max(0.2);
                point.metadata.rainfall = 0.0;
                point.metadata.temperature = self.rng.gen_range(35.0..40.0);
            }
            DisasterType::Pest => {
                point.ndvi = (point.ndvi - event.severity * 0.3).max(0.3);
            }
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
