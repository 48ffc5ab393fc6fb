//! Configuration management for the Crop Insurance NDVI Monitor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CIM_ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Longest history that can be simulated in one run
pub const MAX_SIMULATION_DAYS: u32 = 365;

/// Monitoring sweep interval in demo mode: 5 minutes
pub const DEMO_MONITORING_INTERVAL_SECS: u64 = 5 * 60;

/// Monitoring sweep interval in production: 3 days
pub const PRODUCTION_MONITORING_INTERVAL_SECS: u64 = 3 * 24 * 60 * 60;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Scheduled NDVI monitoring
    pub monitoring: MonitoringConfig,

    /// NDVI simulation settings
    pub simulation: SimulationConfig,

    /// Farm reference data source
    pub farms: FarmsConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitoringConfig {
    /// Whether the scheduled sweep runs at all
    pub enabled: bool,

    /// Seconds between sweeps
    pub interval_secs: u64,
}

impl MonitoringConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Days of history generated per farm when none is requested
    pub default_days: u32,

    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,

    /// Generate a history for every farm at startup
    pub seed_on_startup: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FarmsConfig {
    /// JSON file with farm records; the built-in farms are used when unset
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CIM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("monitoring.enabled", true)?
            .set_default(
                "monitoring.interval_secs",
                default_interval_secs(&environment),
            )?
            .set_default("simulation.default_days", 60)?
            .set_default("simulation.seed_on_startup", true)?
            .set_default("logging.format", "pretty")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CIM_ prefix)
            .add_source(
                Environment::with_prefix("CIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let days = self.simulation.default_days;
        if !(1..=MAX_SIMULATION_DAYS).contains(&days) {
            return Err(ConfigError::Message(format!(
                "simulation.default_days must be between 1 and {}, got {}",
                MAX_SIMULATION_DAYS, days
            )));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn default_interval_secs(environment: &str) -> u64 {
    if environment == "production" {
        PRODUCTION_MONITORING_INTERVAL_SECS
    } else {
        DEMO_MONITORING_INTERVAL_SECS
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            monitoring: MonitoringConfig::default(),
            simulation: SimulationConfig::default(),
            farms: FarmsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEMO_MONITORING_INTERVAL_SECS,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_days: 60,
            seed: None,
            seed_on_startup: true,
        }
    }
}
