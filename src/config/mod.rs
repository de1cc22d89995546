//! Application configuration module
//!
//! Configuration is read from environment variables (and a `.env` file in
//! development) with the `NEXUS` prefix. Nested values use a double
//! underscore, e.g. `NEXUS__DATABASE__URL`.
//!
//! # Example
//!
//! ```no_run
//! use nexus_pipeline::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod pipeline;
mod server;

pub use database::{DatabaseConfig, PoolConfig};
pub use error::{ConfigError, ValidationError};
pub use pipeline::PipelineConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "NEXUS";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection or in-memory mode)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `NEXUS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `NEXUS__DATABASE__URL=...` -> `database.url = ...`
    /// - `NEXUS__PIPELINE__AUTO_RESTART=false` -> `pipeline.auto_restart = false`
    /// - `NEXUS__PIPELINE__CLAIM_LEASE_SECS=60` -> `pipeline.claim_lease_secs = 60`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid, or if
    /// in-memory storage is requested in production.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.pipeline.validate()?;
        if self.database.in_memory && self.is_production() {
            return Err(ValidationError::InMemoryInProduction);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
