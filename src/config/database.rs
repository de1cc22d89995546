//! Storage configuration
//!
//! The service runs against PostgreSQL, or entirely in process memory for
//! local development and demos.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, ignored when `in_memory` is set
    pub url: String,
    /// Keep all state in process memory (development only)
    pub in_memory: bool,
    /// Apply the bundled migrations on startup
    pub run_migrations: bool,
    pub pool: PoolConfig,
}

/// Connection pool sizing and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// # Errors
    ///
    /// Nothing is checked for in-memory storage. Otherwise the URL must be a
    /// PostgreSQL URL and the pool must be sized sensibly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.in_memory {
            return Ok(());
        }
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("NEXUS__DATABASE__URL"));
        }
        match self.url.split_once("://") {
            Some(("postgres" | "postgresql", rest)) if !rest.is_empty() => {}
            _ => return Err(ValidationError::InvalidDatabaseUrl),
        }
        self.pool.validate()
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 2,
            max_connections: 10,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}
