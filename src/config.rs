//! Configuration Module
//!
//! Handles loading container sizing from environment variables.

use std::env;
use std::time::Duration;

use crate::check::{require_non_blank, require_positive};
use crate::error::{ContainerError, Result};

/// Container configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Label attached to log output for this cache instance
    pub cache_name: String,
    /// Maximum number of entries a cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for expiring caches
    pub default_ttl_ms: u64,
    /// Maximum number of entries an indexed heap can hold
    pub heap_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAME` - Instance label (default: "default")
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 24 hours)
    /// - `HEAP_CAPACITY` - Maximum heap entries (default: 1024)
    ///
    /// Unparseable values fall back to the default. Call [`Config::validate`]
    /// to reject blank names and zero capacities.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_name: env::var("CACHE_NAME").unwrap_or(defaults.cache_name),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            heap_capacity: env::var("HEAP_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.heap_capacity),
        }
    }

    /// Checks that every required value is present and positive.
    pub fn validate(&self) -> Result<()> {
        require_non_blank("cache_name", &self.cache_name)?;
        require_positive("max_entries", self.max_entries)?;
        require_positive("heap_capacity", self.heap_capacity)?;
        if self.default_ttl_ms == 0 {
            return Err(ContainerError::InvalidArgument(
                "default_ttl_ms must be positive, got 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_name: "default".to_string(),
            max_entries: 1000,
            default_ttl_ms: 24 * 60 * 60 * 1000,
            heap_capacity: 1024,
        }
    }
}
