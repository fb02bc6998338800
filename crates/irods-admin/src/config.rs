//! Configuration for the administration facade.

use crate::Result;
use irods_core::error::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Default per-round-trip timeout (seconds).
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

const fn default_operation_timeout_secs() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

/// Configuration for [`crate::UserAdministrator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AdminConfig {
    /// Timeout applied to every admin call and catalog query, in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_operation_timeout_secs")]
    operation_timeout_secs: u64,

    /// Known local zone name; when absent it is looked up in the catalog
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_zone: Option<String>,
}

impl AdminConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            local_zone: None,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for malformed JSON and [`Error::ValidationError`] for
    /// out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when a value is out of range.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Returns the per-round-trip timeout.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Returns the configured local zone name, if any.
    #[must_use]
    pub fn local_zone(&self) -> Option<&str> {
        self.local_zone.as_deref()
    }

    /// Overrides the per-round-trip timeout in seconds.
    #[must_use]
    pub const fn with_operation_timeout_secs(mut self, seconds: u64) -> Self {
        self.operation_timeout_secs = seconds;
        self
    }

    /// Pins the local zone name so it is never looked up.
    ///
    /// Server-side callers already know their zone and set this.
    #[must_use]
    pub fn with_local_zone(mut self, zone: impl Into<String>) -> Self {
        self.local_zone = Some(zone.into());
        self
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self::new()
    }
}
