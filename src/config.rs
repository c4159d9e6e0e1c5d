//! Configuration for key generation and verification.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. An explicit config file (`--config` on the command line)
//! 3. `./sitekey.toml`
//! 4. `<config dir>/sitekey/sitekey.toml`
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `SITEKEY_BODY_LENGTH` - Ungrouped body length of production keys
//! - `SITEKEY_BIND` - Bind generated keys to a device (true/false)
//! - `SITEKEY_DEVICE` - Device override used instead of the platform fingerprint
//! - `SITEKEY_SECRET_ENV` - Name of the variable holding the signing secret
//! - `SITEKEY_LOGGING_ENABLED` - Enable logging
//! - `SITEKEY_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//!
//! The signing secret itself is never a configuration value; only the name of
//! the environment variable it is read from is. Whether a verifier accepts
//! unbound or `DEV-` keys is not configurable either: see
//! [`crate::verification::VerifierPolicy`].

use config::{Config, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::errors::{LicenseError, LicenseResult};
use crate::license_key::DEFAULT_BODY_LENGTH;
use crate::secret::DEFAULT_SECRET_ENV;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteKeyConfig {
    /// Key generation and verification settings
    pub license: LicenseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// License key settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Ungrouped body length of production keys
    pub body_length: usize,
    /// Bind generated keys to the device fingerprint
    pub bind: bool,
    /// Device fingerprint override; empty means "read from the platform"
    pub device_override: String,
    /// Environment variable the signing secret is read from
    pub secret_env: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            body_length: DEFAULT_BODY_LENGTH,
            bind: true,
            device_override: String::new(),
            secret_env: DEFAULT_SECRET_ENV.to_string(),
        }
    }
}

impl LicenseConfig {
    /// The device override, if one is configured.
    pub fn device_override(&self) -> Option<&str> {
        Some(self.device_override.as_str()).filter(|d| !d.is_empty())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

fn config_err(e: config::ConfigError) -> LicenseError {
    LicenseError::ConfigError(e.to_string())
}

fn env_bool(var: &str) -> Option<bool> {
    env::var(var).ok().and_then(|v| v.parse::<bool>().ok())
}

impl SiteKeyConfig {
    /// Load configuration from the default file locations and environment.
    pub fn load() -> LicenseResult<Self> {
        Self::load_with_file(None)
    }

    /// Load configuration, additionally reading `file` (which must exist)
    /// after the default locations.
    pub fn load_with_file(file: Option<&Path>) -> LicenseResult<Self> {
        let mut builder = Config::builder()
            .set_default("license.body_length", DEFAULT_BODY_LENGTH as i64)
            .map_err(config_err)?
            .set_default("license.bind", true)
            .map_err(config_err)?
            .set_default("license.device_override", "")
            .map_err(config_err)?
            .set_default("license.secret_env", DEFAULT_SECRET_ENV)
            .map_err(config_err)?
            .set_default("logging.enabled", false)
            .map_err(config_err)?
            .set_default("logging.level", "info")
            .map_err(config_err)?;

        if let Some(dir) = dirs::config_dir() {
            builder = builder
                .add_source(File::from(dir.join("sitekey").join("sitekey.toml")).required(false));
        }
        builder = builder.add_source(File::with_name("sitekey").required(false));
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let builder = builder
            .set_override_option(
                "license.body_length",
                env::var("SITEKEY_BODY_LENGTH")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_err)?
            .set_override_option("license.bind", env_bool("SITEKEY_BIND"))
            .map_err(config_err)?
            .set_override_option("license.device_override", env::var("SITEKEY_DEVICE").ok())
            .map_err(config_err)?
            .set_override_option("license.secret_env", env::var("SITEKEY_SECRET_ENV").ok())
            .map_err(config_err)?
            .set_override_option("logging.enabled", env_bool("SITEKEY_LOGGING_ENABLED"))
            .map_err(config_err)?
            .set_override_option("logging.level", env::var("SITEKEY_LOG_LEVEL").ok())
            .map_err(config_err)?;

        let settings = builder
            .build()
            .map_err(|e| LicenseError::ConfigError(format!("failed to build config: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| LicenseError::ConfigError(format!("failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LicenseResult<()> {
        if self.license.body_length == 0 {
            return Err(LicenseError::ConfigError(
                "license.body_length must be greater than 0".to_string(),
            ));
        }

        if self.license.secret_env.is_empty() {
            return Err(LicenseError::ConfigError(
                "license.secret_env cannot be empty".to_string(),
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(LicenseError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }
}
