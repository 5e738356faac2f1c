//! API configuration

use std::str::FromStr;

use core_kernel::{Currency, Timezone};
use serde::Deserialize;

pub use ::config::ConfigError;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// ISO 4217 code of the property's billing currency
    pub property_currency: String,
    /// IANA timezone of the property, drives the overdue threshold
    pub property_timezone: String,
    /// Base URL of the AI scoring service
    pub scoring_base_url: String,
    /// License key for the scoring service
    pub scoring_license_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/hospitality".to_string(),
            log_level: "info".to_string(),
            property_currency: "USD".to_string(),
            property_timezone: "UTC".to_string(),
            scoring_base_url: "http://127.0.0.1:8000".to_string(),
            scoring_license_key: String::new(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured property currency
    pub fn currency(&self) -> Result<Currency, config::ConfigError> {
        self.property_currency.parse().map_err(|_| {
            config::ConfigError::Message(format!(
                "unknown property currency: {}",
                self.property_currency
            ))
        })
    }

    /// Parses the configured property timezone
    pub fn timezone(&self) -> Result<Timezone, config::ConfigError> {
        chrono_tz::Tz::from_str(&self.property_timezone)
            .map(Timezone::new)
            .map_err(|_| {
                config::ConfigError::Message(format!(
                    "unknown property timezone: {}",
                    self.property_timezone
                ))
            })
    }
}
