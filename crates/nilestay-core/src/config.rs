//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub finance: FinanceConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiration in minutes
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_minutes: i64,
}

fn default_jwt_expiration() -> i64 {
    1440 // 24 hours
}

/// Finance configuration
///
/// The exchange rate is a fixed configuration value, not a live rate: every
/// USD-priced figure in the system is derived from EGP list prices through
/// this single constant.
#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    /// Fixed USD to EGP conversion rate
    #[serde(default = "default_usd_rate")]
    pub usd_to_egp_rate: f64,
}

fn default_usd_rate() -> f64 {
    50.0
}

impl FinanceConfig {
    /// The conversion rate as a `Decimal`, falling back to the default
    /// when the configured value is unusable (non-positive or not finite).
    pub fn usd_rate(&self) -> Decimal {
        Decimal::from_f64(self.usd_to_egp_rate)
            .filter(|r| r > &Decimal::ZERO)
            .unwrap_or_else(|| Decimal::from(50))
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            usd_to_egp_rate: 50.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("auth.jwt_expiration_minutes", 1440)?
            .set_default("finance.usd_to_egp_rate", 50.0)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with NILESTAY_ prefix
            .add_source(
                Environment::with_prefix("NILESTAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("NILESTAY").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_finance_config() {
        let config = FinanceConfig::default();
        assert_eq!(config.usd_to_egp_rate, 50.0);
        assert_eq!(config.usd_rate(), dec!(50));
    }

    #[test]
    fn test_unusable_rate_falls_back() {
        let config = FinanceConfig {
            usd_to_egp_rate: 0.0,
        };
        assert_eq!(config.usd_rate(), dec!(50));

        let config = FinanceConfig {
            usd_to_egp_rate: -3.0,
        };
        assert_eq!(config.usd_rate(), dec!(50));
    }

    #[test]
    fn test_custom_rate() {
        let config = FinanceConfig {
            usd_to_egp_rate: 48.5,
        };
        assert_eq!(config.usd_rate(), dec!(48.5));
    }
}
