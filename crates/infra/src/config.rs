//! Configuration loading and representation.

use std::net::SocketAddr;

use thiserror::Error;

use pricelens_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Runtime settings for the API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// When set, items live in Postgres; otherwise in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Load the sample catalog on startup when the store is empty.
    pub seed_sample_data: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::invalid(
                        "DATABASE_MAX_CONNECTIONS",
                        format!("expected a positive integer, got {raw:?}"),
                    ));
                }
            },
        };

        let seed_sample_data = match get("SEED_SAMPLE_DATA") {
            None => false,
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError::invalid("SEED_SAMPLE_DATA", format!("expected a boolean, got {raw:?}")))?,
        };

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", e.to_string()))?,
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            seed_sample_data,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
