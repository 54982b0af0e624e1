//! Configuration loading and representation.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

use eduplatform_observability::LogFormat;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Postgres URL. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            database_url: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, after applying a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, map in tests).
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = match get("HOST") {
            Some(v) => v.trim().parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
                key: "HOST",
                message: format!("{e}"),
            })?,
            None => defaults.host,
        };

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                message: format!("{e}"),
            })?,
            None => defaults.port,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                key: "LOG_FORMAT",
                message: format!("{e}"),
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            host,
            port,
            database_url: get("DATABASE_URL"),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn reads_every_key() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("DATABASE_URL", "postgres://localhost/edu"),
            ("LOG_FORMAT", "pretty"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/edu"));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[("DATABASE_URL", ""), ("PORT", " ")])).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn invalid_log_format_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOG_FORMAT", .. }));
    }
}
