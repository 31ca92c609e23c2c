//! Configuration module for the mesh dashboard.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::errors::AppError;
use crate::store::StoreStrategy;

/// Default message poll interval for the incremental store.
pub const DEFAULT_MESSAGES_POLL_MS: u64 = 1000;
/// Default message poll interval when every poll replaces the whole store.
pub const DEFAULT_REPLACE_MESSAGES_POLL_MS: u64 = 2000;
pub const DEFAULT_NODES_POLL_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 4000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the mesh node serving `/api/messages` and `/api/nodes`
    pub upstream_url: String,
    /// Address to bind the dashboard server to
    pub bind_addr: SocketAddr,
    /// How often the messages endpoint is polled
    pub messages_poll_interval: Duration,
    /// How often the nodes endpoint is polled
    pub nodes_poll_interval: Duration,
    /// How polled messages are merged into the store
    pub store_strategy: StoreStrategy,
    /// Upper bound on a single upstream request
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let upstream_url = env::var("MESH_DASH_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://192.168.4.1".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = env::var("MESH_DASH_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| AppError::Config("Invalid MESH_DASH_BIND_ADDR format".to_string()))?;

        let store_strategy = match env::var("MESH_DASH_STORE_STRATEGY") {
            Ok(value) => value.parse()?,
            Err(_) => StoreStrategy::Incremental,
        };

        let default_messages_ms = match store_strategy {
            StoreStrategy::Incremental => DEFAULT_MESSAGES_POLL_MS,
            StoreStrategy::Replace => DEFAULT_REPLACE_MESSAGES_POLL_MS,
        };

        let messages_poll_interval =
            millis_var("MESH_DASH_MESSAGES_POLL_MS", default_messages_ms)?;
        let nodes_poll_interval = millis_var("MESH_DASH_NODES_POLL_MS", DEFAULT_NODES_POLL_MS)?;
        let request_timeout =
            millis_var("MESH_DASH_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;

        let log_level = env::var("MESH_DASH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("MESH_DASH_LOG_FORMAT").as_deref() {
            Err(_) | Ok("text") => LogFormat::Text,
            Ok("json") => LogFormat::Json,
            Ok(other) => {
                return Err(AppError::Config(format!(
                    "Invalid MESH_DASH_LOG_FORMAT {:?} (expected text or json)",
                    other
                )))
            }
        };

        Ok(Self {
            upstream_url,
            bind_addr,
            messages_poll_interval,
            nodes_poll_interval,
            store_strategy,
            request_timeout,
            log_level,
            log_format,
        })
    }
}

/// Read a positive millisecond duration, falling back to `default_ms` when unset.
fn millis_var(name: &str, default_ms: u64) -> Result<Duration, AppError> {
    let ms = match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::Config(format!("Invalid {} value {:?}", name, raw)))?,
        Err(_) => default_ms,
    };

    if ms == 0 {
        return Err(AppError::Config(format!("{} must be greater than zero", name)));
    }

    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 8] = [
        "MESH_DASH_UPSTREAM_URL",
        "MESH_DASH_BIND_ADDR",
        "MESH_DASH_MESSAGES_POLL_MS",
        "MESH_DASH_NODES_POLL_MS",
        "MESH_DASH_STORE_STRATEGY",
        "MESH_DASH_REQUEST_TIMEOUT_MS",
        "MESH_DASH_LOG_LEVEL",
        "MESH_DASH_LOG_FORMAT",
    ];

    // Environment variables are process-wide, so every scenario runs in one test.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.upstream_url, "http://192.168.4.1");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.messages_poll_interval, Duration::from_millis(1000));
        assert_eq!(config.nodes_poll_interval, Duration::from_millis(5000));
        assert_eq!(config.store_strategy, StoreStrategy::Incremental);
        assert_eq!(config.request_timeout, Duration::from_millis(4000));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);

        env::set_var("MESH_DASH_STORE_STRATEGY", "replace");
        env::set_var("MESH_DASH_UPSTREAM_URL", "http://10.0.0.7:8080/");
        let config = Config::from_env().unwrap();
        assert_eq!(config.store_strategy, StoreStrategy::Replace);
        assert_eq!(config.messages_poll_interval, Duration::from_millis(2000));
        assert_eq!(config.upstream_url, "http://10.0.0.7:8080");

        env::set_var("MESH_DASH_MESSAGES_POLL_MS", "0");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));
        env::set_var("MESH_DASH_MESSAGES_POLL_MS", "fast");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));
        env::remove_var("MESH_DASH_MESSAGES_POLL_MS");

        env::set_var("MESH_DASH_STORE_STRATEGY", "append");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));

        for var in VARS {
            env::remove_var(var);
        }
    }
}
