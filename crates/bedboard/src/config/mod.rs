//! Environment-driven configuration for the bedboard service.
//!
//! Everything is read once at startup from `BEDBOARD_*` variables (with a
//! `.env` file honored in development) and passed explicitly to the pieces
//! that need it; nothing re-reads the environment later.

use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8350;
const DEFAULT_LOG_FILTER: &str = "info";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("BEDBOARD_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("BEDBOARD_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("BEDBOARD_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let log_filter =
            env::var("BEDBOARD_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_filter },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Resolve the configured host and port; `localhost` is accepted as a
    /// convenience alias for the loopback address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filter handed to the tracing bootstrap.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_filter: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BEDBOARD_PORT must be a valid port number, got '{value}'")]
    InvalidPort { value: String },
    #[error("BEDBOARD_HOST must be 'localhost' or an IP address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("BEDBOARD_ENV");
        env::remove_var("BEDBOARD_HOST");
        env::remove_var("BEDBOARD_PORT");
        env::remove_var("BEDBOARD_LOG");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.telemetry.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn recognizes_production_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BEDBOARD_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        env::remove_var("BEDBOARD_ENV");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BEDBOARD_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), DEFAULT_PORT));
        env::remove_var("BEDBOARD_HOST");
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BEDBOARD_PORT", "not-a-port");
        match AppConfig::load() {
            Err(ConfigError::InvalidPort { value }) => assert_eq!(value, "not-a-port"),
            other => panic!("expected invalid port error, got {other:?}"),
        }
        env::remove_var("BEDBOARD_PORT");
    }

    #[test]
    fn rejects_unparseable_host() {
        let server = ServerConfig {
            host: "ward-7".to_string(),
            port: DEFAULT_PORT,
        };
        match server.socket_addr() {
            Err(ConfigError::InvalidHost { .. }) => {}
            other => panic!("expected invalid host error, got {other:?}"),
        }
    }
}
