use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_PAGE_LIMIT: usize = 100;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let lock_submitted = match env::var("INTAKE_LOCK_SUBMITTED") {
            Ok(raw) => parse_bool("INTAKE_LOCK_SUBMITTED", &raw)?,
            Err(_) => false,
        };
        let page_limit = match env::var("INTAKE_PAGE_LIMIT") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::InvalidPageLimit { value: raw }),
            },
            Err(_) => DEFAULT_PAGE_LIMIT,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            intake: IntakeSettings {
                lock_submitted,
                page_limit,
            },
        })
    }
}

fn parse_bool(variable: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            variable,
            value: raw.to_string(),
        }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
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

/// Output style of the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Intake workflow policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    pub lock_submitted: bool,
    pub page_limit: usize,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            lock_submitted: false,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBoolean { variable: &'static str, value: String },
    InvalidPageLimit { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBoolean { variable, value } => {
                write!(f, "{} must be true or false, found '{}'", variable, value)
            }
            ConfigError::InvalidPageLimit { value } => {
                write!(f, "INTAKE_PAGE_LIMIT must be a positive integer, found '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBoolean { .. }
            | ConfigError::InvalidPageLimit { .. } => None,
        }
    }
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOG_FORMAT");
        env::remove_var("INTAKE_LOCK_SUBMITTED");
        env::remove_var("INTAKE_PAGE_LIMIT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.intake, IntakeSettings::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_intake_policy_and_log_format() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("APP_LOG_FORMAT", "Pretty");
        env::set_var("INTAKE_LOCK_SUBMITTED", "TRUE");
        env::set_var("INTAKE_PAGE_LIMIT", "25");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
        assert!(config.intake.lock_submitted);
        assert_eq!(config.intake.page_limit, 25);
        reset_env();
    }

    #[test]
    fn rejects_malformed_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        env::set_var("APP_PORT", "70000");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        env::remove_var("APP_PORT");

        env::set_var("INTAKE_LOCK_SUBMITTED", "maybe");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidBoolean {
                variable: "INTAKE_LOCK_SUBMITTED",
                ..
            })
        ));
        env::remove_var("INTAKE_LOCK_SUBMITTED");

        env::set_var("INTAKE_PAGE_LIMIT", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPageLimit { .. })
        ));
        reset_env();
    }
}
