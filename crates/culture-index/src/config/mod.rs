use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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

pub const DEFAULT_SENDER: &str = "Índice Cultural <consultoria@aculturadonnegocio.com.br>";
pub const DEFAULT_SUBJECT: &str = "Seu resultado do Índice de Maturidade Cultural";
pub const DEFAULT_RESEND_ENDPOINT: &str = "https://api.resend.com";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub relay: RelayConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            relay: RelayConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Outbound notification and forwarding settings.
///
/// Absent credentials are legal: the service keeps scoring and reports the
/// missing relay in each response instead of refusing to start.
#[derive(Clone)]
pub struct RelayConfig {
    pub resend_api_key: Option<String>,
    pub resend_endpoint: String,
    pub sender: String,
    pub subject: String,
    pub operator_email: Option<String>,
    pub forward_url: Option<String>,
    pub allowed_origin: String,
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl RelayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match non_blank_var("CULTURE_INDEX_RELAY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidRelayTimeout)?,
            None => 10,
        };
        let max_attempts = match non_blank_var("CULTURE_INDEX_RELAY_MAX_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidRelayAttempts)?,
            None => 2,
        };

        Ok(Self {
            resend_api_key: non_blank_var("RESEND_API_KEY"),
            resend_endpoint: non_blank_var("CULTURE_INDEX_RESEND_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_RESEND_ENDPOINT.to_string()),
            sender: non_blank_var("CULTURE_INDEX_SENDER")
                .unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            subject: non_blank_var("CULTURE_INDEX_SUBJECT")
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            operator_email: non_blank_var("CULTURE_INDEX_OPERATOR_EMAIL"),
            forward_url: non_blank_var("CULTURE_INDEX_FORWARD_URL"),
            allowed_origin: non_blank_var("CULTURE_INDEX_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "*".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_attempts: max_attempts.max(1),
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            resend_endpoint: DEFAULT_RESEND_ENDPOINT.to_string(),
            sender: DEFAULT_SENDER.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            operator_email: None,
            forward_url: None,
            allowed_origin: "*".to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 2,
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("resend_endpoint", &self.resend_endpoint)
            .field("sender", &self.sender)
            .field("subject", &self.subject)
            .field("operator_email", &self.operator_email)
            .field(
                "forward_url",
                &self.forward_url.as_ref().map(|_| "<redacted>"),
            )
            .field("allowed_origin", &self.allowed_origin)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRelayTimeout,
    InvalidRelayAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRelayTimeout => write!(
                f,
                "CULTURE_INDEX_RELAY_TIMEOUT_SECS must be a whole number of seconds"
            ),
            ConfigError::InvalidRelayAttempts => write!(
                f,
                "CULTURE_INDEX_RELAY_MAX_ATTEMPTS must be a positive integer"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRelayTimeout
            | ConfigError::InvalidRelayAttempts => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "RESEND_API_KEY",
            "CULTURE_INDEX_RESEND_ENDPOINT",
            "CULTURE_INDEX_SENDER",
            "CULTURE_INDEX_SUBJECT",
            "CULTURE_INDEX_OPERATOR_EMAIL",
            "CULTURE_INDEX_FORWARD_URL",
            "CULTURE_INDEX_ALLOWED_ORIGIN",
            "CULTURE_INDEX_RELAY_TIMEOUT_SECS",
            "CULTURE_INDEX_RELAY_MAX_ATTEMPTS",
        ] {
            env::remove_var(key);
        }
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
        assert!(config.relay.resend_api_key.is_none());
        assert!(config.relay.forward_url.is_none());
        assert_eq!(config.relay.sender, DEFAULT_SENDER);
        assert_eq!(config.relay.timeout, Duration::from_secs(10));
        assert_eq!(config.relay.max_attempts, 2);
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
    fn blank_relay_values_count_as_unset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RESEND_API_KEY", "   ");
        env::set_var("CULTURE_INDEX_FORWARD_URL", "");
        env::set_var("CULTURE_INDEX_RELAY_MAX_ATTEMPTS", "0");
        let config = AppConfig::load().expect("config loads");
        assert!(config.relay.resend_api_key.is_none());
        assert!(config.relay.forward_url.is_none());
        assert_eq!(config.relay.max_attempts, 1);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CULTURE_INDEX_RELAY_TIMEOUT_SECS", "soon");
        let err = AppConfig::load().expect_err("timeout must be numeric");
        assert!(matches!(err, ConfigError::InvalidRelayTimeout));
        reset_env();
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = RelayConfig {
            resend_api_key: Some("re_secret_value".to_string()),
            ..RelayConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("re_secret_value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn debug_output_redacts_forward_url() {
        let config = RelayConfig {
            forward_url: Some(
                "https://script.google.com/macros/s/AKfy-token-123/exec".to_string(),
            ),
            ..RelayConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("AKfy-token-123"));
        assert!(rendered.contains("forward_url: Some(\"<redacted>\")"));
    }
}
