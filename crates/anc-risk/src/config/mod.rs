use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub clinic: ClinicConfig,
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

        let facility =
            env::var("ANC_FACILITY").unwrap_or_else(|_| DEFAULT_FACILITY.to_string());
        let patient_id_prefix = env::var("ANC_PATIENT_ID_PREFIX")
            .unwrap_or_else(|_| DEFAULT_PATIENT_ID_PREFIX.to_string());
        let clinic = ClinicConfig::new(facility, patient_id_prefix)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            clinic,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

const DEFAULT_FACILITY: &str = "Murang'a County Hospital";
const DEFAULT_PATIENT_ID_PREFIX: &str = "MUR";

/// Facility identity and patient numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    pub facility: String,
    pub patient_id_prefix: String,
}

impl ClinicConfig {
    pub fn new(
        facility: impl Into<String>,
        patient_id_prefix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let patient_id_prefix = patient_id_prefix.into().trim().to_ascii_uppercase();
        if patient_id_prefix.is_empty()
            || !patient_id_prefix.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::InvalidPatientIdPrefix(patient_id_prefix));
        }

        Ok(Self {
            facility: facility.into(),
            patient_id_prefix,
        })
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            facility: DEFAULT_FACILITY.to_string(),
            patient_id_prefix: DEFAULT_PATIENT_ID_PREFIX.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPatientIdPrefix(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPatientIdPrefix(value) => write!(
                f,
                "ANC_PATIENT_ID_PREFIX must be ASCII letters only (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPatientIdPrefix(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
