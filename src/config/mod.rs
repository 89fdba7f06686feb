use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub screening: ScreeningConfig,
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

        let screening = ScreeningConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening,
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

/// Tunables for the resume screening pipeline.
#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    /// Maximum number of resumes accepted in a single batch.
    pub max_batch_size: usize,
    /// Upper bound on concurrent scoring calls to the oracle.
    pub scoring_concurrency: usize,
    /// Time-to-live for cached ranked views.
    pub cache_ttl: Duration,
    /// Maximum number of cached ranked views.
    pub cache_capacity: u64,
    /// Largest page size a results query may request.
    pub max_page_size: u32,
    /// Optional CSV of job postings used to seed the read-only catalog.
    pub postings_csv: Option<PathBuf>,
}

impl ScreeningConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_batch_size = parse_env("SCREENING_MAX_BATCH", 500)?;
        let scoring_concurrency = parse_env("SCREENING_CONCURRENCY", 8)?;
        let cache_ttl_secs: u64 = parse_env("SCREENING_CACHE_TTL_SECS", 30)?;
        let cache_capacity = parse_env("SCREENING_CACHE_CAPACITY", 4096)?;
        let max_page_size = parse_env("SCREENING_MAX_PAGE_SIZE", 100)?;
        let postings_csv = env::var("SCREENING_POSTINGS_CSV").ok().map(PathBuf::from);

        if max_batch_size == 0 {
            return Err(ConfigError::InvalidScreeningValue {
                name: "SCREENING_MAX_BATCH",
            });
        }
        if scoring_concurrency == 0 {
            return Err(ConfigError::InvalidScreeningValue {
                name: "SCREENING_CONCURRENCY",
            });
        }
        if max_page_size == 0 {
            return Err(ConfigError::InvalidScreeningValue {
                name: "SCREENING_MAX_PAGE_SIZE",
            });
        }

        Ok(Self {
            max_batch_size,
            scoring_concurrency,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity,
            max_page_size,
            postings_csv,
        })
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 500,
            scoring_concurrency: 8,
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 4096,
            max_page_size: 100,
            postings_csv: None,
        }
    }
}

fn parse_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidScreeningValue { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScreeningValue { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScreeningValue { name } => {
                write!(f, "{name} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidScreeningValue { .. } => None,
        }
    }
}
