use std::fmt;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter {
        directives: String,
        source: ParseError,
    },
    Install(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directives, .. } => {
                write!(f, "log filter '{directives}' is not a valid directive set")
            }
            TelemetryError::Install(err) => {
                write!(f, "could not install tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::Install(err) => Some(&**err),
        }
    }
}

/// Directives applied when `RUST_LOG` is unset: the configured level for the
/// screening pipeline itself, with the HTTP stack held at `warn` so batch
/// progress logs stay readable under load.
fn default_directives(config: &TelemetryConfig) -> String {
    format!("{},hyper=warn,tower=warn", config.log_level)
}

/// Install the global tracing subscriber. `RUST_LOG` wins when set; otherwise
/// the configured level drives [`default_directives`].
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let directives = default_directives(config);
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&directives).map_err(|source| TelemetryError::InvalidFilter {
            directives: directives.clone(),
            source,
        })
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}
