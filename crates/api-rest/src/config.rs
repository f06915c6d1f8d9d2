//! REST runtime configuration.
//!
//! Resolved once at process startup and then passed into the router. Request handling never
//! reads environment variables.

use api_shared::{Environment, ProblemDetailsConfig};
use std::net::SocketAddr;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3448";

pub const REST_ADDR_VAR: &str = "PATIENTS_REST_ADDR";
pub const APP_ENV_VAR: &str = "APP_ENV";
pub const EXCEPTION_DETAILS_VAR: &str = "PROBLEM_DETAILS_INCLUDE_EXCEPTION_DETAILS";
pub const SEED_VAR: &str = "PATIENTS_SEED";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} address '{value}': {source}")]
    InvalidAddr {
        name: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid {name} value '{value}': expected true/false, 1/0 or yes/no")]
    InvalidBool { name: &'static str, value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is the human-readable format.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// REST configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestConfig {
    addr: SocketAddr,
    environment: Environment,
    include_exception_details: Option<bool>,
    seed: bool,
    log_format: LogFormat,
}

impl RestConfig {
    /// Builds configuration from raw environment values without touching the process
    /// environment.
    ///
    /// # Arguments
    ///
    /// * `addr` - Listen address, defaulting to [`DEFAULT_REST_ADDR`].
    /// * `app_env` - Deployment environment name.
    /// * `include_exception_details` - Explicit override for debug exception details.
    /// * `seed` - Whether to add the demo patients, defaulting to true.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the address does not parse or a boolean is not recognised.
    pub fn from_env_values(
        addr: Option<&str>,
        app_env: Option<&str>,
        include_exception_details: Option<&str>,
        seed: Option<&str>,
    ) -> ConfigResult<Self> {
        let raw_addr = addr
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_REST_ADDR);
        let addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                name: REST_ADDR_VAR,
                value: raw_addr.to_string(),
                source,
            })?;

        Ok(Self {
            addr,
            environment: Environment::from_env_value(app_env),
            include_exception_details: parse_bool(EXCEPTION_DETAILS_VAR, include_exception_details)?,
            seed: parse_bool(SEED_VAR, seed)?.unwrap_or(true),
            log_format: LogFormat::Text,
        })
    }

    /// Reads the process environment. Call once, after `.env` has been loaded.
    pub fn from_env() -> ConfigResult<Self> {
        let var = |name: &str| std::env::var(name).ok();
        let config = Self::from_env_values(
            var(REST_ADDR_VAR).as_deref(),
            var(APP_ENV_VAR).as_deref(),
            var(EXCEPTION_DETAILS_VAR).as_deref(),
            var(SEED_VAR).as_deref(),
        )?;
        Ok(config.with_log_format(LogFormat::from_env_value(var(LOG_FORMAT_VAR).as_deref())))
    }

    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn seed(&self) -> bool {
        self.seed
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether problem payloads carry exception details: the explicit override if set,
    /// otherwise the environment default.
    pub fn include_exception_details(&self) -> bool {
        self.include_exception_details
            .unwrap_or_else(|| self.environment.includes_exception_details())
    }

    pub fn problem_details_config(&self) -> ProblemDetailsConfig {
        ProblemDetailsConfig::builder()
            .environment(self.environment)
            .include_exception_details(self.include_exception_details())
            .build()
    }
}

fn parse_bool(name: &'static str, value: Option<&str>) -> ConfigResult<Option<bool>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: raw.to_string(),
        }),
    }
}
