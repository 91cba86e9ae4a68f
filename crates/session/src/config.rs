//! Environment-driven configuration for the session client.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use backoffice_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid value: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("no data directory on this platform; set BACKOFFICE_TOKEN_PATH")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_url: String,
    pub token_path: PathBuf,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank are the same.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_url = get("BACKOFFICE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "BACKOFFICE_API_URL",
                reason: format!("'{api_url}' is not an http(s) URL"),
            });
        }

        let token_path = match get("BACKOFFICE_TOKEN_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("backoffice")
                .join("session.token"),
        };

        let request_timeout = match get("BACKOFFICE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "BACKOFFICE_REQUEST_TIMEOUT_SECS",
                        reason: format!("'{raw}' is not a positive number of seconds"),
                    });
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let log_format = match get("BACKOFFICE_LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: "BACKOFFICE_LOG_FORMAT",
                reason: format!("{e}"),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_url,
            token_path,
            request_timeout,
            log_format,
        })
    }
}
