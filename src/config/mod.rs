use crate::error::{MvcError, Result};
use axum::http::StatusCode;
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Environment key for the status code used by errors without an explicit status.
pub const ERROR_STATUS_KEY: &str = "MVC_ERROR_STATUS";

/// Environment key for the request body limit, in bytes.
pub const BODY_LIMIT_KEY: &str = "MVC_BODY_LIMIT";

pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Configuration service
///
/// A process-wide key/value store seeded from the environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a service holding every environment variable
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Parse the value stored under `key`, if any
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| MvcError::Config {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}

/// Tunables for activation and request handling
#[derive(Debug, Clone)]
pub struct Options {
    /// Status for handler errors that carry no status of their own
    pub error_status: StatusCode,
    /// Maximum request body size read into a [`Context`](crate::context::Context)
    pub body_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            error_status: StatusCode::BAD_REQUEST,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Options {
    /// Build options from a [`ConfigService`], falling back to defaults for unset keys
    ///
    /// # Errors
    /// Returns [`MvcError::Config`] when a key is set to an unparseable value
    /// or the error status is not a 4xx/5xx code.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let mut options = Self::default();

        if let Some(code) = config.parse::<u16>(ERROR_STATUS_KEY)? {
            let status = StatusCode::from_u16(code).map_err(|e| MvcError::Config {
                key: ERROR_STATUS_KEY.to_string(),
                message: e.to_string(),
            })?;
            if !(status.is_client_error() || status.is_server_error()) {
                return Err(MvcError::Config {
                    key: ERROR_STATUS_KEY.to_string(),
                    message: format!("{} is not an error status", code),
                });
            }
            options.error_status = status;
        }

        if let Some(limit) = config.parse::<usize>(BODY_LIMIT_KEY)? {
            options.body_limit = limit;
        }

        Ok(options)
    }
}
