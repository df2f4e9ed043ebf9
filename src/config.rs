//! Configuration management for the Amber MCP server.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::AmberError;

/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts for transient failures.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default log level when `LOG_LEVEL` is unset.
const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Configuration for connecting to a ServiceNow instance.
///
/// Constructed once at startup and passed by reference to the client
/// and server. The password is stored but never logged or exposed in
/// error messages.
#[derive(Clone)]
pub struct Config {
    /// Instance URL (e.g., `https://dev12345.service-now.com`).
    pub instance: String,

    /// ServiceNow user with asset-read roles.
    pub username: String,

    /// ServiceNow password for basic auth.
    /// This value must never be logged or included in error messages.
    pub password: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Max retry attempts for transient errors.
    pub max_retries: u32,

    /// Logging level (DEBUG, INFO, WARNING, ERROR).
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `SERVICENOW_INSTANCE`: Instance URL
    /// - `SERVICENOW_USERNAME`: User with asset-read roles
    /// - `SERVICENOW_PASSWORD`: Password for basic auth
    ///
    /// # Optional
    ///
    /// - `SERVICENOW_TIMEOUT`: Request timeout in seconds (default 30)
    /// - `SERVICENOW_MAX_RETRIES`: Retry attempts for transient errors (default 3)
    /// - `LOG_LEVEL`: Logging level (default INFO)
    ///
    /// # Errors
    ///
    /// Returns `AmberError::Config` if any required variable is missing
    /// or if values fail validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = Config::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, AmberError> {
        let instance = Self::get_required_env("SERVICENOW_INSTANCE")?;
        let username = Self::get_required_env("SERVICENOW_USERNAME")?;
        let password = Self::get_required_env("SERVICENOW_PASSWORD")?;

        let instance = Self::validate_instance(instance)?;
        Self::validate_password(&password)?;

        let timeout = Self::get_optional_u64("SERVICENOW_TIMEOUT", DEFAULT_TIMEOUT_SECS)?;
        if timeout == 0 {
            return Err(AmberError::invalid_config(
                "SERVICENOW_TIMEOUT must be greater than zero",
            ));
        }
        let max_retries =
            Self::get_optional_u64("SERVICENOW_MAX_RETRIES", u64::from(DEFAULT_MAX_RETRIES))?
                as u32;

        let log_level = env::var("LOG_LEVEL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Config {
            instance,
            username,
            password,
            timeout: Duration::from_secs(timeout),
            max_retries,
            log_level,
        })
    }

    /// Returns the Table API base URL (`{instance}/api/now`).
    pub fn base_url(&self) -> String {
        format!("{}/api/now", self.instance.trim_end_matches('/'))
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, AmberError> {
        env::var(name)
            .map_err(|_| AmberError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(AmberError::missing_env(name))
                } else {
                    Ok(value.trim().to_string())
                }
            })
    }

    /// Gets an optional numeric environment variable with a default.
    fn get_optional_u64(name: &str, default: u64) -> Result<u64, AmberError> {
        match env::var(name) {
            Err(_) => Ok(default),
            Ok(value) if value.trim().is_empty() => Ok(default),
            Ok(value) => value.trim().parse::<u64>().map_err(|_| {
                AmberError::invalid_config(format!("{} must be a non-negative integer", name))
            }),
        }
    }

    /// Validates and normalizes the instance URL.
    fn validate_instance(url: String) -> Result<String, AmberError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&url)
            .map_err(|_| AmberError::invalid_config("SERVICENOW_INSTANCE must be a valid URL"))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AmberError::invalid_config(
                "SERVICENOW_INSTANCE must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Validates the password is not a placeholder value.
    fn validate_password(password: &str) -> Result<(), AmberError> {
        let lower = password.to_lowercase();
        let placeholder_patterns = ["your_password", "changeme", "placeholder", "xxx"];

        for pattern in placeholder_patterns {
            if lower.contains(pattern) {
                return Err(AmberError::invalid_config(
                    "SERVICENOW_PASSWORD appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: Tests that modify environment variables should not run in parallel.
    // Use `cargo test -- --test-threads=1` for full integration tests.

    #[test]
    fn test_validate_instance_removes_trailing_slash() {
        let result =
            Config::validate_instance("https://dev12345.service-now.com/".to_string()).unwrap();
        assert_eq!(result, "https://dev12345.service-now.com");
    }

    #[test]
    fn test_validate_instance_requires_scheme() {
        let result = Config::validate_instance("dev12345.service-now.com".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_instance_rejects_non_http_scheme() {
        let result = Config::validate_instance("ftp://dev12345.service-now.com".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_password_rejects_placeholder() {
        let result = Config::validate_password("your_password_here");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_password_accepts_real_value() {
        let result = Config::validate_password("s3cret-but-real");
        assert!(result.is_ok());
    }

    #[test]
    fn test_base_url() {
        let config = Config {
            instance: "https://dev12345.service-now.com".to_string(),
            username: "agent".to_string(),
            password: "pw".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            log_level: "INFO".to_string(),
        };
        assert_eq!(
            config.base_url(),
            "https://dev12345.service-now.com/api/now"
        );
    }
}
