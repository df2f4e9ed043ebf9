//! Error types for the Amber MCP server.
//!
//! This module defines `AmberError`, the unified error type used throughout
//! the application for consistent error handling and propagation.
//!
//! # Security
//!
//! All error messages are sanitized to ensure the ServiceNow password is
//! never leaked in logs or error responses. Use `sanitize_message()` when
//! constructing error messages from external sources.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for all Amber operations.
///
/// Each variant provides specific context about the failure, enabling
/// meaningful error messages without leaking sensitive information
/// like credentials.
#[derive(Error, Debug)]
pub enum AmberError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status} on table '{table}': {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The table that was being queried.
        table: String,
        /// The response body, potentially containing error details.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the instance may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// Rate limited by the instance (HTTP 429).
    #[error("rate limited by ServiceNow - please wait before retrying")]
    RateLimited {
        /// Suggested retry delay, if provided by the server.
        retry_after: Option<Duration>,
    },

    /// Instance temporarily unavailable (HTTP 500/502/503/504).
    #[error("instance temporarily unavailable ({status}) - will retry automatically")]
    ServiceUnavailable {
        /// The specific status code.
        status: reqwest::StatusCode,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested record was not found.
    #[error("record not found on table '{table}': {id}")]
    NotFound {
        /// The table that was queried.
        table: String,
        /// The identifier (sys_id or asset_tag) that had no match.
        id: String,
    },

    /// Authentication failed - bad username or password (HTTP 401/403).
    #[error("authentication failed - check SERVICENOW_USERNAME and SERVICENOW_PASSWORD")]
    Authentication,

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl AmberError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        AmberError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        AmberError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AmberError::Validation(message.into())
    }

    /// Creates a not found error for a record identifier.
    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        AmberError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        AmberError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        AmberError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and the operation should be retried.
    ///
    /// Retryable errors include:
    /// - Rate limiting (HTTP 429)
    /// - Server errors (HTTP 500, 502, 503, 504)
    /// - Timeouts and connection failures (may succeed on retry)
    ///
    /// Authentication, validation, and not-found errors are never retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AmberError::RateLimited { .. } => true,
            AmberError::ServiceUnavailable { .. } => true,
            AmberError::Timeout { .. } => true,
            AmberError::Http(e) => e.is_timeout() || e.is_connect(),
            AmberError::HttpStatus { status, .. } => {
                status.as_u16() == 429 || status.is_server_error()
            }
            _ => false,
        }
    }

    /// Returns true if this is a rate limit error, indicating we should back off.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AmberError::RateLimited { .. })
            || matches!(self, AmberError::HttpStatus { status, .. } if status.as_u16() == 429)
    }

    /// Returns the suggested delay before retry, if any.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AmberError::RateLimited { retry_after } => *retry_after,
            AmberError::ServiceUnavailable { .. } => Some(Duration::from_millis(500)),
            AmberError::Timeout { .. } => Some(Duration::from_millis(100)),
            _ => None,
        }
    }

    /// Sanitizes an error message to remove any occurrence of the password.
    ///
    /// This is critical for security - credentials must never appear in
    /// logs, error messages, or responses to users.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `password` - The password to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the password replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, password: &str) -> String {
        if password.is_empty() {
            return message.to_string();
        }
        message.replace(password, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    ///
    /// Use this when you need to include error details in logs or responses
    /// and want to ensure no sensitive data is leaked.
    #[must_use]
    pub fn sanitized_display(&self, password: &str) -> String {
        Self::sanitize_message(&self.to_string(), password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_error() {
        let err = AmberError::missing_env("SERVICENOW_PASSWORD");
        assert!(err.to_string().contains("SERVICENOW_PASSWORD"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validation_error() {
        let err = AmberError::validation("limit must be >= 1");
        assert_eq!(err.to_string(), "validation error: limit must be >= 1");
    }

    #[test]
    fn test_not_found_error() {
        let err = AmberError::not_found("alm_asset", "P1000001");
        let msg = err.to_string();
        assert!(msg.contains("alm_asset"));
        assert!(msg.contains("P1000001"));
    }

    #[test]
    fn test_timeout_error() {
        let err = AmberError::timeout(Duration::from_secs(30), "GET alm_hardware");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn test_is_retryable_rate_limited() {
        let err = AmberError::RateLimited { retry_after: None };
        assert!(err.is_retryable());
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_is_retryable_service_unavailable() {
        let err = AmberError::ServiceUnavailable {
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert!(err.is_retryable());
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn test_authentication_never_retryable() {
        assert!(!AmberError::Authentication.is_retryable());
    }

    #[test]
    fn test_is_retryable_not_found() {
        let err = AmberError::not_found("alm_asset", "123");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_is_retryable_validation() {
        let err = AmberError::validation("invalid input");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_http_status_5xx_is_retryable() {
        let err = AmberError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            table: "alm_hardware".to_string(),
            body: String::new(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_http_status_4xx_not_retryable() {
        let err = AmberError::HttpStatus {
            status: reqwest::StatusCode::BAD_REQUEST,
            table: "alm_hardware".to_string(),
            body: String::new(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_sanitize_message_removes_password() {
        let password = "super_secret_pw_12345";
        let message = format!("Error connecting with {} to instance", password);
        let sanitized = AmberError::sanitize_message(&message, password);
        assert!(!sanitized.contains(password));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_password() {
        let message = "Some error message";
        let sanitized = AmberError::sanitize_message(message, "");
        assert_eq!(sanitized, message);
    }

    #[test]
    fn test_sanitize_message_no_match() {
        let message = "Some error message";
        let sanitized = AmberError::sanitize_message(message, "not_present");
        assert_eq!(sanitized, message);
    }

    #[test]
    fn test_retry_after_rate_limited() {
        let err = AmberError::RateLimited {
            retry_after: Some(Duration::from_secs(5)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_retry_after_service_unavailable() {
        let err = AmberError::ServiceUnavailable {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        };
        assert_eq!(err.retry_after(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_connection_test_error() {
        let err = AmberError::connection_test("could not reach instance");
        let msg = err.to_string();
        assert!(msg.contains("connection test failed"));
        assert!(msg.contains("could not reach instance"));
    }
}
