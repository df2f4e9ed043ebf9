//! HTTP client for the ServiceNow Table API.
//!
//! This module provides the `SnowClient` struct for making authenticated
//! requests to table endpoints (`{instance}/api/now/table/{table}`).
//!
//! # Retry Logic
//!
//! The client automatically retries transient failures up to the configured
//! `SERVICENOW_MAX_RETRIES`:
//! - HTTP 429 (rate limit): Exponential backoff starting at 100ms,
//!   honoring a `Retry-After` header when present
//! - HTTP 502/503/504: Fixed 500ms delay
//! - Timeouts and connection errors: Retried with backoff
//!
//! Client errors (4xx except 429) and authentication failures are never
//! retried.
//!
//! # Security
//!
//! The password is never logged. All error messages are sanitized before
//! logging.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};

use crate::config::Config;
use crate::error::AmberError;

/// Maximum number of rows any single query may return.
///
/// Enforced client-side regardless of what a caller asks for, to bound
/// response size.
pub const MAX_ROW_LIMIT: u32 = 500;

/// Initial delay for exponential backoff (milliseconds).
const INITIAL_BACKOFF_MS: u64 = 100;

/// Delay before retrying after a 502/503/504 (milliseconds).
const SERVER_ERROR_DELAY_MS: u64 = 500;

/// Maximum length for HTTP error response bodies to avoid leaking verbose
/// instance internals.
const MAX_ERROR_BODY_LEN: usize = 500;

/// The ServiceNow tables this server queries.
///
/// Using an enum rather than free-form strings keeps every query against
/// a known table and out of URL-injection territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `alm_hardware` - hardware assets.
    Hardware,
    /// `alm_license` - software license entitlements.
    License,
    /// `alm_asset` - base asset table (superset of hardware/software).
    Asset,
    /// `ast_contract` - vendor contracts.
    Contract,
    /// `cmdb_ci` - configuration items.
    ConfigurationItem,
    /// `sys_properties` - used only for the health-check ping.
    SysProperties,
}

impl Table {
    /// Returns the REST table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Hardware => "alm_hardware",
            Table::License => "alm_license",
            Table::Asset => "alm_asset",
            Table::Contract => "ast_contract",
            Table::ConfigurationItem => "cmdb_ci",
            Table::SysProperties => "sys_properties",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for ServiceNow `sysparm_query` filter strings.
///
/// Conditions are joined with `^` (AND). Values are inserted verbatim,
/// which matches the Table API's encoded-query convention; reqwest
/// percent-encodes the whole parameter on the wire.
///
/// # Example
///
/// ```ignore
/// let query = SnowQuery::new()
///     .eq("install_status", "1")
///     .like("assigned_to", "Smith");
/// assert_eq!(query.build(), "install_status=1^assigned_toLIKESmith");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnowQuery {
    parts: Vec<String>,
}

impl SnowQuery {
    /// Creates an empty query (matches all rows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-match condition (`field=value`).
    pub fn eq(mut self, field: &str, value: impl AsRef<str>) -> Self {
        self.parts.push(format!("{}={}", field, value.as_ref()));
        self
    }

    /// Adds a partial-match condition (`fieldLIKEvalue`).
    pub fn like(mut self, field: &str, value: impl AsRef<str>) -> Self {
        self.parts.push(format!("{}LIKE{}", field, value.as_ref()));
        self
    }

    /// Adds a greater-or-equal condition (`field>=value`).
    pub fn ge(mut self, field: &str, value: impl AsRef<str>) -> Self {
        self.parts.push(format!("{}>={}", field, value.as_ref()));
        self
    }

    /// Adds a less-or-equal condition (`field<=value`).
    pub fn le(mut self, field: &str, value: impl AsRef<str>) -> Self {
        self.parts.push(format!("{}<={}", field, value.as_ref()));
        self
    }

    /// Adds a strictly-less-than condition (`field<value`).
    pub fn lt(mut self, field: &str, value: impl AsRef<str>) -> Self {
        self.parts.push(format!("{}<{}", field, value.as_ref()));
        self
    }

    /// Adds a membership condition (`fieldINa,b,c`).
    pub fn is_in(mut self, field: &str, values: &[&str]) -> Self {
        self.parts.push(format!("{}IN{}", field, values.join(",")));
        self
    }

    /// Returns true if no conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Builds the `sysparm_query` string.
    pub fn build(&self) -> String {
        self.parts.join("^")
    }
}

/// Result of a connectivity ping against the instance.
#[derive(Debug, Clone)]
pub struct PingResult {
    /// True when the authenticated request succeeded.
    pub ok: bool,
    /// Round-trip time of the probe request.
    pub response_time: Duration,
    /// Sanitized error detail when the probe failed.
    pub error: Option<String>,
}

/// HTTP client for the ServiceNow Table API.
///
/// Handles basic-auth, query building, response parsing, and retry with
/// backoff for all table operations.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = SnowClient::new(&config)?;
///
/// let query = SnowQuery::new().eq("install_status", "1");
/// let rows = client.get_records(Table::Hardware, &query, None, 50).await?;
/// ```
#[derive(Clone)]
pub struct SnowClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Table API base URL (e.g., `https://dev12345.service-now.com/api/now`).
    base_url: String,

    /// Basic-auth username.
    username: String,

    /// Basic-auth password.
    /// SECURITY: Never log this value!
    password: String,

    /// Request timeout, used for timeout error reporting.
    timeout: Duration,

    /// Max retry attempts for transient errors.
    max_retries: u32,
}

impl SnowClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AmberError::HttpClient` if the HTTP client fails to
    /// initialize.
    pub fn new(config: &Config) -> Result<Self, AmberError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AmberError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
            max_retries: config.max_retries,
        })
    }

    /// Returns a reference to the password for sanitization purposes.
    ///
    /// This should ONLY be used for sanitizing error messages, never for logging.
    pub(crate) fn password_for_sanitization(&self) -> &str {
        &self.password
    }

    /// Returns the Table API base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validates that an identifier is a well-formed sys_id.
    ///
    /// ServiceNow sys_ids are 32-character hex strings. This prevents
    /// path traversal or injection via malformed IDs interpolated into URLs.
    ///
    /// # Errors
    ///
    /// Returns `AmberError::Validation` if the ID has the wrong length or
    /// contains non-hex characters.
    pub fn validate_sys_id(id: &str, field_name: &str) -> Result<(), AmberError> {
        if id.len() != 32 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AmberError::validation(format!(
                "{} must be a 32-character hex sys_id, got: {:?}",
                field_name,
                id.chars().take(50).collect::<String>()
            )));
        }
        Ok(())
    }

    /// Tests connectivity to the instance.
    ///
    /// Makes a lightweight authenticated request to verify the instance is
    /// reachable and the credentials are valid, without touching asset data.
    ///
    /// # Errors
    ///
    /// Returns `AmberError::ConnectionTest` if the connection fails,
    /// with details about the failure reason.
    pub async fn test_connection(&self) -> Result<(), AmberError> {
        tracing::debug!("Testing connection to ServiceNow instance");

        let result = self
            .get_records(Table::SysProperties, &SnowQuery::new(), None, 1)
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Connection test successful");
                Ok(())
            }
            Err(AmberError::Authentication) => Err(AmberError::connection_test(
                "Authentication failed - verify SERVICENOW_USERNAME and SERVICENOW_PASSWORD",
            )),
            Err(AmberError::Timeout { duration, .. }) => {
                Err(AmberError::connection_test(format!(
                    "Connection timed out after {:?} - verify SERVICENOW_INSTANCE is correct and reachable",
                    duration
                )))
            }
            Err(AmberError::Http(e)) => {
                let message = AmberError::sanitize_message(&e.to_string(), &self.password);
                Err(AmberError::connection_test(format!(
                    "HTTP error: {} - verify SERVICENOW_INSTANCE is correct",
                    message
                )))
            }
            Err(e) => {
                let message = AmberError::sanitize_message(&e.to_string(), &self.password);
                Err(AmberError::connection_test(message))
            }
        }
    }

    /// Performs a connectivity ping, returning status and elapsed time.
    ///
    /// Unlike [`test_connection`](Self::test_connection) this never fails;
    /// a failed probe is reported in the returned [`PingResult`].
    pub async fn ping(&self) -> PingResult {
        let start = Instant::now();
        match self
            .get_records(Table::SysProperties, &SnowQuery::new(), None, 1)
            .await
        {
            Ok(_) => PingResult {
                ok: true,
                response_time: start.elapsed(),
                error: None,
            },
            Err(e) => PingResult {
                ok: false,
                response_time: start.elapsed(),
                error: Some(e.sanitized_display(&self.password)),
            },
        }
    }

    /// Executes an operation with retry logic for transient failures.
    ///
    /// Transient errors (rate limit, 5xx, timeout, connection failure) are
    /// retried up to `max_retries` times; everything else surfaces
    /// immediately.
    async fn with_retry<T, F, Fut>(&self, operation: &str, f: F) -> Result<T, AmberError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AmberError>>,
    {
        let mut delay = Duration::from_millis(INITIAL_BACKOFF_MS);
        let mut retries = 0u32;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;

                    // Determine delay based on error type
                    let actual_delay = if e.is_rate_limit() {
                        // Use provided retry_after or exponential backoff
                        e.retry_after().unwrap_or(delay)
                    } else if matches!(e, AmberError::ServiceUnavailable { .. }) {
                        Duration::from_millis(SERVER_ERROR_DELAY_MS)
                    } else {
                        delay
                    };

                    tracing::debug!(
                        operation = operation,
                        retry = retries,
                        max_retries = self.max_retries,
                        delay_ms = actual_delay.as_millis() as u64,
                        error = %AmberError::sanitize_message(&e.to_string(), &self.password),
                        "Retrying after transient error"
                    );

                    tokio::time::sleep(actual_delay).await;

                    // Exponential backoff for next attempt (if rate limited)
                    if e.is_rate_limit() {
                        delay *= 2;
                    }
                }
                Err(e) => {
                    if retries > 0 {
                        tracing::debug!(
                            operation = operation,
                            retries = retries,
                            "All retry attempts exhausted"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Fetches multiple records from a table.
    ///
    /// # Arguments
    ///
    /// * `table` - The table to query
    /// * `query` - Filter conditions (empty query matches all rows)
    /// * `fields` - Optional field projection (`sysparm_fields`)
    /// * `limit` - Maximum rows to return, clamped to `[1, MAX_ROW_LIMIT]`
    ///
    /// # Returns
    ///
    /// The `result` array from the Table API envelope as raw JSON rows,
    /// in instance order, never more than `limit` entries.
    pub async fn get_records(
        &self,
        table: Table,
        query: &SnowQuery,
        fields: Option<&[&str]>,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, AmberError> {
        let operation = format!("GET {}", table);
        self.with_retry(&operation, || {
            self.get_records_inner(table, query, fields, limit)
        })
        .await
    }

    /// Single-attempt record fetch (no retry wrapper).
    async fn get_records_inner(
        &self,
        table: Table,
        query: &SnowQuery,
        fields: Option<&[&str]>,
        limit: u32,
    ) -> Result<Vec<serde_json::Value>, AmberError> {
        let url = format!("{}/table/{}", self.base_url, table);
        let limit = limit.clamp(1, MAX_ROW_LIMIT);

        let mut req = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .query(&[
                ("sysparm_limit", limit.to_string()),
                ("sysparm_display_value", "all".to_string()),
            ]);

        if !query.is_empty() {
            req = req.query(&[("sysparm_query", query.build())]);
        }
        if let Some(fields) = fields {
            req = req.query(&[("sysparm_fields", fields.join(","))]);
        }

        tracing::debug!(table = %table, query = %query.build(), limit, "Querying table");

        let body = self.execute(req, table, &format!("GET {}", table)).await?;
        Ok(Self::result_array(body))
    }

    /// Fetches a single record by sys_id.
    ///
    /// # Errors
    ///
    /// Returns `AmberError::NotFound` with the sys_id if no record matches,
    /// and `AmberError::Validation` if the sys_id is malformed.
    pub async fn get_record(
        &self,
        table: Table,
        sys_id: &str,
    ) -> Result<serde_json::Value, AmberError> {
        Self::validate_sys_id(sys_id, "sys_id")?;
        let operation = format!("GET {}/{}", table, sys_id);
        self.with_retry(&operation, || self.get_record_inner(table, sys_id))
            .await
            .map_err(|e| {
                // Attach the specific ID to a generic 404
                if matches!(e, AmberError::NotFound { .. }) {
                    AmberError::not_found(table.as_str(), sys_id)
                } else {
                    e
                }
            })
    }

    /// Single-attempt record fetch by sys_id.
    async fn get_record_inner(
        &self,
        table: Table,
        sys_id: &str,
    ) -> Result<serde_json::Value, AmberError> {
        let url = format!("{}/table/{}/{}", self.base_url, table, sys_id);

        let req = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .query(&[("sysparm_display_value", "all")]);

        tracing::debug!(table = %table, sys_id = %sys_id, "Fetching record");

        let body = self
            .execute(req, table, &format!("GET {}/{}", table, sys_id))
            .await?;
        Ok(body.get("result").cloned().unwrap_or_default())
    }

    /// Updates fields on an existing record via PATCH.
    ///
    /// This is the only write operation the server performs; it is used by
    /// the reconciliation tool to stamp a reconciliation-status field.
    ///
    /// # Returns
    ///
    /// The updated record as returned by the instance.
    pub async fn update_record(
        &self,
        table: Table,
        sys_id: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value, AmberError> {
        Self::validate_sys_id(sys_id, "sys_id")?;
        let operation = format!("PATCH {}/{}", table, sys_id);
        self.with_retry(&operation, || {
            self.update_record_inner(table, sys_id, data.clone())
        })
        .await
        .map_err(|e| {
            if matches!(e, AmberError::NotFound { .. }) {
                AmberError::not_found(table.as_str(), sys_id)
            } else {
                e
            }
        })
    }

    /// Single-attempt PATCH.
    async fn update_record_inner(
        &self,
        table: Table,
        sys_id: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value, AmberError> {
        let url = format!("{}/table/{}/{}", self.base_url, table, sys_id);

        let req = self
            .http
            .request(Method::PATCH, &url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .json(&data);

        tracing::debug!(table = %table, sys_id = %sys_id, "Updating record");

        let body = self
            .execute(req, table, &format!("PATCH {}/{}", table, sys_id))
            .await?;
        Ok(body.get("result").cloned().unwrap_or_default())
    }

    /// Sends a prepared request and parses the JSON response body.
    ///
    /// Maps transport failures and non-success statuses to typed errors.
    async fn execute(
        &self,
        req: reqwest::RequestBuilder,
        table: Table,
        operation: &str,
    ) -> Result<serde_json::Value, AmberError> {
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                return AmberError::timeout(self.timeout, operation);
            }
            AmberError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_http_error(status, response, table).await);
        }

        let body = response.text().await.map_err(AmberError::Http)?;

        tracing::trace!(body = %body, "Table API response");

        serde_json::from_str(&body).map_err(AmberError::Serialization)
    }

    /// Extracts the `result` array from a Table API envelope.
    fn result_array(body: serde_json::Value) -> Vec<serde_json::Value> {
        match body.get("result") {
            Some(serde_json::Value::Array(rows)) => rows.clone(),
            _ => Vec::new(),
        }
    }

    /// Caps an error body at `MAX_ERROR_BODY_LEN` bytes.
    ///
    /// The cut backs up to a char boundary so multibyte bodies (instance
    /// error messages are often localized) never split a character.
    fn truncate_detail(detail: String) -> String {
        if detail.len() <= MAX_ERROR_BODY_LEN {
            return detail;
        }
        let mut end = MAX_ERROR_BODY_LEN;
        while !detail.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &detail[..end])
    }

    /// Handles HTTP-level errors and converts to AmberError.
    ///
    /// Classifies errors into specific types for proper retry handling.
    async fn handle_http_error(
        &self,
        status: StatusCode,
        response: reqwest::Response,
        table: Table,
    ) -> AmberError {
        // Try to extract retry-after header for rate limiting
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.unwrap_or_default();

        // The Table API wraps errors as {"error": {"message": ...}, "status": "failure"}
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);

        // Sanitize and truncate to avoid leaking instance internals
        let detail = AmberError::sanitize_message(&detail, &self.password);
        let detail = Self::truncate_detail(detail);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AmberError::Authentication,
            StatusCode::NOT_FOUND => AmberError::not_found(table.as_str(), "resource"),
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(table = %table, "Rate limited by ServiceNow");
                AmberError::RateLimited { retry_after }
            }
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                tracing::warn!(status = %status, "ServiceNow instance temporarily unavailable");
                AmberError::ServiceUnavailable { status }
            }
            _ => AmberError::HttpStatus {
                status,
                table: table.as_str().to_string(),
                body: detail,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Hardware.as_str(), "alm_hardware");
        assert_eq!(Table::License.as_str(), "alm_license");
        assert_eq!(Table::Asset.as_str(), "alm_asset");
        assert_eq!(Table::Contract.as_str(), "ast_contract");
        assert_eq!(Table::ConfigurationItem.as_str(), "cmdb_ci");
        assert_eq!(Table::SysProperties.as_str(), "sys_properties");
    }

    #[test]
    fn test_query_empty() {
        let query = SnowQuery::new();
        assert!(query.is_empty());
        assert_eq!(query.build(), "");
    }

    #[test]
    fn test_query_eq() {
        let query = SnowQuery::new().eq("install_status", "1");
        assert_eq!(query.build(), "install_status=1");
    }

    #[test]
    fn test_query_like() {
        let query = SnowQuery::new().like("assigned_to", "Smith");
        assert_eq!(query.build(), "assigned_toLIKESmith");
    }

    #[test]
    fn test_query_joins_with_caret() {
        let query = SnowQuery::new()
            .eq("model_category", "Computer")
            .like("location", "Odense");
        assert_eq!(query.build(), "model_category=Computer^locationLIKEOdense");
    }

    #[test]
    fn test_query_date_window_is_closed_interval() {
        let query = SnowQuery::new()
            .ge("ends", "2026-08-30")
            .le("ends", "2026-11-28");
        assert_eq!(query.build(), "ends>=2026-08-30^ends<=2026-11-28");
    }

    #[test]
    fn test_query_lt() {
        let query = SnowQuery::new().lt("sys_updated_on", "2026-06-01");
        assert_eq!(query.build(), "sys_updated_on<2026-06-01");
    }

    #[test]
    fn test_query_is_in() {
        let query = SnowQuery::new().is_in("install_status", &["In use", "Installed"]);
        assert_eq!(query.build(), "install_statusINIn use,Installed");
    }

    #[test]
    fn test_validate_sys_id_valid() {
        assert!(SnowClient::validate_sys_id("00a9e80d3790200044e0bfc8bcbe5d79", "sys_id").is_ok());
        assert!(SnowClient::validate_sys_id("ABCDEF0123456789abcdef0123456789", "sys_id").is_ok());
    }

    #[test]
    fn test_validate_sys_id_rejects_bad_input() {
        assert!(SnowClient::validate_sys_id("", "sys_id").is_err());
        assert!(SnowClient::validate_sys_id("12345", "sys_id").is_err());
        assert!(SnowClient::validate_sys_id("../etc/passwd/etc/passwd/etcpass", "sys_id").is_err());
        assert!(
            SnowClient::validate_sys_id("zza9e80d3790200044e0bfc8bcbe5d79", "sys_id").is_err()
        );
    }

    #[test]
    fn test_validate_sys_id_error_names_field() {
        let err = SnowClient::validate_sys_id("nope", "asset_sys_id").unwrap_err();
        assert!(err.to_string().contains("asset_sys_id"));
    }

    #[test]
    fn test_truncate_detail_short_body_unchanged() {
        let body = "Invalid query field".to_string();
        assert_eq!(SnowClient::truncate_detail(body.clone()), body);
    }

    #[test]
    fn test_truncate_detail_caps_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LEN + 100);
        let truncated = SnowClient::truncate_detail(body);
        assert!(truncated.ends_with("...[truncated]"));
        assert_eq!(truncated.len(), MAX_ERROR_BODY_LEN + "...[truncated]".len());
    }

    #[test]
    fn test_truncate_detail_respects_char_boundaries() {
        // 3-byte chars put a boundary mid-character at the byte cap.
        let body = "€".repeat(200);
        assert!(body.len() > MAX_ERROR_BODY_LEN);
        let truncated = SnowClient::truncate_detail(body);
        assert!(truncated.ends_with("...[truncated]"));
        assert!(truncated.chars().all(|c| c == '€' || c.is_ascii()));
    }

    #[test]
    fn test_result_array_extracts_rows() {
        let body = serde_json::json!({"result": [{"sys_id": "a"}, {"sys_id": "b"}]});
        let rows = SnowClient::result_array(body);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_result_array_missing_result() {
        let body = serde_json::json!({"unexpected": true});
        assert!(SnowClient::result_array(body).is_empty());
    }
}
