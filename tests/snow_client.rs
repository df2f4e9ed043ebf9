//! Integration tests for the ServiceNow Table API client.
//!
//! These tests run against a local wiremock instance, exercising the
//! request shape, envelope parsing, and retry behavior without touching
//! a real ServiceNow instance.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use amber::config::Config;
use amber::error::AmberError;
use amber::snow_client::{SnowClient, SnowQuery, Table};

const TEST_PASSWORD: &str = "test_password_12345";

fn test_config(instance: &str, max_retries: u32) -> Config {
    Config {
        instance: instance.to_string(),
        username: "api.user".to_string(),
        password: TEST_PASSWORD.to_string(),
        timeout: Duration::from_secs(5),
        max_retries,
        log_level: "INFO".to_string(),
    }
}

fn client_for(server: &MockServer, max_retries: u32) -> SnowClient {
    SnowClient::new(&test_config(&server.uri(), max_retries)).expect("client should build")
}

fn result_envelope(rows: serde_json::Value) -> serde_json::Value {
    json!({ "result": rows })
}

#[tokio::test]
async fn get_records_sends_auth_and_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .and(basic_auth("api.user", TEST_PASSWORD))
        .and(query_param("sysparm_limit", "25"))
        .and(query_param("sysparm_display_value", "all"))
        .and(query_param(
            "sysparm_query",
            "install_status=In use^model_category=Computer",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([
            {"sys_id": "a", "asset_tag": "P1"},
            {"sys_id": "b", "asset_tag": "P2"}
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let query = SnowQuery::new()
        .eq("install_status", "In use")
        .eq("model_category", "Computer");
    let rows = client
        .get_records(Table::Hardware, &query, None, 25)
        .await
        .expect("query should succeed");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["asset_tag"], "P1");
}

#[tokio::test]
async fn get_records_omits_empty_query() {
    let server = MockServer::start().await;

    // An empty filter must not send sysparm_query at all.
    Mock::given(method("GET"))
        .and(path("/api/now/table/ast_contract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let rows = client
        .get_records(Table::Contract, &SnowQuery::new(), None, 50)
        .await
        .expect("query should succeed");

    assert!(rows.is_empty());
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or("").contains("sysparm_query"));
}

#[tokio::test]
async fn get_records_clamps_limit_to_maximum() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_asset"))
        .and(query_param("sysparm_limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    client
        .get_records(Table::Asset, &SnowQuery::new(), None, 10_000)
        .await
        .expect("query should succeed");
}

#[tokio::test]
async fn get_records_clamps_zero_limit_to_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_asset"))
        .and(query_param("sysparm_limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    client
        .get_records(Table::Asset, &SnowQuery::new(), None, 0)
        .await
        .expect("query should succeed");
}

#[tokio::test]
async fn get_records_sends_field_projection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_license"))
        .and(query_param("sysparm_fields", "sys_id,rights,allocated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    client
        .get_records(
            Table::License,
            &SnowQuery::new(),
            Some(&["sys_id", "rights", "allocated"]),
            10,
        )
        .await
        .expect("query should succeed");
}

#[tokio::test]
async fn service_unavailable_retries_then_fails() {
    let server = MockServer::start().await;
    let max_retries = 2;

    // One initial attempt plus max_retries retries, all failing.
    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(503))
        .expect(u64::from(max_retries) + 1)
        .mount(&server)
        .await;

    let client = client_for(&server, max_retries);
    let err = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect_err("persistent 503 should fail");

    assert!(matches!(err, AmberError::ServiceUnavailable { .. }));
}

#[tokio::test]
async fn service_unavailable_recovers_on_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(result_envelope(json!([{"sys_id": "a"}]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let rows = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect("should recover after one 502");

    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn rate_limit_honors_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_license"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_license"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    client
        .get_records(Table::License, &SnowQuery::new(), None, 10)
        .await
        .expect("should recover after rate limit");
}

#[tokio::test]
async fn authentication_failure_is_not_retried() {
    let server = MockServer::start().await;

    // Exactly one request: credential failures must never be retried.
    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect_err("401 should fail");

    assert!(matches!(err, AmberError::Authentication));
}

#[tokio::test]
async fn forbidden_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect_err("403 should fail");

    assert!(matches!(err, AmberError::Authentication));
}

#[tokio::test]
async fn bad_request_extracts_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Invalid query field", "detail": "x"},
            "status": "failure"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect_err("400 should fail");

    match err {
        AmberError::HttpStatus { status, body, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(body, "Invalid query field");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn long_multibyte_error_body_is_truncated_not_panicked() {
    let server = MockServer::start().await;

    // A localized error message longer than the truncation cap, made of
    // 3-byte characters so the cap falls inside one of them.
    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "€".repeat(200)},
            "status": "failure"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect_err("400 should fail");

    match err {
        AmberError::HttpStatus { status, body, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.ends_with("...[truncated]"));
            assert!(body.len() <= 500 + "...[truncated]".len());
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn get_record_returns_single_result() {
    let server = MockServer::start().await;
    let sys_id = "00a9e80d3790200044e0bfc8bcbe5d79";

    Mock::given(method("GET"))
        .and(path(format!("/api/now/table/alm_asset/{}", sys_id)))
        .and(query_param("sysparm_display_value", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"sys_id": sys_id, "asset_tag": "P1000042"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let record = client
        .get_record(Table::Asset, sys_id)
        .await
        .expect("record should be found");

    assert_eq!(record["asset_tag"], "P1000042");
}

#[tokio::test]
async fn get_record_missing_maps_to_not_found() {
    let server = MockServer::start().await;
    let sys_id = "ffa9e80d3790200044e0bfc8bcbe5d79";

    Mock::given(method("GET"))
        .and(path(format!("/api/now/table/alm_asset/{}", sys_id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "No Record found"},
            "status": "failure"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .get_record(Table::Asset, sys_id)
        .await
        .expect_err("missing record should fail");

    match err {
        AmberError::NotFound { table, id } => {
            assert_eq!(table, "alm_asset");
            assert_eq!(id, sys_id);
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn get_record_rejects_malformed_sys_id_without_request() {
    let server = MockServer::start().await;
    // No mocks mounted: a malformed sys_id must fail before any request.

    let client = client_for(&server, 3);
    let err = client
        .get_record(Table::Asset, "../../etc/passwd")
        .await
        .expect_err("malformed sys_id should fail");

    assert!(matches!(err, AmberError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_record_patches_and_returns_result() {
    let server = MockServer::start().await;
    let sys_id = "00a9e80d3790200044e0bfc8bcbe5d79";

    Mock::given(method("PATCH"))
        .and(path(format!("/api/now/table/alm_hardware/{}", sys_id)))
        .and(basic_auth("api.user", TEST_PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"sys_id": sys_id, "u_reconciliation_status": "orphaned"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let updated = client
        .update_record(
            Table::Hardware,
            sys_id,
            json!({ "u_reconciliation_status": "orphaned" }),
        )
        .await
        .expect("update should succeed");

    assert_eq!(updated["u_reconciliation_status"], "orphaned");
}

#[tokio::test]
async fn error_bodies_never_contain_the_password() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/alm_hardware"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": format!("auth failed for {}", TEST_PASSWORD)}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Zero retries so the single 500 surfaces directly.
    let client = client_for(&server, 0);
    let err = client
        .get_records(Table::Hardware, &SnowQuery::new(), None, 10)
        .await
        .expect_err("500 should fail");

    assert!(!err.to_string().contains(TEST_PASSWORD));
}

#[tokio::test]
async fn test_connection_reports_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/sys_properties"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .test_connection()
        .await
        .expect_err("auth failure should surface");

    assert!(err.to_string().contains("Authentication failed"));
}

#[tokio::test]
async fn ping_reports_success_and_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/sys_properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_envelope(json!([]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let up = client.ping().await;
    assert!(up.ok);
    assert!(up.error.is_none());

    // The mock is exhausted, so the next probe gets a 404 from wiremock.
    let down = client.ping().await;
    assert!(!down.ok);
    assert!(down.error.is_some());
}
