//! End-to-end integration tests
//!
//! Loggers post to a mock collector; the tests decode what arrived.

use crate::fixtures::*;
use crate::helpers::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::time::Duration;
use usage_logger::{HttpLogger, LogOptions, LoggerConfig};

/// E2E test: a logged exchange reaches the collector intact
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_logs_exchange_to_collector() {
    init_tracing();
    let server = collector(204).await;
    let logger = logger_for(&server, "include debug");

    logger.log(
        &mock_request_with_json(),
        &mock_response_with_html(),
        LogOptions::new()
            .with_now(1_455_908_640_173)
            .with_interval(Duration::from_millis(12)),
    );
    logger.wait_for_response();

    assert_eq!(logger.submit_successes(), 1);
    assert_eq!(logger.submit_failures(), 0);

    let records = received_records(&server).await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(value_of(record, "request_method"), Some("POST"));
    assert_eq!(value_of(record, "request_url"), Some("http://localhost:3000/index.html?message=hello"));
    assert_eq!(value_of(record, "response_code"), Some("200"));
    assert_eq!(value_of(record, "request_header:content-type"), Some("Application/JSON"));
    assert_eq!(value_of(record, "request_param:message"), Some("hello"));
    assert_eq!(value_of(record, "request_body"), Some(MOCK_JSON));
    assert_eq!(value_of(record, "response_body"), Some(MOCK_HTML));
    assert_eq!(value_of(record, "now"), Some("1455908640173"));
    assert_eq!(value_of(record, "interval"), Some("12"));
    assert_eq!(value_of(record, "host"), Some(logger.host()));

    let keys = keys_of(record);
    assert_eq!(&keys[..3], &["request_method", "request_url", "response_code"]);
    assert_eq!(&keys[keys.len() - 3..], &["now", "interval", "host"]);
}

/// E2E test: standard bundle masks emails and long digit runs
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_standard_rules_mask_details() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include standard");

    logger.log(&mock_request_with_json(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    let records = received_records(&server).await;
    let record = &records[0];
    assert_eq!(
        value_of(record, "request_body"),
        Some("{ \"hello\" : \"world\", \"email\" : \"x@y.com\" }")
    );
    assert_eq!(value_of(record, "response_body"), Some("<html>Order xyxy confirmed</html>"));
    assert_eq!(value_of(record, "request_header:cookie"), None);
    assert_eq!(value_of(record, "response_header:set-cookie"), None);
    assert_eq!(value_of(record, "request_header:abc"), Some("123"));
}

/// E2E test: strict bundle keeps only the URL path and safe headers
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_strict_rules_keep_minimum() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include strict");

    logger.log(&mock_request_with_json(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    let records = received_records(&server).await;
    let record = &records[0];
    assert_eq!(value_of(record, "request_url"), Some(MOCK_URL));
    assert_eq!(value_of(record, "request_header:user-agent"), Some("integration/1.0"));
    assert_eq!(value_of(record, "response_header:content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(value_of(record, "response_header:content-length"), Some("42"));
    for removed in [
        "request_body",
        "response_body",
        "request_param:message",
        "request_header:cookie",
        "request_header:abc",
        "response_header:set-cookie",
    ] {
        assert_eq!(value_of(record, removed), None, "{removed}");
    }
}

/// E2E test: stopped records never reach the collector
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_stop_rules_drop_records() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include debug\n/request_method/ stop_if /POST/");

    logger.log(&mock_request_with_json(), &mock_response_with_html(), LogOptions::new());
    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    let records = received_records(&server).await;
    assert_eq!(records.len(), 1);
    assert_eq!(value_of(&records[0], "request_method"), Some("GET"));
    assert_eq!(logger.submit_successes(), 1);
}

/// E2E test: rules loaded from a file
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_rules_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create rules file");
    writeln!(file, "include debug").expect("Failed to write rules");
    writeln!(file, "/response_body/ replace /Order [0-9]+/, /Order N/").expect("Failed to write rules");
    let path = file.path().display().to_string();

    let server = collector(204).await;
    let logger = HttpLogger::new(
        LoggerConfig::new()
            .with_url(message_url(&server))
            .with_rules(format!("file://{path}")),
    )
    .expect("Failed to create logger");
    assert!(logger.rules().text().contains("include debug"));

    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    let records = received_records(&server).await;
    assert_eq!(value_of(&records[0], "response_body"), Some("<html>Order N confirmed</html>"));
}

/// E2E test: schema is announced before any exchange
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_schema_announced_first() {
    let server = collector(204).await;
    let logger = logger_with(&server, "include debug", |c| {
        c.with_schema("type Query { hello: String }")
    });
    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    let records = received_records(&server).await;
    assert_eq!(records.len(), 2);
    assert_eq!(value_of(&records[0], "graphql_schema"), Some("type Query { hello: String }"));
    assert_eq!(value_of(&records[0], "agent"), Some("http_logger.rs"));
    assert_eq!(value_of(&records[1], "request_method"), Some("GET"));
    assert_eq!(logger.submit_successes(), 2);
}

/// E2E test: plain http collectors need allow_http_url
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_plain_http_requires_opt_in() {
    let server = collector(204).await;
    let logger = HttpLogger::new(
        LoggerConfig::new()
            .with_url(message_url(&server))
            .with_rules("include standard"),
    )
    .expect("Failed to create logger");
    assert!(!logger.enableable());
    assert!(!logger.enabled());

    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();
    assert!(received_records(&server).await.is_empty());
}

/// E2E test: a disabled logger sends nothing until enabled again
#[tokio::test(flavor = "multi_thread")]
async fn test_e2e_disable_and_enable() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include debug");

    logger.disable();
    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.enable();
    logger.log(&mock_request_with_json(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    let records = received_records(&server).await;
    assert_eq!(records.len(), 1);
    assert_eq!(value_of(&records[0], "request_method"), Some("POST"));
}
