//! Test helper utilities for integration tests

use flate2::read::ZlibDecoder;
use once_cell::sync::Lazy;
use std::io::Read;
use tracing_subscriber::EnvFilter;
use usage_logger::{HttpLogger, LoggerConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// One decoded record as submitted
pub type Pairs = Vec<(String, String)>;

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Start a collector answering every POST to `/message` with `status`
pub async fn collector(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/message"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

/// Collector endpoint of a mock server
pub fn message_url(server: &MockServer) -> String {
    format!("{}/message", server.uri())
}

/// Logger posting to `server`. Plain http is allowed ahead of `rules`.
pub fn logger_for(server: &MockServer, rules: &str) -> HttpLogger {
    logger_with(server, rules, |config| config)
}

/// Logger posting to `server` with extra configuration
pub fn logger_with(
    server: &MockServer,
    rules: &str,
    configure: impl FnOnce(LoggerConfig) -> LoggerConfig,
) -> HttpLogger {
    let config = LoggerConfig::new()
        .with_url(message_url(server))
        .with_rules(format!("allow_http_url\n{rules}"));
    HttpLogger::new(configure(config)).expect("Failed to create logger")
}

/// Whether a batch was sent deflated
pub fn is_compressed(request: &Request) -> bool {
    request
        .headers
        .get("content-encoding")
        .is_some_and(|v| v == "deflated")
}

/// Decode one submitted batch into its records
pub fn decode_batch(request: &Request) -> Vec<Pairs> {
    let text = if is_compressed(request) {
        let mut text = String::new();
        ZlibDecoder::new(request.body.as_slice())
            .read_to_string(&mut text)
            .expect("Failed to inflate batch");
        text
    } else {
        String::from_utf8(request.body.clone()).expect("Batch is not UTF-8")
    };
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).expect("Record is not a JSON array of pairs"))
        .collect()
}

/// Every record the collector has received, in arrival order
pub async fn received_records(server: &MockServer) -> Vec<Pairs> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .flat_map(decode_batch)
        .collect()
}

/// Value of the first pair named `key`
pub fn value_of<'a>(record: &'a Pairs, key: &str) -> Option<&'a str> {
    record
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Names of every pair, in order
pub fn keys_of(record: &Pairs) -> Vec<&str> {
    record.iter().map(|(k, _)| k.as_str()).collect()
}
