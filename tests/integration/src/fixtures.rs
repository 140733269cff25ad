//! Sample requests and responses for integration tests

use usage_logger::{HttpRequestImpl, HttpResponseImpl};

/// Base URL of the application being logged
pub const MOCK_URL: &str = "http://localhost:3000/index.html";

/// JSON request body with personal details
pub const MOCK_JSON: &str = "{ \"hello\" : \"world\", \"email\" : \"jane.doe@example.com\" }";

/// HTML response body with a long digit run
pub const MOCK_HTML: &str = "<html>Order 4111111111111111 confirmed</html>";

/// A GET request with a query string
pub fn mock_request() -> HttpRequestImpl {
    HttpRequestImpl::new()
        .with_method("GET")
        .with_url(format!("{MOCK_URL}?foo=bar"))
        .with_param("foo", "bar")
}

/// A POST request carrying cookies, a user agent and a JSON body
pub fn mock_request_with_json() -> HttpRequestImpl {
    HttpRequestImpl::new()
        .with_method("POST")
        .with_url(format!("{MOCK_URL}?message=hello"))
        .with_header("Content-Type", "Application/JSON")
        .with_header("User-Agent", "integration/1.0")
        .with_header("Cookie", "session=abc123")
        .with_header("ABC", "123")
        .with_param("message", "hello")
        .with_body(MOCK_JSON)
}

/// A 200 response with an HTML body
pub fn mock_response_with_html() -> HttpResponseImpl {
    HttpResponseImpl::new()
        .with_status(200)
        .with_header("Content-Type", "text/html; charset=utf-8")
        .with_header("Content-Length", "42")
        .with_header("Set-Cookie", "session=abc123")
        .with_body(MOCK_HTML)
}
