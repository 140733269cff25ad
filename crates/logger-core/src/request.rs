//! Request side of the adapter boundary.
//!
//! Framework integrations implement [`HttpRequest`] for their native request
//! type. [`HttpRequestImpl`] is a plain owned implementation used when the
//! caller already holds the details, and throughout the tests.

/// Capability interface over a captured HTTP request.
///
/// Every accessor may report absence; absent details are omitted from the
/// log record rather than treated as errors.
pub trait HttpRequest {
    /// Request method, e.g. `GET`.
    fn method(&self) -> Option<&str>;

    /// Absolute request URL including the query string.
    fn url(&self) -> Option<&str>;

    /// Request headers in arrival order. Duplicate names are allowed.
    fn headers(&self) -> Vec<(String, String)>;

    /// Query or form parameters in arrival order.
    fn params(&self) -> Vec<(String, String)>;

    /// Request body, when captured.
    fn body(&self) -> Option<&str>;

    /// Session attributes exposed by the underlying connection.
    fn session(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Owned request details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequestImpl {
    /// Request method
    pub method: Option<String>,
    /// Request URL
    pub url: Option<String>,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Query or form parameters
    pub params: Vec<(String, String)>,
    /// Request body
    pub body: Option<String>,
    /// Session attributes
    pub session: Vec<(String, String)>,
}

impl HttpRequestImpl {
    /// Create a request with no details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the method
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Builder: set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder: add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builder: add a parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Builder: set the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder: add a session attribute
    #[must_use]
    pub fn with_session_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.session.push((name.into(), value.into()));
        self
    }
}

impl HttpRequest for HttpRequestImpl {
    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn params(&self) -> Vec<(String, String)> {
        self.params.clone()
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn session(&self) -> Vec<(String, String)> {
        self.session.clone()
    }
}
