//! Response side of the adapter boundary.

/// Capability interface over a captured HTTP response.
pub trait HttpResponse {
    /// Status code, when known.
    fn status(&self) -> Option<u16>;

    /// Response headers in arrival order.
    fn headers(&self) -> Vec<(String, String)>;

    /// Response body, when captured.
    fn body(&self) -> Option<&str>;
}

/// Owned response details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponseImpl {
    /// Status code
    pub status: Option<u16>,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Option<String>,
}

impl HttpResponseImpl {
    /// Create a response with no details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the status code
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Builder: add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builder: set the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl HttpResponse for HttpResponseImpl {
    fn status(&self) -> Option<u16> {
        self.status
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}
