//! HTTP request building.

use serde_json::Value;

/// HTTP request method. The remote API only serves GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Lowercase name as used by the swagger schema document.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
        }
    }

    /// Convert to reqwest::Method.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }

    /// Parse a schema method key ("get", "POST", ...). Methods the client
    /// does not issue yield None.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Builder for API requests.
#[derive(Debug)]
pub struct ApiRequest {
    pub(crate) method: HttpMethod,
    pub(crate) endpoint: String,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) headers: Vec<(String, String)>,
    /// When false the 429/419 recovery loop is skipped and the request is
    /// attempted exactly once. Used for token sub-requests.
    pub(crate) retry_on_limits: bool,
}

impl ApiRequest {
    /// Create a new request builder.
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: Vec::new(),
            body: None,
            headers: Vec::new(),
            retry_on_limits: true,
        }
    }

    /// Create a GET request builder.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    /// Create a POST request builder.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    /// Add a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Add query parameters.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set a form-encoded body.
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Disable the 429/419 recovery loop for this request.
    pub fn single_attempt(mut self) -> Self {
        self.retry_on_limits = false;
        self
    }

    /// Sort parameters into a deterministic order so that logically identical
    /// queries produce identical URLs. An HTTP cache in front of the
    /// transport then sees one cache key per query regardless of the order
    /// the call site supplied parameters in.
    pub(crate) fn canonicalize(&mut self) {
        self.params.sort();
    }
}
