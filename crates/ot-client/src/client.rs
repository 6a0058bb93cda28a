//! The connection to the REST API: URL building, auth token lifecycle, and
//! the rate-limit recovery loop.

use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::{debug, warn};

use crate::auth::{TokenResponse, AUTH_TOKEN_HEADER, TOKEN_REQUEST_ENDPOINT, TOKEN_VALIDATE_ENDPOINT};
use crate::config::ConnectionConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{ApiRequest, HttpMethod, RequestBody};
use crate::response::ApiResponse;
use crate::retry::{parse_retry_after, RetryPolicy};
use crate::schema::{ParamValue, SchemaIndex};

/// File name of the remote machine-readable API schema.
const SCHEMA_DOCUMENT: &str = "swagger.yaml";

/// Endpoint reporting the remote API's protocol version.
const VERSION_ENDPOINT: &str = "/public/utils/version";

/// Connection to the remote API.
///
/// Holds the HTTP client, the schema index built at connect time, and the
/// cached auth token. The token cache is a single shared field: two threads
/// refreshing at once may both issue token requests, in which case the last
/// writer wins. That race is accepted; everything else on the connection is
/// freely shareable across threads.
#[derive(Debug)]
pub struct Connection {
    http: reqwest::blocking::Client,
    config: ConnectionConfig,
    schema: SchemaIndex,
    token: Mutex<Option<String>>,
}

impl Connection {
    /// Establish a connection: build the transport, fetch and index the
    /// remote API schema (fatal on failure), and check the remote protocol
    /// version (mismatch is a warning only).
    pub fn connect(config: ConnectionConfig) -> Result<Self> {
        url::Url::parse(&config.host)?;

        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);
        if !config.use_http2 {
            builder = builder.http1_only();
        }
        let http = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        let mut conn = Self {
            http,
            config,
            schema: SchemaIndex::empty(),
            token: Mutex::new(None),
        };
        conn.schema = conn.fetch_schema()?;
        conn.check_remote_version()?;
        Ok(conn)
    }

    /// The connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The schema index built at connect time.
    pub fn schema(&self) -> &SchemaIndex {
        &self.schema
    }

    /// Issue a GET request and parse the response envelope.
    pub fn get(&self, endpoint: &str, params: Vec<(String, String)>) -> Result<ApiResponse> {
        self.send(ApiRequest::get(endpoint).params(params))
    }

    /// Issue a POST request carrying the parameters as a form-encoded body
    /// and parse the response envelope.
    pub fn post(&self, endpoint: &str, params: Vec<(String, String)>) -> Result<ApiResponse> {
        self.send(ApiRequest::post(endpoint).form(params))
    }

    /// Execute a request and parse the response envelope.
    pub fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        ApiResponse::from_http(self.execute(request)?)
    }

    /// Execute a request, recovering from rate limiting (429) and token
    /// expiry (419), and fail on any remaining non-2xx status.
    ///
    /// The recovery loop has no attempt cap unless one is configured; see
    /// [`RetryConfig`](crate::RetryConfig).
    pub fn execute(&self, mut request: ApiRequest) -> Result<reqwest::blocking::Response> {
        request.canonicalize();

        let authenticated = self.config.credentials.is_some()
            && !request.endpoint.contains("request_token");
        if authenticated {
            self.ensure_token()?;
        }

        let mut policy = RetryPolicy::new(self.config.retry.clone());
        loop {
            let response = self.execute_once(&request, authenticated)?;
            match response.status().as_u16() {
                429 if request.retry_on_limits => {
                    let retry_after = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(parse_retry_after);
                    match policy.next_delay(retry_after) {
                        Some(delay) => {
                            warn!(
                                endpoint = %request.endpoint,
                                delay_secs = delay.as_secs_f64(),
                                "usage limit hit, retrying"
                            );
                            thread::sleep(delay);
                        }
                        None => return Err(Error::new(ErrorKind::RateLimited { retry_after })),
                    }
                }
                419 if request.retry_on_limits && authenticated => {
                    if !policy.admit() {
                        return Err(Error::new(ErrorKind::TokenExpired));
                    }
                    debug!(endpoint = %request.endpoint, "token expired, refreshing");
                    self.refresh_token()?;
                }
                _ => return check_status(response, &request.endpoint),
            }
        }
    }

    fn execute_once(
        &self,
        request: &ApiRequest,
        attach_token: bool,
    ) -> Result<reqwest::blocking::Response> {
        let url = self.build_url(&request.endpoint);
        let mut req = self.http.request(request.method.to_reqwest(), &url);

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        // Read the cache on every attempt so a mid-loop refresh takes effect.
        if attach_token {
            if let Some(token) = self.cached_token() {
                req = req.header(AUTH_TOKEN_HEADER, token);
            }
        }
        match &request.body {
            Some(RequestBody::Json(value)) => req = req.json(value),
            Some(RequestBody::Form(fields)) => req = req.form(fields),
            None => {}
        }

        debug!(method = %request.method, url = %url, "sending request");
        Ok(req.send()?)
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}:{}/api/{}{}",
            self.config.host, self.config.port, self.config.api_version, endpoint
        )
    }

    /// Validate a filter value against the remote schema before it is sent.
    pub fn validate_parameter(
        &self,
        endpoint: &str,
        method: HttpMethod,
        name: &str,
        value: &ParamValue,
    ) -> Result<()> {
        self.schema.validate(endpoint, method, name, value)
    }

    /// Make sure a token is cached, requesting one if absent.
    pub fn ensure_token(&self) -> Result<()> {
        if self.cached_token().is_some() {
            return Ok(());
        }
        let token = self.request_token()?;
        self.store_token(token);
        Ok(())
    }

    /// Refresh the cached token. An existing token is first validated
    /// against the token-validation endpoint: 200 means it is still good and
    /// nothing happens; 419 means expired and a new one is issued; any other
    /// status is a hard failure.
    pub fn refresh_token(&self) -> Result<()> {
        if let Some(token) = self.cached_token() {
            let request = ApiRequest::get(TOKEN_VALIDATE_ENDPOINT)
                .header(AUTH_TOKEN_HEADER, token)
                .single_attempt();
            let response = self.execute_once(&request, false)?;
            match response.status().as_u16() {
                200 => return Ok(()),
                419 => {}
                _ => {
                    check_status(response, TOKEN_VALIDATE_ENDPOINT)?;
                }
            }
        }

        let token = self.request_token()?;
        self.store_token(token);
        Ok(())
    }

    fn request_token(&self) -> Result<String> {
        let credentials = self.config.credentials.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Config(
                "token requested but no credentials configured".to_string(),
            ))
        })?;

        let request = ApiRequest::post(TOKEN_REQUEST_ENDPOINT)
            .form(vec![
                ("app_name".to_string(), credentials.app_name.clone()),
                ("secret".to_string(), credentials.secret().to_string()),
                ("expiry".to_string(), self.config.token_expiry_secs.to_string()),
            ])
            .single_attempt();
        let response = self.execute(request)?;
        let body: TokenResponse = response.json().map_err(Error::from)?;
        Ok(body.token)
    }

    fn cached_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_token(&self, token: String) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn fetch_schema(&self) -> Result<SchemaIndex> {
        let url = format!(
            "{}:{}/api/docs/{}",
            self.config.host, self.config.port, SCHEMA_DOCUMENT
        );
        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::new(ErrorKind::Http {
                status: status.as_u16(),
                message: format!("failed to fetch API schema from {url}"),
            }));
        }
        let text = response.text()?;
        SchemaIndex::from_swagger_yaml(&text)
    }

    fn check_remote_version(&self) -> Result<()> {
        let response = self.get(VERSION_ENDPOINT, Vec::new())?;
        let remote = match &response.data {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        match remote {
            Some(version) if version == crate::API_PROTOCOL_VERSION => {}
            _ => warn!(
                remote = ?response.data,
                expected = crate::API_PROTOCOL_VERSION,
                "remote API version differs from the one this client expects; \
                 they may not be compatible"
            ),
        }
        Ok(())
    }
}

/// Fail on any non-2xx status, carrying the endpoint and body for context.
fn check_status(
    response: reqwest::blocking::Response,
    endpoint: &str,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().unwrap_or_default();
    let message = format!("{endpoint}: {}", body.trim());
    let kind = match code {
        401 => ErrorKind::Authentication(message),
        404 => ErrorKind::NotFound(message),
        _ => ErrorKind::Http {
            status: code,
            message,
        },
    };
    Err(Error::new(kind))
}
