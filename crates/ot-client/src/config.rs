//! Connection configuration.

use std::time::Duration;

use crate::auth::Credentials;
use crate::retry::RetryConfig;

/// Configuration for a [`Connection`](crate::Connection).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Scheme and host, without a port.
    pub host: String,
    /// Port appended to the host when building URLs.
    pub port: u16,
    /// API version segment of request URLs.
    pub api_version: String,
    /// Credentials for token auth. Requests go unauthenticated when absent.
    pub credentials: Option<Credentials>,
    /// Allow HTTP/2 via ALPN. When false the transport is pinned to
    /// HTTP/1.1.
    pub use_http2: bool,
    /// Lifetime requested for issued tokens, in seconds.
    pub token_expiry_secs: u64,
    /// Retry behavior for 429/419 responses.
    pub retry: RetryConfig,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: 443,
            api_version: "latest".to_string(),
            credentials: None,
            use_http2: false,
            token_expiry_secs: 600,
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: crate::USER_AGENT.to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Create a new config builder.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the host (scheme included, port excluded).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the API version URL segment.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Enable token auth with the given credentials.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    /// Allow HTTP/2 via ALPN.
    pub fn use_http2(mut self, enabled: bool) -> Self {
        self.config.use_http2 = enabled;
        self
    }

    /// Set the requested token lifetime in seconds.
    pub fn token_expiry_secs(mut self, secs: u64) -> Self {
        self.config.token_expiry_secs = secs;
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set a custom User-Agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}
