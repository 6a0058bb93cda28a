//! Credentials and token endpoint plumbing.
//!
//! Tokens are opaque strings: the client caches and forwards them but never
//! inspects their contents.

use serde::Deserialize;

/// Header carrying the auth token on authenticated requests.
pub const AUTH_TOKEN_HEADER: &str = "Auth-Token";

/// Endpoint issuing new tokens.
pub const TOKEN_REQUEST_ENDPOINT: &str = "/public/auth/request_token";

/// Endpoint checking whether a cached token is still valid.
pub const TOKEN_VALIDATE_ENDPOINT: &str = "/public/auth/validate_token";

/// App credentials for token-based auth.
///
/// The secret is redacted in Debug output to prevent accidental exposure in
/// logs.
#[derive(Clone)]
pub struct Credentials {
    /// Registered application name.
    pub app_name: String,
    secret: String,
}

impl Credentials {
    /// Create a new credential pair.
    pub fn new(app_name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            secret: secret.into(),
        }
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_name", &self.app_name)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Body of a successful token request.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}
