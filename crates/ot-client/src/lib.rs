//! # opentargets-client
//!
//! Core HTTP layer for the Open Targets REST API.
//!
//! This crate provides the connection machinery the endpoint wrappers in
//! `opentargets-rest` are built on:
//! - URL building and deterministic (cache-friendly) parameter ordering
//! - Transparent recovery from rate limiting (429) and token expiry (419)
//! - Bearer-token lifecycle against the auth endpoints
//! - Pre-flight filter validation against the remote swagger schema
//! - Response envelopes with pagination info and fair-usage metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 opentargets-rest                            │
//! │  (endpoint methods, Query, ResultCursor)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Connection                               │
//! │  - build_url + canonicalized params                         │
//! │  - 429/419 recovery loop, token cache                       │
//! │  - SchemaIndex for pre-flight validation                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                reqwest (blocking)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All I/O is synchronous and blocking; the 429 backoff suspends the calling
//! thread with a native sleep.
//!
//! ## Example
//!
//! ```rust,ignore
//! use opentargets_client::{Connection, ConnectionConfig};
//!
//! fn main() -> Result<(), opentargets_client::Error> {
//!     let conn = Connection::connect(ConnectionConfig::default())?;
//!     let response = conn.get(
//!         "/public/search",
//!         vec![("q".to_string(), "braf".to_string())],
//!     )?;
//!     println!("{} results", response.len());
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
mod schema;

pub use auth::{Credentials, AUTH_TOKEN_HEADER, TOKEN_REQUEST_ENDPOINT, TOKEN_VALIDATE_ENDPOINT};
pub use client::Connection;
pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{ApiRequest, HttpMethod, RequestBody};
pub use response::{ApiResponse, Quota, ResultInfo, Usage};
pub use retry::{parse_retry_after, RetryConfig, RetryPolicy};
pub use schema::{ParamType, ParamValue, SchemaIndex};

/// Protocol version of the remote API this client was written against.
/// A differing remote version is reported with a warning at connect time.
pub const API_PROTOCOL_VERSION: f64 = 1.2;

/// Default API host.
pub const DEFAULT_HOST: &str = "https://www.targetvalidation.org";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("opentargets-api/", env!("CARGO_PKG_VERSION"));
