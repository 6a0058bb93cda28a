//! # opentargets-api
//!
//! Umbrella crate for the Open Targets REST API client. Re-exports the
//! connection layer (`opentargets-client`) and the endpoint wrappers
//! (`opentargets-rest`); most applications only need the latter.
//!
//! ```rust,ignore
//! use opentargets_api::rest::{Filters, OpenTargetsClient};
//!
//! let client = OpenTargetsClient::connect(Default::default())?;
//! for hit in client.search("braf")? {
//!     println!("{}", hit?["id"]);
//! }
//! ```

#[cfg(feature = "client")]
pub use opentargets_client as client;

#[cfg(feature = "rest")]
pub use opentargets_rest as rest;

#[cfg(feature = "rest")]
pub use opentargets_rest::{
    Connection, ConnectionConfig, Credentials, Error, ErrorKind, Filters, OpenTargetsClient,
    Query, Result, ResultCursor, RetryConfig,
};
