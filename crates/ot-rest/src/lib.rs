//! # opentargets-rest
//!
//! Endpoint wrappers for the Open Targets REST API, built on the connection
//! machinery in `opentargets-client`.
//!
//! The entry point is [`OpenTargetsClient`]: connect once, then call the
//! endpoint methods. Collection endpoints hand back a [`ResultCursor`] that
//! fetches further pages on demand while you iterate, so result sets larger
//! than one page need no extra code:
//!
//! ```rust,ignore
//! use opentargets_rest::{Filters, OpenTargetsClient};
//!
//! fn main() -> Result<(), opentargets_rest::Error> {
//!     let client = OpenTargetsClient::connect(Default::default())?;
//!
//!     let associations = client
//!         .get_associations_for_target("BRAF")?
//!         .filter("direct", true)?;
//!     println!("{associations}");
//!
//!     for association in associations {
//!         let association = association?;
//!         println!("{}", association["disease"]["efo_info"]["label"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Ad-hoc queries against any endpoint go through [`Query`] directly.

mod client;
mod cursor;
mod filters;

pub use client::{
    OpenTargetsClient, ASSOCIATION_ENDPOINT, EVIDENCE_ENDPOINT, FILTER_ASSOCIATIONS_ENDPOINT,
    FILTER_EVIDENCE_ENDPOINT, SEARCH_ENDPOINT, STATS_ENDPOINT,
};
pub use cursor::{Query, ResultCursor};
pub use filters::Filters;

pub use opentargets_client::{
    ApiResponse, Connection, ConnectionConfig, ConnectionConfigBuilder, Credentials, Error,
    ErrorKind, HttpMethod, ParamValue, Quota, Result, ResultInfo, RetryConfig, Usage,
};
