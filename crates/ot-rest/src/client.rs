//! High-level endpoint methods for the Open Targets REST API.

use serde_json::Value;
use tracing::debug;

use opentargets_client::{ApiResponse, Connection, ConnectionConfig, Error, ErrorKind, Result};

use crate::cursor::{Query, ResultCursor};
use crate::filters::Filters;

/// Free-text search endpoint.
pub const SEARCH_ENDPOINT: &str = "/public/search";
/// Single-association lookup endpoint.
pub const ASSOCIATION_ENDPOINT: &str = "/public/association";
/// Association filter endpoint.
pub const FILTER_ASSOCIATIONS_ENDPOINT: &str = "/public/association/filter";
/// Single-evidence lookup endpoint.
pub const EVIDENCE_ENDPOINT: &str = "/public/evidence";
/// Evidence filter endpoint.
pub const FILTER_EVIDENCE_ENDPOINT: &str = "/public/evidence/filter";
/// API statistics endpoint.
pub const STATS_ENDPOINT: &str = "/public/utils/stats";

/// Client for the Open Targets REST API.
///
/// Wraps a [`Connection`] with methods for each public endpoint. Collection
/// endpoints return a [`ResultCursor`] that paginates transparently; lookup
/// endpoints return the raw [`ApiResponse`].
///
/// # Example
///
/// ```rust,ignore
/// use opentargets_rest::{Filters, OpenTargetsClient};
///
/// let client = OpenTargetsClient::connect(Default::default())?;
/// let hits = client.get_associations_for_target("BRAF")?;
/// for hit in hits {
///     println!("{}", hit?["id"]);
/// }
/// ```
#[derive(Debug)]
pub struct OpenTargetsClient {
    conn: Connection,
}

impl OpenTargetsClient {
    /// Connect to the API and build a client.
    pub fn connect(config: ConnectionConfig) -> Result<Self> {
        Ok(Self {
            conn: Connection::connect(config)?,
        })
    }

    /// Build a client over an already-established connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Free-text search across targets, diseases and other entities.
    pub fn search(&self, query: &str) -> Result<ResultCursor<'_>> {
        self.search_with(query, Filters::new())
    }

    /// Free-text search with additional filters, e.g. `filter=target` or
    /// `size`.
    pub fn search_with(&self, query: &str, filters: Filters) -> Result<ResultCursor<'_>> {
        Query::get(SEARCH_ENDPOINT)
            .with("q", query)
            .with_filters(filters)
            .execute(&self.conn)
    }

    /// Fetch a single association by its identifier.
    pub fn get_association(&self, association_id: &str) -> Result<ApiResponse> {
        self.conn.get(
            ASSOCIATION_ENDPOINT,
            vec![("id".to_string(), association_id.to_string())],
        )
    }

    /// Query the association filter endpoint directly.
    pub fn filter_associations(&self, filters: Filters) -> Result<ResultCursor<'_>> {
        Query::get(FILTER_ASSOCIATIONS_ENDPOINT)
            .with_filters(filters)
            .execute(&self.conn)
    }

    /// All disease associations for a target, looked up by symbol or name.
    ///
    /// The query string is first resolved to a target identifier through
    /// search, then the associations are fetched for that identifier.
    pub fn get_associations_for_target(&self, target: &str) -> Result<ResultCursor<'_>> {
        let id = self.best_hit_id(target, "target")?;
        self.filter_associations(Filters::new().with("target", id))
    }

    /// All target associations for a disease, looked up by name.
    pub fn get_associations_for_disease(&self, disease: &str) -> Result<ResultCursor<'_>> {
        let id = self.best_hit_id(disease, "disease")?;
        self.filter_associations(Filters::new().with("disease", id))
    }

    /// Fetch a single evidence string by its identifier.
    pub fn get_evidence(&self, evidence_id: &str) -> Result<ApiResponse> {
        self.conn.get(
            EVIDENCE_ENDPOINT,
            vec![("id".to_string(), evidence_id.to_string())],
        )
    }

    /// Query the evidence filter endpoint directly.
    pub fn filter_evidence(&self, filters: Filters) -> Result<ResultCursor<'_>> {
        Query::get(FILTER_EVIDENCE_ENDPOINT)
            .with_filters(filters)
            .execute(&self.conn)
    }

    /// All evidence for a target, looked up by symbol or name.
    pub fn get_evidence_for_target(&self, target: &str) -> Result<ResultCursor<'_>> {
        let id = self.best_hit_id(target, "target")?;
        self.filter_evidence(Filters::new().with("target", id))
    }

    /// All evidence for a disease, looked up by name.
    pub fn get_evidence_for_disease(&self, disease: &str) -> Result<ResultCursor<'_>> {
        let id = self.best_hit_id(disease, "disease")?;
        self.filter_evidence(Filters::new().with("disease", id))
    }

    /// Statistics about the current data release.
    pub fn get_stats(&self) -> Result<ApiResponse> {
        self.conn.get(STATS_ENDPOINT, Vec::new())
    }

    /// Resolve a free-text query to the identifier of its best search hit of
    /// the given kind (`target` or `disease`).
    fn best_hit_id(&self, query: &str, kind: &str) -> Result<String> {
        let response = self.conn.get(
            SEARCH_ENDPOINT,
            vec![
                ("filter".to_string(), kind.to_string()),
                ("q".to_string(), query.to_string()),
                ("size".to_string(), "1".to_string()),
            ],
        )?;

        let id = response
            .records()
            .first()
            .and_then(|hit| hit.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound(format!("no {kind} found for '{query}'")))
            })?;
        debug!(%query, %kind, %id, "resolved best search hit");
        Ok(id)
    }
}
