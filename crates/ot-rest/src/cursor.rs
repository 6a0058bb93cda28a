//! Query descriptors and the lazy, auto-paginating result cursor.
//!
//! A [`Query`] describes what to ask for; executing it against a
//! [`Connection`] produces a [`ResultCursor`], which owns the iteration
//! state. The cursor buffers one page at a time and re-issues the query with
//! an advanced `from` offset whenever the buffer runs dry, so iterating it
//! walks the full result set no matter how many pages the server splits it
//! into.

use std::collections::{BTreeMap, VecDeque};

use serde_json::Value;
use tracing::debug;

use opentargets_client::{
    ApiRequest, ApiResponse, Connection, Error, ErrorKind, HttpMethod, ParamValue, Result,
    ResultInfo, Usage,
};

use crate::filters::Filters;

/// Query parameter carrying the pagination offset.
const PAGE_OFFSET_PARAM: &str = "from";

/// An endpoint plus its parameters, not yet executed.
#[derive(Debug, Clone)]
pub struct Query {
    endpoint: String,
    method: HttpMethod,
    params: BTreeMap<String, ParamValue>,
}

impl Query {
    /// Create a query against an endpoint.
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            params: BTreeMap::new(),
        }
    }

    /// Create a GET query.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    /// Create a POST query.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Merge a filter set into the parameters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        for (name, value) in filters {
            self.params.insert(name, value);
        }
        self
    }

    /// The endpoint this query targets.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The HTTP method this query uses.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Perform the initial fetch and hand the result to a cursor.
    pub fn execute(self, conn: &Connection) -> Result<ResultCursor<'_>> {
        let response = self.fetch(conn)?;
        Ok(ResultCursor::from_response(conn, self, response))
    }

    fn fetch(&self, conn: &Connection) -> Result<ApiResponse> {
        conn.send(self.to_request())
    }

    fn to_request(&self) -> ApiRequest {
        match self.method {
            HttpMethod::Get => ApiRequest::get(&self.endpoint).params(
                self.params
                    .iter()
                    .map(|(name, value)| (name.clone(), value.render())),
            ),
            HttpMethod::Post => ApiRequest::post(&self.endpoint).form(
                self.params
                    .iter()
                    .map(|(name, value)| (name.clone(), value.render()))
                    .collect(),
            ),
        }
    }

    fn render_params(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lazy iterator over a query's full result set.
///
/// Holds one buffered page of unread records; when the buffer empties and
/// the declared total has not been reached, the query is re-issued with
/// `from` set to the number of records consumed so far. Iteration stops once
/// `current == total`.
///
/// Access must be serialized by the caller; independent cursors over the
/// same connection are fine.
#[derive(Debug)]
pub struct ResultCursor<'a> {
    conn: &'a Connection,
    query: Query,
    info: ResultInfo,
    usage: Option<Usage>,
    buffer: VecDeque<Value>,
    current: usize,
    total: usize,
}

impl<'a> ResultCursor<'a> {
    fn from_response(conn: &'a Connection, query: Query, response: ApiResponse) -> Self {
        let info = response.info.clone();
        let usage = response.usage;
        let records = response.into_records();
        // A server that reports no usable total is taken at face value: the
        // first page is the whole result set.
        let total = info.total_count().unwrap_or(records.len());
        Self {
            conn,
            query,
            info,
            usage,
            buffer: records.into(),
            current: 0,
            total,
        }
    }

    /// Total number of records in the result set.
    pub fn len(&self) -> usize {
        self.total
    }

    /// True when the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of records consumed so far. Never exceeds [`len`](Self::len).
    pub fn current(&self) -> usize {
        self.current
    }

    /// Pagination metadata from the most recent initial fetch.
    pub fn info(&self) -> &ResultInfo {
        &self.info
    }

    /// Fair-usage metrics from the most recent initial fetch, when reported.
    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    /// The query this cursor iterates.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Narrow the result set by one filter and start over.
    ///
    /// The value is validated against the remote schema for this cursor's
    /// endpoint and method before anything is sent. The returned cursor is
    /// freshly activated: buffer, consumed count and total all reset.
    pub fn filter(self, name: &str, value: impl Into<ParamValue>) -> Result<Self> {
        self.filter_all(Filters::new().with(name, value))
    }

    /// Narrow the result set by a filter set in a single re-execution.
    ///
    /// Every value is validated before the query is re-issued. An empty set
    /// is a no-op and keeps the current iteration state.
    pub fn filter_all(self, filters: Filters) -> Result<Self> {
        if filters.is_empty() {
            return Ok(self);
        }

        for (name, value) in filters.iter() {
            self.conn
                .validate_parameter(&self.query.endpoint, self.query.method, name, value)?;
        }

        let conn = self.conn;
        let mut query = self.query;
        // Any offset left over from pagination must not constrain the
        // narrowed query.
        query.params.remove(PAGE_OFFSET_PARAM);
        for (name, value) in filters {
            query.params.insert(name, value);
        }
        debug!(endpoint = %query.endpoint, "re-executing filtered query");
        query.execute(conn)
    }

    /// The record at `index` among the not-yet-consumed records, advancing
    /// the cursor past it. Returns None when the result set ends first.
    pub fn nth_remaining(&mut self, index: usize) -> Result<Option<Value>> {
        for _ in 0..index {
            match self.next() {
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(None),
            }
        }
        self.next().transpose()
    }

    /// Records at `start`, `start + step`, ... below `stop` (unbounded when
    /// None), indexed among the not-yet-consumed records. Consumes every
    /// record up to the slice end.
    pub fn slice(&mut self, start: usize, stop: Option<usize>, step: usize) -> Result<Vec<Value>> {
        if step == 0 {
            return Err(Error::new(ErrorKind::Other(
                "slice step must be at least 1".to_string(),
            )));
        }

        let mut out = Vec::new();
        let mut index = 0usize;
        while stop.map_or(true, |stop| index < stop) {
            match self.next() {
                Some(Ok(record)) => {
                    if index >= start && (index - start) % step == 0 {
                        out.push(record);
                    }
                }
                Some(Err(e)) => return Err(e),
                None => break,
            }
            index += 1;
        }
        Ok(out)
    }

    /// Drain the remaining records into a vector.
    pub fn collect_records(&mut self) -> Result<Vec<Value>> {
        self.by_ref().collect()
    }
}

impl Iterator for ResultCursor<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }

        if self.buffer.is_empty() {
            self.query
                .params
                .insert(PAGE_OFFSET_PARAM.to_string(), ParamValue::Int(self.current as i64));
            match self.query.fetch(self.conn) {
                Ok(response) => self.buffer = response.into_records().into(),
                Err(e) => return Some(Err(e)),
            }
        }

        // A follow-up page with no records ends the iteration early rather
        // than looping on the same offset.
        let record = self.buffer.pop_front()?;
        self.current += 1;
        Some(Ok(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.current;
        (remaining, Some(remaining))
    }
}

impl std::fmt::Display for ResultCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Results found", self.total)?;
        if !self.query.params.is_empty() {
            write!(f, " | parameters: {}", self.query.render_params())?;
        }
        Ok(())
    }
}
