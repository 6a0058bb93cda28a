//! Response envelope: payload splitting, pagination info, usage metrics.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

const USAGE_LIMIT_1H: &str = "X-Usage-Limit-1h";
const USAGE_LIMIT_10S: &str = "X-Usage-Limit-10s";
const USAGE_REMAINING_1H: &str = "X-Usage-Remaining-1h";
const USAGE_REMAINING_10S: &str = "X-Usage-Remaining-10s";

/// Parsed response from the API.
///
/// For paginated collections `data` is the record array and `info` carries
/// the pagination metadata the server returned alongside it. For bare
/// payloads (e.g. the version endpoint) `data` is the payload itself and
/// `info` is empty.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Record list, or the raw payload for non-collection responses.
    pub data: Value,
    /// Pagination metadata from the response body.
    pub info: ResultInfo,
    /// Fair-usage metrics from the response headers, when present.
    pub usage: Option<Usage>,
}

/// Pagination metadata returned alongside a record collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultInfo {
    /// Total number of records matching the query.
    pub total: Option<Value>,
    /// Offset this page starts at. Renamed from the wire field `from`,
    /// which is a Rust keyword.
    #[serde(rename = "from")]
    pub from_: Option<Value>,
    /// Page size the server applied.
    pub size: Option<Value>,
    /// Any further metadata fields, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultInfo {
    /// `total` coerced to an integer, tolerating numeric strings.
    pub fn total_count(&self) -> Option<usize> {
        coerce_count(self.total.as_ref()?)
    }
}

fn coerce_count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Fair-usage quota pair: hourly window and 10-second window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub hour: i64,
    pub seconds_10: i64,
}

/// Fair-usage metrics reported via `X-Usage-*` response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub limit: Quota,
    pub remaining: Quota,
}

impl Usage {
    /// Extract usage metrics from response headers. Returns None when the
    /// server did not send them; that is not an error.
    pub fn from_headers(headers: &HeaderMap) -> Option<Usage> {
        let read = |name: &str| -> Option<i64> {
            headers.get(name)?.to_str().ok()?.trim().parse().ok()
        };
        Some(Usage {
            limit: Quota {
                hour: read(USAGE_LIMIT_1H)?,
                seconds_10: read(USAGE_LIMIT_10S)?,
            },
            remaining: Quota {
                hour: read(USAGE_REMAINING_1H)?,
                seconds_10: read(USAGE_REMAINING_10S)?,
            },
        })
    }

    /// The smaller of the two remaining counts.
    pub fn minimum_remaining(&self) -> i64 {
        self.remaining.hour.min(self.remaining.seconds_10)
    }

    /// True when the server reports the quota as overdrawn.
    pub fn exceeded(&self) -> bool {
        self.minimum_remaining() < 0
    }
}

impl ApiResponse {
    /// Parse a raw HTTP response. The response must declare a JSON content
    /// type (an absent header is tolerated).
    pub fn from_http(response: reqwest::blocking::Response) -> Result<Self> {
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !content_type.contains("json") {
                return Err(Error::new(ErrorKind::UnsupportedContentType(
                    content_type.to_string(),
                )));
            }
        }

        let usage = Usage::from_headers(response.headers());
        if let Some(usage) = &usage {
            if usage.exceeded() {
                warn!(
                    remaining = usage.minimum_remaining(),
                    "fair usage limit exceeded"
                );
            }
        }

        let body: Value = response.json()?;
        let (data, info) = split_payload(body)?;

        Ok(Self { data, info, usage })
    }

    /// The records in this response. Empty for non-collection payloads.
    pub fn records(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Consume the response and take its records.
    pub fn into_records(self) -> Vec<Value> {
        match self.data {
            Value::Array(records) => records,
            _ => Vec::new(),
        }
    }

    /// Declared total when the server reported one, else the number of
    /// records actually present.
    pub fn len(&self) -> usize {
        self.info
            .total_count()
            .unwrap_or_else(|| self.records().len())
    }

    /// True when `len()` is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a parsed body into records and pagination info. An object body has
/// its `data` key extracted (missing key means no records); the remainder is
/// the info block. Anything else is a bare payload with empty info.
fn split_payload(body: Value) -> Result<(Value, ResultInfo)> {
    match body {
        Value::Object(mut map) => {
            let data = map.remove("data").unwrap_or_else(|| Value::Array(Vec::new()));
            let info: ResultInfo = serde_json::from_value(Value::Object(map))?;
            Ok((data, info))
        }
        other => Ok((other, ResultInfo::default())),
    }
}
