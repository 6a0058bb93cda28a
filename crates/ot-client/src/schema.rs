//! Remote API schema index and pre-flight parameter validation.
//!
//! The remote API publishes a swagger document describing every endpoint's
//! parameters. At connect time the document is fetched once and flattened
//! into a lookup table of endpoint x method x parameter -> declared type;
//! filter values are checked against that table before any network call.

use std::collections::HashMap;

use crate::error::{Error, ErrorKind, Result};
use crate::request::HttpMethod;

/// Declared parameter type in the remote schema.
///
/// The swagger tags `number` and `integer` both map to [`ParamType::Number`];
/// anything else (including a missing tag) is a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Boolean,
    Number,
}

impl ParamType {
    fn from_swagger(tag: &str) -> Self {
        match tag {
            "boolean" => ParamType::Boolean,
            "number" | "integer" => ParamType::Number,
            _ => ParamType::String,
        }
    }
}

/// A typed filter value.
///
/// Number covers both integer and floating forms, matching the schema's
/// single `number` type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// True when the value's runtime type matches the declared type.
    pub fn matches(&self, declared: ParamType) -> bool {
        match (self, declared) {
            (ParamValue::String(_), ParamType::String) => true,
            (ParamValue::Bool(_), ParamType::Boolean) => true,
            (ParamValue::Int(_) | ParamValue::Float(_), ParamType::Number) => true,
            _ => false,
        }
    }

    /// Query-string rendering of the value.
    pub fn render(&self) -> String {
        match self {
            ParamValue::String(s) => s.clone(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value.into())
    }
}

impl From<&ParamValue> for serde_json::Value {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::String(s) => serde_json::Value::String(s.clone()),
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Int(i) => serde_json::Value::from(*i),
            ParamValue::Float(f) => serde_json::Value::from(*f),
        }
    }
}

type ParamTable = HashMap<String, ParamType>;

/// Client-side index of the remote API's declared parameter types.
///
/// Built once at connection setup; read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    endpoints: HashMap<String, HashMap<HttpMethod, ParamTable>>,
}

impl SchemaIndex {
    /// An index with no endpoints. Every validation against it fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from a swagger YAML document.
    pub fn from_swagger_yaml(text: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(text)?;
        Self::from_document(&document)
    }

    /// Build the index from an already parsed swagger document.
    pub fn from_document(document: &serde_yaml::Value) -> Result<Self> {
        let paths = document
            .get("paths")
            .and_then(serde_yaml::Value::as_mapping)
            .ok_or_else(|| {
                Error::new(ErrorKind::Schema(
                    "swagger document has no 'paths' map".to_string(),
                ))
            })?;

        let mut endpoints: HashMap<String, HashMap<HttpMethod, ParamTable>> = HashMap::new();
        for (path, item) in paths {
            let Some(path) = path.as_str() else { continue };
            let endpoint = normalize_path(path);
            let methods = endpoints.entry(endpoint).or_default();

            let Some(item) = item.as_mapping() else { continue };
            for (method_key, operation) in item {
                let Some(method) = method_key.as_str().and_then(HttpMethod::parse) else {
                    continue;
                };
                let Some(parameters) = operation
                    .get("parameters")
                    .and_then(serde_yaml::Value::as_sequence)
                else {
                    continue;
                };

                let table = methods.entry(method).or_default();
                for parameter in parameters {
                    let Some(name) = parameter.get("name").and_then(serde_yaml::Value::as_str)
                    else {
                        continue;
                    };
                    let declared = parameter
                        .get("type")
                        .and_then(serde_yaml::Value::as_str)
                        .map(ParamType::from_swagger)
                        .unwrap_or(ParamType::String);
                    table.insert(name.to_string(), declared);
                }
            }
        }

        Ok(Self { endpoints })
    }

    /// Number of indexed endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Declared type of a parameter, if the schema knows it.
    pub fn parameter_type(
        &self,
        endpoint: &str,
        method: HttpMethod,
        name: &str,
    ) -> Option<ParamType> {
        self.endpoints
            .get(endpoint)?
            .get(&method)?
            .get(name)
            .copied()
    }

    /// Validate a filter value against the declared parameter type.
    ///
    /// Unknown endpoints, unknown parameters, and type mismatches all fail
    /// the same way, before any network traffic.
    pub fn validate(
        &self,
        endpoint: &str,
        method: HttpMethod,
        name: &str,
        value: &ParamValue,
    ) -> Result<()> {
        match self.parameter_type(endpoint, method, name) {
            Some(declared) if value.matches(declared) => Ok(()),
            _ => Err(Error::new(ErrorKind::InvalidParameter {
                endpoint: endpoint.to_string(),
                name: name.to_string(),
                value: value.render(),
            })),
        }
    }
}

/// Normalize a documented path to the endpoint form used at request time:
/// path-parameter braces and everything after them are dropped, as is a
/// trailing slash.
fn normalize_path(path: &str) -> String {
    let path = path.split('{').next().unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path).to_string()
}
