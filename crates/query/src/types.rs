//! Shared value types for a single `run-query` invocation.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry the data
//! that flows through the handler: header sets, the typed request decoded from
//! the caller's argument bag, the GraphQL wire envelope, and the raw HTTP reply
//! returned by the transport port.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{QueryError, QueryText};

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Header names and values in insertion order.
///
/// Names are kept exactly as supplied; no case folding happens here. Inserting
/// an existing name replaces its value in place, and a new name is appended.
/// Consumers that fold case (HTTP does) must let later entries win, so an
/// entry added after another whose name differs only in case takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a header, returning the previous value for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Returns the value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over header names only. Used for logging; values may be secrets.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, String)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<(String, String)> for HeaderSet {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Typed request
// ---------------------------------------------------------------------------

/// The `run-query` arguments after decoding and validation.
///
/// `variables` and `headers` stay as raw JSON text here; they are parsed by the
/// dispatcher and the header merger respectively so that each can report its
/// own error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQueryRequest {
    pub query: QueryText,
    pub variables: Option<String>,
    pub headers: Option<String>,
}

impl RunQueryRequest {
    pub const QUERY: &'static str = "query";
    pub const VARIABLES: &'static str = "variables";
    pub const HEADERS: &'static str = "headers";

    /// Decodes the loosely-typed argument bag received at the protocol boundary.
    ///
    /// `query` must be a non-empty string. `variables` and `headers` may be
    /// missing or `null`; otherwise they must be strings.
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, QueryError> {
        let query = match arguments.get(Self::QUERY) {
            None | Some(Value::Null) => {
                return Err(QueryError::invalid_argument(Self::QUERY, "is required"));
            }
            Some(Value::String(s)) => QueryText::new(s.as_str()).ok_or_else(|| {
                QueryError::invalid_argument(Self::QUERY, "must be a non-empty string")
            })?,
            Some(other) => {
                return Err(QueryError::invalid_argument(
                    Self::QUERY,
                    format!("expected a string, got {}", json_type_name(other)),
                ));
            }
        };

        Ok(Self {
            query,
            variables: optional_string(arguments, Self::VARIABLES)?,
            headers: optional_string(arguments, Self::HEADERS)?,
        })
    }
}

fn optional_string(arguments: &Map<String, Value>, name: &str) -> Result<Option<String>, QueryError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(QueryError::invalid_argument(
            name,
            format!("expected a JSON-encoded string, got {}", json_type_name(other)),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The JSON body posted to a GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlEnvelope<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// Status and full body of an HTTP response, as returned by the transport port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}
