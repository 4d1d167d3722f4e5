//! Newtype identifiers and validated string values.
//!
//! Every value that has an identity or a non-trivial validity rule is a
//! distinct newtype wrapping a primitive. This prevents accidentally passing,
//! for example, a raw tool name where a query text is expected, even though
//! both are `String` under the hood.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new value, returning `None` if the input is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String-backed values
// ---------------------------------------------------------------------------

string_id! {
    /// The text of a GraphQL document supplied by the caller.
    ///
    /// Guaranteed non-empty. The document is not parsed or validated against
    /// any schema; it is forwarded to the endpoint as-is.
    QueryText
}

string_id! {
    /// Name of a tool exposed over the protocol boundary (e.g. `"run-query"`).
    ToolName
}

// ---------------------------------------------------------------------------
// UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single tool invocation.
///
/// Generated fresh for every call and attached to its tracing span so all log
/// events from one invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// The GraphQL endpoint every query is posted to.
///
/// Validated once at startup; dispatch never re-parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Parses and validates an endpoint URL. Only `http` and `https` are accepted.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(ConfigError::InvalidEndpoint {
                endpoint: raw.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Returns the endpoint as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
