//! Error types for the MCP GraphQL domain.
//!
//! [`QueryError`] covers every way a single `run-query` invocation can fail.
//! [`ConfigError`] covers startup configuration problems; the server never
//! starts with an invalid configuration.
//!
//! None of these conditions is retried by this crate. A caller may retry at a
//! higher layer; the [`ErrorKind`] tag lets it tell local input mistakes apart
//! from upstream or transport failures.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Stable, machine-readable classification of a [`QueryError`].
///
/// Serialised in `snake_case` and surfaced to protocol clients alongside the
/// human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    InvalidHeaderFormat,
    InvalidVariablesFormat,
    TransportError,
    UpstreamError,
    Cancelled,
    DeadlineExceeded,
}

impl ErrorKind {
    /// Returns `true` if the failure was caused by the caller's input.
    ///
    /// Such failures never reach the network.
    pub fn is_caller_error(self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::InvalidHeaderFormat | Self::InvalidVariablesFormat
        )
    }

    /// Returns `true` if the invocation was stopped before it completed.
    pub fn is_interruption(self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Returns the `snake_case` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidHeaderFormat => "invalid_header_format",
            Self::InvalidVariablesFormat => "invalid_variables_format",
            Self::TransportError => "transport_error",
            Self::UpstreamError => "upstream_error",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Invocation errors
// ---------------------------------------------------------------------------

/// Errors produced while handling one `run-query` invocation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum QueryError {
    /// A required argument is missing or empty, or an argument has the wrong type.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// Name of the offending argument (e.g. `"query"`).
        argument: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The caller-supplied header override could not be used.
    ///
    /// Produced for JSON that does not parse as an object of strings, and for
    /// header names or values that are not legal on the wire.
    #[error("invalid headers '{input}': {reason}")]
    InvalidHeaderFormat {
        /// The offending text.
        input: String,
        /// Parse or validation failure.
        reason: String,
    },

    /// The caller-supplied variables are not valid JSON.
    #[error("invalid variables '{input}': {reason}")]
    InvalidVariablesFormat {
        /// The offending text.
        input: String,
        /// Parse failure reported by the JSON parser.
        reason: String,
    },

    /// The endpoint could not be reached, the connection failed, or the fixed
    /// request timeout elapsed.
    #[error("failed to execute GraphQL request against {endpoint}: {cause}")]
    Transport {
        /// Endpoint the request was sent to.
        endpoint: String,
        /// Underlying failure.
        cause: String,
    },

    /// The endpoint answered with an HTTP status of 400 or above.
    ///
    /// The raw response body is kept verbatim for diagnosis.
    #[error("GraphQL request failed with status code {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The invocation was cancelled by its caller.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the call completed.
    #[error("deadline exceeded after {after:?}")]
    DeadlineExceeded {
        /// How long the invocation was allowed to run.
        after: Duration,
    },
}

impl QueryError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidHeaderFormat { .. } => ErrorKind::InvalidHeaderFormat,
            Self::InvalidVariablesFormat { .. } => ErrorKind::InvalidVariablesFormat,
            Self::Transport { .. } => ErrorKind::TransportError,
            Self::Upstream { .. } => ErrorKind::UpstreamError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
        }
    }

    pub(crate) fn invalid_argument(argument: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.to_string(),
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Errors detected while building the process-wide configuration.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// The configured endpoint is not a usable `http`/`https` URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The configured value.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A default header flag is not of the form `KEY=VALUE`.
    #[error("header flag '{flag}' must be of the form KEY=VALUE")]
    MalformedHeaderFlag {
        /// The offending flag value.
        flag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_carries_status_and_body() {
        let err = QueryError::Upstream {
            status: 500,
            body: "\"boom\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
    }

    #[test]
    fn caller_errors_are_classified() {
        let err = QueryError::invalid_argument("query", "must be a non-empty string");
        assert!(err.kind().is_caller_error());
        assert!(!QueryError::Cancelled.kind().is_caller_error());
        assert!(QueryError::Cancelled.kind().is_interruption());
    }

    #[test]
    fn kind_serialises_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidVariablesFormat).unwrap();
        assert_eq!(json, "\"invalid_variables_format\"");
        assert_eq!(ErrorKind::InvalidVariablesFormat.as_str(), "invalid_variables_format");
    }
}
