//! Process-wide configuration, built once at startup and read-only afterwards.

use crate::{ConfigError, Endpoint, HeaderSet};

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// The configuration every `run-query` invocation reads.
///
/// Constructed by the composition root and moved into the handler; nothing
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub endpoint: Endpoint,
    pub default_headers: HeaderSet,
}

impl QueryConfig {
    pub fn new(endpoint: Endpoint, default_headers: HeaderSet) -> Self {
        Self {
            endpoint,
            default_headers,
        }
    }

    /// Builds a configuration from raw flag values.
    ///
    /// Each header flag is `KEY=VALUE`, split on the first `=`. A later flag for
    /// the same key replaces an earlier one.
    pub fn from_flags<I, S>(endpoint: &str, header_flags: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoint = Endpoint::parse(endpoint)?;
        let mut default_headers = HeaderSet::new();
        for flag in header_flags {
            let (key, value) = parse_header_flag(flag.as_ref())?;
            default_headers.insert(key, value);
        }
        Ok(Self::new(endpoint, default_headers))
    }
}

/// Splits a `KEY=VALUE` flag on its first `=`.
pub fn parse_header_flag(flag: &str) -> Result<(String, String), ConfigError> {
    match flag.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(ConfigError::MalformedHeaderFlag {
            flag: flag.to_string(),
        }),
    }
}
