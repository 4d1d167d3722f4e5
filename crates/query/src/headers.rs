//! Header merging.
//!
//! Combines the operator-configured default headers with an optional per-call
//! override given as JSON text. The override wins on key collision; header
//! names are compared exactly as written. Override entries are placed after
//! the defaults, so they also win where a case-folding consumer collapses two
//! names onto one.

use std::collections::BTreeMap;

use crate::{HeaderSet, QueryError};

/// Produces the effective header set for one invocation.
///
/// An absent or empty override yields a copy of `defaults`. Otherwise the
/// override must be a JSON object whose values are all strings.
pub fn merge(defaults: &HeaderSet, override_json: Option<&str>) -> Result<HeaderSet, QueryError> {
    let mut effective = defaults.clone();

    let Some(raw) = override_json.filter(|s| !s.is_empty()) else {
        return Ok(effective);
    };

    let overrides: BTreeMap<String, String> =
        serde_json::from_str(raw).map_err(|e| QueryError::InvalidHeaderFormat {
            input: raw.to_string(),
            reason: e.to_string(),
        })?;

    effective.extend(overrides);
    Ok(effective)
}
