//! Authorization-denial extraction
//!
//! Filters a batch of server errors down to the ones tagged with the
//! `ACCESS_DENIED` code and pulls out where in the selection each one
//! points. Paths are only usable for pruning when every entry is a
//! field name; an entry that is a list index means the denial sits
//! inside list data and cannot be mapped back onto the selection, so
//! such a denial is kept but reported with an empty path.

use serde_json::Value;

use crate::errors::ServerError;

/// One authorization denial extracted from a server error batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeniedField {
    /// Field path into the selection; empty when the server's path
    /// was missing or contained non-string entries
    pub path: Vec<String>,
    /// Server-supplied hint naming the access the caller lacks
    pub required_access: Option<String>,
}

/// Extract every authorization denial from `errors`.
pub fn locate_denials(errors: &[ServerError]) -> Vec<DeniedField> {
    errors
        .iter()
        .filter(|error| error.is_access_denied())
        .map(|error| DeniedField {
            path: field_path(error.path.as_deref()),
            required_access: error.required_access().map(String::from),
        })
        .collect()
}

/// A path is usable only when every entry is a string.
fn field_path(path: Option<&[Value]>) -> Vec<String> {
    let Some(entries) = path else {
        return Vec::new();
    };
    let mut segments = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.as_str() {
            Some(segment) => segments.push(segment.to_string()),
            None => return Vec::new(),
        }
    }
    segments
}
