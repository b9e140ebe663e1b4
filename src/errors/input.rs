//! Input-shape error types
//!
//! These cover everything that can go wrong while turning command-line
//! flags into an input document or a field selection: malformed paths,
//! malformed JSON, unreadable referenced files, and assignments that
//! would have to overwrite an existing scalar to proceed.

use thiserror::Error;

/// Errors raised while building input documents and selections.
#[derive(Error, Debug)]
pub enum InputError {
    /// Path with no non-empty segments
    #[error("invalid path '{0}': expected at least one non-empty segment")]
    EmptyPath(String),

    /// Assignment missing the `=` separator
    #[error("invalid assignment '{0}': expected <path>=<value>")]
    MissingSeparator(String),

    /// Value failed to parse as JSON
    #[error("invalid JSON for {context}: {source}")]
    InvalidJson {
        /// Flag or assignment the bad value came from
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// An intermediate path segment ran into an existing non-container value
    #[error("cannot assign '{path}': segment '{segment}' already holds a {found} value")]
    TypeConflict {
        /// Full path of the failing assignment
        path: String,
        /// Segment at which the walk stopped
        segment: String,
        /// Kind of value found in the way
        found: &'static str,
    },

    /// All-digit segment too large to be an array index
    #[error("array index '{0}' is out of range")]
    InvalidIndex(String),

    /// Referenced file could not be read
    #[error("failed to read '{path}'")]
    Io {
        /// Path of the file reference
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Selection value was not `true` or a nested object
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

impl InputError {
    /// Wrap a `serde_json` failure with the flag it came from.
    pub fn bad_json(context: impl Into<String>, source: serde_json::Error) -> Self {
        InputError::InvalidJson {
            context: context.into(),
            source,
        }
    }
}
