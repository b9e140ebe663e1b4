//! Input-document construction
//!
//! Command handlers accept an optional base document plus any number
//! of `path=value` assignments and hand them here. The builder merges
//! everything into one JSON document via [`path::assign`], reporting
//! `None` when the caller supplied nothing at all so handlers can
//! tell "no input" apart from "an empty object".
//!
//! Value sources:
//! - `file:PATH` reads the file; for a plain assignment the contents
//!   stay a raw string, for the base and for `--set-json` they are
//!   parsed as JSON.
//! - `json:PATH` reads the file and always parses the contents.
//! - Anything else is inline text. Plain assignments parse it as JSON
//!   only when it looks like JSON; `--set-json` assignments always
//!   parse it; the base always parses it.

pub mod path;

use std::fs;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::{InputError, InputResult};

pub use path::{assign, split_path};

/// Prefix marking a raw file reference.
const FILE_PREFIX: &str = "file:";

/// Prefix marking a JSON file reference.
const JSON_FILE_PREFIX: &str = "json:";

static NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("numeral pattern is valid")
});

/// Raw material for one input document.
#[derive(Debug, Default, Clone)]
pub struct DocumentSpec {
    /// Base document: inline JSON text or a `file:PATH` reference
    pub base: Option<String>,
    /// `path=value` assignments with inferred value types (`--set`)
    pub assignments: Vec<String>,
    /// `path=value` assignments always parsed as JSON (`--set-json`)
    pub json_assignments: Vec<String>,
}

impl DocumentSpec {
    fn is_empty(&self) -> bool {
        self.base.is_none() && self.assignments.is_empty() && self.json_assignments.is_empty()
    }
}

/// Build one input document from a base plus assignments.
///
/// Returns `Ok(None)` when the spec is entirely empty. Assignments
/// apply in order, plain ones first, so a later write to the same
/// path wins.
pub fn build(spec: &DocumentSpec) -> InputResult<Option<Value>> {
    if spec.is_empty() {
        return Ok(None);
    }

    let mut document = match &spec.base {
        Some(base) => parse_base(base)?,
        None => Value::Object(Map::new()),
    };

    for assignment in &spec.assignments {
        let (path, raw) = split_assignment(assignment, "--set")?;
        let value = infer_value(raw, assignment)?;
        assign(&mut document, path, value)?;
    }

    for assignment in &spec.json_assignments {
        let (path, raw) = split_assignment(assignment, "--set-json")?;
        let text = resolve_text(raw)?;
        let value = serde_json::from_str(&text)
            .map_err(|e| InputError::bad_json(format!("--set-json '{assignment}'"), e))?;
        assign(&mut document, path, value)?;
    }

    Ok(Some(document))
}

fn parse_base(base: &str) -> InputResult<Value> {
    let text = resolve_text(base)?;
    serde_json::from_str(&text).map_err(|e| InputError::bad_json(format!("--input '{base}'"), e))
}

fn split_assignment<'a>(assignment: &'a str, flag: &str) -> InputResult<(&'a str, &'a str)> {
    let (path, value) = assignment
        .split_once('=')
        .ok_or_else(|| InputError::MissingSeparator(format!("{flag} {assignment}")))?;
    Ok((path, value))
}

/// Turn a `--set` value into JSON, honoring file references and the
/// looks-like-JSON heuristic for inline text.
fn infer_value(raw: &str, assignment: &str) -> InputResult<Value> {
    if let Some(file) = raw.strip_prefix(FILE_PREFIX) {
        return Ok(Value::String(read_file(file)?));
    }
    if let Some(file) = raw.strip_prefix(JSON_FILE_PREFIX) {
        let text = read_file(file)?;
        return serde_json::from_str(&text)
            .map_err(|e| InputError::bad_json(format!("--set '{assignment}'"), e));
    }
    if looks_like_json(raw) {
        return serde_json::from_str(raw)
            .map_err(|e| InputError::bad_json(format!("--set '{assignment}'"), e));
    }
    Ok(Value::String(raw.to_string()))
}

/// Resolve a value to text, reading the file behind either prefix.
fn resolve_text(raw: &str) -> InputResult<String> {
    if let Some(file) = raw.strip_prefix(FILE_PREFIX) {
        return read_file(file);
    }
    if let Some(file) = raw.strip_prefix(JSON_FILE_PREFIX) {
        return read_file(file);
    }
    Ok(raw.to_string())
}

fn read_file(path: &str) -> InputResult<String> {
    fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_string(),
        source,
    })
}

/// Whether inline text should be treated as JSON rather than a string.
fn looks_like_json(raw: &str) -> bool {
    raw.starts_with('{')
        || raw.starts_with('[')
        || raw.starts_with('"')
        || raw == "true"
        || raw == "false"
        || raw == "null"
        || NUMERAL.is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn spec(
        base: Option<&str>,
        assignments: &[&str],
        json_assignments: &[&str],
    ) -> DocumentSpec {
        DocumentSpec {
            base: base.map(String::from),
            assignments: assignments.iter().map(|s| s.to_string()).collect(),
            json_assignments: json_assignments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_spec_builds_nothing() {
        assert!(build(&DocumentSpec::default()).unwrap().is_none());
    }

    #[test]
    fn single_assignment_builds_a_document() {
        let doc = build(&spec(None, &["a.b=1"], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({"a": {"b": 1}}));
    }

    #[test]
    fn base_alone_counts_as_built() {
        let doc = build(&spec(Some("{}"), &[], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn assignments_merge_over_the_base() {
        let doc = build(&spec(Some(r#"{"a": {"keep": true}}"#), &["a.b=2"], &[]))
            .unwrap()
            .unwrap();
        assert_eq!(doc, json!({"a": {"keep": true, "b": 2}}));
    }

    #[test]
    fn scalar_base_is_legal_json() {
        let doc = build(&spec(Some("42"), &[], &[])).unwrap().unwrap();
        assert_eq!(doc, json!(42));
    }

    #[test]
    fn inline_numerals_parse_as_numbers() {
        let doc = build(&spec(None, &["n=42", "f=-3.5"], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({"n": 42, "f": -3.5}));
    }

    #[test]
    fn non_json_text_stays_a_string() {
        let doc = build(&spec(None, &["n=forty-two"], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({"n": "forty-two"}));
    }

    #[test]
    fn json_literals_and_containers_parse() {
        let doc = build(
            &spec(None, &["t=true", "x=null", r#"o={"k":1}"#, "l=[1,2]"], &[]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc, json!({"t": true, "x": null, "o": {"k": 1}, "l": [1, 2]}));
    }

    #[test]
    fn set_json_always_parses() {
        let doc = build(&spec(None, &[], &["n=42"])).unwrap().unwrap();
        assert_eq!(doc, json!({"n": 42}));

        let err = build(&spec(None, &[], &["n=forty-two"])).unwrap_err();
        assert!(matches!(err, InputError::InvalidJson { .. }));
    }

    #[test]
    fn later_assignment_overwrites_earlier() {
        let doc = build(&spec(None, &["a=1", "a=2"], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({"a": 2}));
    }

    #[test]
    fn missing_separator_is_flag_attributed() {
        let err = build(&spec(None, &["oops"], &[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid assignment '--set oops': expected <path>=<value>"
        );
    }

    #[test]
    fn file_reference_keeps_raw_string_for_set() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "42").unwrap();
        let assignment = format!("v=file:{}", f.path().display());
        let doc = build(&spec(None, &[&assignment], &[])).unwrap().unwrap();
        // Raw file contents stay a string even when they look like JSON
        assert_eq!(doc, json!({"v": "42"}));
    }

    #[test]
    fn json_file_reference_parses_for_set() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"k": [1, 2]}}"#).unwrap();
        let assignment = format!("v=json:{}", f.path().display());
        let doc = build(&spec(None, &[&assignment], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({"v": {"k": [1, 2]}}));
    }

    #[test]
    fn base_file_reference_parses_as_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"from": "file"}}"#).unwrap();
        let base = format!("file:{}", f.path().display());
        let doc = build(&spec(Some(&base), &[], &[])).unwrap().unwrap();
        assert_eq!(doc, json!({"from": "file"}));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = build(&spec(None, &["v=file:/no/such/file"], &[])).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
