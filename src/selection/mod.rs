//! Field-selection trees
//!
//! A request to the graph API is a nested field selection mirroring
//! the shape of the expected response. On the wire it is a JSON
//! object whose values are `true` (scalar leaf) or another selection,
//! with two reserved keys: `__args` for call arguments and `__on` for
//! type-conditional sub-selections. Internally those reserved parts
//! live in their own slots, so walking or measuring the field map
//! never needs to filter them out.

pub mod prune;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::errors::{InputError, InputResult};

pub use prune::prune;

/// Reserved wire key carrying call arguments.
pub const ARGUMENTS_KEY: &str = "__args";

/// Reserved wire key carrying type-conditional sub-selections.
pub const TYPE_CONDITIONS_KEY: &str = "__on";

/// One field inside a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Scalar field, rendered as `true`
    Leaf,
    /// Sub-object selection
    Node(SelectionNode),
}

/// A nested field selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionNode {
    /// Call arguments for this field, rendered under `__args`
    pub arguments: Option<Map<String, Value>>,
    /// Selected fields, in declaration order
    pub fields: IndexMap<String, Selection>,
    /// Type-conditional sub-selections, rendered under `__on`
    pub type_conditions: IndexMap<String, SelectionNode>,
}

impl SelectionNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from dotted field paths.
    ///
    /// `["id", "owner.login"]` selects the `id` leaf plus the `login`
    /// leaf under an `owner` sub-selection. A path that first appears
    /// as a parent and later as a leaf (or vice versa) keeps the
    /// sub-selection form.
    pub fn from_field_paths<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut root = SelectionNode::new();
        for path in paths {
            let segments: Vec<&str> = path
                .as_ref()
                .split('.')
                .filter(|s| !s.is_empty())
                .collect();
            root.select_path(&segments);
        }
        root
    }

    fn select_path(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        if rest.is_empty() {
            // Do not demote an existing sub-selection to a leaf
            self.fields
                .entry(first.to_string())
                .or_insert(Selection::Leaf);
            return;
        }
        let child = self
            .fields
            .entry(first.to_string())
            .or_insert_with(|| Selection::Node(SelectionNode::new()));
        if let Selection::Leaf = child {
            *child = Selection::Node(SelectionNode::new());
        }
        if let Selection::Node(node) = child {
            node.select_path(rest);
        }
    }

    /// Attach call arguments to this node.
    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Whether this node selects nothing (arguments never count).
    pub fn is_selection_empty(&self) -> bool {
        self.fields.is_empty() && self.type_conditions.is_empty()
    }

    /// Render the wire shape.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(arguments) = &self.arguments {
            map.insert(ARGUMENTS_KEY.to_string(), Value::Object(arguments.clone()));
        }
        for (name, selection) in &self.fields {
            let rendered = match selection {
                Selection::Leaf => Value::Bool(true),
                Selection::Node(node) => node.to_value(),
            };
            map.insert(name.clone(), rendered);
        }
        if !self.type_conditions.is_empty() {
            let mut conditions = Map::new();
            for (type_name, node) in &self.type_conditions {
                conditions.insert(type_name.clone(), node.to_value());
            }
            map.insert(TYPE_CONDITIONS_KEY.to_string(), Value::Object(conditions));
        }
        Value::Object(map)
    }

    /// Parse the wire shape back into a typed tree.
    ///
    /// Field values must be `true` or a nested object; anything else
    /// is rejected so a malformed selection fails before any request
    /// is issued.
    pub fn from_value(value: &Value) -> InputResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            InputError::InvalidSelection(format!("expected an object, got {value}"))
        })?;

        let mut node = SelectionNode::new();
        for (key, entry) in map {
            match key.as_str() {
                ARGUMENTS_KEY => {
                    let arguments = entry.as_object().ok_or_else(|| {
                        InputError::InvalidSelection(format!(
                            "'{ARGUMENTS_KEY}' must be an object, got {entry}"
                        ))
                    })?;
                    node.arguments = Some(arguments.clone());
                }
                TYPE_CONDITIONS_KEY => {
                    let conditions = entry.as_object().ok_or_else(|| {
                        InputError::InvalidSelection(format!(
                            "'{TYPE_CONDITIONS_KEY}' must be an object, got {entry}"
                        ))
                    })?;
                    for (type_name, condition) in conditions {
                        node.type_conditions
                            .insert(type_name.clone(), SelectionNode::from_value(condition)?);
                    }
                }
                _ => {
                    let selection = match entry {
                        Value::Bool(true) => Selection::Leaf,
                        Value::Object(_) => Selection::Node(SelectionNode::from_value(entry)?),
                        other => {
                            return Err(InputError::InvalidSelection(format!(
                                "field '{key}' must be true or an object, got {other}"
                            )))
                        }
                    };
                    node.fields.insert(key.clone(), selection);
                }
            }
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_paths_build_nested_selections() {
        let node = SelectionNode::from_field_paths(&["id", "owner.login", "owner.id"]);
        assert_eq!(
            node.to_value(),
            json!({"id": true, "owner": {"login": true, "id": true}})
        );
    }

    #[test]
    fn leaf_never_demotes_a_sub_selection() {
        let node = SelectionNode::from_field_paths(&["owner.login", "owner"]);
        assert_eq!(node.to_value(), json!({"owner": {"login": true}}));

        let node = SelectionNode::from_field_paths(&["owner", "owner.login"]);
        assert_eq!(node.to_value(), json!({"owner": {"login": true}}));
    }

    #[test]
    fn arguments_render_under_the_reserved_key() {
        let args = json!({"id": 7}).as_object().cloned().unwrap();
        let node = SelectionNode::from_field_paths(&["name"]).with_arguments(args);
        assert_eq!(node.to_value(), json!({"__args": {"id": 7}, "name": true}));
    }

    #[test]
    fn arguments_do_not_count_as_selections() {
        let args = json!({"id": 7}).as_object().cloned().unwrap();
        let node = SelectionNode::new().with_arguments(args);
        assert!(node.is_selection_empty());
    }

    #[test]
    fn wire_shape_round_trips() {
        let wire = json!({
            "__args": {"first": 10},
            "id": true,
            "owner": {"login": true, "__on": {"User": {"email": true}}}
        });
        let node = SelectionNode::from_value(&wire).unwrap();
        assert_eq!(node.to_value(), wire);
    }

    #[test]
    fn non_boolean_leaf_is_rejected() {
        let wire = json!({"id": 1});
        let err = SelectionNode::from_value(&wire).unwrap_err();
        assert!(matches!(err, InputError::InvalidSelection(_)));

        let wire = json!({"id": false});
        assert!(SelectionNode::from_value(&wire).is_err());
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(SelectionNode::from_value(&json!([1])).is_err());
    }
}
