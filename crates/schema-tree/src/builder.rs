//! Recursive tree construction
//!
//! Expands a schema fragment into a tree of normalized nodes. Each kind has
//! its own child-production rule; `$ref` fragments become ref nodes without
//! recursing, which is what keeps circular schemas finite. Building is
//! total: any syntactically valid JSON value at a schema position produces a
//! node, never a panic.

use crate::normalize::normalize;
use crate::types::{RefNode, SchemaKind, SchemaNode, SchemaTree, TreeNode};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Usage-site tags a parent attaches to a child it creates
#[derive(Debug, Clone, Default)]
pub(crate) struct Markers {
    pub name: Option<String>,
    pub required: bool,
    pub contains: bool,
}

/// Build a complete tree snapshot for a top-level schema document.
pub fn build_tree(schema: &Value) -> SchemaTree {
    let root = build_node(schema, Vec::new(), None, Markers::default());
    debug!(kind = %root.schema().kind, "built schema tree");
    SchemaTree { root }
}

/// Build the node for one fragment, recursing into its subschemas.
pub(crate) fn build_node(
    fragment: &Value,
    path: Vec<usize>,
    inherited_id: Option<&str>,
    markers: Markers,
) -> Arc<TreeNode> {
    let mut node = normalize(fragment, inherited_id);
    node.name = markers.name;
    node.required = markers.required;
    node.contains = markers.contains;
    node.path = path;

    match node.kind.clone() {
        SchemaKind::Object => build_object_children(&mut node, fragment),
        SchemaKind::Array => build_array_children(&mut node, fragment),
        kind @ (SchemaKind::AllOf | SchemaKind::AnyOf | SchemaKind::OneOf | SchemaKind::Not) => {
            // combination_keyword is Some for exactly these kinds
            if let Some(keyword) = kind.combination_keyword() {
                build_combination_children(&mut node, fragment, keyword);
            }
        }
        SchemaKind::Ref => {
            return Arc::new(TreeNode::Ref(RefNode {
                placeholder: node,
                expanded: None,
                is_expanded: false,
            }));
        }
        // Basic types, multi-type, undefined and error nodes are leaves
        _ => {}
    }

    Arc::new(TreeNode::Schema(node))
}

/// One child per `properties` key, in key insertion order. Keys listed in
/// the object's `required` array get the required tag.
fn build_object_children(node: &mut SchemaNode, fragment: &Value) {
    node.raw.shift_remove("properties");

    let Some(properties) = fragment.get("properties").and_then(Value::as_object) else {
        return;
    };

    let required: HashSet<&str> = fragment
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (key, subschema) in properties {
        let markers = Markers {
            name: Some(key.clone()),
            required: required.contains(key.as_str()),
            contains: false,
        };
        append_child(node, subschema, markers);
    }
}

/// Tuple `items` produce one child per entry; a single `items` fragment
/// produces exactly one child; `contains` appends one extra tagged child.
/// Anything else under `items` is coerced to "no children".
fn build_array_children(node: &mut SchemaNode, fragment: &Value) {
    node.raw.shift_remove("items");
    node.raw.shift_remove("contains");

    match fragment.get("items") {
        Some(Value::Array(entries)) => {
            for entry in entries {
                append_child(node, entry, Markers::default());
            }
        }
        Some(item) if item.is_object() => {
            append_child(node, item, Markers::default());
        }
        _ => {}
    }

    if let Some(subschema) = fragment.get("contains") {
        let markers = Markers {
            contains: true,
            ..Markers::default()
        };
        append_child(node, subschema, markers);
    }
}

/// One child per option of the combination keyword; a bare (non-array)
/// value, the usual shape of `not`, produces a single child.
fn build_combination_children(node: &mut SchemaNode, fragment: &Value, keyword: &str) {
    node.raw.shift_remove(keyword);

    match fragment.get(keyword) {
        Some(Value::Array(options)) => {
            for option in options {
                append_child(node, option, Markers::default());
            }
        }
        Some(option) => {
            append_child(node, option, Markers::default());
        }
        None => {}
    }
}

fn append_child(parent: &mut SchemaNode, subschema: &Value, markers: Markers) {
    let mut path = parent.path.clone();
    path.push(parent.children.len());
    let child = build_node(subschema, path, parent.id.as_deref(), markers);
    parent.children.push(child);
}
