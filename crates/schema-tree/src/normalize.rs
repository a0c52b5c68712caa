//! Schema fragment normalization
//!
//! Turns a raw schema fragment into a childless [`SchemaNode`] shell: the
//! `type` keyword (or the first complex keyword standing in for it) becomes
//! the node's kind, `$id` feeds the document identity, and everything else
//! is copied into the node's raw keyword map. The tree builder adds children
//! afterwards.

use crate::types::{SchemaKind, SchemaNode};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Keywords that select a kind when `type` is absent, in priority order.
/// A fragment carrying several of these is not disambiguated; the first
/// match wins.
const COMPLEX_KEYWORDS: [(&str, SchemaKind); 5] = [
    ("allOf", SchemaKind::AllOf),
    ("anyOf", SchemaKind::AnyOf),
    ("oneOf", SchemaKind::OneOf),
    ("not", SchemaKind::Not),
    ("$ref", SchemaKind::Ref),
];

/// Normalize a raw schema fragment into a childless node shell.
///
/// Pure over its inputs: the returned node holds independent copies of every
/// keyword and never aliases `fragment`. Non-object fragments (boolean
/// schemas, malformed values) yield an empty shell with undefined kind so
/// that building stays total.
pub fn normalize(fragment: &Value, inherited_id: Option<&str>) -> SchemaNode {
    let mut node = SchemaNode {
        id: inherited_id.map(str::to_string),
        kind: SchemaKind::Undefined,
        name: None,
        required: false,
        contains: false,
        raw: IndexMap::new(),
        path: Vec::new(),
        children: Vec::new(),
    };

    let Some(object) = fragment.as_object() else {
        return node;
    };

    if let Some(id) = object.get("$id").and_then(Value::as_str) {
        node.id = Some(id.to_string());
    }
    node.kind = resolve_kind(object);

    for (keyword, value) in object {
        if keyword == "type" || keyword == "$id" {
            continue;
        }
        node.raw.insert(keyword.clone(), value.clone());
    }

    node
}

/// Resolve the kind: `type` verbatim when present (an array of basic type
/// names becomes multi-type), else the first complex keyword found, else
/// undefined.
fn resolve_kind(object: &Map<String, Value>) -> SchemaKind {
    match object.get("type") {
        Some(Value::String(name)) => {
            SchemaKind::from_type_name(name).unwrap_or(SchemaKind::Undefined)
        }
        Some(Value::Array(names)) => SchemaKind::Multi(
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => COMPLEX_KEYWORDS
            .iter()
            .find(|(keyword, _)| object.contains_key(*keyword))
            .map(|(_, kind)| kind.clone())
            .unwrap_or(SchemaKind::Undefined),
    }
}
