//! Tree node types for the schema table

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Resolved type tag of a schema fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Object,
    AllOf,
    AnyOf,
    OneOf,
    Not,
    Ref,
    Error,
    /// `type` held an array of basic type names; the presentation layer
    /// renders one tag per entry
    Multi(Vec<String>),
    /// Fragment declared no `type` and no complex keyword; a valid,
    /// displayable state rendered as a "missing type" indicator
    Undefined,
}

impl SchemaKind {
    /// Map a `type` keyword value to its kind, if recognized
    pub(crate) fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// The keyword whose value holds this combination's subschemas
    pub fn combination_keyword(&self) -> Option<&'static str> {
        match self {
            Self::AllOf => Some("allOf"),
            Self::AnyOf => Some("anyOf"),
            Self::OneOf => Some("oneOf"),
            Self::Not => Some("not"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Null => write!(f, "null"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::AllOf => write!(f, "allOf"),
            Self::AnyOf => write!(f, "anyOf"),
            Self::OneOf => write!(f, "oneOf"),
            Self::Not => write!(f, "not"),
            Self::Ref => write!(f, "$ref"),
            Self::Error => write!(f, "error"),
            Self::Multi(names) => write!(f, "{}", names.join(" | ")),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// A normalized schema fragment in canonical form, distinct from the raw
/// input schema.
///
/// Nodes are assembled once per tree snapshot and never mutated afterwards;
/// expand/collapse produces a new snapshot that shares untouched subtrees
/// through the `Arc`s in `children`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    /// Document identity used as the base for resolving relative `$ref`s;
    /// inherited from the nearest ancestor unless the fragment declares its
    /// own `$id`
    pub id: Option<String>,
    /// Resolved type tag
    pub kind: SchemaKind,
    /// Property key when this node is a named property of an object
    pub name: Option<String>,
    /// Whether the name is listed in the parent object's `required` array
    pub required: bool,
    /// Whether the node was produced from an array's `contains` keyword
    pub contains: bool,
    /// All remaining original keywords (title, description, constraints...),
    /// copied from the input and never mutated after construction
    pub raw: IndexMap<String, Value>,
    /// Child indices from the tree root to this node; doubles as indentation
    /// depth and as the addressing scheme for expand/collapse
    pub path: Vec<usize>,
    /// Ordered children; order is presentation-significant
    pub children: Vec<Arc<TreeNode>>,
}

impl SchemaNode {
    /// Depth of the node in the tree (root is 0)
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The `title` keyword, if present
    pub fn title(&self) -> Option<&str> {
        self.raw.get("title").and_then(Value::as_str)
    }

    /// The `description` keyword, if present (error nodes carry their
    /// message here)
    pub fn description(&self) -> Option<&str> {
        self.raw.get("description").and_then(Value::as_str)
    }

    /// The `$ref` pointer text, if present
    pub fn ref_target(&self) -> Option<&str> {
        self.raw.get("$ref").and_then(Value::as_str)
    }
}

/// A `$ref` node, toggling between a collapsed placeholder and a lazily
/// materialized target subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefNode {
    /// The unexpanded shell; displays the `$ref` string itself, not its
    /// target. Childless.
    pub placeholder: SchemaNode,
    /// Target subtree, built on first expansion and cached for the lifetime
    /// of the snapshot family (a fresh top-level build starts empty again)
    pub expanded: Option<Arc<TreeNode>>,
    /// Whether rendering should use `expanded` instead of `placeholder`
    pub is_expanded: bool,
}

/// A node of the schema tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TreeNode {
    Schema(SchemaNode),
    Ref(RefNode),
}

impl TreeNode {
    /// The node's schema shell; for ref nodes this is the placeholder
    pub fn schema(&self) -> &SchemaNode {
        match self {
            TreeNode::Schema(node) => node,
            TreeNode::Ref(ref_node) => &ref_node.placeholder,
        }
    }

    /// Direct children; ref nodes expose none (their target lives behind
    /// `expanded`)
    pub fn children(&self) -> &[Arc<TreeNode>] {
        match self {
            TreeNode::Schema(node) => &node.children,
            TreeNode::Ref(_) => &[],
        }
    }

    pub fn as_ref_node(&self) -> Option<&RefNode> {
        match self {
            TreeNode::Ref(ref_node) => Some(ref_node),
            TreeNode::Schema(_) => None,
        }
    }
}

/// An immutable tree snapshot over one top-level schema document.
///
/// Cloning is cheap; expand/collapse return a new snapshot that shares every
/// untouched subtree with this one, so readers may keep holding old
/// snapshots for comparison or undo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaTree {
    pub root: Arc<TreeNode>,
}

impl SchemaTree {
    /// Look up the node addressed by `path`, redirecting through the
    /// materialized subtree of every expanded ref the descent passes.
    ///
    /// Returns `None` when the path indexes past a leaf, past a collapsed
    /// ref, or past the end of a sibling list.
    pub fn node_at(&self, path: &[usize]) -> Option<&TreeNode> {
        let mut current: &TreeNode = &self.root;
        let mut remaining = path;
        loop {
            if let TreeNode::Ref(ref_node) = current {
                if remaining.is_empty() {
                    return Some(current);
                }
                match &ref_node.expanded {
                    Some(inner) if ref_node.is_expanded => {
                        current = inner;
                        continue;
                    }
                    _ => return None,
                }
            }
            match remaining.split_first() {
                None => return Some(current),
                Some((&index, rest)) => {
                    current = current.children().get(index)?.as_ref();
                    remaining = rest;
                }
            }
        }
    }
}
