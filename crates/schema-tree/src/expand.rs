//! `$ref` expansion and collapse
//!
//! Both operations produce a new tree snapshot: the spine from the root to
//! the addressed ref node is copied, every untouched sibling subtree is
//! shared with the previous snapshot through its `Arc`. Descent redirects
//! through the materialized subtree of every expanded ref it passes, so a
//! path may address a node nested arbitrarily deep in a chain of expanded
//! refs.

use crate::builder::{build_node, Markers};
use crate::collection::ReferenceCollection;
use crate::error::{ResolveError, TreeError, TreeResult};
use crate::resolver::resolve;
use crate::types::{RefNode, SchemaKind, SchemaNode, SchemaTree, TreeNode};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Expand the ref node addressed by `path`, materializing its target on
/// first expansion.
///
/// The materialized root inherits the usage-site tags (`name`, `required`,
/// `contains`) from the placeholder: they describe the reference site, not
/// the referenced schema, so they are copied across rather than recomputed.
/// Resolution failure materializes an error node in place of the target;
/// either way the result is cached for subsequent expansions within this
/// snapshot family.
pub fn expand_ref(
    tree: &SchemaTree,
    path: &[usize],
    collection: &ReferenceCollection,
) -> TreeResult<SchemaTree> {
    let root = rewrite_ref(&tree.root, path, path, &mut |ref_node| {
        let mut updated = ref_node.clone();
        updated.is_expanded = true;
        if updated.expanded.is_none() {
            debug!(?path, target = ?ref_node.placeholder.ref_target(), "materializing ref");
            updated.expanded = Some(materialize(ref_node, path, collection));
        }
        updated
    })?;
    Ok(SchemaTree { root })
}

/// Collapse the ref node addressed by `path`, keeping its materialized
/// subtree cached so re-expansion needs no re-resolution.
pub fn collapse_ref(tree: &SchemaTree, path: &[usize]) -> TreeResult<SchemaTree> {
    let root = rewrite_ref(&tree.root, path, path, &mut |ref_node| {
        let mut updated = ref_node.clone();
        updated.is_expanded = false;
        updated
    })?;
    Ok(SchemaTree { root })
}

/// Copy-on-write descent shared by expand and collapse.
///
/// Walks `remaining` indices down from `node`, rebuilding only the visited
/// spine. At every step a ref node is redirected through its `expanded`
/// subtree before indexing continues, which is what makes paths into
/// multi-level ref chains addressable. `apply` rewrites the ref node at the
/// destination.
fn rewrite_ref(
    node: &Arc<TreeNode>,
    remaining: &[usize],
    full_path: &[usize],
    apply: &mut dyn FnMut(&RefNode) -> RefNode,
) -> TreeResult<Arc<TreeNode>> {
    match (node.as_ref(), remaining.split_first()) {
        // Destination reached; it must be a ref node.
        (TreeNode::Ref(ref_node), None) => Ok(Arc::new(TreeNode::Ref(apply(ref_node)))),
        (TreeNode::Schema(_), None) => Err(TreeError::NotARef(full_path.to_vec())),

        // Passing through a ref: redirect into its materialized subtree.
        (TreeNode::Ref(ref_node), Some(_)) => {
            let inner = match &ref_node.expanded {
                Some(inner) if ref_node.is_expanded => inner,
                _ => return Err(TreeError::PathNotFound(full_path.to_vec())),
            };
            let rewritten = rewrite_ref(inner, remaining, full_path, apply)?;
            let mut updated = ref_node.clone();
            updated.expanded = Some(rewritten);
            Ok(Arc::new(TreeNode::Ref(updated)))
        }

        // Plain node: copy the shell, swap the addressed child, share the rest.
        (TreeNode::Schema(schema), Some((&index, rest))) => {
            let child = schema
                .children
                .get(index)
                .ok_or_else(|| TreeError::PathNotFound(full_path.to_vec()))?;
            let rewritten = rewrite_ref(child, rest, full_path, apply)?;
            let mut updated = schema.clone();
            updated.children[index] = rewritten;
            Ok(Arc::new(TreeNode::Schema(updated)))
        }
    }
}

/// Resolve and build the target subtree for a ref node, rooted at the ref
/// node's own path. Resolution failure becomes a terminal error node.
fn materialize(
    ref_node: &RefNode,
    path: &[usize],
    collection: &ReferenceCollection,
) -> Arc<TreeNode> {
    let placeholder = &ref_node.placeholder;
    let ref_str = placeholder.ref_target().unwrap_or_default();
    let markers = Markers {
        name: placeholder.name.clone(),
        required: placeholder.required,
        contains: placeholder.contains,
    };

    match resolve(ref_str, placeholder.id.as_deref(), collection) {
        Ok(resolved) => build_node(
            resolved.fragment,
            path.to_vec(),
            Some(&resolved.source),
            markers,
        ),
        Err(err) => Arc::new(TreeNode::Schema(error_node(err, path, markers))),
    }
}

/// Terminal, childless node representing a failed resolution; the message
/// sits where a description would, so it renders inline.
fn error_node(err: ResolveError, path: &[usize], markers: Markers) -> SchemaNode {
    let mut raw = IndexMap::new();
    raw.insert("description".to_string(), Value::String(err.to_string()));

    SchemaNode {
        id: None,
        kind: SchemaKind::Error,
        name: markers.name,
        required: markers.required,
        contains: markers.contains,
        raw,
        path: path.to_vec(),
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use serde_json::json;

    fn ref_node_at<'a>(tree: &'a SchemaTree, path: &[usize]) -> &'a RefNode {
        tree.node_at(path)
            .and_then(TreeNode::as_ref_node)
            .expect("ref node at path")
    }

    #[test]
    fn test_circular_ref_expands_one_level() {
        let document = json!({
            "$id": "doc#",
            "type": "object",
            "properties": {"self": {"$ref": "#"}}
        });
        let refs: ReferenceCollection = vec![document.clone()].into_iter().collect();
        let tree = build_tree(&document);

        let expanded = expand_ref(&tree, &[0], &refs).unwrap();

        let ref_node = ref_node_at(&expanded, &[0]);
        assert!(ref_node.is_expanded);
        let inner = ref_node.expanded.as_ref().unwrap();
        assert_eq!(inner.schema().kind, SchemaKind::Object);
        assert_eq!(inner.schema().path, vec![0]);

        // the target's own `self` property is again an unexpanded ref
        let nested = ref_node_at(&expanded, &[0, 0]);
        assert!(!nested.is_expanded);
        assert!(nested.expanded.is_none());
        assert_eq!(nested.placeholder.name.as_deref(), Some("self"));
        assert_eq!(nested.placeholder.path, vec![0, 0]);
    }

    #[test]
    fn test_missing_reference_becomes_error_node() {
        let tree = build_tree(&json!({
            "type": "object",
            "properties": {"broken": {"$ref": "missing.json#"}}
        }));
        let refs = ReferenceCollection::new();

        let expanded = expand_ref(&tree, &[0], &refs).unwrap();

        let ref_node = ref_node_at(&expanded, &[0]);
        assert!(ref_node.is_expanded);
        let inner = ref_node.expanded.as_ref().unwrap().schema();
        assert_eq!(inner.kind, SchemaKind::Error);
        assert!(inner.description().unwrap().contains("missing.json#"));
        assert!(inner.children.is_empty());
    }

    #[test]
    fn test_pointer_failure_becomes_error_node() {
        let document = json!({
            "$id": "doc#",
            "type": "object",
            "properties": {"part": {"$ref": "#/definitions/absent"}}
        });
        let refs: ReferenceCollection = vec![document.clone()].into_iter().collect();
        let tree = build_tree(&document);

        let expanded = expand_ref(&tree, &[0], &refs).unwrap();
        let inner = ref_node_at(&expanded, &[0]).expanded.as_ref().unwrap();
        assert_eq!(inner.schema().kind, SchemaKind::Error);
    }

    #[test]
    fn test_collapse_keeps_cache_and_prior_tree_intact() {
        let document = json!({
            "$id": "doc#",
            "type": "object",
            "properties": {"self": {"$ref": "#"}}
        });
        let refs: ReferenceCollection = vec![document.clone()].into_iter().collect();
        let tree = build_tree(&document);

        let expanded = expand_ref(&tree, &[0], &refs).unwrap();
        let cached = ref_node_at(&expanded, &[0]).expanded.clone().unwrap();

        let collapsed = collapse_ref(&expanded, &[0]).unwrap();
        let ref_node = collapsed
            .node_at(&[0])
            .and_then(TreeNode::as_ref_node)
            .unwrap();
        assert!(!ref_node.is_expanded);
        assert!(Arc::ptr_eq(ref_node.expanded.as_ref().unwrap(), &cached));

        // prior snapshots are untouched
        assert!(ref_node_at(&expanded, &[0]).is_expanded);
        assert!(!build_tree(&document)
            .node_at(&[0])
            .and_then(TreeNode::as_ref_node)
            .unwrap()
            .is_expanded);

        // re-expansion reuses the cache instead of re-resolving
        let reexpanded = expand_ref(&collapsed, &[0], &ReferenceCollection::new()).unwrap();
        assert!(Arc::ptr_eq(
            ref_node_at(&reexpanded, &[0]).expanded.as_ref().unwrap(),
            &cached
        ));
    }

    #[test]
    fn test_untouched_siblings_shared_between_snapshots() {
        let tree = build_tree(&json!({
            "type": "object",
            "properties": {
                "stable": {"type": "object", "properties": {"x": {"type": "string"}}},
                "link": {"$ref": "missing.json#"}
            }
        }));
        let refs = ReferenceCollection::new();

        let expanded = expand_ref(&tree, &[1], &refs).unwrap();

        let before = &tree.root.children()[0];
        let after = &expanded.root.children()[0];
        assert!(Arc::ptr_eq(before, after));
        assert!(!Arc::ptr_eq(&tree.root.children()[1], &expanded.root.children()[1]));
    }

    #[test]
    fn test_multi_level_ref_chain_addressing() {
        // outer.json points into middle.json, whose expansion contains
        // another ref; the inner ref is only addressable through the
        // expanded outer ref.
        let outer = json!({
            "$id": "outer.json#",
            "type": "object",
            "properties": {"middle": {"$ref": "middle.json#"}}
        });
        let middle = json!({
            "$id": "middle.json#",
            "type": "object",
            "properties": {"inner": {"$ref": "inner.json#"}}
        });
        let inner = json!({
            "$id": "inner.json#",
            "type": "string"
        });
        let refs: ReferenceCollection =
            vec![outer.clone(), middle, inner].into_iter().collect();

        let tree = build_tree(&outer);
        let tree = expand_ref(&tree, &[0], &refs).unwrap();
        let tree = expand_ref(&tree, &[0, 0], &refs).unwrap();

        let inner_ref = ref_node_at(&tree, &[0, 0]);
        assert!(inner_ref.is_expanded);
        assert_eq!(
            inner_ref.expanded.as_ref().unwrap().schema().kind,
            SchemaKind::String
        );

        // collapsing the nested ref goes through the same redirect
        let tree = collapse_ref(&tree, &[0, 0]).unwrap();
        assert!(!ref_node_at(&tree, &[0, 0]).is_expanded);
        assert!(ref_node_at(&tree, &[0]).is_expanded);
    }

    #[test]
    fn test_usage_site_markers_copied_onto_expanded_root() {
        let document = json!({
            "$id": "doc#",
            "type": "object",
            "properties": {"self": {"$ref": "#"}},
            "required": ["self"]
        });
        let refs: ReferenceCollection = vec![document.clone()].into_iter().collect();
        let tree = build_tree(&document);

        let placeholder = &ref_node_at(&tree, &[0]).placeholder;
        assert!(placeholder.required);

        let expanded = expand_ref(&tree, &[0], &refs).unwrap();
        let root = ref_node_at(&expanded, &[0]).expanded.as_ref().unwrap();
        assert!(root.schema().required);
        assert_eq!(root.schema().name.as_deref(), Some("self"));
    }

    #[test]
    fn test_contains_marker_survives_expansion() {
        let document = json!({
            "$id": "doc#",
            "type": "array",
            "contains": {"$ref": "#"}
        });
        let refs: ReferenceCollection = vec![document.clone()].into_iter().collect();
        let tree = build_tree(&document);

        let expanded = expand_ref(&tree, &[0], &refs).unwrap();
        assert!(ref_node_at(&expanded, &[0])
            .expanded
            .as_ref()
            .unwrap()
            .schema()
            .contains);
    }

    #[test]
    fn test_addressing_errors() {
        let tree = build_tree(&json!({
            "type": "object",
            "properties": {"plain": {"type": "string"}}
        }));
        let refs = ReferenceCollection::new();

        assert_eq!(
            expand_ref(&tree, &[0], &refs).unwrap_err(),
            TreeError::NotARef(vec![0])
        );
        assert_eq!(
            collapse_ref(&tree, &[5]).unwrap_err(),
            TreeError::PathNotFound(vec![5])
        );
        // indexing through a collapsed ref is not addressable
        let tree = build_tree(&json!({"$ref": "doc#"}));
        assert_eq!(
            collapse_ref(&tree, &[0]).unwrap_err(),
            TreeError::PathNotFound(vec![0])
        );
    }
}
