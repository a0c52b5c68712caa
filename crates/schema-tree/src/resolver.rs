//! `$ref` resolution against the reference collection
//!
//! A `$ref` string splits on `#` into a source part and a JSON pointer. The
//! source part is resolved to a document identity relative to the current
//! node's inherited id, looked up in the collection, and the pointer is then
//! walked segment by segment into the document. Failures are data outcomes
//! for the caller to turn into error nodes, never panics.

use crate::collection::ReferenceCollection;
use crate::error::ResolveError;
use serde_json::Value;
use tracing::trace;

/// A successfully dereferenced `$ref`
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRef<'a> {
    /// Normalized identity key of the document the fragment came from; used
    /// as the inherited id when building a tree for the fragment
    pub source: String,
    /// The located raw schema fragment, borrowed from the collection
    pub fragment: &'a Value,
}

/// Resolve a `$ref` string against the collection, relative to the identity
/// of the node carrying the reference.
pub fn resolve<'a>(
    ref_str: &str,
    current_id: Option<&str>,
    collection: &'a ReferenceCollection,
) -> Result<ResolvedRef<'a>, ResolveError> {
    let (source_part, pointer_part) = split_ref(ref_str);
    let key = format!("{}#", effective_source(source_part, current_id));
    trace!(ref_str, key = %key, "resolving reference");

    let document = collection
        .get(&key)
        .ok_or_else(|| ResolveError::ReferenceNotFound(key.clone()))?;

    let fragment = walk_pointer(document, pointer_part, &key)?;
    Ok(ResolvedRef {
        source: key,
        fragment,
    })
}

/// Split a `$ref` string into `(source, pointer)` on the first `#`.
fn split_ref(ref_str: &str) -> (&str, &str) {
    match ref_str.split_once('#') {
        Some((source, pointer)) => (source, pointer),
        None => (ref_str, ""),
    }
}

/// Compute the effective source path for the document lookup:
/// - empty source is a self-reference (the current document, fragment
///   marker stripped);
/// - absolute URIs and absolute filesystem-style paths pass through
///   verbatim;
/// - anything else is a relative path joined to the directory of the
///   current document's identity.
fn effective_source(source: &str, current_id: Option<&str>) -> String {
    let current = current_id.unwrap_or_default();
    let current_base = current.split('#').next().unwrap_or_default();

    if source.is_empty() {
        return current_base.to_string();
    }
    if source.starts_with('/') || source.contains("://") {
        return source.to_string();
    }

    let directory = match current_base.rfind('/') {
        Some(index) => &current_base[..=index],
        None => "",
    };
    let relative = source.strip_prefix("./").unwrap_or(source);
    format!("{directory}{relative}")
}

/// Walk a JSON pointer into a document. Segments unescape `~1` and `~0`;
/// numeric segments index arrays.
fn walk_pointer<'a>(
    document: &'a Value,
    pointer: &str,
    source: &str,
) -> Result<&'a Value, ResolveError> {
    let mut current = document;

    for segment in pointer.split('/').filter(|segment| !segment.is_empty()) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(object) => object.get(&segment),
            Value::Array(array) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| array.get(index)),
            _ => None,
        }
        .ok_or_else(|| ResolveError::PointerNotFound {
            source: source.to_string(),
            pointer: pointer.to_string(),
        })?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> ReferenceCollection {
        let mut collection = ReferenceCollection::new();
        collection.register(json!({
            "$id": "https://example.com/schemas/person.json#",
            "type": "object",
            "definitions": {
                "name": {"type": "string"},
                "odd/key": {"type": "boolean"},
                "tilde~key": {"type": "null"}
            },
            "examples": [{"first": {"type": "integer"}}]
        }));
        collection.register(json!({
            "$id": "https://example.com/schemas/address.json#",
            "type": "object"
        }));
        collection
    }

    #[test]
    fn test_self_reference_resolves_current_document() {
        let refs = collection();
        let resolved = resolve(
            "#",
            Some("https://example.com/schemas/person.json#"),
            &refs,
        )
        .unwrap();

        assert_eq!(resolved.source, "https://example.com/schemas/person.json#");
        assert_eq!(resolved.fragment["type"], "object");
    }

    #[test]
    fn test_pointer_walk_into_document() {
        let refs = collection();
        let resolved = resolve(
            "#/definitions/name",
            Some("https://example.com/schemas/person.json#"),
            &refs,
        )
        .unwrap();

        assert_eq!(resolved.fragment, &json!({"type": "string"}));
    }

    #[test]
    fn test_relative_source_resolves_against_current_directory() {
        let refs = collection();
        let resolved = resolve(
            "address.json#",
            Some("https://example.com/schemas/person.json#"),
            &refs,
        )
        .unwrap();
        assert_eq!(resolved.source, "https://example.com/schemas/address.json#");

        // leading ./ is tolerated
        let resolved = resolve(
            "./address.json#",
            Some("https://example.com/schemas/person.json#"),
            &refs,
        )
        .unwrap();
        assert_eq!(resolved.source, "https://example.com/schemas/address.json#");
    }

    #[test]
    fn test_absolute_uri_used_verbatim() {
        let refs = collection();
        let resolved = resolve(
            "https://example.com/schemas/address.json#",
            Some("https://other.org/unrelated.json#"),
            &refs,
        )
        .unwrap();
        assert_eq!(resolved.source, "https://example.com/schemas/address.json#");
    }

    #[test]
    fn test_absolute_path_used_verbatim() {
        let mut refs = ReferenceCollection::new();
        refs.insert("/schemas/local.json", json!({"type": "null"}));

        let resolved = resolve("/schemas/local.json#", Some("elsewhere.json#"), &refs).unwrap();
        assert_eq!(resolved.source, "/schemas/local.json#");
    }

    #[test]
    fn test_missing_source_is_reference_not_found() {
        let refs = ReferenceCollection::new();
        let err = resolve("missing.json#", None, &refs).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ReferenceNotFound("missing.json#".to_string())
        );
    }

    #[test]
    fn test_missing_pointer_segment_is_pointer_not_found() {
        let refs = collection();
        let err = resolve(
            "#/definitions/nope",
            Some("https://example.com/schemas/person.json#"),
            &refs,
        )
        .unwrap_err();

        assert!(matches!(err, ResolveError::PointerNotFound { .. }));
    }

    #[test]
    fn test_pointer_escapes_and_array_indexing() {
        let refs = collection();
        let current = Some("https://example.com/schemas/person.json#");

        let resolved = resolve("#/definitions/odd~1key", current, &refs).unwrap();
        assert_eq!(resolved.fragment["type"], "boolean");

        let resolved = resolve("#/definitions/tilde~0key", current, &refs).unwrap();
        assert_eq!(resolved.fragment["type"], "null");

        let resolved = resolve("#/examples/0/first", current, &refs).unwrap();
        assert_eq!(resolved.fragment["type"], "integer");
    }
}
