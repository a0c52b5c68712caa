//! In-memory reference collection
//!
//! The host application owns the set of all known schema documents and hands
//! the core an insertion-ordered map from document identity to raw document.
//! Identities are the declared `$id` normalized to end with a single `#`.
//! The core never fetches documents itself.

use indexmap::IndexMap;
use serde_json::Value;

/// Known schema documents keyed by their declared identity (`$id` plus a
/// trailing `#`).
#[derive(Debug, Clone, Default)]
pub struct ReferenceCollection {
    documents: IndexMap<String, Value>,
}

impl ReferenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under its declared `$id`.
    ///
    /// Returns `false` (and drops the document) when it carries no usable
    /// `$id`; use [`insert`](Self::insert) to supply an identity explicitly.
    pub fn register(&mut self, document: Value) -> bool {
        let Some(id) = document.get("$id").and_then(Value::as_str) else {
            return false;
        };
        let key = normalize_key(id);
        self.documents.insert(key, document);
        true
    }

    /// Register a document under an explicit identity.
    pub fn insert(&mut self, id: &str, document: Value) {
        self.documents.insert(normalize_key(id), document);
    }

    /// Look up a document by its normalized identity key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.documents.get(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate documents in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.documents.iter().map(|(key, doc)| (key.as_str(), doc))
    }
}

impl FromIterator<Value> for ReferenceCollection {
    fn from_iter<I: IntoIterator<Item = Value>>(documents: I) -> Self {
        let mut collection = Self::new();
        for document in documents {
            collection.register(document);
        }
        collection
    }
}

/// Normalize an identity to `<source>#`, stripping any declared fragment.
fn normalize_key(id: &str) -> String {
    let base = id.split('#').next().unwrap_or_default();
    format!("{base}#")
}
