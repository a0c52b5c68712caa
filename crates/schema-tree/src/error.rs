//! Error types for the schema-tree core

use thiserror::Error;

/// Result type alias for expand/collapse operations
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Result type alias for document parsing
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Reference resolution failures.
///
/// These never escape the expansion controller: they are converted into
/// error nodes so the failure renders inline instead of aborting the view.
// Manual Display/Error impls: thiserror's derive treats a field named
// `source` as the error source, which a `String` cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    ReferenceNotFound(String),

    PointerNotFound { source: String, pointer: String },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::ReferenceNotFound(source) => {
                write!(f, "Reference source not found in collection: {source}")
            }
            ResolveError::PointerNotFound { source, pointer } => {
                write!(f, "Pointer '{pointer}' not found in document '{source}'")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Addressing errors on the expand/collapse API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("No node at path {0:?}")]
    PathNotFound(Vec<usize>),

    #[error("Node at path {0:?} is not a $ref node")]
    NotARef(Vec<usize>),
}

/// Schema document parsing errors
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
