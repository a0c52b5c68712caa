//! # schema-tree
//!
//! Schema-tree construction and `$ref` resolution core for the schema viewer.
//! Normalizes a (possibly self-referential) JSON-Schema document into an
//! immutable tree of typed nodes and supports on-demand expansion and
//! collapse of `$ref` pointers without infinite recursion or stale state.
//!
//! The presentation layer consumes tree snapshots and calls back only
//! through [`expand_ref`] and [`collapse_ref`]; both return a new snapshot
//! that shares every untouched subtree with the old one.

mod types;
mod normalize;
mod builder;
mod resolver;
mod expand;
mod collection;
mod parser;
mod error;

pub use types::{RefNode, SchemaKind, SchemaNode, SchemaTree, TreeNode};
pub use normalize::normalize;
pub use builder::build_tree;
pub use resolver::{resolve, ResolvedRef};
pub use expand::{collapse_ref, expand_ref};
pub use collection::ReferenceCollection;
pub use parser::SchemaParser;
pub use error::{ParseError, ParseResult, ResolveError, TreeError, TreeResult};
