//! Core types for LyX documents.
//!
//! - [`catalog`]: the grammar table of known objects.
//! - [`node`] and [`tree`]: the document tree.
//! - [`nesting`]: the rules deciding where a node may be placed.
//! - [`document`]: skeleton accessors over a parsed tree.

pub mod catalog;
pub mod document;
pub mod identifier;
pub mod nesting;
pub mod node;
pub mod tree;

pub use document::Document;
pub use node::{Content, Node, NodeKind, ObjectKey};
pub use tree::{NodeId, Tree, TreeError};
