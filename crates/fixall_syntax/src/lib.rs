//! Immutable, lossless syntax trees.
//!
//! Nodes are reference counted and never mutated: every edit builds a new
//! root that shares all untouched subtrees with the old one. Nodes do not
//! know their own position; positions are computed on the way down by
//! [`TreeWalker`] and [`covering_node`], which hand out [`NodeRef`]s.
//!
//! Whitespace and comments are kept as trivia tokens, so the text of a root
//! node is always the exact source it was built from.

mod node;
mod path;
mod rewrite;
mod walk;

pub use node::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use path::NodePath;
pub use rewrite::replace_paths;
pub use walk::{NodeRef, TokenRef, TokenWalker, TreeWalker, covering_node};

/// Kind of whitespace trivia tokens.
pub const WHITESPACE: SyntaxKind = "whitespace";
/// Kind of source text that fell between parsed nodes and is not whitespace.
pub const SKIPPED: SyntaxKind = "skipped";
