use std::fmt;

use crate::{SyntaxElement, SyntaxNode};

/// Child-index path from a root node to one of its descendant nodes.
///
/// Paths order lexicographically, which is source order for nodes that do
/// not contain each other and puts an ancestor before its descendants.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the root itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path of the child at `index` below this path.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// Follows this path from `root`. Returns `None` if the path does not
    /// lead to a node in this tree.
    pub fn resolve(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        let mut current = root.clone();
        for &index in &self.0 {
            let next = match current.children().get(index)? {
                SyntaxElement::Node(node) => node.clone(),
                SyntaxElement::Token(_) => return None,
            };
            current = next;
        }
        Some(current)
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}
