use fixall_text_size::{Ranged, TextRange, TextSize};

use crate::{NodePath, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// A node together with its position in a particular tree.
#[derive(Clone, Debug)]
pub struct NodeRef {
    node: SyntaxNode,
    offset: TextSize,
    path: NodePath,
}

impl NodeRef {
    /// A positioned view of `root` as the root of its own tree.
    pub fn root(root: &SyntaxNode) -> Self {
        Self {
            node: root.clone(),
            offset: TextSize::default(),
            path: NodePath::root(),
        }
    }

    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn kind(&self) -> SyntaxKind {
        self.node.kind()
    }

    pub fn text(&self) -> String {
        self.node.text()
    }

    /// Positioned views of the direct child nodes.
    pub fn child_nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.children().filter_map(|(element, offset, index)| match element {
            SyntaxElement::Node(node) => Some(NodeRef {
                node: node.clone(),
                offset,
                path: self.path.child(index),
            }),
            SyntaxElement::Token(_) => None,
        })
    }

    /// Positioned views of the direct child tokens.
    pub fn child_tokens(&self) -> impl Iterator<Item = TokenRef> + '_ {
        self.children().filter_map(|(element, offset, _)| match element {
            SyntaxElement::Token(token) => Some(TokenRef {
                token: token.clone(),
                offset,
            }),
            SyntaxElement::Node(_) => None,
        })
    }

    /// The range of the node without its leading trivia.
    pub fn trimmed_range(&self) -> TextRange {
        let leading: TextSize = self.node.leading_trivia().map(SyntaxToken::text_len).sum();
        TextRange::new(self.offset + leading, self.range().end())
    }

    fn children(&self) -> impl Iterator<Item = (&SyntaxElement, TextSize, usize)> + '_ {
        let mut offset = self.offset;
        self.node
            .children()
            .iter()
            .enumerate()
            .map(move |(index, element)| {
                let start = offset;
                offset += element.text_len();
                (element, start, index)
            })
    }
}

impl Ranged for NodeRef {
    fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.node.text_len())
    }
}

/// A token together with its offset in a particular tree.
#[derive(Clone, Debug)]
pub struct TokenRef {
    token: SyntaxToken,
    offset: TextSize,
}

impl TokenRef {
    pub fn token(&self) -> &SyntaxToken {
        &self.token
    }

    pub fn kind(&self) -> SyntaxKind {
        self.token.kind()
    }

    pub fn text(&self) -> &str {
        self.token.text()
    }
}

impl Ranged for TokenRef {
    fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.token.text_len())
    }
}

/// Iterator for walking all nodes in a tree (pre-order traversal).
pub struct TreeWalker {
    stack: Vec<NodeRef>,
}

impl TreeWalker {
    pub fn new(root: &SyntaxNode) -> Self {
        Self {
            stack: vec![NodeRef::root(root)],
        }
    }
}

impl Iterator for TreeWalker {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let children: Vec<NodeRef> = current.child_nodes().collect();
        self.stack.extend(children.into_iter().rev());
        Some(current)
    }
}

/// Iterator over every token of a tree in source order, trivia included.
pub struct TokenWalker {
    stack: Vec<(SyntaxElement, TextSize)>,
}

impl TokenWalker {
    pub fn new(root: &SyntaxNode) -> Self {
        Self {
            stack: vec![(SyntaxElement::Node(root.clone()), TextSize::default())],
        }
    }
}

impl Iterator for TokenWalker {
    type Item = TokenRef;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                (SyntaxElement::Token(token), offset) => return Some(TokenRef { token, offset }),
                (SyntaxElement::Node(node), offset) => {
                    let mut child_offset = offset;
                    let children: Vec<_> = node
                        .children()
                        .iter()
                        .map(|child| {
                            let start = child_offset;
                            child_offset += child.text_len();
                            (child.clone(), start)
                        })
                        .collect();
                    self.stack.extend(children.into_iter().rev());
                }
            }
        }
    }
}

/// Finds the smallest node whose range fully covers `range`.
///
/// Returns `None` when `range` reaches outside the tree. When two sibling
/// nodes both cover an empty range sitting on their shared boundary, the
/// first one wins.
pub fn covering_node(root: &SyntaxNode, range: TextRange) -> Option<NodeRef> {
    let mut current = NodeRef::root(root);
    if !current.range().contains_range(range) {
        return None;
    }

    loop {
        let next = current
            .child_nodes()
            .find(|child| child.range().contains_range(range));
        match next {
            Some(child) => current = child,
            None => return Some(current),
        }
    }
}
