use std::fmt;
use std::sync::Arc;

use fixall_text_size::TextSize;

/// The kind of a node or token (the grammar's node type name).
pub type SyntaxKind = &'static str;

const TRIVIA_KINDS: &[SyntaxKind] = &[
    crate::WHITESPACE,
    crate::SKIPPED,
    "comment",
    "line_comment",
    "block_comment",
];

#[derive(Debug)]
struct TokenData {
    kind: SyntaxKind,
    text: Box<str>,
}

/// A leaf of the tree carrying source text.
#[derive(Clone)]
pub struct SyntaxToken(Arc<TokenData>);

impl SyntaxToken {
    pub fn new(kind: SyntaxKind, text: impl Into<Box<str>>) -> Self {
        Self(Arc::new(TokenData {
            kind,
            text: text.into(),
        }))
    }

    /// Shorthand for a whitespace trivia token.
    pub fn whitespace(text: impl Into<Box<str>>) -> Self {
        Self::new(crate::WHITESPACE, text)
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn text(&self) -> &str {
        &self.0.text
    }

    pub fn text_len(&self) -> TextSize {
        TextSize::of(self.text())
    }

    /// Whitespace, comments and skipped text.
    pub fn is_trivia(&self) -> bool {
        TRIVIA_KINDS.contains(&self.kind())
    }

    /// Returns a token of the same kind with different text.
    #[must_use]
    pub fn with_text(&self, text: impl Into<Box<str>>) -> Self {
        Self::new(self.kind(), text)
    }

    pub fn ptr_eq(&self, other: &SyntaxToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn structurally_eq(&self, other: &SyntaxToken) -> bool {
        self.ptr_eq(other) || (self.kind() == other.kind() && self.text() == other.text())
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.text())
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A child of a node: either another node or a token.
#[derive(Clone, Debug, is_macro::Is)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxElement::Node(node) => node.kind(),
            SyntaxElement::Token(token) => token.kind(),
        }
    }

    pub fn text_len(&self) -> TextSize {
        match self {
            SyntaxElement::Node(node) => node.text_len(),
            SyntaxElement::Token(token) => token.text_len(),
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.as_token().is_some_and(SyntaxToken::is_trivia)
    }

    pub fn ptr_eq(&self, other: &SyntaxElement) -> bool {
        match (self, other) {
            (SyntaxElement::Node(a), SyntaxElement::Node(b)) => a.ptr_eq(b),
            (SyntaxElement::Token(a), SyntaxElement::Token(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn structurally_eq(&self, other: &SyntaxElement) -> bool {
        match (self, other) {
            (SyntaxElement::Node(a), SyntaxElement::Node(b)) => a.structurally_eq(b),
            (SyntaxElement::Token(a), SyntaxElement::Token(b)) => a.structurally_eq(b),
            _ => false,
        }
    }

    fn write_text(&self, out: &mut String) {
        match self {
            SyntaxElement::Node(node) => node.write_text(out),
            SyntaxElement::Token(token) => out.push_str(token.text()),
        }
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        SyntaxElement::Node(node)
    }
}

impl From<SyntaxToken> for SyntaxElement {
    fn from(token: SyntaxToken) -> Self {
        SyntaxElement::Token(token)
    }
}

#[derive(Debug)]
struct NodeData {
    kind: SyntaxKind,
    children: Vec<SyntaxElement>,
    text_len: TextSize,
}

/// An interior node of the tree.
///
/// Cloning is cheap (one reference count). Two handles are the *same* node
/// when [`SyntaxNode::ptr_eq`] holds.
#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, children: Vec<SyntaxElement>) -> Self {
        let text_len = children.iter().map(SyntaxElement::text_len).sum();
        Self(Arc::new(NodeData {
            kind,
            children,
            text_len,
        }))
    }

    /// A node wrapping a single token of the same kind, as used for named
    /// leaves such as identifiers and literals.
    pub fn leaf(kind: SyntaxKind, text: impl Into<Box<str>>) -> Self {
        Self::new(kind, vec![SyntaxToken::new(kind, text).into()])
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn children(&self) -> &[SyntaxElement] {
        &self.0.children
    }

    /// Direct child nodes, skipping tokens.
    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> + '_ {
        self.children().iter().filter_map(SyntaxElement::as_node)
    }

    /// Direct child tokens that are not trivia.
    pub fn significant_tokens(&self) -> impl Iterator<Item = &SyntaxToken> + '_ {
        self.children()
            .iter()
            .filter_map(SyntaxElement::as_token)
            .filter(|token| !token.is_trivia())
    }

    pub fn text_len(&self) -> TextSize {
        self.0.text_len
    }

    /// The full source text of this node, trivia included.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.text_len().to_usize());
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        for child in self.children() {
            child.write_text(out);
        }
    }

    /// Trivia tokens at the very start of this node's own children.
    pub fn leading_trivia(&self) -> impl Iterator<Item = &SyntaxToken> + '_ {
        self.children()
            .iter()
            .map_while(|child| child.as_token().filter(|token| token.is_trivia()))
    }

    pub fn has_leading_trivia(&self) -> bool {
        self.leading_trivia().next().is_some()
    }

    /// Returns this node with its leading trivia replaced by `trivia`.
    #[must_use]
    pub fn with_leading_trivia(&self, trivia: impl IntoIterator<Item = SyntaxToken>) -> Self {
        let mut children: Vec<SyntaxElement> = trivia.into_iter().map(Into::into).collect();
        children.extend(
            self.children()
                .iter()
                .skip_while(|child| child.is_trivia())
                .cloned(),
        );
        Self::new(self.kind(), children)
    }

    /// Returns a node of the same kind with different children.
    #[must_use]
    pub fn with_children(&self, children: Vec<SyntaxElement>) -> Self {
        Self::new(self.kind(), children)
    }

    /// Returns a copy of the subtree with every token passed through `f`.
    ///
    /// Nodes whose tokens all come back unchanged (`None`) are shared, so a
    /// pass that changes nothing returns a handle to `self`.
    #[must_use]
    pub fn map_tokens<F>(&self, f: &mut F) -> Self
    where
        F: FnMut(&SyntaxToken) -> Option<SyntaxToken>,
    {
        let mut changed = false;
        let children: Vec<SyntaxElement> = self
            .children()
            .iter()
            .map(|child| {
                let mapped = match child {
                    SyntaxElement::Node(node) => SyntaxElement::Node(node.map_tokens(f)),
                    SyntaxElement::Token(token) => match f(token) {
                        Some(replacement) => SyntaxElement::Token(replacement),
                        None => SyntaxElement::Token(token.clone()),
                    },
                };
                changed |= !mapped.ptr_eq(child);
                mapped
            })
            .collect();

        if changed {
            self.with_children(children)
        } else {
            self.clone()
        }
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &SyntaxNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Same kinds and same tokens all the way down.
    pub fn structurally_eq(&self, other: &SyntaxNode) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.kind() == other.kind()
            && self.text_len() == other.text_len()
            && self.children().len() == other.children().len()
            && self
                .children()
                .iter()
                .zip(other.children())
                .all(|(a, b)| a.structurally_eq(b))
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("SyntaxNode")
                .field("kind", &self.kind())
                .field("children", &self.children())
                .finish()
        } else {
            write!(f, "{}@{:?}", self.kind(), self.text())
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> SyntaxNode {
        SyntaxNode::leaf("identifier", text)
    }

    fn parenthesized(inner: SyntaxNode) -> SyntaxNode {
        SyntaxNode::new(
            "parenthesized_expression",
            vec![
                SyntaxToken::new("(", "(").into(),
                inner.into(),
                SyntaxToken::new(")", ")").into(),
            ],
        )
    }

    #[test]
    fn test_text_and_len() {
        let node = parenthesized(ident("foo"));
        assert_eq!(node.text(), "(foo)");
        assert_eq!(node.text_len(), TextSize::new(5));
    }

    #[test]
    fn test_with_leading_trivia() {
        let node = ident("foo");
        let spaced = node.with_leading_trivia([SyntaxToken::whitespace(" ")]);
        assert_eq!(spaced.text(), " foo");
        assert!(spaced.has_leading_trivia());

        let replaced = spaced.with_leading_trivia([SyntaxToken::whitespace("\t")]);
        assert_eq!(replaced.text(), "\tfoo");
        assert_eq!(replaced.leading_trivia().count(), 1);
    }

    #[test]
    fn test_map_tokens_shares_unchanged() {
        let node = parenthesized(ident("foo"));
        let same = node.map_tokens(&mut |_| None);
        assert!(same.ptr_eq(&node));

        let upper = node.map_tokens(&mut |token| {
            (token.kind() == "identifier").then(|| token.with_text("FOO"))
        });
        assert!(!upper.ptr_eq(&node));
        assert_eq!(upper.text(), "(FOO)");
    }

    #[test]
    fn test_structurally_eq() {
        let a = parenthesized(ident("foo"));
        let b = parenthesized(ident("foo"));
        let c = parenthesized(ident("bar"));
        assert!(!a.ptr_eq(&b));
        assert!(a.structurally_eq(&b));
        assert!(!a.structurally_eq(&c));
    }
}
