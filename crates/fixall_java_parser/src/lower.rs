use fixall_syntax::{SKIPPED, SyntaxElement, SyntaxNode, SyntaxToken, WHITESPACE};
use tree_sitter::Node;

/// Lower a tree-sitter tree over `source` into a lossless syntax tree.
///
/// Named leaves (identifiers, literals) become nodes wrapping one token, so
/// they can be replaced like any other node. Anonymous leaves (keywords,
/// punctuation) and extras (comments) become tokens. Text between children
/// becomes a trivia token: leading trivia of the following node when that
/// child is a node, a sibling token otherwise.
pub fn lower_tree(tree: &tree_sitter::Tree, source: &str) -> SyntaxNode {
    let root = tree.root_node();
    let leading = gap_token(source, 0, root.start_byte());

    let SyntaxElement::Node(lowered) = lower(root, source, leading, true) else {
        unreachable!("root is always lowered to a node");
    };

    match gap_token(source, root.end_byte(), source.len()) {
        Some(trailing) => {
            let mut children = lowered.children().to_vec();
            children.push(trailing.into());
            lowered.with_children(children)
        }
        None => lowered,
    }
}

fn becomes_node(node: Node) -> bool {
    node.child_count() > 0 || (node.is_named() && !node.is_extra())
}

fn lower(node: Node, source: &str, leading: Option<SyntaxToken>, force_node: bool) -> SyntaxElement {
    let kind = node.kind();
    let mut children: Vec<SyntaxElement> = leading.into_iter().map(Into::into).collect();

    if node.child_count() == 0 {
        let token = SyntaxToken::new(kind, &source[node.start_byte()..node.end_byte()]);
        if !force_node && !becomes_node(node) {
            return token.into();
        }
        children.push(token.into());
        return SyntaxNode::new(kind, children).into();
    }

    let mut pos = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let gap = gap_token(source, pos, child.start_byte());
        if becomes_node(child) {
            children.push(lower(child, source, gap, false));
        } else {
            children.extend(gap.map(SyntaxElement::from));
            children.push(lower(child, source, None, false));
        }
        pos = pos.max(child.end_byte());
    }
    children.extend(gap_token(source, pos, node.end_byte()).map(SyntaxElement::from));

    SyntaxNode::new(kind, children).into()
}

fn gap_token(source: &str, start: usize, end: usize) -> Option<SyntaxToken> {
    if start >= end {
        return None;
    }
    let text = &source[start..end];
    let kind = if text.trim().is_empty() {
        WHITESPACE
    } else {
        SKIPPED
    };
    Some(SyntaxToken::new(kind, text))
}

#[cfg(test)]
mod tests {
    use fixall_syntax::TreeWalker;
    use pretty_assertions::assert_eq;

    use crate::JavaParser;

    #[test]
    fn test_named_leaves_become_nodes() {
        let mut parser = JavaParser::new();
        let root = parser
            .parse_syntax("class A { int f() { return (foo); } }")
            .unwrap();

        let parens = TreeWalker::new(&root)
            .find(|n| n.kind() == "parenthesized_expression")
            .unwrap();
        assert_eq!(parens.text(), " (foo)");
        assert!(parens.node().has_leading_trivia());

        let inner: Vec<_> = parens.child_nodes().map(|n| n.kind()).collect();
        assert_eq!(inner, vec!["identifier"]);
        let tokens: Vec<_> = parens
            .node()
            .significant_tokens()
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(tokens, vec!["(", ")"]);
    }

    #[test]
    fn test_comments_are_trivia_tokens() {
        let mut parser = JavaParser::new();
        let root = parser.parse_syntax("class A { // note\n}").unwrap();
        let comment = fixall_syntax::TokenWalker::new(&root)
            .find(|t| t.kind() == "line_comment")
            .unwrap();
        assert!(comment.token().is_trivia());
    }
}
