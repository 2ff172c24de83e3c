//! Java front end for fixall, built on tree-sitter-java.
//!
//! tree-sitter trees are tied to their parser and cannot be edited
//! structurally, so every parse is lowered into an immutable
//! [`fixall_syntax::SyntaxNode`] tree before any rule sees it.

mod lower;

use std::sync::Arc;

use fixall_syntax::SyntaxNode;
use thiserror::Error;

pub use lower::lower_tree;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("tree-sitter did not produce a tree")]
    NoTree,
    #[error("source is {0} bytes, larger than the supported maximum of 4 GiB")]
    TooLarge(usize),
}

/// Result of parsing a Java source file.
pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub source: Arc<str>,
}

impl ParseResult {
    /// Lower the tree-sitter tree into a lossless syntax tree.
    pub fn syntax(&self) -> SyntaxNode {
        lower_tree(&self.tree, &self.source)
    }

    /// True if tree-sitter had to recover from syntax errors.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Java parser wrapping tree-sitter.
pub struct JavaParser {
    parser: tree_sitter::Parser,
}

/// Return the tree-sitter Java language.
pub fn java_language() -> tree_sitter::Language {
    tree_sitter_java_orchard::LANGUAGE.into()
}

impl JavaParser {
    /// Create a new Java parser.
    pub fn new() -> Self {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&java_language())
            .expect("Failed to load Java grammar");
        Self { parser }
    }

    /// Parse Java source code into a tree-sitter tree.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, ParseError> {
        if u32::try_from(source.len()).is_err() {
            return Err(ParseError::TooLarge(source.len()));
        }
        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
        Ok(ParseResult {
            tree,
            source: source.into(),
        })
    }

    /// Parse Java source code straight into a lossless syntax tree.
    pub fn parse_syntax(&mut self, source: &str) -> Result<SyntaxNode, ParseError> {
        Ok(self.parse(source)?.syntax())
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_class() {
        let mut parser = JavaParser::new();
        let source = r#"
public class Hello {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}
"#;
        let result = parser.parse(source).expect("Failed to parse");
        assert_eq!(result.tree.root_node().kind(), "program");
        assert!(!result.has_errors());
    }

    #[test]
    fn test_parse_syntax_is_lossless() {
        let mut parser = JavaParser::new();
        let source = "  // header\nclass A {\n\tint f() { return(x); } /* tail */\n}\n\n";
        let root = parser.parse_syntax(source).unwrap();
        assert_eq!(root.kind(), "program");
        assert_eq!(root.text(), source);
    }

    #[test]
    fn test_parse_with_errors_is_still_lossless() {
        let mut parser = JavaParser::new();
        let source = "class A { int x = ; }";
        let result = parser.parse(source).unwrap();
        assert!(result.has_errors());
        assert_eq!(result.syntax().text(), source);
    }
}
