//! UnnecessaryParentheses rule implementation.
//!
//! Checks for parentheses around a return value or the right-hand side of
//! an assignment or variable initializer, where they never change meaning.
//! Each parenthesis is reported on its own, so one pair yields two findings
//! that resolve to the same node when fixed.
//!
//! ## Examples
//!
//! ```java
//! return (x);      // violation, twice
//! y = (a + b);     // violation, twice
//! int z = ((1));   // violation, four times
//! if ((a)) { }     // ok, not checked
//! ```

use fixall_diagnostics::{Finding, Violation};
use fixall_engine::FixError;
use fixall_syntax::{NodeRef, SyntaxElement, SyntaxNode, SyntaxToken, WHITESPACE};
use fixall_text_size::Ranged;

use crate::{CheckContext, FromConfig, Properties, Rule, RuleFix};

const PARENTHESIZED: &str = "parenthesized_expression";

#[derive(Debug, Clone, Copy)]
enum Position {
    Return,
    Assignment,
    Nested,
}

/// Violation: parentheses that can be removed without changing meaning.
#[derive(Debug, Clone)]
pub struct UnnecessaryParenthesesViolation {
    position: Position,
}

impl Violation for UnnecessaryParenthesesViolation {
    const RULE_ID: &'static str = "UnnecessaryParentheses";

    fn message(&self) -> String {
        match self.position {
            Position::Return => "Unnecessary parentheses around return value.".to_string(),
            Position::Assignment => {
                "Unnecessary parentheses around assignment right-hand side.".to_string()
            }
            Position::Nested => "Unnecessary parentheses around expression.".to_string(),
        }
    }
}

/// This rule has no configuration options.
#[derive(Debug, Clone, Default)]
pub struct UnnecessaryParentheses;

const RELEVANT_KINDS: &[&str] = &[
    "return_statement",
    "assignment_expression",
    "variable_declarator",
];

impl FromConfig for UnnecessaryParentheses {
    const MODULE_NAME: &'static str = "UnnecessaryParentheses";

    fn from_config(_properties: &Properties) -> Self {
        Self
    }
}

impl Rule for UnnecessaryParentheses {
    fn name(&self) -> &'static str {
        "UnnecessaryParentheses"
    }

    fn relevant_kinds(&self) -> &'static [&'static str] {
        RELEVANT_KINDS
    }

    fn check(&self, ctx: &CheckContext, node: &NodeRef) -> Vec<Finding> {
        let (value, position) = match node.kind() {
            "return_statement" => (node.child_nodes().next(), Position::Return),
            // The value is the last child of both `a = b` and `int a = b`. A
            // declarator without an initializer ends in its name.
            "assignment_expression" | "variable_declarator" => {
                (node.child_nodes().last(), Position::Assignment)
            }
            _ => return vec![],
        };

        let mut findings = Vec::new();
        let mut current = value.filter(|value| value.kind() == PARENTHESIZED);
        let mut position = position;
        while let Some(parens) = current {
            if has_comments(parens.node()) {
                break;
            }
            for token in parens.child_tokens().filter(|t| matches!(t.kind(), "(" | ")")) {
                findings.push(Finding::new(
                    UnnecessaryParenthesesViolation { position },
                    ctx.unit_id(),
                    token.range(),
                ));
            }
            current = sole_child(&parens).filter(|inner| inner.kind() == PARENTHESIZED);
            position = Position::Nested;
        }
        findings
    }

    fn fix(&self) -> Option<RuleFix> {
        Some(RuleFix::Batched(Box::new(unwrap_parentheses)))
    }
}

fn sole_child(node: &NodeRef) -> Option<NodeRef> {
    let mut children = node.child_nodes();
    let child = children.next()?;
    children.next().is_none().then_some(child)
}

/// Comments directly inside the parentheses would be lost by unwrapping.
fn has_comments(node: &SyntaxNode) -> bool {
    node.children().iter().any(|child| match child {
        SyntaxElement::Token(token) => token.is_trivia() && token.kind() != WHITESPACE,
        SyntaxElement::Node(_) => false,
    })
}

/// Replaces a parenthesized expression with the expression inside it.
///
/// The result keeps the parentheses' leading trivia, or gets a single space
/// if there was none so `return(x)` cannot become `returnx`.
fn unwrap_parentheses(node: &SyntaxNode) -> Result<SyntaxNode, FixError> {
    if node.kind() != PARENTHESIZED {
        return Err(FixError::UnexpectedNode {
            kind: node.kind(),
            reason: "expected a parenthesized expression".to_string(),
        });
    }
    if has_comments(node) {
        return Err(FixError::UnexpectedNode {
            kind: node.kind(),
            reason: "comments inside parentheses".to_string(),
        });
    }
    let inner = node
        .child_nodes()
        .next()
        .ok_or_else(|| FixError::UnexpectedNode {
            kind: node.kind(),
            reason: "no expression inside parentheses".to_string(),
        })?;

    let leading: Vec<SyntaxToken> = if node.has_leading_trivia() {
        node.leading_trivia().cloned().collect()
    } else {
        vec![SyntaxToken::whitespace(" ")]
    };
    Ok(inner.with_leading_trivia(leading))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, fix};
    use pretty_assertions::assert_eq;

    fn method(body: &str) -> String {
        format!("class Test {{\n    int f(int a, int b) {{\n        {body}\n    }}\n}}\n")
    }

    #[test]
    fn test_one_finding_per_parenthesis() {
        let source = method("return(a);");
        let findings = check(UnnecessaryParentheses, &source);
        let texts: Vec<&str> = findings.iter().map(|f| &source[f.range]).collect();
        assert_eq!(texts, vec!["(", ")"]);
        assert_eq!(
            findings[0].message,
            "Unnecessary parentheses around return value."
        );
    }

    #[test]
    fn test_assignment_and_initializer() {
        let source = method("int c = (a);\n        b = (a + c);\n        return b;");
        let findings = check(UnnecessaryParentheses, &source);
        assert_eq!(findings.len(), 4);
        assert!(findings.iter().all(|f| f.message.contains("right-hand side")));
    }

    #[test]
    fn test_condition_parentheses_are_not_checked() {
        let source = method("if ((a > b)) { return a; }\n        return f(a, (b));");
        assert!(check(UnnecessaryParentheses, &source).is_empty());
    }

    #[test]
    fn test_comment_inside_parentheses_is_skipped() {
        let source = method("return (/* keep */ a);");
        assert!(check(UnnecessaryParentheses, &source).is_empty());
    }

    #[test]
    fn test_nested_parentheses_are_all_reported() {
        let source = method("return ((a));");
        assert_eq!(check(UnnecessaryParentheses, &source).len(), 4);
    }

    #[test]
    fn test_fix_adjacent_to_keyword() {
        assert_eq!(
            fix(UnnecessaryParentheses, &method("return(a);")),
            method("return a;")
        );
    }

    #[test]
    fn test_fix_keeps_existing_spacing() {
        let source = method("int c = (a * b);\n        b = (c);\n        return (b);");
        let expected = method("int c = a * b;\n        b = c;\n        return b;");
        assert_eq!(fix(UnnecessaryParentheses, &source), expected);
    }

    #[test]
    fn test_fix_nested_in_one_pass() {
        let fixed = fix(UnnecessaryParentheses, &method("return((a));"));
        assert_eq!(fixed, method("return a;"));
        assert!(check(UnnecessaryParentheses, &fixed).is_empty());
    }

    #[test]
    fn test_unwrap_rejects_other_nodes() {
        let node = SyntaxNode::leaf("identifier", "a");
        assert!(unwrap_parentheses(&node).is_err());
    }
}
