//! UpperEll rule implementation.
//!
//! Checks that long literals use uppercase 'L' rather than lowercase 'l'.
//! The lowercase 'l' looks too similar to '1', which can cause confusion.
//!
//! ## Examples
//!
//! ```java
//! long bad = 123l;   // violation
//! long good = 123L;  // ok
//! ```

use fixall_diagnostics::{Finding, Violation};
use fixall_engine::FixError;
use fixall_syntax::{NodeRef, SyntaxNode};

use crate::{CheckContext, FromConfig, Properties, Rule, RuleFix};

/// Violation: long literal uses lowercase 'l' suffix.
#[derive(Debug, Clone)]
pub struct UpperEllViolation;

impl Violation for UpperEllViolation {
    const RULE_ID: &'static str = "UpperEll";

    fn message(&self) -> String {
        "Should use uppercase 'L'.".to_string()
    }
}

/// This rule has no configuration options.
#[derive(Debug, Clone, Default)]
pub struct UpperEll;

const RELEVANT_KINDS: &[&str] = &[
    "decimal_integer_literal",
    "hex_integer_literal",
    "octal_integer_literal",
    "binary_integer_literal",
];

impl FromConfig for UpperEll {
    const MODULE_NAME: &'static str = "UpperEll";

    fn from_config(_properties: &Properties) -> Self {
        Self
    }
}

impl Rule for UpperEll {
    fn name(&self) -> &'static str {
        "UpperEll"
    }

    fn relevant_kinds(&self) -> &'static [&'static str] {
        RELEVANT_KINDS
    }

    fn check(&self, ctx: &CheckContext, node: &NodeRef) -> Vec<Finding> {
        let range = node.trimmed_range();
        if !ctx.text_at(range).ends_with('l') {
            return vec![];
        }
        vec![Finding::new(UpperEllViolation, ctx.unit_id(), range)]
    }

    fn fix(&self) -> Option<RuleFix> {
        Some(RuleFix::Batched(Box::new(uppercase_suffix)))
    }
}

/// Rewrites the literal token of `node` to end in 'L'.
fn uppercase_suffix(node: &SyntaxNode) -> Result<SyntaxNode, FixError> {
    let kind = node.kind();
    let mut fixed = false;
    let replaced = node.map_tokens(&mut |token| {
        let text = token.text().strip_suffix('l')?;
        if token.kind() != kind {
            return None;
        }
        fixed = true;
        Some(token.with_text(format!("{text}L")))
    });
    if fixed {
        Ok(replaced)
    } else {
        Err(FixError::UnexpectedNode {
            kind,
            reason: "no literal ending in 'l'".to_string(),
        })
    }
}
