//! TrailingWhitespace rule implementation.
//!
//! Checks for spaces and tabs at the end of a line. Only whitespace between
//! tokens is considered; text blocks and comments keep their content.

use fixall_diagnostics::{Finding, Violation};
use fixall_engine::{FixError, SourceUnit};
use fixall_syntax::{NodeRef, SyntaxNode, TokenWalker, WHITESPACE};
use fixall_text_size::{Ranged, TextRange, TextSize};

use crate::{CheckContext, FromConfig, Properties, Rule, RuleFix};

#[derive(Debug, Clone)]
pub struct TrailingWhitespaceViolation;

impl Violation for TrailingWhitespaceViolation {
    const RULE_ID: &'static str = "TrailingWhitespace";

    fn message(&self) -> String {
        "Line has trailing spaces.".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrailingWhitespace;

impl FromConfig for TrailingWhitespace {
    const MODULE_NAME: &'static str = "TrailingWhitespace";

    fn from_config(_properties: &Properties) -> Self {
        Self
    }
}

impl Rule for TrailingWhitespace {
    fn name(&self) -> &'static str {
        "TrailingWhitespace"
    }

    fn relevant_kinds(&self) -> &'static [&'static str] {
        &["program"]
    }

    fn check(&self, ctx: &CheckContext, node: &NodeRef) -> Vec<Finding> {
        if !node.path().is_root() {
            return vec![];
        }

        let mut findings = Vec::new();
        for token in TokenWalker::new(node.node()) {
            if token.kind() != WHITESPACE {
                continue;
            }
            let mut line_start = 0;
            for line in token.text().split_inclusive('\n') {
                let Some(body) = line.strip_suffix('\n') else {
                    break;
                };
                let body = body.strip_suffix('\r').unwrap_or(body);
                let trimmed = body.trim_end_matches([' ', '\t']);
                if trimmed.len() < body.len() {
                    let start = line_start + trimmed.len();
                    let range = TextRange::new(
                        token.start() + TextSize::try_from(start).unwrap_or_default(),
                        token.start() + TextSize::try_from(line_start + body.len()).unwrap_or_default(),
                    );
                    findings.push(Finding::new(TrailingWhitespaceViolation, ctx.unit_id(), range));
                }
                line_start += line.len();
            }
        }
        findings
    }

    fn fix(&self) -> Option<RuleFix> {
        Some(RuleFix::Independent(Box::new(
            |unit: &SourceUnit, _: &[Finding]| -> Result<SyntaxNode, FixError> {
                Ok(strip_trailing_whitespace(unit.root()))
            },
        )))
    }
}

/// Remove spaces and tabs before every line break inside whitespace tokens.
pub fn strip_trailing_whitespace(root: &SyntaxNode) -> SyntaxNode {
    root.map_tokens(&mut |token| {
        if token.kind() != WHITESPACE {
            return None;
        }
        strip_lines(token.text()).map(|text| token.with_text(text))
    })
}

fn strip_lines(text: &str) -> Option<String> {
    let mut changed = false;
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let Some(body) = line.strip_suffix('\n') else {
            out.push_str(line);
            continue;
        };
        let (body, ending) = match body.strip_suffix('\r') {
            Some(body) => (body, "\r\n"),
            None => (body, "\n"),
        };
        let trimmed = body.trim_end_matches([' ', '\t']);
        changed |= trimmed.len() < body.len();
        out.push_str(trimmed);
        out.push_str(ending);
    }
    changed.then_some(out)
}
