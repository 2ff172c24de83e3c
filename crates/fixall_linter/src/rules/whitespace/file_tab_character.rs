//! FileTabCharacter rule implementation.
//!
//! Checks that indentation and other whitespace contains no tab characters.
//! Tabs inside comments and literals are part of their text and are left
//! alone. The fix expands every tab in the unit to the next tab stop in one
//! rebuild of the tree.

use fixall_diagnostics::{Finding, Violation};
use fixall_engine::{FixError, SourceUnit};
use fixall_syntax::{NodeRef, SyntaxNode, TokenWalker, WHITESPACE};
use fixall_text_size::{Ranged, TextRange, TextSize};

use crate::{CheckContext, FromConfig, Properties, Rule, RuleFix};

/// Violation: file contains tab character.
#[derive(Debug, Clone)]
pub struct FileContainsTabViolation;

impl Violation for FileContainsTabViolation {
    const RULE_ID: &'static str = "FileTabCharacter";

    fn message(&self) -> String {
        "File contains tab characters (this is the first instance).".to_string()
    }
}

/// Violation: line contains tab character (when eachLine=true).
#[derive(Debug, Clone)]
pub struct LineContainsTabViolation;

impl Violation for LineContainsTabViolation {
    const RULE_ID: &'static str = "FileTabCharacter";

    fn message(&self) -> String {
        "Line contains a tab character.".to_string()
    }
}

/// Configuration for FileTabCharacter rule.
#[derive(Debug, Clone)]
pub struct FileTabCharacter {
    /// Report every line containing a tab instead of just the first one.
    each_line: bool,
    /// Tab width used when expanding tabs to spaces. Never zero.
    tab_width: usize,
}

const RELEVANT_KINDS: &[&str] = &["program"];

impl Default for FileTabCharacter {
    fn default() -> Self {
        Self {
            each_line: false,
            tab_width: 4,
        }
    }
}

impl FileTabCharacter {
    /// A zero `tab_width` is treated as 1.
    pub fn new(each_line: bool, tab_width: usize) -> Self {
        Self {
            each_line,
            tab_width: tab_width.max(1),
        }
    }

    pub fn each_line(&self) -> bool {
        self.each_line
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }
}

impl FromConfig for FileTabCharacter {
    const MODULE_NAME: &'static str = "FileTabCharacter";

    fn from_config(properties: &Properties) -> Self {
        let each_line = properties
            .get("eachLine")
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);

        let tab_width = properties
            .get("tabWidth")
            .and_then(|s| s.parse().ok())
            .filter(|width| *width > 0)
            .unwrap_or(4);

        Self::new(each_line, tab_width)
    }
}

impl Rule for FileTabCharacter {
    fn name(&self) -> &'static str {
        "FileTabCharacter"
    }

    fn relevant_kinds(&self) -> &'static [&'static str] {
        RELEVANT_KINDS
    }

    fn check(&self, ctx: &CheckContext, node: &NodeRef) -> Vec<Finding> {
        // Only check at the root node to avoid scanning the file multiple times
        if !node.path().is_root() {
            return vec![];
        }

        let line_index = ctx.line_index();
        let mut findings: Vec<Finding> = Vec::new();
        let mut last_line = None;
        for token in TokenWalker::new(node.node()) {
            if token.kind() != WHITESPACE {
                continue;
            }
            for (at, _) in token.text().match_indices('\t') {
                let offset = token.start() + TextSize::try_from(at).unwrap_or_default();
                let line = line_index.line_index(offset);
                if last_line == Some(line) {
                    continue;
                }
                last_line = Some(line);

                let range = TextRange::at(offset, TextSize::new(1));
                if !self.each_line {
                    return vec![Finding::new(FileContainsTabViolation, ctx.unit_id(), range)];
                }
                findings.push(Finding::new(LineContainsTabViolation, ctx.unit_id(), range));
            }
        }
        findings
    }

    fn fix(&self) -> Option<RuleFix> {
        let tab_width = self.tab_width;
        Some(RuleFix::Independent(Box::new(
            move |unit: &SourceUnit, _: &[Finding]| -> Result<SyntaxNode, FixError> {
                Ok(expand_tabs(unit.root(), tab_width))
            },
        )))
    }
}

/// Replace tabs in whitespace tokens with spaces up to the next tab stop.
///
/// Columns are tracked across all tokens, so a tab after code on the same
/// line expands relative to where that code ends. A zero `tab_width` is
/// treated as 1.
pub fn expand_tabs(root: &SyntaxNode, tab_width: usize) -> SyntaxNode {
    let tab_width = tab_width.max(1);
    let mut column = 0;
    root.map_tokens(&mut |token| {
        let text = token.text();
        if token.kind() != WHITESPACE || !text.contains('\t') {
            for ch in text.chars() {
                column = next_column(column, ch, tab_width);
            }
            return None;
        }

        let mut expanded = String::with_capacity(text.len() + tab_width);
        for ch in text.chars() {
            let next = next_column(column, ch, tab_width);
            if ch == '\t' {
                expanded.extend(std::iter::repeat_n(' ', next - column));
            } else {
                expanded.push(ch);
            }
            column = next;
        }
        Some(token.with_text(expanded))
    })
}

fn next_column(column: usize, ch: char, tab_width: usize) -> usize {
    match ch {
        '\t' => column + tab_width - column % tab_width,
        '\n' => 0,
        _ => column + 1,
    }
}
