use fixall_diagnostics::{Finding, FixStrategy};
use fixall_syntax::{SyntaxNode, covering_node};
use tracing::{debug, warn};

use super::{RemediationResult, UnitRemediator, UnitReport};
use crate::cancel::CancellationToken;
use crate::error::{Cancelled, FixError};
use crate::model::SourceUnit;
use crate::tag::TaggedTree;

/// Fixes any number of findings in one unit with a per-node `replace`
/// function, without letting one replacement disturb the others.
///
/// Targets are located by range in the original tree and tagged in one step
/// ("where"), then rewritten by tag in one combined edit ("what"). Ranges are
/// only ever read against the unmodified tree, so it does not matter how
/// much any replacement grows or shrinks the text around it.
pub struct BatchedTagRemediator<F> {
    replace: F,
}

impl<F> BatchedTagRemediator<F>
where
    F: Fn(&SyntaxNode) -> Result<SyntaxNode, FixError> + Send + Sync,
{
    /// `replace` receives a finding's node and returns the node to put in
    /// its place, or the very same node to leave that occurrence alone.
    pub fn new(replace: F) -> Self {
        Self { replace }
    }
}

impl<F> UnitRemediator for BatchedTagRemediator<F>
where
    F: Fn(&SyntaxNode) -> Result<SyntaxNode, FixError> + Send + Sync,
{
    fn strategy(&self) -> FixStrategy {
        FixStrategy::BatchedTag
    }

    fn remediate(
        &self,
        unit: &SourceUnit,
        findings: &[Finding],
        cancel: &CancellationToken,
    ) -> Result<UnitReport, Cancelled> {
        let mut report = UnitReport::unchanged(unit.id(), findings.len());
        let original = unit.root();

        let mut targets = Vec::with_capacity(findings.len());
        for finding in findings {
            cancel.check()?;
            match covering_node(original, finding.range) {
                Some(node) => targets.push(node.path().clone()),
                None => {
                    debug!(
                        unit = %unit.id(),
                        range = ?finding.range,
                        rule = %finding.rule_id,
                        "finding does not map to a node, dropping it"
                    );
                    report.dropped += 1;
                }
            }
        }
        cancel.check()?;
        if targets.is_empty() {
            return Ok(report);
        }

        let tagged = TaggedTree::tag_all(original, targets);
        let resolved = tagged.tagged_nodes();
        debug!(
            unit = %unit.id(),
            findings = findings.len(),
            tagged = resolved.len(),
            kinds = ?resolved.iter().map(|(_, node)| node.kind()).collect::<Vec<_>>(),
            "tagged fix targets"
        );

        let rewritten = tagged.rewrite(|_, node| (self.replace)(node));
        cancel.check()?;
        match rewritten {
            Ok(root) => report.result = RemediationResult::from_roots(original, root),
            Err(err) => {
                warn!(
                    unit = %unit.id(),
                    path = %unit.path().display(),
                    error = %err,
                    "replacement failed, leaving unit unchanged"
                );
                report.failure = Some(err);
            }
        }
        Ok(report)
    }
}
