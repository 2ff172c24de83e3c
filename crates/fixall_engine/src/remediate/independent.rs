use fixall_diagnostics::{Finding, FixStrategy};
use fixall_syntax::SyntaxNode;
use tracing::{debug, warn};

use super::{RemediationResult, UnitRemediator, UnitReport};
use crate::cancel::CancellationToken;
use crate::error::{Cancelled, FixError};
use crate::model::SourceUnit;

/// Fixes each unit in isolation with a callback that rebuilds the whole
/// unit tree from the unit's findings.
pub struct IndependentRemediator<F> {
    fix_unit: F,
}

impl<F> IndependentRemediator<F>
where
    F: Fn(&SourceUnit, &[Finding]) -> Result<SyntaxNode, FixError> + Send + Sync,
{
    pub fn new(fix_unit: F) -> Self {
        Self { fix_unit }
    }
}

impl<F> UnitRemediator for IndependentRemediator<F>
where
    F: Fn(&SourceUnit, &[Finding]) -> Result<SyntaxNode, FixError> + Send + Sync,
{
    fn strategy(&self) -> FixStrategy {
        FixStrategy::Independent
    }

    fn remediate(
        &self,
        unit: &SourceUnit,
        findings: &[Finding],
        cancel: &CancellationToken,
    ) -> Result<UnitReport, Cancelled> {
        cancel.check()?;
        if findings.is_empty() {
            return Ok(UnitReport::unchanged(unit.id(), 0));
        }

        let mut report = UnitReport::unchanged(unit.id(), findings.len());
        match (self.fix_unit)(unit, findings) {
            Ok(root) => {
                report.result = RemediationResult::from_roots(unit.root(), root);
                debug!(
                    unit = %unit.id(),
                    path = %unit.path().display(),
                    changed = report.is_changed(),
                    "fixed unit independently"
                );
            }
            Err(err) => {
                warn!(
                    unit = %unit.id(),
                    path = %unit.path().display(),
                    error = %err,
                    "fix failed, leaving unit unchanged"
                );
                report.failure = Some(err);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Workspace;
    use fixall_diagnostics::{Severity, UnitId};
    use fixall_text_size::TextRange;

    fn unit(text: &str) -> std::sync::Arc<SourceUnit> {
        let mut builder = Workspace::builder();
        let project = builder.add_project("p");
        let id = builder.add_unit(project, "A.java", SyntaxNode::leaf("program", text));
        let workspace = builder.build();
        workspace.unit(id).cloned().unwrap()
    }

    fn finding(unit_id: UnitId) -> Finding {
        Finding {
            rule_id: "Upper".to_string(),
            unit_id,
            range: TextRange::default(),
            severity: Severity::Warning,
            message: "make it loud".to_string(),
            arguments: vec![],
        }
    }

    fn upper(unit: &SourceUnit, _: &[Finding]) -> Result<SyntaxNode, FixError> {
        Ok(SyntaxNode::leaf("program", unit.text().to_uppercase()))
    }

    #[test]
    fn test_rebuilds_unit() {
        let unit = unit("abc");
        let remediator = IndependentRemediator::new(upper);
        let report = remediator
            .remediate(&unit, &[finding(unit.id())], &CancellationToken::new())
            .unwrap();
        let RemediationResult::Updated(root) = report.result else {
            panic!("expected an update");
        };
        assert_eq!(root.text(), "ABC");
        assert_eq!(report.findings, 1);
    }

    #[test]
    fn test_no_findings_skips_callback() {
        let unit = unit("abc");
        let remediator = IndependentRemediator::new(|_: &SourceUnit, _: &[Finding]| {
            panic!("callback must not run without findings")
        });
        let report = remediator
            .remediate(&unit, &[], &CancellationToken::new())
            .unwrap();
        assert!(report.result.is_unchanged());
    }

    #[test]
    fn test_failure_is_isolated() {
        let unit = unit("abc");
        let remediator = IndependentRemediator::new(|_: &SourceUnit, _: &[Finding]| {
            Err(FixError::message("cannot fix"))
        });
        let report = remediator
            .remediate(&unit, &[finding(unit.id())], &CancellationToken::new())
            .unwrap();
        assert!(report.result.is_unchanged());
        assert_eq!(report.failure, Some(FixError::message("cannot fix")));
    }

    #[test]
    fn test_returning_same_root_is_unchanged() {
        let unit = unit("abc");
        let remediator =
            IndependentRemediator::new(|unit: &SourceUnit, _: &[Finding]| Ok(unit.root().clone()));
        let report = remediator
            .remediate(&unit, &[finding(unit.id())], &CancellationToken::new())
            .unwrap();
        assert!(report.result.is_unchanged());
    }

    #[test]
    fn test_cancelled_before_start() {
        let unit = unit("abc");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let remediator = IndependentRemediator::new(upper);
        assert_eq!(
            remediator
                .remediate(&unit, &[finding(unit.id())], &cancel)
                .unwrap_err(),
            Cancelled
        );
    }
}
