//! Per-unit remediation.
//!
//! A remediator turns one unit plus the findings reported against it into a
//! [`RemediationResult`]. It sees nothing but that unit, so units can be
//! processed concurrently in any order.

mod batched;
mod independent;

use fixall_diagnostics::{Finding, FixStrategy, UnitId};
use fixall_syntax::SyntaxNode;

pub use batched::BatchedTagRemediator;
pub use independent::IndependentRemediator;

use crate::cancel::CancellationToken;
use crate::error::{Cancelled, FixError};
use crate::model::SourceUnit;

/// Outcome of remediating one unit.
#[derive(Clone, Debug, is_macro::Is)]
pub enum RemediationResult {
    /// Nothing to substitute: the unit's original tree stays in place.
    Unchanged,
    /// The unit's new tree.
    Updated(SyntaxNode),
}

impl RemediationResult {
    /// `Unchanged` when `rewritten` is the very node `original` is.
    pub fn from_roots(original: &SyntaxNode, rewritten: SyntaxNode) -> Self {
        if rewritten.ptr_eq(original) {
            RemediationResult::Unchanged
        } else {
            RemediationResult::Updated(rewritten)
        }
    }

    /// The tree the unit has after remediation.
    pub fn root_or(&self, original: &SyntaxNode) -> SyntaxNode {
        match self {
            RemediationResult::Unchanged => original.clone(),
            RemediationResult::Updated(root) => root.clone(),
        }
    }
}

/// What happened to one unit during a pass.
#[derive(Clone, Debug)]
pub struct UnitReport {
    pub unit_id: UnitId,
    pub result: RemediationResult,
    /// Findings handed to the remediator for this unit.
    pub findings: usize,
    /// Findings whose range did not resolve to a node.
    pub dropped: usize,
    /// The callback error that left the unit unchanged, if any.
    pub failure: Option<FixError>,
}

impl UnitReport {
    pub(crate) fn unchanged(unit_id: UnitId, findings: usize) -> Self {
        Self {
            unit_id,
            result: RemediationResult::Unchanged,
            findings,
            dropped: 0,
            failure: None,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.result.is_updated()
    }
}

/// Applies one rule's fix to a single unit.
pub trait UnitRemediator: Send + Sync {
    fn strategy(&self) -> FixStrategy;

    /// Remediate `unit` given the findings reported against it.
    ///
    /// Callback failures are reported through [`UnitReport::failure`] and
    /// leave the unit unchanged. Only cancellation is returned as an error.
    fn remediate(
        &self,
        unit: &SourceUnit,
        findings: &[Finding],
        cancel: &CancellationToken,
    ) -> Result<UnitReport, Cancelled>;
}
