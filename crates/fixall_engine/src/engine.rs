//! One fix-all invocation: resolve, remediate each unit, aggregate.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fixall_diagnostics::{Finding, UnitId};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::{Containment, SnapshotAggregator};
use crate::cancel::CancellationToken;
use crate::error::{Cancelled, FixError};
use crate::model::{SourceUnit, Workspace};
use crate::remediate::{RemediationResult, UnitRemediator, UnitReport};
use crate::scope::{Resolution, Scope, ScopeResolver};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Remediate units on the rayon pool instead of one after another.
    pub parallel: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// A request to fix every finding of one rule within a scope.
#[derive(Clone, Debug)]
pub struct FixAllRequest {
    pub scope: Scope,
    /// Unit the request was made from; anchors `SingleUnit` and `Project`.
    pub origin: UnitId,
    pub rule_id: String,
    /// Findings may belong to any rule and any unit; only those of
    /// `rule_id` are used.
    pub findings: Vec<Finding>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, is_macro::Is)]
pub enum FixAllStatus {
    Applied { changed_units: usize },
    NoChange,
    Unsupported,
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct FixAllOutcome {
    /// The resulting snapshot. The input snapshot itself unless `status`
    /// is `Applied`.
    pub workspace: Arc<Workspace>,
    pub status: FixAllStatus,
    /// One report per unit in scope, in declared order. Empty when the
    /// pass was cancelled or the scope unsupported.
    pub reports: Vec<UnitReport>,
}

impl FixAllOutcome {
    pub fn unit(&self, id: UnitId) -> Option<&UnitReport> {
        self.reports.iter().find(|report| report.unit_id == id)
    }

    fn unchanged(workspace: &Arc<Workspace>, status: FixAllStatus) -> Self {
        Self {
            workspace: Arc::clone(workspace),
            status,
            reports: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FixAllEngine {
    options: EngineOptions,
}

impl FixAllEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Apply `remediator` to every unit `request.scope` covers and fold the
    /// results into a new snapshot.
    ///
    /// Never fails: unsupported scopes, cancellation and per-unit fix
    /// failures are all reported through the outcome, and in the first two
    /// cases the input snapshot is returned as is. A cancellation observed
    /// after every unit finished still discards their results. A callback
    /// that panics fails its own unit the way an `Err` would.
    pub fn fix_all(
        &self,
        workspace: &Arc<Workspace>,
        request: &FixAllRequest,
        remediator: &dyn UnitRemediator,
        cancel: &CancellationToken,
    ) -> FixAllOutcome {
        if cancel.is_cancelled() {
            return FixAllOutcome::unchanged(workspace, FixAllStatus::Cancelled);
        }

        let Resolution::Units(units) = ScopeResolver::resolve(request.scope, workspace, request.origin)
        else {
            debug!(scope = ?request.scope, rule = %request.rule_id, "scope not supported, nothing to do");
            return FixAllOutcome::unchanged(workspace, FixAllStatus::Unsupported);
        };

        let findings = group_findings(&request.rule_id, &request.findings);
        let reports = match self
            .remediate_units(&units, &findings, remediator, cancel)
            .and_then(|reports| cancel.check().map(|()| reports))
        {
            Ok(reports) => reports,
            Err(Cancelled) => {
                info!(rule = %request.rule_id, "fix-all cancelled, workspace left unchanged");
                return FixAllOutcome::unchanged(workspace, FixAllStatus::Cancelled);
            }
        };

        let containment = match request.scope {
            Scope::SingleUnit => Containment::Unit(request.origin),
            Scope::Project => match workspace.unit(request.origin) {
                Some(unit) => Containment::Project(unit.project()),
                None => Containment::Unit(request.origin),
            },
            Scope::Workspace | Scope::Custom => Containment::Workspace,
        };
        let next = SnapshotAggregator::aggregate(
            workspace,
            containment,
            reports.iter().map(|report| (report.unit_id, report.result.clone())),
        );

        let changed_units = reports.iter().filter(|report| report.is_changed()).count();
        let failed_units = reports.iter().filter(|report| report.failure.is_some()).count();
        let dropped: usize = reports.iter().map(|report| report.dropped).sum();
        info!(
            rule = %request.rule_id,
            scope = ?request.scope,
            units = reports.len(),
            changed = changed_units,
            failed = failed_units,
            dropped,
            "fix-all complete"
        );

        let status = if changed_units == 0 {
            FixAllStatus::NoChange
        } else {
            FixAllStatus::Applied { changed_units }
        };
        FixAllOutcome {
            workspace: next,
            status,
            reports,
        }
    }

    /// Fix a single unit outside of any snapshot.
    ///
    /// Returns `unit` itself when nothing changed or the fix failed.
    pub fn fix_unit(
        &self,
        unit: &Arc<SourceUnit>,
        findings: &[Finding],
        remediator: &dyn UnitRemediator,
        cancel: &CancellationToken,
    ) -> Result<Arc<SourceUnit>, Cancelled> {
        let findings: Vec<Finding> = findings
            .iter()
            .filter(|finding| finding.unit_id == unit.id())
            .cloned()
            .collect();
        let report = remediate_isolated(remediator, unit, &findings, cancel)?;
        cancel.check()?;
        Ok(match report.result {
            RemediationResult::Updated(root) => Arc::new(unit.with_root(root)),
            RemediationResult::Unchanged => Arc::clone(unit),
        })
    }

    fn remediate_units(
        &self,
        units: &[Arc<SourceUnit>],
        findings: &HashMap<UnitId, Vec<Finding>>,
        remediator: &dyn UnitRemediator,
        cancel: &CancellationToken,
    ) -> Result<Vec<UnitReport>, Cancelled> {
        let run = |unit: &Arc<SourceUnit>| {
            cancel.check()?;
            let for_unit = findings.get(&unit.id()).map_or(&[][..], Vec::as_slice);
            remediate_isolated(remediator, unit, for_unit, cancel)
        };
        if self.options.parallel {
            units.par_iter().map(run).collect()
        } else {
            units.iter().map(run).collect()
        }
    }
}

/// Run `remediator` on one unit, turning a panic into a failed report.
fn remediate_isolated(
    remediator: &dyn UnitRemediator,
    unit: &SourceUnit,
    findings: &[Finding],
    cancel: &CancellationToken,
) -> Result<UnitReport, Cancelled> {
    panic::catch_unwind(AssertUnwindSafe(|| remediator.remediate(unit, findings, cancel)))
        .unwrap_or_else(|payload| {
            let error = FixError::message(format!("fix panicked: {}", panic_message(&*payload)));
            warn!(
                unit = %unit.id(),
                path = %unit.path().display(),
                error = %error,
                "fix panicked, leaving unit unchanged"
            );
            let mut report = UnitReport::unchanged(unit.id(), findings.len());
            report.failure = Some(error);
            Ok(report)
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn group_findings(rule_id: &str, findings: &[Finding]) -> HashMap<UnitId, Vec<Finding>> {
    let mut grouped: HashMap<UnitId, Vec<Finding>> = HashMap::new();
    for finding in findings.iter().filter(|finding| finding.rule_id == rule_id) {
        grouped.entry(finding.unit_id).or_default().push(finding.clone());
    }
    grouped
}
