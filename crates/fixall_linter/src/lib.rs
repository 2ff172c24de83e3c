//! Java lint rules whose fixes run through the batch remediation engine.

pub mod registry;
pub mod rules;

pub use registry::{FromConfig, Properties, RuleRegistry};

use std::sync::Arc;

use fixall_diagnostics::{Finding, FixStrategy, UnitId};
use fixall_engine::{
    AnalysisCache, BatchedTagRemediator, CancellationToken, FixAllEngine, FixAllOutcome,
    FixAllRequest, FixError, IndependentRemediator, Scope, SourceUnit, UnitRemediator, Workspace,
    WorkspaceId,
};
use fixall_source_file::{LineIndex, SourceCode};
use fixall_syntax::{NodeRef, SyntaxNode, TreeWalker};
use fixall_text_size::TextRange;
use rayon::prelude::*;
use tracing::debug;

/// Context provided to rules while checking one unit.
pub struct CheckContext<'a> {
    unit: &'a SourceUnit,
    line_index: LineIndex,
}

impl<'a> CheckContext<'a> {
    pub fn new(unit: &'a SourceUnit) -> Self {
        Self {
            unit,
            line_index: LineIndex::from_source_text(unit.text()),
        }
    }

    pub fn unit_id(&self) -> UnitId {
        self.unit.id()
    }

    /// Get the source text.
    pub fn source(&self) -> &'a str {
        self.unit.text()
    }

    /// Get the cached line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Get the source code helper for line/column info.
    pub fn source_code(&self) -> SourceCode<'a, '_> {
        SourceCode::new(self.unit.text(), &self.line_index)
    }

    /// Get text at a given range.
    pub fn text_at(&self, range: TextRange) -> &'a str {
        &self.unit.text()[range]
    }
}

/// Per-node replacement used by batched fixes.
pub type ReplaceFn = Box<dyn Fn(&SyntaxNode) -> Result<SyntaxNode, FixError> + Send + Sync>;

/// Whole-unit rebuild used by independent fixes.
pub type FixUnitFn = Box<dyn Fn(&SourceUnit, &[Finding]) -> Result<SyntaxNode, FixError> + Send + Sync>;

/// How a rule repairs its findings.
pub enum RuleFix {
    Batched(ReplaceFn),
    Independent(FixUnitFn),
}

impl RuleFix {
    pub fn strategy(&self) -> FixStrategy {
        match self {
            RuleFix::Batched(_) => FixStrategy::BatchedTag,
            RuleFix::Independent(_) => FixStrategy::Independent,
        }
    }

    /// The engine-side remediator applying this fix.
    pub fn into_remediator(self) -> Box<dyn UnitRemediator> {
        match self {
            RuleFix::Batched(replace) => Box::new(BatchedTagRemediator::new(replace)),
            RuleFix::Independent(fix_unit) => Box::new(IndependentRemediator::new(fix_unit)),
        }
    }
}

/// Trait for lint rules.
pub trait Rule: Send + Sync {
    /// The rule's name, also the `rule_id` of its findings.
    fn name(&self) -> &'static str;

    /// Node kinds this rule cares about. Empty means run on all nodes.
    fn relevant_kinds(&self) -> &'static [&'static str] {
        &[]
    }

    /// Check a node for violations.
    fn check(&self, ctx: &CheckContext, node: &NodeRef) -> Vec<Finding>;

    /// The fix for this rule's findings, if it has one.
    fn fix(&self) -> Option<RuleFix> {
        None
    }

    fn fix_strategy(&self) -> Option<FixStrategy> {
        self.fix().map(|fix| fix.strategy())
    }
}

/// The remediator for `rule`, if the rule can fix its findings.
pub fn remediator_for(rule: &dyn Rule) -> Option<Box<dyn UnitRemediator>> {
    rule.fix().map(RuleFix::into_remediator)
}

/// Run `rules` over one unit, walking its tree once.
///
/// Findings come back sorted by position.
pub fn lint_unit(unit: &SourceUnit, rules: &[Box<dyn Rule>]) -> Vec<Finding> {
    let ctx = CheckContext::new(unit);
    let mut findings = Vec::new();
    for node in TreeWalker::new(unit.root()) {
        for rule in rules {
            let kinds = rule.relevant_kinds();
            if kinds.is_empty() || kinds.contains(&node.kind()) {
                findings.extend(rule.check(&ctx, &node));
            }
        }
    }
    findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    findings
}

/// Run `rules` over every unit of `workspace` in parallel.
pub fn lint_workspace(workspace: &Workspace, rules: &[Box<dyn Rule>]) -> Vec<Finding> {
    let units: Vec<&Arc<SourceUnit>> = workspace.units().collect();
    units
        .par_iter()
        .flat_map_iter(|unit| lint_unit(unit, rules))
        .collect()
}

/// A configured rule set plus the findings it produced per snapshot.
pub struct Linter {
    rules: Vec<Box<dyn Rule>>,
    findings: AnalysisCache<Vec<Finding>>,
}

impl Linter {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            findings: AnalysisCache::new(),
        }
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|rule| rule.name() == name)
            .map(|rule| &**rule)
    }

    /// All findings for the current snapshot of `workspace`, linted at most
    /// once per snapshot.
    pub fn findings(&self, workspace: &Workspace) -> Arc<Vec<Finding>> {
        self.findings
            .get_or_compute(workspace, |workspace| lint_workspace(workspace, &self.rules))
    }

    /// Forget cached findings for a workspace that is no longer in use.
    pub fn invalidate(&self, workspace: WorkspaceId) {
        self.findings.invalidate(workspace);
    }

    /// Fix every finding of `rule_name` within `scope` around `origin`.
    ///
    /// Returns `None` when no such rule is configured or the rule has no fix.
    pub fn fix_rule(
        &self,
        engine: &FixAllEngine,
        workspace: &Arc<Workspace>,
        rule_name: &str,
        scope: Scope,
        origin: UnitId,
        cancel: &CancellationToken,
    ) -> Option<FixAllOutcome> {
        let rule = self.rule(rule_name)?;
        let Some(remediator) = remediator_for(rule) else {
            debug!(rule = rule_name, "rule has no fix, skipping");
            return None;
        };
        let findings = self.findings(workspace);
        let request = FixAllRequest {
            scope,
            origin,
            rule_id: rule_name.to_string(),
            findings: findings
                .iter()
                .filter(|finding| finding.rule_id == rule_name)
                .cloned()
                .collect(),
        };
        Some(engine.fix_all(workspace, &request, remediator.as_ref(), cancel))
    }
}
