//! Mapping a requested scope to the units it covers.

use std::sync::Arc;

use fixall_diagnostics::UnitId;

use crate::model::{SourceUnit, Workspace};

/// Breadth of source considered in one remediation pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, is_macro::Is)]
pub enum Scope {
    /// Only the unit the request originates from.
    SingleUnit,
    /// Every unit of the origin unit's project.
    Project,
    /// Every unit of every project.
    Workspace,
    /// Host-defined unit selections; not supported by this engine.
    Custom,
}

/// The units a scope resolves to.
#[derive(Clone, Debug, is_macro::Is)]
pub enum Resolution {
    Units(Vec<Arc<SourceUnit>>),
    Unsupported,
}

pub struct ScopeResolver;

impl ScopeResolver {
    /// Resolve `scope` around `origin`.
    ///
    /// Units come back in declared order: project order, then unit order.
    /// An origin that is not part of `workspace` resolves to no units.
    pub fn resolve(scope: Scope, workspace: &Workspace, origin: UnitId) -> Resolution {
        let units = match scope {
            Scope::Custom => return Resolution::Unsupported,
            Scope::Workspace => workspace.units().cloned().collect(),
            Scope::SingleUnit => workspace.unit(origin).cloned().into_iter().collect(),
            Scope::Project => workspace
                .unit(origin)
                .and_then(|unit| workspace.project(unit.project()))
                .map(|project| project.units().to_vec())
                .unwrap_or_default(),
        };
        Resolution::Units(units)
    }
}
