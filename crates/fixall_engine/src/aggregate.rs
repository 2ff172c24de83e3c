//! Folding per-unit results back into one workspace snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use fixall_diagnostics::UnitId;
use fixall_syntax::SyntaxNode;

use crate::model::{Project, ProjectId, Workspace};
use crate::remediate::RemediationResult;

/// Which units a pass may substitute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Containment {
    /// Only this unit.
    Unit(UnitId),
    /// Only units of this project.
    Project(ProjectId),
    /// Any unit.
    Workspace,
}

impl Containment {
    fn admits_project(self, workspace: &Workspace, project: ProjectId) -> bool {
        match self {
            Containment::Workspace => true,
            Containment::Project(id) => id == project,
            Containment::Unit(unit) => workspace
                .unit(unit)
                .is_some_and(|unit| unit.project() == project),
        }
    }

    fn admits_unit(self, unit: UnitId) -> bool {
        match self {
            Containment::Unit(id) => id == unit,
            Containment::Project(_) | Containment::Workspace => true,
        }
    }
}

pub struct SnapshotAggregator;

impl SnapshotAggregator {
    /// Build the snapshot that results from substituting every updated unit.
    ///
    /// Units without an update, and units outside `containment`, are carried
    /// over by reference; so is every project without a substituted unit.
    /// If nothing is substituted the input snapshot itself is returned. The
    /// order of `results` does not matter.
    pub fn aggregate(
        workspace: &Arc<Workspace>,
        containment: Containment,
        results: impl IntoIterator<Item = (UnitId, RemediationResult)>,
    ) -> Arc<Workspace> {
        let updates: HashMap<UnitId, SyntaxNode> = results
            .into_iter()
            .filter(|(unit, _)| containment.admits_unit(*unit))
            .filter_map(|(unit, result)| match result {
                RemediationResult::Updated(root) => Some((unit, root)),
                RemediationResult::Unchanged => None,
            })
            .collect();
        if updates.is_empty() {
            return Arc::clone(workspace);
        }

        let mut changed = false;
        let projects: Vec<Arc<Project>> = workspace
            .projects()
            .iter()
            .map(|project| {
                if !containment.admits_project(workspace, project.id()) {
                    return Arc::clone(project);
                }
                match fold_project(project, &updates) {
                    Some(folded) => {
                        changed = true;
                        Arc::new(folded)
                    }
                    None => Arc::clone(project),
                }
            })
            .collect();

        if changed {
            Arc::new(workspace.with_projects(projects))
        } else {
            Arc::clone(workspace)
        }
    }
}

fn fold_project(project: &Project, updates: &HashMap<UnitId, SyntaxNode>) -> Option<Project> {
    if !project.units().iter().any(|unit| updates.contains_key(&unit.id())) {
        return None;
    }
    let units = project
        .units()
        .iter()
        .map(|unit| match updates.get(&unit.id()) {
            Some(root) => Arc::new(unit.with_root(root.clone())),
            None => Arc::clone(unit),
        })
        .collect();
    Some(project.with_units(units))
}
