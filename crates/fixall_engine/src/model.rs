//! Immutable snapshots: source units, projects and workspaces.
//!
//! Nothing here is ever mutated after construction. Producing an updated
//! snapshot always means building a new value that shares every untouched
//! unit and project with the old one through `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fixall_diagnostics::UnitId;
use fixall_syntax::SyntaxNode;

static NEXT_WORKSPACE_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId(u32);

impl ProjectId {
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project#{}", self.0)
    }
}

/// Identity of a workspace lineage: every snapshot derived from a workspace
/// keeps its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkspaceId(u64);

/// Identity of one particular workspace snapshot, unique for the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        Self(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One parsed source file.
#[derive(Debug)]
pub struct SourceUnit {
    id: UnitId,
    project: ProjectId,
    path: PathBuf,
    text: Arc<str>,
    root: SyntaxNode,
}

impl SourceUnit {
    fn new(id: UnitId, project: ProjectId, path: PathBuf, root: SyntaxNode) -> Self {
        Self {
            id,
            project,
            path,
            text: root.text().into(),
            root,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// The same unit (id, path, project) over a different tree.
    #[must_use]
    pub fn with_root(&self, root: SyntaxNode) -> Self {
        Self::new(self.id, self.project, self.path.clone(), root)
    }
}

/// An ordered collection of units analysed together.
#[derive(Debug)]
pub struct Project {
    id: ProjectId,
    name: String,
    units: Vec<Arc<SourceUnit>>,
}

impl Project {
    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units in declared order.
    pub fn units(&self) -> &[Arc<SourceUnit>] {
        &self.units
    }

    /// The same project with a different unit list.
    #[must_use]
    pub fn with_units(&self, units: Vec<Arc<SourceUnit>>) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            units,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct UnitLocation {
    project: usize,
    unit: usize,
}

/// A complete, immutable snapshot of all projects.
#[derive(Debug)]
pub struct Workspace {
    id: WorkspaceId,
    snapshot: SnapshotId,
    projects: Vec<Arc<Project>>,
    // Units never move between snapshots of one lineage, so the index is
    // shared by all of them.
    index: Arc<HashMap<UnitId, UnitLocation>>,
}

impl Workspace {
    pub fn builder() -> WorkspaceBuilder {
        WorkspaceBuilder::default()
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    /// Projects in declared order.
    pub fn projects(&self) -> &[Arc<Project>] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Arc<Project>> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// All units, project order then unit order.
    pub fn units(&self) -> impl Iterator<Item = &Arc<SourceUnit>> + '_ {
        self.projects.iter().flat_map(|project| project.units.iter())
    }

    pub fn unit(&self, id: UnitId) -> Option<&Arc<SourceUnit>> {
        let location = self.index.get(&id)?;
        self.projects
            .get(location.project)?
            .units
            .get(location.unit)
    }

    pub fn unit_count(&self) -> usize {
        self.index.len()
    }

    /// A new snapshot of the same workspace with `projects` substituted.
    ///
    /// # Panics
    ///
    /// Panics if the project or unit layout differs from `self`; a snapshot
    /// may only substitute units, never add, remove or move them.
    #[must_use]
    pub fn with_projects(&self, projects: Vec<Arc<Project>>) -> Self {
        assert_eq!(projects.len(), self.projects.len(), "project layout changed");
        for (old, new) in self.projects.iter().zip(&projects) {
            assert_eq!(old.id, new.id, "project order changed");
            assert_eq!(old.units.len(), new.units.len(), "unit layout changed");
        }
        Self {
            id: self.id,
            snapshot: SnapshotId::next(),
            projects,
            index: Arc::clone(&self.index),
        }
    }

    /// A new snapshot where one unit's tree is replaced. Returns `None` if
    /// the unit is not part of this workspace.
    #[must_use]
    pub fn with_unit_root(&self, id: UnitId, root: SyntaxNode) -> Option<Self> {
        let location = *self.index.get(&id)?;
        let mut projects = self.projects.clone();
        let project = Arc::clone(&projects[location.project]);
        let mut units = project.units.clone();
        units[location.unit] = Arc::new(units[location.unit].with_root(root));
        projects[location.project] = Arc::new(project.with_units(units));
        Some(self.with_projects(projects))
    }
}

/// Builds the first snapshot of a workspace.
#[derive(Debug, Default)]
pub struct WorkspaceBuilder {
    projects: Vec<(String, Vec<(UnitId, PathBuf, SyntaxNode)>)>,
    next_unit: u32,
}

impl WorkspaceBuilder {
    /// Declare a new project; projects keep declaration order.
    pub fn add_project(&mut self, name: impl Into<String>) -> ProjectId {
        let id = u32::try_from(self.projects.len()).expect("too many projects");
        self.projects.push((name.into(), Vec::new()));
        ProjectId(id)
    }

    /// Add a unit to `project`; units keep declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `project` was not returned by this builder.
    pub fn add_unit(
        &mut self,
        project: ProjectId,
        path: impl Into<PathBuf>,
        root: SyntaxNode,
    ) -> UnitId {
        let id = UnitId::new(self.next_unit);
        self.next_unit += 1;
        self.projects[project.0 as usize]
            .1
            .push((id, path.into(), root));
        id
    }

    pub fn build(self) -> Arc<Workspace> {
        let mut index = HashMap::new();
        let projects = self
            .projects
            .into_iter()
            .enumerate()
            .map(|(project_index, (name, units))| {
                let id = ProjectId(u32::try_from(project_index).expect("too many projects"));
                let units = units
                    .into_iter()
                    .enumerate()
                    .map(|(unit_index, (unit_id, path, root))| {
                        index.insert(
                            unit_id,
                            UnitLocation {
                                project: project_index,
                                unit: unit_index,
                            },
                        );
                        Arc::new(SourceUnit::new(unit_id, id, path, root))
                    })
                    .collect();
                Arc::new(Project { id, name, units })
            })
            .collect();

        Arc::new(Workspace {
            id: WorkspaceId(NEXT_WORKSPACE_ID.fetch_add(1, Ordering::Relaxed)),
            snapshot: SnapshotId::next(),
            projects,
            index: Arc::new(index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> SyntaxNode {
        SyntaxNode::leaf("program", text)
    }

    #[test]
    fn test_builder_keeps_declared_order() {
        let mut builder = Workspace::builder();
        let app = builder.add_project("app");
        let lib = builder.add_project("lib");
        let a = builder.add_unit(lib, "lib/A.java", leaf("a"));
        let b = builder.add_unit(app, "app/B.java", leaf("b"));
        let c = builder.add_unit(app, "app/C.java", leaf("c"));
        let workspace = builder.build();

        let order: Vec<_> = workspace.units().map(|unit| unit.id()).collect();
        assert_eq!(order, vec![b, c, a]);
        assert_eq!(workspace.unit(a).unwrap().project(), lib);
        assert_eq!(workspace.unit(c).unwrap().text(), "c");
        assert_eq!(workspace.unit_count(), 3);
        assert_eq!(workspace.project(app).unwrap().name(), "app");
    }

    #[test]
    fn test_with_unit_root_shares_untouched_values() {
        let mut builder = Workspace::builder();
        let app = builder.add_project("app");
        let lib = builder.add_project("lib");
        let a = builder.add_unit(app, "A.java", leaf("a"));
        let b = builder.add_unit(app, "B.java", leaf("b"));
        builder.add_unit(lib, "C.java", leaf("c"));
        let workspace = builder.build();

        let updated = workspace.with_unit_root(a, leaf("z")).unwrap();
        assert_eq!(updated.id(), workspace.id());
        assert_ne!(updated.snapshot(), workspace.snapshot());
        assert_eq!(updated.unit(a).unwrap().text(), "z");
        assert_eq!(workspace.unit(a).unwrap().text(), "a");
        assert!(Arc::ptr_eq(
            updated.unit(b).unwrap(),
            workspace.unit(b).unwrap()
        ));
        assert!(Arc::ptr_eq(
            updated.project(lib).unwrap(),
            workspace.project(lib).unwrap()
        ));
    }

    #[test]
    fn test_with_unit_root_unknown_unit() {
        let workspace = Workspace::builder().build();
        assert!(workspace.with_unit_root(UnitId::new(9), leaf("x")).is_none());
    }
}
