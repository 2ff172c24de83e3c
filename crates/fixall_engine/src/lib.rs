//! Batch remediation of lint findings across a file, a project or a whole
//! workspace.
//!
//! A pass resolves its scope to units, hands each unit and its findings to a
//! [`UnitRemediator`], and folds the per-unit results into a new immutable
//! [`Workspace`] snapshot. Units never see each other, so they are fixed in
//! parallel.

mod aggregate;
mod cache;
mod cancel;
mod engine;
mod error;
mod model;
mod remediate;
mod scope;
mod tag;

pub use aggregate::{Containment, SnapshotAggregator};
pub use cache::AnalysisCache;
pub use cancel::CancellationToken;
pub use engine::{EngineOptions, FixAllEngine, FixAllOutcome, FixAllRequest, FixAllStatus};
pub use error::{Cancelled, FixError};
pub use model::{Project, ProjectId, SnapshotId, SourceUnit, Workspace, WorkspaceBuilder, WorkspaceId};
pub use remediate::{
    BatchedTagRemediator, IndependentRemediator, RemediationResult, UnitRemediator, UnitReport,
};
pub use scope::{Resolution, Scope, ScopeResolver};
pub use tag::{StableTag, StableTagTracker, TaggedTree};
