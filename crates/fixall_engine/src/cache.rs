//! Per-workspace memoization with explicit invalidation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::model::{SnapshotId, Workspace, WorkspaceId};

/// Caches one value per workspace, recomputed whenever it is asked for on a
/// snapshot other than the one it was computed from.
///
/// Entries are only ever removed by [`invalidate`](Self::invalidate) or
/// [`clear`](Self::clear); the owner decides when a workspace is gone.
#[derive(Debug)]
pub struct AnalysisCache<V> {
    entries: Mutex<HashMap<WorkspaceId, (SnapshotId, Arc<V>)>>,
}

impl<V> Default for AnalysisCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> AnalysisCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for `workspace`'s current snapshot, computing it on a miss.
    ///
    /// `compute` runs without the cache lock held, so two threads missing
    /// at the same time may both compute; the last one to finish is kept.
    pub fn get_or_compute(&self, workspace: &Workspace, compute: impl FnOnce(&Workspace) -> V) -> Arc<V> {
        if let Some(value) = self.get(workspace) {
            return value;
        }
        let value = Arc::new(compute(workspace));
        self.lock()
            .insert(workspace.id(), (workspace.snapshot(), Arc::clone(&value)));
        value
    }

    /// The cached value, if it was computed from this exact snapshot.
    pub fn get(&self, workspace: &Workspace) -> Option<Arc<V>> {
        self.lock()
            .get(&workspace.id())
            .filter(|(snapshot, _)| *snapshot == workspace.snapshot())
            .map(|(_, value)| Arc::clone(value))
    }

    pub fn invalidate(&self, workspace: WorkspaceId) {
        self.lock().remove(&workspace);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<WorkspaceId, (SnapshotId, Arc<V>)>> {
        // The map stays consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
