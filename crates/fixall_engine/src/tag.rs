//! Pass-scoped identity tags for nodes.
//!
//! A tag names one node of one tree for the duration of a remediation pass.
//! Tags live in a side table next to the tree (tag to path and back) rather
//! than inside it, so tagging leaves the tree untouched and dropping the
//! tracker is all it takes to strip every tag from the result.

use std::collections::HashMap;

use fixall_syntax::{NodePath, SyntaxNode, replace_paths};

/// An opaque marker attached to exactly one node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StableTag(u32);

/// Side table of the tags handed out in one pass.
#[derive(Debug, Default)]
pub struct StableTagTracker {
    paths: Vec<NodePath>,
    tags: HashMap<NodePath, StableTag>,
}

impl StableTagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the node at `path`. Tagging the same node twice returns the tag
    /// it already carries.
    pub fn tag(&mut self, path: NodePath) -> StableTag {
        if let Some(tag) = self.tags.get(&path) {
            return *tag;
        }
        let tag = StableTag(u32::try_from(self.paths.len()).expect("too many tags in one pass"));
        self.paths.push(path.clone());
        self.tags.insert(path, tag);
        tag
    }

    /// Where the node carrying `tag` is.
    pub fn resolve(&self, tag: StableTag) -> Option<&NodePath> {
        self.paths.get(tag.0 as usize)
    }

    /// The tag carried by the node at `path`, if any.
    pub fn tag_at(&self, path: &NodePath) -> Option<StableTag> {
        self.tags.get(path).copied()
    }

    /// All tags in the order they were handed out.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (StableTag, &NodePath)> + '_ {
        self.paths
            .iter()
            .enumerate()
            .map(|(index, path)| (StableTag(index as u32), path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A tree together with the tags attached to its nodes in this pass.
#[derive(Debug)]
pub struct TaggedTree {
    root: SyntaxNode,
    tracker: StableTagTracker,
}

impl TaggedTree {
    /// Tag every node at `targets` in one step.
    ///
    /// The paths must come from `root` itself. Since tagging does not touch
    /// the tree, none of them can be invalidated by tagging another one.
    pub fn tag_all(root: &SyntaxNode, targets: impl IntoIterator<Item = NodePath>) -> Self {
        let mut tracker = StableTagTracker::new();
        for path in targets {
            tracker.tag(path);
        }
        Self {
            root: root.clone(),
            tracker,
        }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn tracker(&self) -> &StableTagTracker {
        &self.tracker
    }

    /// Look every tagged node up again by its tag.
    pub fn tagged_nodes(&self) -> Vec<(StableTag, SyntaxNode)> {
        self.tracker
            .iter()
            .filter_map(|(tag, path)| Some((tag, path.resolve(&self.root)?)))
            .collect()
    }

    /// Rewrite every tagged node in one combined edit and drop the tags.
    ///
    /// `replace` receives each tagged node (with any tagged descendants
    /// already rewritten) and returns its replacement.
    pub fn rewrite<E, F>(self, mut replace: F) -> Result<SyntaxNode, E>
    where
        F: FnMut(StableTag, &SyntaxNode) -> Result<SyntaxNode, E>,
    {
        let Self { root, tracker } = self;
        replace_paths(&root, &tracker.paths, |path, node| {
            match tracker.tag_at(path) {
                Some(tag) => replace(tag, node),
                None => Ok(node.clone()),
            }
        })
    }
}
