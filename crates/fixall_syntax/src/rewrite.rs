use crate::{NodePath, SyntaxElement, SyntaxNode};

/// Rebuilds `root` in a single bottom-up pass, replacing the node at every
/// path in `targets` with the result of `replace`.
///
/// Paths are interpreted against `root` as given; no replacement can shift
/// another target because positions are never consulted. When one target
/// contains another, the inner one is replaced first and the outer one is
/// handed its already rewritten subtree. Paths that do not lead to a node are
/// ignored. Subtrees without targets are shared with `root`, and if nothing
/// changes the returned node is `root` itself.
pub fn replace_paths<E, F>(
    root: &SyntaxNode,
    targets: &[NodePath],
    mut replace: F,
) -> Result<SyntaxNode, E>
where
    F: FnMut(&NodePath, &SyntaxNode) -> Result<SyntaxNode, E>,
{
    let mut sorted: Vec<&NodePath> = targets.iter().collect();
    sorted.sort();
    sorted.dedup();
    rebuild(root, &NodePath::root(), &sorted, &mut replace)
}

fn rebuild<E, F>(
    node: &SyntaxNode,
    path: &NodePath,
    targets: &[&NodePath],
    replace: &mut F,
) -> Result<SyntaxNode, E>
where
    F: FnMut(&NodePath, &SyntaxNode) -> Result<SyntaxNode, E>,
{
    let depth = path.depth();
    // Sorted order puts `path` itself ahead of its descendants.
    let (is_target, mut remaining) = match targets.split_first() {
        Some((first, rest)) if first.depth() == depth => (true, rest),
        _ => (false, targets),
    };

    let mut children: Option<Vec<SyntaxElement>> = None;
    while let Some(first) = remaining.first() {
        let index = first.indices()[depth];
        let split = remaining
            .iter()
            .position(|target| target.indices()[depth] != index)
            .unwrap_or(remaining.len());
        let (group, rest) = remaining.split_at(split);
        remaining = rest;

        let Some(SyntaxElement::Node(child)) = node.children().get(index) else {
            continue;
        };
        let rewritten = rebuild(child, &path.child(index), group, replace)?;
        if !rewritten.ptr_eq(child) {
            children.get_or_insert_with(|| node.children().to_vec())[index] = rewritten.into();
        }
    }

    let rebuilt = match children {
        Some(children) => node.with_children(children),
        None => node.clone(),
    };

    if is_target {
        replace(path, &rebuilt)
    } else {
        Ok(rebuilt)
    }
}
