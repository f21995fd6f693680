use std::fmt;
use std::str::FromStr;

use crate::model::item::{Item, NodeId};

/// Error type for path addressing
#[derive(Debug, Clone, thiserror::Error)]
pub enum PathError {
    #[error("no item at path {0}")]
    NotFound(TreePath),
    #[error("a path must have at least one segment")]
    Empty,
    #[error("invalid path segment: {0}")]
    Parse(String),
}

/// A 1-based positional address from the root to a node: `1.2.3` selects the
/// third child of the second child of the first root item.
///
/// Paths are positional, not stable identifiers — any insertion or deletion
/// at an equal or shallower depth before the addressed index invalidates
/// them. Sessions re-derive paths from [`NodeId`]s after structural edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    pub fn new(segments: Vec<usize>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(bad) = segments.iter().find(|&&s| s == 0) {
            return Err(PathError::Parse(bad.to_string()));
        }
        Ok(TreePath(segments))
    }

    /// Path to the n-th root item (1-based).
    pub fn root(index: usize) -> Self {
        TreePath(vec![index.max(1)])
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Index of the addressed node within its parent array (1-based).
    pub fn last(&self) -> usize {
        *self.0.last().expect("paths are never empty")
    }

    /// Whether this path addresses a root-level item.
    pub fn is_root_level(&self) -> bool {
        self.0.len() == 1
    }

    /// Path of the containing node, or None at root level.
    pub fn parent(&self) -> Option<TreePath> {
        if self.is_root_level() {
            None
        } else {
            Some(TreePath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Path of the n-th child (1-based) of the addressed node.
    pub fn child(&self, index: usize) -> TreePath {
        let mut segments = self.0.clone();
        segments.push(index);
        TreePath(segments)
    }

    /// Same parent, different index.
    pub fn with_last(&self, index: usize) -> TreePath {
        let mut segments = self.0.clone();
        *segments.last_mut().expect("paths are never empty") = index;
        TreePath(segments)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{seg}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('.')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| PathError::Parse(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        TreePath::new(segments)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Walk `items` along `path` and return the addressed node, if every
/// intermediate segment resolves. Absent `children` arrays fail resolution
/// the same way an out-of-bounds index does.
pub fn resolve<'a>(items: &'a [Item], path: &TreePath) -> Option<&'a Item> {
    let mut current = items;
    let mut found = None;
    for &seg in path.segments() {
        let item = current.get(seg - 1)?;
        current = item.children();
        found = Some(item);
    }
    found
}

/// Mutable variant of [`resolve`]. Like the shared version this is pure:
/// it never materializes absent `children` arrays.
pub fn resolve_mut<'a>(items: &'a mut [Item], path: &TreePath) -> Option<&'a mut Item> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = items;
    for &seg in parents {
        current = current.get_mut(seg - 1)?.children.as_deref_mut()?;
    }
    current.get_mut(last - 1)
}

/// Return the array that directly contains the node addressed by `path`:
/// the root items array for root-level paths, otherwise the parent node's
/// `children`. Absent intermediate `children` arrays are healed to empty
/// (with a diagnostic) so legacy documents stay addressable.
pub fn parent_array_mut<'a>(
    items: &'a mut Vec<Item>,
    path: &TreePath,
) -> Result<&'a mut Vec<Item>, PathError> {
    let mut current = items;
    for &seg in &path.segments()[..path.len() - 1] {
        let item = current
            .get_mut(seg - 1)
            .ok_or_else(|| PathError::NotFound(path.clone()))?;
        current = item.children_mut();
    }
    Ok(current)
}

/// Derive the positional path of the node with the given runtime id, by
/// pre-order search.
pub fn path_of(items: &[Item], id: NodeId) -> Option<TreePath> {
    fn search(items: &[Item], id: NodeId, prefix: &mut Vec<usize>) -> Option<TreePath> {
        for (idx, item) in items.iter().enumerate() {
            prefix.push(idx + 1);
            if item.id == id {
                let path = TreePath(prefix.clone());
                prefix.pop();
                return Some(path);
            }
            if let Some(found) = search(item.children(), id, prefix) {
                prefix.pop();
                return Some(found);
            }
            prefix.pop();
        }
        None
    }
    if !id.is_assigned() {
        return None;
    }
    search(items, id, &mut Vec::new())
}

/// Visit every node in pre-order with its path.
pub fn for_each_with_path(items: &[Item], f: &mut dyn FnMut(&TreePath, &Item)) {
    fn walk(items: &[Item], prefix: &mut Vec<usize>, f: &mut dyn FnMut(&TreePath, &Item)) {
        for (idx, item) in items.iter().enumerate() {
            prefix.push(idx + 1);
            f(&TreePath(prefix.clone()), item);
            walk(item.children(), prefix, f);
            prefix.pop();
        }
    }
    walk(items, &mut Vec::new(), f);
}
