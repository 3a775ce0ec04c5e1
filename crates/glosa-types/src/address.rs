use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a node in the translation tree, resolved on demand.
///
/// An address is the chain of child ordinals leading from the implicit root
/// down to the node: the root is the empty chain, a main word is a chain of
/// length one. The parent address is the chain without its last ordinal, so a
/// node never needs to store a pointer to its parent.
///
/// Addresses are not stable handles. Any insert, remove or move in the child
/// list of one of the ancestors shifts the ordinals of later siblings, so a
/// holder must re-resolve after every mutation it did not make itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddress(Vec<usize>);

impl NodeAddress {
    /// Address of the implicit root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Address of a main word, i.e. a direct child of the root.
    pub fn main_word(row: usize) -> Self {
        Self(vec![row])
    }

    pub fn from_path(path: Vec<usize>) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_main_word(&self) -> bool {
        self.0.len() == 1
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Ordinal within the parent, `None` for the root.
    pub fn row(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, row: usize) -> Self {
        let mut path = self.0.clone();
        path.push(row);
        Self(path)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Next sibling address (may not resolve).
    pub fn next_sibling(&self) -> Option<Self> {
        let row = self.row()?;
        let mut path = self.0.clone();
        *path.last_mut()? = row + 1;
        Some(Self(path))
    }

    /// Address of the main word this node belongs to.
    pub fn main_word_of(&self) -> Option<Self> {
        self.0.first().map(|row| Self(vec![*row]))
    }

    /// True if `other` lies strictly inside the subtree rooted here.
    pub fn is_ancestor_of(&self, other: &NodeAddress) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    /// Rewrites this address as it reads after the node at `removed` has been
    /// unlinked from its parent. Returns `None` if this address pointed into
    /// the removed subtree.
    pub fn after_removal(&self, removed: &NodeAddress) -> Option<Self> {
        if removed == self || removed.is_ancestor_of(self) {
            return None;
        }
        let (Some(removed_row), Some(removed_parent)) = (removed.row(), removed.parent()) else {
            return Some(self.clone());
        };
        let level = removed_parent.depth();
        if self.0.len() > level && self.0.starts_with(removed_parent.path()) && self.0[level] > removed_row {
            let mut path = self.0.clone();
            path[level] -= 1;
            return Some(Self(path));
        }
        Some(self.clone())
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for row in &self.0 {
            write!(f, "/{row}")?;
        }
        Ok(())
    }
}
