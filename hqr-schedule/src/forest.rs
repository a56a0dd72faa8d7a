//! Reduction trees mapped onto tile-row indices.

use hqr_tree::{ReductionTree, TreeTopology};
use smallvec::SmallVec;

/// Leaf list of a reduction tree; domains and root sets are usually small.
pub(crate) type Leaves = SmallVec<[usize; 8]>;

/// One elimination expressed in tile-rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileMerge {
    /// Round of the merge inside its own tree (1-based).
    pub level: usize,
    /// Tile-row that survives and accumulates the result.
    pub pivot: usize,
    /// Tile-row that is eliminated.
    pub tile: usize,
}

/// A [`ReductionTree`] whose leaf positions are bound to tile-rows.
///
/// `leaves[0]` is the root; the remaining leaves keep the order the tree was
/// built over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafTree {
    leaves: Leaves,
    tree: ReductionTree,
}

impl LeafTree {
    pub(crate) fn new(leaves: Leaves, topology: TreeTopology) -> Self {
        let tree = topology.build(leaves.len());
        LeafTree { leaves, tree }
    }

    /// Tile-rows in leaf order.
    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    /// Surviving tile-row, `None` when the tree has no leaves.
    pub fn root(&self) -> Option<usize> {
        self.leaves.first().copied()
    }

    pub fn tree(&self) -> &ReductionTree {
        &self.tree
    }

    /// Merges in execution order, translated to tile-rows.
    pub fn merges(&self) -> impl Iterator<Item = TileMerge> + '_ {
        self.tree.merges().iter().map(|m| TileMerge {
            level: m.level,
            pivot: self.leaves[m.survivor],
            tile: self.leaves[m.victim],
        })
    }
}
