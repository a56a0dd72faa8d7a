//! Reduction trees over an ordered list of leaves.
//!
//! A [`ReductionTree`] is expressed entirely in leaf *positions* `0..n`;
//! callers map positions to tile indices. Position 0 is always the root.

/// One elimination inside a reduction tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Merge {
    /// Round in which the merge runs (1-based).
    pub level: usize,
    /// Leaf position that survives and accumulates the result.
    pub survivor: usize,
    /// Leaf position that is eliminated.
    pub victim: usize,
}

/// Reduction tree produced by a [`TreeTopology`](crate::TreeTopology).
///
/// Merges are stored in a total order sorted by level (ties by survivor
/// position). Every non-root position is a victim exactly once, and a position
/// only acts as survivor at levels strictly below the one where it is itself
/// eliminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionTree {
    merges: Vec<Merge>,
    parent: Vec<Option<usize>>,
    depth: Vec<usize>,
    levels: usize,
}

impl ReductionTree {
    pub(crate) fn from_merges(n: usize, mut merges: Vec<Merge>) -> Self {
        merges.sort_by_key(|m| (m.level, m.survivor));

        let mut parent = vec![None; n];
        for m in &merges {
            parent[m.victim] = Some(m.survivor);
        }

        // A survivor is eliminated at a later level than every merge it
        // receives, so walking backwards always sees the survivor's depth first.
        let mut depth = vec![0usize; n];
        for m in merges.iter().rev() {
            depth[m.victim] = depth[m.survivor] + 1;
        }

        let levels = merges.last().map_or(0, |m| m.level);
        ReductionTree {
            merges,
            parent,
            depth,
            levels,
        }
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the tree has no leaves at all.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root position (always 0), or `None` for an empty tree.
    pub fn root(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// All merges in execution order.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Merges running in round `level`.
    pub fn merges_at(&self, level: usize) -> impl Iterator<Item = &Merge> + '_ {
        self.merges.iter().filter(move |m| m.level == level)
    }

    /// Number of rounds needed to reduce every leaf into the root.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Immediate parent of leaf `i` (`None` for the root).
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parent[i]
    }

    /// Number of hops from leaf `i` to the root.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn depth(&self, i: usize) -> usize {
        self.depth[i]
    }

    /// Largest depth over all leaves.
    pub fn height(&self) -> usize {
        self.depth.iter().copied().max().unwrap_or(0)
    }
}
