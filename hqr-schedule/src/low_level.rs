//! Low-level (TS) forest: local reduction inside each domain.
//!
//! For column `k`, every domain with live tile-rows is reduced with the
//! low-level topology. The domain holding `k` is always rooted at `k`, the
//! panel tile. With round-robin roots, the other domains rotate their leaf
//! list by `k mod len`, so the surviving tile moves from column to column
//! while the tree shape stays the same.

use hqr_tree::TreeTopology;

use crate::domain::DomainPartition;
use crate::forest::{LeafTree, Leaves, TileMerge};

/// Local reduction of one domain at one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTree {
    /// Index of the domain in the partition.
    pub domain: usize,
    pub reduction: LeafTree,
}

impl DomainTree {
    /// Live tile-rows of the domain, in leaf order.
    pub fn leaves(&self) -> &[usize] {
        self.reduction.leaves()
    }

    /// Tile-row that survives the local reduction.
    pub fn root(&self) -> usize {
        self.reduction.leaves()[0]
    }

    /// LOCAL_MERGE eliminations of this domain, in execution order.
    pub fn merges(&self) -> impl Iterator<Item = TileMerge> + '_ {
        self.reduction.merges()
    }
}

/// Per-column local reduction trees, one per live domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowLevelForest {
    topology: TreeTopology,
    columns: Vec<Vec<DomainTree>>,
}

impl LowLevelForest {
    /// Build the forest for the first `columns` tile-columns.
    pub fn build(
        partition: &DomainPartition,
        columns: usize,
        topology: TreeTopology,
        round_robin_roots: bool,
    ) -> Self {
        let columns = (0..columns)
            .map(|k| {
                partition
                    .live(k)
                    .map(|domain| {
                        let mut leaves: Leaves = domain.live(k).collect();
                        if round_robin_roots && !domain.contains(k) {
                            let shift = k % leaves.len();
                            leaves.rotate_left(shift);
                        }
                        DomainTree {
                            domain: domain.index,
                            reduction: LeafTree::new(leaves, topology),
                        }
                    })
                    .collect()
            })
            .collect();
        LowLevelForest { topology, columns }
    }

    pub fn topology(&self) -> TreeTopology {
        self.topology
    }

    /// Number of columns covered.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Domain trees of column `k`, in domain order (empty past the last
    /// factorized column).
    pub fn column(&self, k: usize) -> &[DomainTree] {
        self.columns.get(k).map_or(&[][..], Vec::as_slice)
    }

    /// Domain roots of column `k`; the first one is `k`.
    pub fn roots(&self, k: usize) -> impl Iterator<Item = usize> + '_ {
        self.column(k).iter().map(DomainTree::root)
    }
}
