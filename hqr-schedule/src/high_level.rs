//! High-level (TT) forest: reduction across domain roots.
//!
//! The roots left by the [`LowLevelForest`] are grouped by process row into
//! the participants of the distributed tree. Roots sharing a participant are
//! first reduced with the group topology; the group leaders then meet in a
//! tree built with the high-level topology, which reduces everything into
//! the panel tile `k`.

use hqr_tree::TreeTopology;

use crate::domain::DomainPartition;
use crate::forest::{LeafTree, Leaves, TileMerge};
use crate::low_level::LowLevelForest;

/// Reduction of the domain roots of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTree {
    groups: Vec<LeafTree>,
    top: LeafTree,
}

impl RootTree {
    /// Per-participant trees, in process order.
    pub fn groups(&self) -> &[LeafTree] {
        &self.groups
    }

    /// Distributed tree over the group leaders.
    pub fn top(&self) -> &LeafTree {
        &self.top
    }

    /// Surviving tile-row, `None` when the column has no roots.
    pub fn root(&self) -> Option<usize> {
        self.top.root()
    }

    /// Rounds of the whole reduction: the deepest group, then the top tree.
    pub fn levels(&self) -> usize {
        self.group_levels() + self.top.tree().levels()
    }

    fn group_levels(&self) -> usize {
        self.groups.iter().map(|g| g.tree().levels()).max().unwrap_or(0)
    }

    /// Merges in execution order: every group, then the top tree with its
    /// levels shifted past the groups.
    pub fn merges(&self) -> impl Iterator<Item = TileMerge> + '_ {
        let offset = self.group_levels();
        self.groups
            .iter()
            .flat_map(LeafTree::merges)
            .chain(self.top.merges().map(move |m| TileMerge {
                level: m.level + offset,
                ..m
            }))
    }
}

/// Per-column trees over the domain roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighLevelForest {
    topology: TreeTopology,
    participants: usize,
    columns: Vec<RootTree>,
}

impl HighLevelForest {
    /// Build the forest over the roots of `low`.
    ///
    /// `participants` process-row groups (out of `process_rows`) take part in
    /// the `topology` tree; roots inside a group are reduced with
    /// `group_topology`.
    ///
    /// # Panics
    /// Panics if `participants == 0` or `participants > process_rows`.
    pub fn build(
        low: &LowLevelForest,
        partition: &DomainPartition,
        topology: TreeTopology,
        group_topology: TreeTopology,
        participants: usize,
        process_rows: usize,
    ) -> Self {
        assert!(
            participants > 0 && participants <= process_rows,
            "participants must be in 1..={process_rows}"
        );
        let columns = (0..low.len())
            .map(|k| {
                let mut groups: Vec<(usize, Leaves)> = Vec::new();
                for tree in low.column(k) {
                    let process = partition.domains()[tree.domain].process;
                    let group = process * participants / process_rows;
                    match groups.last_mut() {
                        Some((g, leaves)) if *g == group => leaves.push(tree.root()),
                        _ => groups.push((group, Leaves::from_elem(tree.root(), 1))),
                    }
                }
                let leaders: Leaves = groups.iter().map(|(_, leaves)| leaves[0]).collect();
                RootTree {
                    groups: groups
                        .into_iter()
                        .map(|(_, leaves)| LeafTree::new(leaves, group_topology))
                        .collect(),
                    top: LeafTree::new(leaders, topology),
                }
            })
            .collect();
        HighLevelForest {
            topology,
            participants,
            columns,
        }
    }

    pub fn topology(&self) -> TreeTopology {
        self.topology
    }

    /// Number of participants in the distributed tree.
    pub fn participants(&self) -> usize {
        self.participants
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Root tree of column `k`, `None` past the last factorized column.
    pub fn column(&self, k: usize) -> Option<&RootTree> {
        self.columns.get(k)
    }

    /// DOMAIN_MERGE eliminations of column `k`, in execution order.
    pub fn merges(&self, k: usize) -> impl Iterator<Item = TileMerge> + '_ {
        self.column(k).into_iter().flat_map(RootTree::merges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_over_flat_groups(
        part: &DomainPartition,
        participants: usize,
        process_rows: usize,
    ) -> HighLevelForest {
        let low = LowLevelForest::build(part, 1, TreeTopology::Flat, false);
        HighLevelForest::build(
            &low,
            part,
            TreeTopology::Binary,
            TreeTopology::Flat,
            participants,
            process_rows,
        )
    }

    fn pairs(high: &HighLevelForest, k: usize) -> Vec<(usize, usize, usize)> {
        high.merges(k).map(|m| (m.level, m.tile, m.pivot)).collect()
    }

    #[test]
    fn test_binary_over_four_domains() {
        // four process rows, one domain each
        let part = DomainPartition::new(8, 2, 2);
        let high = binary_over_flat_groups(&part, 4, 4);
        assert_eq!(pairs(&high, 0), vec![(1, 2, 0), (1, 6, 4), (2, 4, 0)]);
        assert_eq!(high.column(0).and_then(RootTree::root), Some(0));
        assert!(high.column(0).unwrap().groups().iter().all(|g| g.leaves().len() == 1));
    }

    #[test]
    fn test_roots_of_one_process_row_meet_first() {
        // two process rows of four tile-rows, two domains each
        let part = DomainPartition::new(8, 4, 2);
        let high = binary_over_flat_groups(&part, 2, 2);
        let col = high.column(0).unwrap();
        assert_eq!(col.groups().len(), 2);
        assert_eq!(col.top().leaves(), &[0, 4]);
        assert_eq!(pairs(&high, 0), vec![(1, 2, 0), (1, 6, 4), (2, 4, 0)]);
        assert_eq!(col.levels(), 2);
    }

    #[test]
    fn test_single_participant_uses_group_tree_only() {
        let part = DomainPartition::new(8, 2, 2);
        let high = binary_over_flat_groups(&part, 1, 4);
        let col = high.column(0).unwrap();
        assert_eq!(col.groups().len(), 1);
        assert!(col.top().tree().merges().is_empty());
        assert_eq!(pairs(&high, 0), vec![(1, 2, 0), (2, 4, 0), (3, 6, 0)]);
    }

    #[test]
    fn test_single_domain_has_no_domain_merges() {
        let part = DomainPartition::new(5, 5, 5);
        let low = LowLevelForest::build(&part, 3, TreeTopology::Greedy, false);
        let high =
            HighLevelForest::build(&low, &part, TreeTopology::Flat, TreeTopology::Greedy, 1, 1);
        assert_eq!(high.len(), 3);
        assert!((0..3).all(|k| high.merges(k).next().is_none()));
        assert!(high.column(3).is_none());
    }
}
