//! Printable per-column view of a schedule.

use std::fmt;

use crate::error::QueryResult;
use crate::schedule::{EliminationKind, EliminationNode, PivotSchedule};

/// Borrowed view of one column of a [`PivotSchedule`].
///
/// Printing it gives one line per active tile-row in canonical order:
///
/// ```text
/// column 0: 6 tiles, 4 steps
///   P    0 <-    0  step 0
///   L    1 <-    0  step 1
/// ...
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    schedule: &'a PivotSchedule,
    k: usize,
}

impl PivotSchedule {
    /// Display view of column `k`.
    pub fn column(&self, k: usize) -> QueryResult<ColumnView<'_>> {
        self.active_elimination_count(k)?;
        Ok(ColumnView { schedule: self, k })
    }
}

impl<'a> ColumnView<'a> {
    pub fn index(&self) -> usize {
        self.k
    }

    pub fn active_count(&self) -> usize {
        self.schedule.active_elimination_count(self.k).unwrap_or(0)
    }

    pub fn step_count(&self) -> usize {
        self.schedule.step_counts.get(self.k).copied().unwrap_or(0)
    }

    /// Nodes in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = EliminationNode> + 'a {
        let (schedule, k) = (self.schedule, self.k);
        schedule.nodes(k).into_iter().flatten()
    }

    /// Nodes running at global step `step`.
    pub fn nodes_at_step(&self, step: usize) -> impl Iterator<Item = EliminationNode> + 'a {
        self.nodes().filter(move |n| n.step == step)
    }

    /// Number of nodes of each kind: `(panel, local, domain)`.
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.nodes().fold((0, 0, 0), |(p, l, d), n| match n.kind {
            EliminationKind::Panel => (p + 1, l, d),
            EliminationKind::LocalMerge => (p, l + 1, d),
            EliminationKind::DomainMerge => (p, l, d + 1),
            EliminationKind::Inactive => (p, l, d),
        })
    }
}

impl fmt::Display for ColumnView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "column {}: {} tiles, {} steps",
            self.k,
            self.active_count(),
            self.step_count()
        )?;
        for node in self.nodes() {
            writeln!(
                f,
                "  {} {:>4} <- {:>4}  step {}",
                node.kind.letter(),
                node.tile,
                node.pivot,
                node.step
            )?;
        }
        Ok(())
    }
}
