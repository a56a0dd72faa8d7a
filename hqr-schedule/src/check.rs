//! Full consistency check of a built schedule.

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::{Result, ScheduleError};
use crate::schedule::{EliminationKind, PivotSchedule};

fn violation(column: usize, reason: String) -> ScheduleError {
    ScheduleError::Invariant { column, reason }
}

impl PivotSchedule {
    /// Re-check every column: each live tile-row is eliminated exactly once,
    /// pivot pointers lead back to the panel tile without cycles, local merges
    /// stay on one process row, chains are consistent in both directions, and
    /// no merge runs before the merges it depends on.
    ///
    /// Columns are checked in parallel with the `parallel` feature.
    pub fn validate(&self) -> Result<()> {
        self.validate_columns()
    }

    #[cfg(feature = "parallel")]
    fn validate_columns(&self) -> Result<()> {
        (0..self.columns())
            .into_par_iter()
            .try_for_each(|k| self.validate_column(k))
    }

    #[cfg(not(feature = "parallel"))]
    fn validate_columns(&self) -> Result<()> {
        (0..self.columns()).try_for_each(|k| self.validate_column(k))
    }

    fn validate_column(&self, k: usize) -> Result<()> {
        let mt = self.grid.mt();
        let live = mt - k;

        // Coverage of [k, MT) by the canonical order.
        let mut seen = vec![false; live];
        for i in 0..self.active_elimination_count(k)? {
            let m = self.tile_at(k, i)?;
            if m < k || seen[m - k] {
                return Err(violation(k, format!("tile {m} listed twice or out of range")));
            }
            seen[m - k] = true;
            if self.index_of(k, m)? != i {
                return Err(violation(k, format!("tile {m} has inconsistent index")));
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(violation(k, format!("tile {} never eliminated", missing + k)));
        }
        if self.tile_at(k, 0)? != k || self.kind_of(k, k)? != EliminationKind::Panel {
            return Err(violation(k, "panel tile is not listed first".into()));
        }

        for m in k..mt {
            let node = self.node(k, m)?;
            if m == k {
                continue;
            }
            if !node.kind.is_merge() || node.pivot == m || node.pivot < k {
                return Err(violation(k, format!("tile {m} has an invalid pivot")));
            }

            // Pivot pointers must reach the panel tile without revisiting.
            let mut hops = 0;
            let mut cur = m;
            while cur != k {
                cur = self.pivot_of(k, cur)?;
                hops += 1;
                if hops > live {
                    return Err(violation(k, format!("pivot cycle through tile {m}")));
                }
            }

            let same_domain = self.partition.domain_of(m).map(|d| d.index)
                == self.partition.domain_of(node.pivot).map(|d| d.index);
            let expected_local = node.kind == EliminationKind::LocalMerge;
            if same_domain != expected_local {
                return Err(violation(
                    k,
                    format!("tile {m} merge kind does not match its domains"),
                ));
            }
            if expected_local && self.crosses_process(k, m)? {
                return Err(violation(k, format!("local merge of tile {m} leaves its process row")));
            }

            // Incoming merges must be done before `m` leaves the schedule.
            let mut incoming = self.first_in_chain(k, m)?;
            while let Some(src) = incoming {
                let src_node = self.node(k, src)?;
                let overlap = self.config.domino
                    && node.kind == EliminationKind::DomainMerge
                    && src_node.kind == EliminationKind::LocalMerge;
                let ordered = if overlap {
                    src_node.step <= node.step
                } else {
                    src_node.step < node.step
                };
                if !ordered {
                    return Err(violation(
                        k,
                        format!("tile {m} eliminated before tile {src} merged into it"),
                    ));
                }
                incoming = self.next_in_chain(k, m, src)?;
            }
        }

        // Chains: walk forward from every head, check back links and steps.
        let mut chained = 0;
        for p in k..mt {
            let mut prev: Option<usize> = None;
            let mut cur = self.first_in_chain(k, p)?;
            while let Some(m) = cur {
                if self.pivot_of(k, m)? != p || self.prev_in_chain(k, p, m)? != prev {
                    return Err(violation(k, format!("broken chain into tile {p} at {m}")));
                }
                if let Some(before) = prev {
                    if self.step_of(k, before)? >= self.step_of(k, m)? {
                        return Err(violation(k, format!("chain into tile {p} not step ordered")));
                    }
                }
                chained += 1;
                prev = Some(m);
                cur = self.next_in_chain(k, p, m)?;
            }
            if self.last_in_chain(k, p)? != prev {
                return Err(violation(k, format!("chain tail of tile {p} is stale")));
            }
        }
        if chained != live - 1 {
            return Err(violation(
                k,
                format!("chains hold {chained} tiles, expected {}", live - 1),
            ));
        }
        Ok(())
    }
}
