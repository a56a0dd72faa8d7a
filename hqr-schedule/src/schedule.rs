//! The query façade over a built hierarchical schedule.
//!
//! [`PivotSchedule`] flattens both forests into one arena indexed by
//! `(column, tile-row)`. Every slot records how the tile-row is eliminated at
//! that column, into which pivot, at which global step, and its neighbours in
//! the chain of tiles eliminated into the same pivot. All queries are pure
//! reads over this table.

use log::{debug, trace, warn};

use crate::config::ScheduleConfig;
use crate::domain::DomainPartition;
use crate::error::{QueryError, QueryResult, Result};
use crate::grid::TileGrid;
use crate::high_level::{HighLevelForest, RootTree};
use crate::low_level::{DomainTree, LowLevelForest};

/// How a tile-row takes part in the reduction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EliminationKind {
    /// Factorization of the diagonal tile `k`.
    Panel,
    /// Elimination into a tile of the same domain.
    LocalMerge,
    /// Elimination of a domain root into another domain's root.
    DomainMerge,
    /// Not part of the column (`m < k`, or `k` past the last factorized column).
    #[default]
    Inactive,
}

impl EliminationKind {
    pub fn is_active(self) -> bool {
        self != EliminationKind::Inactive
    }

    /// Whether the kind is one of the two-tile merge kernels.
    pub fn is_merge(self) -> bool {
        matches!(self, EliminationKind::LocalMerge | EliminationKind::DomainMerge)
    }

    /// One-letter tag used when printing schedules.
    pub fn letter(self) -> char {
        match self {
            EliminationKind::Panel => 'P',
            EliminationKind::LocalMerge => 'L',
            EliminationKind::DomainMerge => 'D',
            EliminationKind::Inactive => '.',
        }
    }
}

/// A single elimination of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EliminationNode {
    pub column: usize,
    pub tile: usize,
    pub step: usize,
    pub kind: EliminationKind,
    /// Tile receiving the elimination (`tile` itself for the panel).
    pub pivot: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Slot {
    pub(crate) kind: EliminationKind,
    pub(crate) pivot: usize,
    pub(crate) step: usize,
    /// Position in the column's canonical order.
    pub(crate) index: usize,
    /// Neighbours in the chain of tiles eliminated into `pivot`.
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
    /// First and last tile eliminated into this tile.
    pub(crate) head: Option<usize>,
    pub(crate) tail: Option<usize>,
}

/// Precomputed elimination schedule of a hierarchical tile QR/LU.
///
/// Built once per factorization shape and options, then shared read-only by
/// every driver task. The structure is `Send + Sync` and never mutated after
/// construction.
///
/// # Example
///
/// ```
/// use hqr_schedule::{DomainSize, EliminationKind, PivotSchedule, ScheduleConfig, TileGrid};
///
/// let grid = TileGrid::new(6, 3, 2, 1).unwrap();
/// let config = ScheduleConfig::default().with_domain_size(DomainSize::Fixed(3));
/// let schedule = PivotSchedule::new(grid, config).unwrap();
///
/// assert_eq!(schedule.active_elimination_count(0).unwrap(), 6);
/// assert_eq!(schedule.kind_of(0, 3).unwrap(), EliminationKind::DomainMerge);
/// assert_eq!(schedule.pivot_of(0, 5).unwrap(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PivotSchedule {
    pub(crate) grid: TileGrid,
    pub(crate) config: ScheduleConfig,
    pub(crate) partition: DomainPartition,
    pub(crate) low: LowLevelForest,
    pub(crate) high: HighLevelForest,
    /// `columns * MT` slots, indexed by `k * MT + m`.
    pub(crate) slots: Vec<Slot>,
    /// Canonical order of all columns back to back.
    pub(crate) order: Vec<usize>,
    /// Start of column `k` in `order`; `columns + 1` entries.
    pub(crate) order_offsets: Vec<usize>,
    pub(crate) step_counts: Vec<usize>,
}

impl PivotSchedule {
    /// Build the QR/LU schedule of `grid` with `config`.
    pub fn new(grid: TileGrid, config: ScheduleConfig) -> Result<Self> {
        let mt = grid.mt();
        let block = grid.rows_per_process();
        let mut domain_size = config.domain_size.resolve(&grid)?;
        if domain_size > block {
            warn!(
                "domain size {} exceeds {} tile-rows per process row, clamping",
                domain_size, block
            );
            domain_size = block;
        }
        let mut participants = config.high_level_size.resolve(&grid)?;
        if participants > grid.p() {
            warn!(
                "high-level tree size {} exceeds {} process rows, clamping",
                participants,
                grid.p()
            );
            participants = grid.p();
        }

        let columns = grid.min_mn();
        let partition = DomainPartition::new(mt, block, domain_size);
        let low = LowLevelForest::build(
            &partition,
            columns,
            config.low_level,
            config.round_robin_roots,
        );
        let high = HighLevelForest::build(
            &low,
            &partition,
            config.high_level,
            config.low_level,
            participants,
            grid.p(),
        );

        let mut builder = TableBuilder::new(mt, columns);
        for k in 0..columns {
            if let Some(roots) = high.column(k) {
                builder.push_column(k, low.column(k), roots, config.domino);
            }
            trace!(
                "column {}: {} active tiles, {} domains (deepest local tree {}), {} steps",
                k,
                mt - k,
                low.column(k).len(),
                low.column(k)
                    .iter()
                    .map(|d| d.reduction.tree().height())
                    .max()
                    .unwrap_or(0),
                builder.step_counts[k]
            );
        }

        debug!(
            "hierarchical schedule: {}x{} tiles on {}x{} processes, {} domains of {} rows, \
             {} participants, low={} high={} domino={} round_robin={}",
            mt,
            grid.nt(),
            grid.p(),
            grid.q(),
            partition.len(),
            domain_size,
            participants,
            config.low_level,
            config.high_level,
            config.domino,
            config.round_robin_roots
        );

        Ok(PivotSchedule {
            grid,
            config,
            partition,
            low,
            high,
            slots: builder.slots,
            order: builder.order,
            order_offsets: builder.order_offsets,
            step_counts: builder.step_counts,
        })
    }

    /// Build the LQ schedule of `grid`: the QR schedule of its transpose.
    pub fn new_lq(grid: TileGrid, config: ScheduleConfig) -> Result<Self> {
        Self::new(grid.transposed(), config)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn partition(&self) -> &DomainPartition {
        &self.partition
    }

    pub fn low_level(&self) -> &LowLevelForest {
        &self.low
    }

    pub fn high_level(&self) -> &HighLevelForest {
        &self.high
    }

    /// Number of factorized columns, `min(MT, NT)`.
    pub fn columns(&self) -> usize {
        self.step_counts.len()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of tile-rows taking part in column `k`.
    pub fn active_elimination_count(&self, k: usize) -> QueryResult<usize> {
        self.check_column(k)?;
        Ok(if k < self.columns() {
            self.grid.mt() - k
        } else {
            0
        })
    }

    /// The `i`-th tile-row of column `k` in canonical order: the panel tile,
    /// then local merges grouped by domain, then domain merges.
    pub fn tile_at(&self, k: usize, i: usize) -> QueryResult<usize> {
        let count = self.active_elimination_count(k)?;
        if i >= count {
            return Err(QueryError::IndexOutOfRange { k, i, count });
        }
        Ok(self.order[self.order_offsets[k] + i])
    }

    /// Position of `m` in column `k`'s canonical order.
    pub fn index_of(&self, k: usize, m: usize) -> QueryResult<usize> {
        Ok(self.active_slot(k, m)?.index)
    }

    /// Classification of tile-row `m` at column `k`.
    pub fn kind_of(&self, k: usize, m: usize) -> QueryResult<EliminationKind> {
        Ok(self.slot(k, m)?.map_or(EliminationKind::Inactive, |s| s.kind))
    }

    /// Tile `m` is eliminated into at column `k` (`k` itself for the panel).
    pub fn pivot_of(&self, k: usize, m: usize) -> QueryResult<usize> {
        Ok(self.active_slot(k, m)?.pivot)
    }

    /// Global step at which `m` is processed in column `k`.
    pub fn step_of(&self, k: usize, m: usize) -> QueryResult<usize> {
        Ok(self.active_slot(k, m)?.step)
    }

    /// Number of global steps of column `k`, the panel step included.
    pub fn step_count(&self, k: usize) -> QueryResult<usize> {
        self.check_column(k)?;
        Ok(self.step_counts.get(k).copied().unwrap_or(0))
    }

    /// Tile eliminated into `p` right after `m`, `None` at the end of the chain.
    ///
    /// The panel tile is its own pivot but belongs to no chain, so
    /// `next_in_chain(k, k, k)` is `None`.
    pub fn next_in_chain(&self, k: usize, p: usize, m: usize) -> QueryResult<Option<usize>> {
        Ok(self.chain_slot(k, p, m)?.and_then(|s| s.next))
    }

    /// Tile eliminated into `p` right before `m`, `None` at the start of the
    /// chain (and for the panel tile).
    pub fn prev_in_chain(&self, k: usize, p: usize, m: usize) -> QueryResult<Option<usize>> {
        Ok(self.chain_slot(k, p, m)?.and_then(|s| s.prev))
    }

    /// First tile eliminated into `p` at column `k`.
    pub fn first_in_chain(&self, k: usize, p: usize) -> QueryResult<Option<usize>> {
        Ok(self.active_slot(k, p)?.head)
    }

    /// Last tile eliminated into `p` at column `k`.
    pub fn last_in_chain(&self, k: usize, p: usize) -> QueryResult<Option<usize>> {
        Ok(self.active_slot(k, p)?.tail)
    }

    /// Full description of how `m` is processed at column `k`.
    pub fn node(&self, k: usize, m: usize) -> QueryResult<EliminationNode> {
        let slot = self.active_slot(k, m)?;
        Ok(EliminationNode {
            column: k,
            tile: m,
            step: slot.step,
            kind: slot.kind,
            pivot: slot.pivot,
        })
    }

    /// Every node of column `k`, in canonical order.
    pub fn nodes(&self, k: usize) -> QueryResult<impl Iterator<Item = EliminationNode> + '_> {
        let count = self.active_elimination_count(k)?;
        let start = self.order_offsets.get(k).copied().unwrap_or(0);
        let mt = self.grid.mt();
        Ok(self.order[start..start + count].iter().map(move |&m| {
            let slot = &self.slots[k * mt + m];
            EliminationNode {
                column: k,
                tile: m,
                step: slot.step,
                kind: slot.kind,
                pivot: slot.pivot,
            }
        }))
    }

    /// Whether eliminating `m` at column `k` moves data between process rows.
    pub fn crosses_process(&self, k: usize, m: usize) -> QueryResult<bool> {
        let pivot = self.pivot_of(k, m)?;
        Ok(self.grid.owner(m, k)?.0 != self.grid.owner(pivot, k)?.0)
    }

    // -----------------------------------------------------------------------
    // Slot lookup
    // -----------------------------------------------------------------------

    fn check_column(&self, k: usize) -> QueryResult<()> {
        if k >= self.grid.nt() {
            return Err(QueryError::ColumnOutOfRange {
                k,
                nt: self.grid.nt(),
            });
        }
        Ok(())
    }

    /// Slot of `(k, m)`, `None` when the tile is inactive.
    pub(crate) fn slot(&self, k: usize, m: usize) -> QueryResult<Option<&Slot>> {
        self.grid.check_tile(m, k)?;
        if k >= self.columns() || m < k {
            return Ok(None);
        }
        Ok(Some(&self.slots[k * self.grid.mt() + m]))
    }

    fn active_slot(&self, k: usize, m: usize) -> QueryResult<&Slot> {
        self.slot(k, m)?.ok_or(QueryError::InactiveTile { k, m })
    }

    /// Chain slot of `m` in the chain into `p`; `None` for the panel triple
    /// `(k, k, k)`, which matches `pivot_of` but starts no chain.
    fn chain_slot(&self, k: usize, p: usize, m: usize) -> QueryResult<Option<&Slot>> {
        self.grid.check_tile(p, k)?;
        let slot = self.active_slot(k, m)?;
        if slot.pivot != p {
            return Err(QueryError::NotEliminatedInto { k, p, m });
        }
        Ok(if slot.kind.is_merge() { Some(slot) } else { None })
    }
}

// ---------------------------------------------------------------------------
// Table construction
// ---------------------------------------------------------------------------

struct TableBuilder {
    mt: usize,
    slots: Vec<Slot>,
    order: Vec<usize>,
    order_offsets: Vec<usize>,
    step_counts: Vec<usize>,
}

impl TableBuilder {
    fn new(mt: usize, columns: usize) -> Self {
        let total: usize = (0..columns).map(|k| mt - k).sum();
        let mut order_offsets = Vec::with_capacity(columns + 1);
        order_offsets.push(0);
        TableBuilder {
            mt,
            slots: vec![Slot::default(); columns * mt],
            order: Vec::with_capacity(total),
            order_offsets,
            step_counts: vec![0; columns],
        }
    }

    /// Lay out column `k`: the panel, then every local merge, then every
    /// domain merge, timing each merge as soon as both operands are ready.
    fn push_column(&mut self, k: usize, domains: &[DomainTree], roots: &RootTree, domino: bool) {
        let base = k * self.mt;
        let live = self.mt - k;
        // Step at which each live tile was last touched, and whether that was
        // a local merge it received.
        let mut ready = vec![0usize; live];
        let mut after_local = vec![false; live];

        self.slots[base + k] = Slot {
            kind: EliminationKind::Panel,
            pivot: k,
            step: 0,
            index: 0,
            ..Slot::default()
        };
        self.order.push(k);
        let mut last_step = 0;

        for domain in domains {
            for merge in domain.merges() {
                let (p, v) = (merge.pivot - k, merge.tile - k);
                let step = ready[p].max(ready[v]) + 1;
                ready[p] = step;
                ready[v] = step;
                after_local[p] = true;
                last_step = last_step.max(step);
                self.record(k, merge.tile, merge.pivot, EliminationKind::LocalMerge, step);
            }
        }

        for merge in roots.merges() {
            let (p, v) = (merge.pivot - k, merge.tile - k);
            let step = if domino && after_local[v] && ready[v] > ready[p] {
                ready[v]
            } else {
                ready[p].max(ready[v]) + 1
            };
            ready[p] = step;
            ready[v] = step;
            after_local[p] = false;
            last_step = last_step.max(step);
            self.record(k, merge.tile, merge.pivot, EliminationKind::DomainMerge, step);
        }

        self.step_counts[k] = last_step + 1;
        self.order_offsets.push(self.order.len());
    }

    fn record(&mut self, k: usize, tile: usize, pivot: usize, kind: EliminationKind, step: usize) {
        let base = k * self.mt;
        let index = self.order.len() - self.order_offsets[k];
        let prev = self.slots[base + pivot].tail;
        if let Some(prev) = prev {
            self.slots[base + prev].next = Some(tile);
        } else {
            self.slots[base + pivot].head = Some(tile);
        }
        self.slots[base + pivot].tail = Some(tile);

        let slot = &mut self.slots[base + tile];
        slot.kind = kind;
        slot.pivot = pivot;
        slot.step = step;
        slot.index = index;
        slot.prev = prev;
        self.order.push(tile);
    }
}
