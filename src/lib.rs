//! Hierarchical reduction-tree schedules for tile QR/LU factorizations.
//!
//! This crate bundles the two building blocks:
//!
//! - [`hqr_tree`]: the tree shapes (flat, binary, fibonacci, greedy).
//! - [`hqr_schedule`]: the two-level domain forest and the
//!   [`PivotSchedule`] query table built on top of it.
//!
//! # Example
//!
//! ```
//! use hqr_rs::{build_qr, EliminationKind, ScheduleConfig, TileGrid, TreeTopology};
//!
//! let grid = TileGrid::new(6, 3, 2, 1).unwrap();
//! let config = ScheduleConfig::default()
//!     .with_low_level(TreeTopology::Flat)
//!     .with_high_level(TreeTopology::Binary);
//! let schedule = build_qr(grid, config).unwrap();
//!
//! let order: Vec<usize> = (0..6).map(|i| schedule.tile_at(0, i).unwrap()).collect();
//! assert_eq!(order, vec![0, 1, 2, 4, 5, 3]);
//! assert_eq!(schedule.kind_of(0, 3).unwrap(), EliminationKind::DomainMerge);
//! ```

use log::debug;

pub use hqr_schedule;
pub use hqr_tree;

// Re-export primary API
pub use hqr_schedule::{
    ColumnView, ConfigError, Domain, DomainPartition, DomainSize, DomainTree, EliminationKind,
    EliminationNode, HighLevelForest, HighLevelSize, LeafTree, LowLevelForest, PivotSchedule,
    QueryError, QueryResult, Result, RootTree, ScheduleConfig, ScheduleError, TileGrid, TileMerge,
};
pub use hqr_tree::{Merge, ReductionTree, TopologyParseError, TreeTopology};

/// Build the QR schedule of `grid`.
pub fn build_qr(grid: TileGrid, config: ScheduleConfig) -> Result<PivotSchedule> {
    PivotSchedule::new(grid, config)
}

/// Build the LQ schedule of `grid` (the QR schedule of its transpose).
pub fn build_lq(grid: TileGrid, config: ScheduleConfig) -> Result<PivotSchedule> {
    PivotSchedule::new_lq(grid, config)
}

/// Build a schedule from the integer option codes used by factorization
/// drivers: tree codes (0 flat, 1 greedy, 2 fibonacci, 3 binary), a domain
/// size and a high-level tree size (`<= 0` for one per process row), and two
/// boolean flags.
pub fn build_from_codes(
    grid: TileGrid,
    low_level: i32,
    high_level: i32,
    domain_size: i32,
    high_level_size: i32,
    domino: i32,
    round_robin_roots: i32,
) -> Result<PivotSchedule> {
    let config = ScheduleConfig::from_codes(
        low_level,
        high_level,
        domain_size,
        high_level_size,
        domino,
        round_robin_roots,
    )?;
    debug!("schedule options decoded from codes: {:?}", config);
    PivotSchedule::new(grid, config)
}
