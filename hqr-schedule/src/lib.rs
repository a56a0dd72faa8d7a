//! Precomputed elimination schedule of a hierarchical tile QR/LU.
//!
//! The tile-rows of each column are grouped into contiguous domains. Inside a
//! domain they are reduced with a low-level tree ([`LowLevelForest`], the
//! TS kernels); the surviving domain roots are then reduced with a
//! high-level tree ([`HighLevelForest`], the TT kernels) into the panel tile.
//! [`PivotSchedule`] flattens both forests into a read-only table that a
//! distributed driver queries to generate its tasks.
//!
//! # Dependency graph
//!
//! ```text
//! hqr-tree -> hqr-schedule -> hqr-rs
//! ```
//!
//! # Example
//!
//! ```
//! use hqr_schedule::{PivotSchedule, ScheduleConfig, TileGrid, TreeTopology};
//!
//! let grid = TileGrid::new(8, 4, 2, 2).unwrap();
//! let config = ScheduleConfig::default()
//!     .with_low_level(TreeTopology::Greedy)
//!     .with_domino(true);
//! let schedule = PivotSchedule::new(grid, config).unwrap();
//! schedule.validate().unwrap();
//!
//! // walk everything eliminated into the panel tile of column 1
//! let mut next = schedule.first_in_chain(1, 1).unwrap();
//! while let Some(m) = next {
//!     assert_eq!(schedule.pivot_of(1, m).unwrap(), 1);
//!     next = schedule.next_in_chain(1, 1, m).unwrap();
//! }
//! ```

mod check;
pub mod config;
pub mod domain;
pub mod error;
pub mod forest;
pub mod grid;
pub mod high_level;
pub mod low_level;
pub mod render;
pub mod schedule;

// Re-export primary API
pub use config::{DomainSize, HighLevelSize, ScheduleConfig};
pub use domain::{Domain, DomainPartition};
pub use error::{ConfigError, QueryError, QueryResult, Result, ScheduleError};
pub use forest::{LeafTree, TileMerge};
pub use grid::TileGrid;
pub use high_level::{HighLevelForest, RootTree};
pub use low_level::{DomainTree, LowLevelForest};
pub use render::ColumnView;
pub use schedule::{EliminationKind, EliminationNode, PivotSchedule};

pub use hqr_tree::{Merge, ReductionTree, TopologyParseError, TreeTopology};
