//! Options accepted when building a schedule.

use hqr_tree::TreeTopology;

use crate::error::ConfigError;
use crate::grid::TileGrid;

/// Number of consecutive tile-rows grouped into one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DomainSize {
    /// One domain per process row: `ceil(MT / P)` tile-rows.
    #[default]
    Auto,
    /// Fixed number of tile-rows per domain, cut inside each process row.
    Fixed(usize),
}

impl DomainSize {
    /// Resolve the size for `grid`.
    pub fn resolve(self, grid: &TileGrid) -> Result<usize, ConfigError> {
        match self {
            DomainSize::Auto => Ok(grid.rows_per_process()),
            DomainSize::Fixed(0) => Err(ConfigError::ZeroDomainSize),
            DomainSize::Fixed(size) => Ok(size),
        }
    }
}

/// Number of participants in the distributed (cross-process) tree.
///
/// Domain roots are grouped by process row into that many participants.
/// Roots of one group are first reduced with the low-level tree; the group
/// leaders then meet in the high-level tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HighLevelSize {
    /// One participant per process row.
    #[default]
    Auto,
    /// Fixed number of participants.
    Fixed(usize),
}

impl HighLevelSize {
    /// Resolve the participant count for `grid`.
    pub fn resolve(self, grid: &TileGrid) -> Result<usize, ConfigError> {
        match self {
            HighLevelSize::Auto => Ok(grid.p()),
            HighLevelSize::Fixed(0) => Err(ConfigError::ZeroHighLevelSize),
            HighLevelSize::Fixed(size) => Ok(size),
        }
    }
}

/// Tree shapes and scheduling options of a hierarchical factorization.
///
/// `Default` reduces domains with a flat tree and domain roots with a binary
/// tree, one domain and one distributed-tree participant per process row,
/// without domino or round-robin roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleConfig {
    /// Tree used inside each domain (LOCAL_MERGE).
    pub low_level: TreeTopology,
    /// Tree used across domain roots (DOMAIN_MERGE).
    pub high_level: TreeTopology,
    pub domain_size: DomainSize,
    pub high_level_size: HighLevelSize,
    /// Let a domain's last local merge share a step with the domain merge
    /// consuming its root.
    pub domino: bool,
    /// Rotate the surviving tile of each domain across columns.
    pub round_robin_roots: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            low_level: TreeTopology::Flat,
            high_level: TreeTopology::Binary,
            domain_size: DomainSize::Auto,
            high_level_size: HighLevelSize::Auto,
            domino: false,
            round_robin_roots: false,
        }
    }
}

impl ScheduleConfig {
    pub fn with_low_level(mut self, topology: TreeTopology) -> Self {
        self.low_level = topology;
        self
    }

    pub fn with_high_level(mut self, topology: TreeTopology) -> Self {
        self.high_level = topology;
        self
    }

    pub fn with_domain_size(mut self, domain_size: DomainSize) -> Self {
        self.domain_size = domain_size;
        self
    }

    pub fn with_high_level_size(mut self, high_level_size: HighLevelSize) -> Self {
        self.high_level_size = high_level_size;
        self
    }

    pub fn with_domino(mut self, domino: bool) -> Self {
        self.domino = domino;
        self
    }

    pub fn with_round_robin_roots(mut self, round_robin_roots: bool) -> Self {
        self.round_robin_roots = round_robin_roots;
        self
    }

    /// Build a configuration from integer option codes.
    ///
    /// Tree codes follow [`TreeTopology::from_code`]. A `domain_size` or
    /// `high_level_size` of 0 or below selects the automatic size; non-zero
    /// flags enable the option.
    pub fn from_codes(
        low_level: i32,
        high_level: i32,
        domain_size: i32,
        high_level_size: i32,
        domino: i32,
        round_robin_roots: i32,
    ) -> Result<Self, ConfigError> {
        let domain_size = match positive(domain_size) {
            Some(size) => DomainSize::Fixed(size),
            None => DomainSize::Auto,
        };
        let high_level_size = match positive(high_level_size) {
            Some(size) => HighLevelSize::Fixed(size),
            None => HighLevelSize::Auto,
        };
        Ok(ScheduleConfig {
            low_level: TreeTopology::from_code(low_level)?,
            high_level: TreeTopology::from_code(high_level)?,
            domain_size,
            high_level_size,
            domino: domino != 0,
            round_robin_roots: round_robin_roots != 0,
        })
    }
}

fn positive(code: i32) -> Option<usize> {
    usize::try_from(code).ok().filter(|&v| v > 0)
}
