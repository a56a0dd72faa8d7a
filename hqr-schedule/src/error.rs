use hqr_tree::TopologyParseError;

/// Invalid grid shape or schedule options, raised at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{what} must be positive")]
    ZeroDimension { what: &'static str },

    #[error("domain size must be positive")]
    ZeroDomainSize,

    #[error("high-level tree size must be positive")]
    ZeroHighLevelSize,

    #[error(transparent)]
    Topology(#[from] TopologyParseError),
}

/// Out-of-range or inconsistent query arguments. Always a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("column {k} out of range for {nt} tile-columns")]
    ColumnOutOfRange { k: usize, nt: usize },

    #[error("tile-row {m} out of range for {mt} tile-rows")]
    RowOutOfRange { m: usize, mt: usize },

    #[error("index {i} out of range: column {k} has {count} active tiles")]
    IndexOutOfRange { k: usize, i: usize, count: usize },

    #[error("tile-row {m} is inactive at column {k}")]
    InactiveTile { k: usize, m: usize },

    #[error("tile-row {m} is not eliminated into {p} at column {k}")]
    NotEliminatedInto { k: usize, p: usize, m: usize },
}

/// Errors produced while building, querying or validating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("schedule invariant violated in column {column}: {reason}")]
    Invariant { column: usize, reason: String },
}

impl ScheduleError {
    /// Whether the error was raised while building the schedule.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ScheduleError::Config(_))
    }

    /// Whether the error comes from bad query arguments.
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, ScheduleError::Query(_))
    }
}

impl From<TopologyParseError> for ScheduleError {
    fn from(err: TopologyParseError) -> Self {
        ScheduleError::Config(err.into())
    }
}

/// Convenience alias for `Result<T, ScheduleError>`.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Result of a single schedule query.
pub type QueryResult<T> = std::result::Result<T, QueryError>;
