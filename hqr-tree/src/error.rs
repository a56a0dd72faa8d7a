/// Errors raised when decoding a [`TreeTopology`](crate::TreeTopology) from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyParseError {
    #[error("unknown tree topology name: {0:?}")]
    UnknownName(String),

    #[error("unknown tree topology code: {0}")]
    UnknownCode(i32),
}
