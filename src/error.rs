use thiserror::Error;

/// Errors reported when building a tree.
///
/// Misuse of a cursor (reading or advancing past the end) is a contract
/// violation and panics instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Every node would be full before holding anything, so insertion
    /// could never find a place to stop.
    #[error("invalid node capacity: a node must hold at least one element")]
    ZeroCapacity,
}

pub type Result<T> = std::result::Result<T, Error>;
