use thiserror::Error;

/// Errors reported at the crate's API boundary.
///
/// Broken internal invariants are not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// An item was inserted into an STR-tree after it was packed.
    #[error("cannot insert items into an STR packed R-tree after it has been built")]
    IndexBuilt,

    /// A grid scale factor was zero, negative or not finite.
    #[error("scale factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    /// A noding run observed its cancel token.
    #[error("noding was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TopologyError>;
