#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// No nodes in the ring
    #[error("Empty ring")]
    EmptyRing,

    /// Virtual node count must be positive
    #[error("Virtual node count must be positive")]
    ZeroVirtualNodes,
}

pub type RingResult<T> = Result<T, RingError>;
