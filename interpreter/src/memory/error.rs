use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// An access touched bytes outside `[0, size)`.
    #[error("memory access out of bounds: address {address} (+{len} bytes) with memory size {size}")]
    OutOfBounds {
        address: i64,
        len: usize,
        size: usize,
    },
}
