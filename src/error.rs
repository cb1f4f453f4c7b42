//! Errors reported by ring construction and role handle claims.
//!
//! A full or empty ring is not an error: `push`/`pop` report those through
//! their ordinary return values.

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Requested capacity was zero.
    #[error("ring capacity must be at least 1")]
    InvalidCapacity,
    /// Requested capacity cannot be rounded up to a power of two, or its storage
    /// would exceed `isize::MAX` bytes.
    #[error("ring capacity {requested} is too large to allocate")]
    CapacityOverflow {
        /// The capacity passed to the constructor.
        requested: usize,
    },
    /// A producer handle for this ring is still alive.
    #[error("a producer handle is already active for this ring")]
    ProducerActive,
    /// A consumer handle for this ring is still alive.
    #[error("a consumer handle is already active for this ring")]
    ConsumerActive,
}

/// Result alias using the crate [`enum@Error`].
pub type Result<T> = core::result::Result<T, Error>;
