//! Error types for archipelago
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Top-level error type for island-model operations
#[derive(Debug, Error)]
pub enum IslandError {
    /// A rendezvous barrier was aborted while parties were waiting.
    ///
    /// Raised when a peer island terminates early and breaks the barrier.
    /// It is not retried: the enclosing orchestrator tears the island down.
    #[error("Barrier broken: a peer island terminated before the rendezvous")]
    BrokenBarrier,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A probability row did not carry the expected total mass
    #[error("Probability row sums to {actual}, expected {expected}")]
    ProbabilityMass { expected: u32, actual: u32 },

    /// Empty population where at least one individual was required
    #[error("Empty population")]
    EmptyPopulation,

    /// IO error while writing monitor output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An island thread panicked before completing its run
    #[error("Island {0} panicked")]
    IslandPanicked(usize),
}

/// Result type alias for island-model operations
pub type IslandResult<T> = Result<T, IslandError>;
