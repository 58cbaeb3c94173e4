//! Error types for hair construction and simulation.

use thiserror::Error;

/// Errors surfaced by the hair simulation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HairError {
    /// Requested active strand count is above the allocated capacity.
    #[error("strand count {requested} exceeds capacity of {maximum} strands")]
    CapacityExceeded { requested: u32, maximum: u32 },

    /// A strand needs a root and at least one distal particle.
    #[error("particles per strand must be at least 2, got {0}")]
    InvalidParticlesPerStrand(u32),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The compute program could not be linked against the device.
    #[error("compute program link failed: {0}")]
    ProgramLink(String),

    /// The head mesh asset was missing or malformed.
    #[error("head mesh could not be loaded: {0}")]
    AssetLoad(String),

    /// The head mesh produced no scalp samples to grow strands from.
    #[error("head mesh has no vertices inside the scalp region")]
    EmptyScalp,
}

/// Result type for hair operations
pub type Result<T> = std::result::Result<T, HairError>;
