//! Configuration errors.
//!
//! The packing kernels themselves never fail. Everything that can go wrong is
//! caught here, when a source view, a packed block or a rounding strategy is
//! built.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("source holds {len} bytes, view needs at least {needed}")]
    SourceTooShort { len: usize, needed: usize },
    #[error("unknown rounding strategy: {0}")]
    UnknownRounding(String),
    #[error("exact rounding needs 8-bit depth, got {bits} bits")]
    ExactRoundingBelowFullDepth { bits: u32 },
}

pub type Result<T> = std::result::Result<T, PackError>;
