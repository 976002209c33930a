//! Base error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! via `From` or keep it as one variant.

use thiserror::Error;

/// Errors produced by `epi-core` primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("polygon has zero area")]
    ZeroArea,

    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("tick length {0} s must be positive and divide one day")]
    InvalidTickLength(u32),
}

/// Shorthand result type for `epi-core`.
pub type CoreResult<T> = Result<T, CoreError>;
