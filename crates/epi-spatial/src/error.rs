//! Spatial-subsystem error type.

use thiserror::Error;

use epi_core::{BuildingId, CoreError};

/// Errors produced by `epi-spatial`.  All of them are initialization
/// failures: once an `Environment` exists, queries report absence with
/// `Option` rather than errors.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("geometry has no {0}")]
    EmptyGeometry(&'static str),

    #[error("building footprint {index} is invalid: {source}")]
    InvalidFootprint {
        index:  usize,
        #[source]
        source: CoreError,
    },

    #[error("road line {index} is invalid: {reason}")]
    InvalidRoad { index: usize, reason: String },

    #[error("building {0} not found")]
    BuildingNotFound(BuildingId),

    #[error("I/O error reading geometry: {0}")]
    Io(#[from] std::io::Error),

    #[error("geometry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
