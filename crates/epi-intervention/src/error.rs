//! Intervention error type.

use thiserror::Error;

use crate::InterventionKind;

/// Configuration errors.  All are raised at construction, before any
/// intervention can be applied.
#[derive(Debug, Error)]
pub enum InterventionError {
    #[error("intervention {index} ({kind}) ends on day {end} before it starts on day {start}")]
    InvalidWindow {
        index: usize,
        kind:  InterventionKind,
        start: u32,
        end:   u32,
    },

    #[error("intervention {index} ({kind}) has no parameter {name:?}")]
    UnknownParameter {
        index: usize,
        kind:  InterventionKind,
        name:  String,
    },

    #[error("intervention {index} ({kind}) parameter {name:?} = {value} is outside [{min}, {max}]")]
    InvalidParameter {
        index: usize,
        kind:  InterventionKind,
        name:  String,
        value: f64,
        min:   f64,
        max:   f64,
    },
}

pub type InterventionResult<T> = Result<T, InterventionError>;
