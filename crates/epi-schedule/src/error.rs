use thiserror::Error;

use crate::Activity;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule has no entries")]
    Empty,

    #[error("schedule entry at {start_secs} s is invalid: {reason}")]
    InvalidEntry { start_secs: u32, reason: String },

    #[error("{0} cannot be scheduled; it is imposed by health state")]
    NotSchedulable(Activity),

    #[error("unknown schedule template {0:?}")]
    UnknownTemplate(String),

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
