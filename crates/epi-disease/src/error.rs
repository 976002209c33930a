use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiseaseError {
    #[error("disease parameter {name} = {value} is out of range ({reason})")]
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    #[error("cannot seed {requested} infections: only {available} susceptible individuals")]
    TooManySeeds { requested: u32, available: usize },
}

pub type DiseaseResult<T> = Result<T, DiseaseError>;
