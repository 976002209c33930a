use thiserror::Error;

use epi_agent::AgentError;
use epi_core::CoreError;
use epi_disease::DiseaseError;
use epi_intervention::InterventionError;
use epi_output::OutputError;
use epi_spatial::SpatialError;

use crate::SimState;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state:  SimState,
        action: &'static str,
    },

    #[error("time model error: {0}")]
    Core(#[from] CoreError),

    #[error("environment error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("intervention error: {0}")]
    Intervention(#[from] InterventionError),

    #[error("population error: {0}")]
    Agent(#[from] AgentError),

    #[error("disease error: {0}")]
    Disease(#[from] DiseaseError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("I/O error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("player thread has stopped")]
    PlayerStopped,
}

pub type SimResult<T> = Result<T, SimError>;
