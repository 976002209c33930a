use thiserror::Error;

use epi_core::AgentId;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("cannot place a population: the environment has no residential buildings")]
    NoResidentialBuildings,

    #[error("population size must be at least 1")]
    EmptyPopulation,

    #[error("invalid population config: {0}")]
    InvalidConfig(String),

    #[error("agent {0} not found in population")]
    UnknownAgent(AgentId),
}

pub type AgentResult<T> = Result<T, AgentError>;
