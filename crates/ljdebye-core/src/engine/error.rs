use thiserror::Error;

use super::accelerator::AcceleratorError;
use super::config::ConfigError;
use crate::core::forcefield::params::ParamLoadError;
use crate::core::models::neighbors::NeighborError;
use crate::core::models::particles::ParticleError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load force field parameters: {source}")]
    ParamLoad {
        #[from]
        source: ParamLoadError,
    },

    #[error("Invalid particle data: {source}")]
    Particles {
        #[from]
        source: ParticleError,
    },

    #[error("Invalid neighbor list: {source}")]
    NeighborList {
        #[from]
        source: NeighborError,
    },

    #[error("Accelerator initialization failed: {0}")]
    AcceleratorInit(#[source] AcceleratorError),

    #[error("Accelerator step failed: {0}")]
    ResourceExhaustion(#[source] AcceleratorError),

    #[error("No neighbor list available for mode {0:?}")]
    MissingNeighborList(super::accelerator::AcceleratorMode),
}
