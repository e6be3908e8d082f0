use super::accelerator::{Accelerator, AcceleratorInit};
use super::config::{ConfigError, EngineConfig};
use super::error::EngineError;
use crate::core::forcefield::table::PairTable;
use crate::core::models::particles::ParticleSet;
use tracing::{info, instrument};

/// What setup derived and handed to the accelerator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetupReport {
    pub cell_size: f64,
    pub max_neighbors: usize,
    pub max_special: usize,
    /// The caller must supply a full neighbor list every step.
    pub requires_external_list: bool,
}

/// One-time preconditions of the pair style. Never re-checked per step.
pub fn validate(
    config: &EngineConfig,
    table: &PairTable,
    particles: &ParticleSet,
) -> Result<(), ConfigError> {
    if particles.charges().is_none() {
        return Err(ConfigError::MissingCharge);
    }
    if config.newton_pair {
        return Err(ConfigError::NewtonPairEnabled);
    }
    if let Some(type_index) = particles.max_type() {
        if type_index >= table.ntypes() {
            return Err(ConfigError::UnknownParticleType {
                type_index,
                ntypes: table.ntypes(),
            });
        }
    }
    Ok(())
}

/// Validates the run and initializes the accelerator with the resolved table.
#[instrument(skip_all, name = "pair_style_setup")]
pub fn initialize(
    config: &EngineConfig,
    table: &PairTable,
    particles: &ParticleSet,
    accelerator: &mut dyn Accelerator,
) -> Result<SetupReport, EngineError> {
    validate(config, table, particles)?;

    let cell_size = table.cell_size(config.skin);
    let report = SetupReport {
        cell_size,
        max_neighbors: config.max_neighbors_hint(),
        max_special: particles.max_specials(),
        requires_external_list: !config.mode.builds_neighbors(),
    };

    accelerator
        .init(&AcceleratorInit {
            table,
            local_count: particles.local(),
            total_count: particles.total(),
            max_neighbors: report.max_neighbors,
            max_special: report.max_special,
            cell_size,
            mode: config.mode,
        })
        .map_err(EngineError::AcceleratorInit)?;

    info!(
        "Pair style initialized: {} types, max cutoff {:.4}, cell size {:.4}, mode {:?}.",
        table.ntypes(),
        table.max_cutoff_sq().sqrt(),
        cell_size,
        config.mode
    );
    Ok(report)
}
