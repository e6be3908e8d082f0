use super::accelerator::{Accelerator, AcceleratorMode, DomainBounds, StepInput};
use super::accumulator::{EvFlags, ForceAccumulator};
use super::config::{ConfigError, EngineConfig};
use super::error::EngineError;
use super::setup::{self, SetupReport};
use super::tasks::host_forces::{self, KernelInputs};
use crate::core::forcefield::table::PairTable;
use crate::core::models::neighbors::NeighborList;
use crate::core::models::particles::ParticleSet;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// How one step was split between the accelerator and the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Rows in the neighbor list (`inum`).
    pub rows: usize,
    /// First row handled by the host.
    pub host_start: usize,
    pub host_time: Duration,
}

impl StepReport {
    pub fn host_rows(&self) -> usize {
        self.rows - self.host_start
    }
}

/// Work-split coordinator: runs the accelerator first, then the host loop on whatever
/// rows it left over.
///
/// The mode is fixed at construction. The accelerator is torn down on drop.
pub struct ForceEngine {
    table: PairTable,
    config: EngineConfig,
    accelerator: Box<dyn Accelerator>,
    setup: SetupReport,
    host_time: f64,
}

impl ForceEngine {
    /// Validates the run and initializes the accelerator.
    pub fn new(
        table: PairTable,
        config: EngineConfig,
        mut accelerator: Box<dyn Accelerator>,
        particles: &ParticleSet,
    ) -> Result<Self, EngineError> {
        let setup = setup::initialize(&config, &table, particles, accelerator.as_mut())?;
        Ok(Self {
            table,
            config,
            accelerator,
            setup,
            host_time: 0.0,
        })
    }

    pub fn table(&self) -> &PairTable {
        &self.table
    }

    pub fn mode(&self) -> AcceleratorMode {
        self.config.mode
    }

    pub fn setup_report(&self) -> &SetupReport {
        &self.setup
    }

    /// Host-loop wall time of the last step, in seconds.
    pub fn last_host_time(&self) -> f64 {
        self.host_time
    }

    /// Bytes held by per-atom tallies plus whatever the accelerator reports.
    pub fn memory_usage(&self, accumulator: &ForceAccumulator) -> usize {
        accumulator.memory_bytes() + self.accelerator.memory_bytes()
    }

    /// Computes one step of forces into `accumulator`, which is reset first.
    ///
    /// `external_list` is required in [`AcceleratorMode::Force`] and ignored otherwise.
    /// An accelerator failure aborts the step before the host loop touches anything.
    /// Particle types and neighbor-list indices are checked against the table and the
    /// particle set before any of them is dereferenced.
    #[instrument(skip_all, name = "force_step", fields(step_age = step_age))]
    pub fn compute(
        &mut self,
        step_age: usize,
        particles: &ParticleSet,
        external_list: Option<&NeighborList>,
        flags: EvFlags,
        accumulator: &mut ForceAccumulator,
    ) -> Result<StepReport, EngineError> {
        setup::validate(&self.config, &self.table, particles)?;
        let charges = particles.charges().ok_or(ConfigError::MissingCharge)?;
        accumulator.reset(particles.total(), flags);

        let step = StepInput {
            step_age,
            particles,
            flags,
            host_time: self.host_time,
        };

        let (host_start, list) = match self.config.mode {
            AcceleratorMode::Force => {
                let list = external_list.ok_or(EngineError::MissingNeighborList(self.config.mode))?;
                list.check_indices(particles.total())?;
                let start = self
                    .accelerator
                    .compute(&step, list, accumulator)
                    .map_err(EngineError::ResourceExhaustion)?;
                (start, list)
            }
            AcceleratorMode::Neighbor | AcceleratorMode::HybridNeighbor => {
                let domain = DomainBounds::enclosing(particles);
                let start = self
                    .accelerator
                    .build_and_compute(&step, &domain, accumulator)
                    .map_err(EngineError::ResourceExhaustion)?;
                let list = self
                    .accelerator
                    .neighbor_list()
                    .ok_or(EngineError::MissingNeighborList(self.config.mode))?;
                list.check_indices(particles.total())?;
                (start, list)
            }
        };

        let rows = list.rows();
        let host_start = host_start.min(rows.len());
        let mut host_time = Duration::ZERO;
        if host_start < rows.len() {
            let inputs = KernelInputs {
                positions: particles.positions(),
                types: particles.types(),
                charges,
            };
            let timer = Instant::now();
            host_forces::run(&rows[host_start..], &inputs, &self.table, accumulator);
            host_time = timer.elapsed();
        }
        self.host_time = host_time.as_secs_f64();

        debug!(
            "Step split: accelerator rows [0, {}), host rows [{}, {}) in {:?}.",
            host_start,
            host_start,
            rows.len(),
            host_time
        );

        Ok(StepReport {
            rows: rows.len(),
            host_start,
            host_time,
        })
    }
}

impl Drop for ForceEngine {
    fn drop(&mut self) {
        self.accelerator.teardown();
    }
}
