//! Contract of the accelerated collaborator.
//!
//! The accelerated path is a black box: it receives the pair table once at init,
//! then each step it computes forces for a prefix of the neighbor-list rows and
//! reports where the host has to take over. Internals (device memory, parallel
//! reductions) are not part of this crate's concern.

use crate::core::forcefield::table::PairTable;
use crate::core::models::neighbors::NeighborList;
use crate::core::models::particles::ParticleSet;
use crate::engine::accumulator::{EvFlags, ForceAccumulator};
use nalgebra::{Point3, Vector3};
use thiserror::Error;

pub mod reference;

/// Division of labour between the accelerator and the host, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceleratorMode {
    /// The accelerator only computes forces, over a list built by someone else.
    Force,
    /// The accelerator builds the neighbor list and computes forces.
    Neighbor,
    /// Like [`AcceleratorMode::Neighbor`], with list building shared with the host.
    HybridNeighbor,
}

impl AcceleratorMode {
    /// The accelerator constructs the neighbor list itself each step.
    pub fn builds_neighbors(self) -> bool {
        !matches!(self, AcceleratorMode::Force)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcceleratorError {
    #[error("requested {requested} bytes but only {available} are available")]
    OutOfMemory { requested: usize, available: usize },
    #[error("accelerator used before initialization")]
    NotInitialized,
    #[error("{0}")]
    Device(String),
}

/// Everything the accelerator needs once at setup.
///
/// The pair table carries the combined, LJ and Coulomb cutoffs, the LJ coefficients
/// and offsets, the special factors, `qqrd2e` and `kappa`.
#[derive(Debug, Clone, Copy)]
pub struct AcceleratorInit<'a> {
    pub table: &'a PairTable,
    pub local_count: usize,
    pub total_count: usize,
    pub max_neighbors: usize,
    pub max_special: usize,
    pub cell_size: f64,
    pub mode: AcceleratorMode,
}

/// Per-step inputs shared by both compute entry points.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    /// Steps since the last neighbor-list rebuild; 0 means rebuild now.
    pub step_age: usize,
    pub particles: &'a ParticleSet,
    pub flags: EvFlags,
    /// Host-loop wall time of the previous step in seconds, for load balancing.
    pub host_time: f64,
}

/// Subdomain and periodic box geometry handed to list construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBounds {
    pub sublo: Point3<f64>,
    pub subhi: Point3<f64>,
    pub boxlo: Point3<f64>,
    pub period: Vector3<f64>,
}

impl DomainBounds {
    /// Axis-aligned bounds that enclose every particle, used as a single-domain box.
    pub fn enclosing(particles: &ParticleSet) -> Self {
        let positions = particles.positions();
        let (lo, hi) = match positions.first() {
            Some(first) => positions.iter().fold((*first, *first), |(lo, hi), p| {
                (lo.inf(p), hi.sup(p))
            }),
            None => (Point3::origin(), Point3::origin()),
        };
        Self {
            sublo: lo,
            subhi: hi,
            boxlo: lo,
            period: hi - lo,
        }
    }
}

/// The accelerated force path.
///
/// Both compute calls add forces for rows `[0, start)` into the accumulator and return
/// `start`; the host owns the remaining rows. An `Err` means the device could not run
/// the step at all.
pub trait Accelerator {
    fn init(&mut self, init: &AcceleratorInit<'_>) -> Result<(), AcceleratorError>;

    /// Builds the neighbor list on the accelerator, then computes its share.
    fn build_and_compute(
        &mut self,
        step: &StepInput<'_>,
        domain: &DomainBounds,
        accumulator: &mut ForceAccumulator,
    ) -> Result<usize, AcceleratorError>;

    /// The list built by the last [`Accelerator::build_and_compute`] call.
    fn neighbor_list(&self) -> Option<&NeighborList>;

    /// Computes its share over a list owned by the caller.
    fn compute(
        &mut self,
        step: &StepInput<'_>,
        list: &NeighborList,
        accumulator: &mut ForceAccumulator,
    ) -> Result<usize, AcceleratorError>;

    fn teardown(&mut self);

    fn memory_bytes(&self) -> usize;
}
