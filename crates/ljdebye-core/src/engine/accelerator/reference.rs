use super::{
    Accelerator, AcceleratorError, AcceleratorInit, AcceleratorMode, DomainBounds, StepInput,
};
use crate::core::forcefield::table::PairTable;
use crate::core::models::neighbors::{NeighborEntry, NeighborList, NeighborRow};
use crate::engine::accumulator::ForceAccumulator;
use crate::engine::tasks::host_forces::{KernelInputs, tally_row};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct DeviceState {
    table: PairTable,
    mode: AcceleratorMode,
    neighbor_cutoff_sq: f64,
}

/// In-process stand-in for an accelerator.
///
/// Evaluates the first `split` fraction of the rows with the same kernel as the host
/// loop, builds brute-force full lists when asked to, and reports exhaustion when its
/// working set would exceed an optional memory budget.
#[derive(Debug, Clone)]
pub struct ReferenceAccelerator {
    split: f64,
    memory_limit: Option<usize>,
    state: Option<DeviceState>,
    list: Option<NeighborList>,
    last_host_time: f64,
}

impl ReferenceAccelerator {
    /// `split` is clamped to `[0, 1]`; 1 hands nothing to the host.
    pub fn new(split: f64) -> Self {
        Self {
            split: split.clamp(0.0, 1.0),
            memory_limit: None,
            state: None,
            list: None,
            last_host_time: 0.0,
        }
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    pub fn split(&self) -> f64 {
        self.split
    }

    /// Host time reported with the most recent step.
    pub fn last_host_time(&self) -> f64 {
        self.last_host_time
    }

    fn state(&self) -> Result<&DeviceState, AcceleratorError> {
        self.state.as_ref().ok_or(AcceleratorError::NotInitialized)
    }

    fn reserve(&self, requested: usize) -> Result<(), AcceleratorError> {
        match self.memory_limit {
            Some(available) if requested > available => {
                Err(AcceleratorError::OutOfMemory { requested, available })
            }
            _ => Ok(()),
        }
    }

    fn working_set_bytes(step: &StepInput<'_>, list: Option<&NeighborList>) -> usize {
        let particles = step.particles.total();
        let per_particle = std::mem::size_of::<[f64; 3]>()
            + std::mem::size_of::<usize>()
            + std::mem::size_of::<f64>()
            + std::mem::size_of::<[f64; 3]>();
        particles * per_particle + list.map_or(0, list_bytes)
    }

    fn compute_prefix(
        &mut self,
        step: &StepInput<'_>,
        rows: &[NeighborRow],
        accumulator: &mut ForceAccumulator,
    ) -> Result<usize, AcceleratorError> {
        let state = self.state()?;
        let charges = step
            .particles
            .charges()
            .ok_or_else(|| AcceleratorError::Device("charges were not uploaded".to_string()))?;
        let inputs = KernelInputs {
            positions: step.particles.positions(),
            types: step.particles.types(),
            charges,
        };

        let start = ((self.split * rows.len() as f64).round() as usize).min(rows.len());
        let flags = accumulator.flags();
        for row in &rows[..start] {
            let tally = tally_row(row, &inputs, &state.table, &flags);
            accumulator.apply(&tally);
        }

        self.last_host_time = step.host_time;
        trace!(
            "Reference accelerator handled {} of {} rows (previous host time {:.3e} s).",
            start,
            rows.len(),
            step.host_time
        );
        Ok(start)
    }
}

fn list_bytes(list: &NeighborList) -> usize {
    list.len() * std::mem::size_of::<NeighborRow>()
        + list.total_entries() * std::mem::size_of::<NeighborEntry>()
}

impl Accelerator for ReferenceAccelerator {
    fn init(&mut self, init: &AcceleratorInit<'_>) -> Result<(), AcceleratorError> {
        self.reserve(init.table.memory_bytes())?;
        debug!(
            "Reference accelerator initialized: {} types, {} local / {} total particles, cell size {:.4}, mode {:?}.",
            init.table.ntypes(),
            init.local_count,
            init.total_count,
            init.cell_size,
            init.mode
        );
        self.state = Some(DeviceState {
            table: init.table.clone(),
            mode: init.mode,
            neighbor_cutoff_sq: init.cell_size * init.cell_size,
        });
        self.list = None;
        Ok(())
    }

    fn build_and_compute(
        &mut self,
        step: &StepInput<'_>,
        _domain: &DomainBounds,
        accumulator: &mut ForceAccumulator,
    ) -> Result<usize, AcceleratorError> {
        let state = self.state()?;
        if !state.mode.builds_neighbors() {
            return Err(AcceleratorError::Device(format!(
                "neighbor construction requested in {:?} mode",
                state.mode
            )));
        }

        if step.step_age == 0 || self.list.is_none() {
            let list = NeighborList::build_full(
                step.particles,
                state.neighbor_cutoff_sq,
                state.table.special_bonds(),
            );
            self.reserve(Self::working_set_bytes(step, Some(&list)))?;
            trace!("Rebuilt neighbor list with {} entries.", list.total_entries());
            self.list = Some(list);
        }

        let list = self.list.take().unwrap_or_default();
        let result = self.compute_prefix(step, list.rows(), accumulator);
        self.list = Some(list);
        result
    }

    fn neighbor_list(&self) -> Option<&NeighborList> {
        self.list.as_ref()
    }

    fn compute(
        &mut self,
        step: &StepInput<'_>,
        list: &NeighborList,
        accumulator: &mut ForceAccumulator,
    ) -> Result<usize, AcceleratorError> {
        self.state()?;
        self.reserve(Self::working_set_bytes(step, Some(list)))?;
        self.compute_prefix(step, list.rows(), accumulator)
    }

    fn teardown(&mut self) {
        if self.state.take().is_some() {
            debug!("Reference accelerator released.");
        }
        self.list = None;
    }

    fn memory_bytes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.table.memory_bytes())
            + self.list.as_ref().map_or(0, list_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::mixing::MixingRule;
    use crate::core::forcefield::params::{ForceField, PairCoeff, SpecialBondParams, StyleParams};
    use crate::core::forcefield::units::UnitSystem;
    use crate::core::models::particles::ParticleSet;
    use crate::engine::accumulator::EvFlags;
    use nalgebra::{Point3, Vector3};

    fn table() -> PairTable {
        let ff = ForceField {
            style: StyleParams {
                kappa: 1.0,
                cut_lj: 2.5,
                cut_coul: None,
                units: UnitSystem::Lj,
                dielectric: 1.0,
                mixing: MixingRule::Geometric,
                shift: false,
            },
            special_bonds: SpecialBondParams::default(),
            coeffs: vec![PairCoeff {
                types: [0, 0],
                epsilon: 1.0,
                sigma: 1.0,
                cut_lj: None,
                cut_coul: None,
            }],
        };
        PairTable::build(1, &ff).unwrap()
    }

    fn particles(n: usize) -> ParticleSet {
        let positions = (0..n)
            .map(|k| Point3::new(1.1 * k as f64, 0.0, 0.0))
            .collect();
        ParticleSet::new(positions, vec![0; n], Some(vec![0.5; n])).unwrap()
    }

    fn initialized(split: f64, table: &PairTable, mode: AcceleratorMode) -> ReferenceAccelerator {
        let mut accelerator = ReferenceAccelerator::new(split);
        accelerator
            .init(&AcceleratorInit {
                table,
                local_count: 4,
                total_count: 4,
                max_neighbors: 100,
                max_special: 0,
                cell_size: table.cell_size(0.3),
                mode,
            })
            .unwrap();
        accelerator
    }

    fn step(particles: &ParticleSet, step_age: usize) -> StepInput<'_> {
        StepInput {
            step_age,
            particles,
            flags: EvFlags::global(),
            host_time: 0.25,
        }
    }

    #[test]
    fn full_split_handles_every_row() {
        let table = table();
        let particles = particles(4);
        let mut accelerator = initialized(1.0, &table, AcceleratorMode::Neighbor);
        let mut acc = ForceAccumulator::new(4, EvFlags::global());

        let start = accelerator
            .build_and_compute(&step(&particles, 0), &DomainBounds::enclosing(&particles), &mut acc)
            .unwrap();

        assert_eq!(start, 4);
        assert_eq!(accelerator.neighbor_list().unwrap().len(), 4);
        assert!(acc.energy().total() != 0.0);
        assert_eq!(accelerator.last_host_time(), 0.25);
    }

    #[test]
    fn partial_split_leaves_a_suffix_untouched() {
        let table = table();
        let particles = particles(4);
        let mut accelerator = initialized(0.5, &table, AcceleratorMode::HybridNeighbor);
        let mut acc = ForceAccumulator::new(4, EvFlags::global());

        let start = accelerator
            .build_and_compute(&step(&particles, 0), &DomainBounds::enclosing(&particles), &mut acc)
            .unwrap();

        assert_eq!(start, 2);
        assert!(acc.forces()[0] != Vector3::zeros());
        assert_eq!(acc.forces()[2], Vector3::zeros());
        assert_eq!(acc.forces()[3], Vector3::zeros());
    }

    #[test]
    fn list_is_reused_until_the_next_rebuild() {
        let table = table();
        let particles = particles(3);
        let mut accelerator = initialized(1.0, &table, AcceleratorMode::Neighbor);
        let mut acc = ForceAccumulator::new(3, EvFlags::none());
        let bounds = DomainBounds::enclosing(&particles);

        accelerator
            .build_and_compute(&step(&particles, 0), &bounds, &mut acc)
            .unwrap();
        let first = accelerator.neighbor_list().cloned().unwrap();

        let far = ParticleSet::new(
            vec![
                Point3::origin(),
                Point3::new(50.0, 0.0, 0.0),
                Point3::new(100.0, 0.0, 0.0),
            ],
            vec![0; 3],
            Some(vec![0.5; 3]),
        )
        .unwrap();
        accelerator
            .build_and_compute(&step(&far, 3), &bounds, &mut acc)
            .unwrap();
        assert_eq!(accelerator.neighbor_list(), Some(&first));

        accelerator
            .build_and_compute(&step(&far, 0), &bounds, &mut acc)
            .unwrap();
        assert_eq!(accelerator.neighbor_list().unwrap().total_entries(), 0);
    }

    #[test]
    fn compute_uses_the_callers_list() {
        let table = table();
        let particles = particles(3);
        let mut accelerator = initialized(1.0, &table, AcceleratorMode::Force);
        let list = NeighborList::build_full(&particles, 9.0, table.special_bonds());
        let mut acc = ForceAccumulator::new(3, EvFlags::none());

        let start = accelerator.compute(&step(&particles, 0), &list, &mut acc).unwrap();

        assert_eq!(start, 3);
        assert!(accelerator.neighbor_list().is_none());
    }

    #[test]
    fn force_mode_refuses_to_build_lists() {
        let table = table();
        let particles = particles(2);
        let mut accelerator = initialized(1.0, &table, AcceleratorMode::Force);
        let mut acc = ForceAccumulator::new(2, EvFlags::none());
        let result = accelerator.build_and_compute(
            &step(&particles, 0),
            &DomainBounds::enclosing(&particles),
            &mut acc,
        );
        assert!(matches!(result, Err(AcceleratorError::Device(_))));
    }

    #[test]
    fn exceeding_the_memory_budget_fails_the_step() {
        let table = table();
        let particles = particles(4);
        let mut accelerator = ReferenceAccelerator::new(1.0).with_memory_limit(table.memory_bytes());
        accelerator
            .init(&AcceleratorInit {
                table: &table,
                local_count: 4,
                total_count: 4,
                max_neighbors: 100,
                max_special: 0,
                cell_size: table.cell_size(0.3),
                mode: AcceleratorMode::Neighbor,
            })
            .unwrap();
        let mut acc = ForceAccumulator::new(4, EvFlags::global());

        let result = accelerator.build_and_compute(
            &step(&particles, 0),
            &DomainBounds::enclosing(&particles),
            &mut acc,
        );

        assert!(matches!(result, Err(AcceleratorError::OutOfMemory { .. })));
        assert!(acc.forces().iter().all(|f| *f == Vector3::zeros()));
    }

    #[test]
    fn calls_before_init_fail() {
        let particles = particles(2);
        let mut accelerator = ReferenceAccelerator::new(1.0);
        let mut acc = ForceAccumulator::new(2, EvFlags::none());
        let result = accelerator.compute(&step(&particles, 0), &NeighborList::default(), &mut acc);
        assert_eq!(result, Err(AcceleratorError::NotInitialized));
    }

    #[test]
    fn teardown_releases_memory() {
        let table = table();
        let mut accelerator = initialized(1.0, &table, AcceleratorMode::Neighbor);
        assert!(accelerator.memory_bytes() > 0);
        accelerator.teardown();
        assert_eq!(accelerator.memory_bytes(), 0);
    }

    #[test]
    fn split_is_clamped() {
        assert_eq!(ReferenceAccelerator::new(2.0).split(), 1.0);
        assert_eq!(ReferenceAccelerator::new(-1.0).split(), 0.0);
    }
}
