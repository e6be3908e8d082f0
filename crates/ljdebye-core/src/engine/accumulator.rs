use crate::core::forcefield::term::EnergyTerm;
use nalgebra::Vector3;

/// Virial components in `xx, yy, zz, xy, xz, yz` order.
pub type Virial = [f64; 6];

/// Weight of one ordered visit in a full neighbor list; both ends are visited.
pub const FULL_LIST_TALLY_WEIGHT: f64 = 0.5;

/// Which energy and virial tallies a step has to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvFlags {
    pub energy: bool,
    pub virial: bool,
    pub per_atom_energy: bool,
    pub per_atom_virial: bool,
}

impl EvFlags {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn global() -> Self {
        Self {
            energy: true,
            virial: true,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            energy: true,
            virial: true,
            per_atom_energy: true,
            per_atom_virial: true,
        }
    }

    /// The kernel has to produce energies.
    #[inline]
    pub fn wants_energy(&self) -> bool {
        self.energy || self.per_atom_energy
    }

    #[inline]
    pub fn wants_virial(&self) -> bool {
        self.virial || self.per_atom_virial
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.wants_energy() || self.wants_virial()
    }
}

/// Everything one owned particle `i` contributes during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomTally {
    pub i: usize,
    pub force: Vector3<f64>,
    pub energy: EnergyTerm,
    pub virial: Virial,
}

impl AtomTally {
    pub fn new(i: usize) -> Self {
        Self {
            i,
            force: Vector3::zeros(),
            energy: EnergyTerm::default(),
            virial: [0.0; 6],
        }
    }

    /// Adds one ordered full-list visit: the force goes to `i` in full, energy and
    /// virial are weighted by [`FULL_LIST_TALLY_WEIGHT`].
    #[inline]
    pub fn add_full_visit(
        &mut self,
        del: &Vector3<f64>,
        fpair: f64,
        evdwl: f64,
        ecoul: f64,
        flags: &EvFlags,
    ) {
        self.force += del * fpair;

        if flags.wants_energy() {
            self.energy += EnergyTerm::new(evdwl, ecoul) * FULL_LIST_TALLY_WEIGHT;
        }
        if flags.wants_virial() {
            let v = pair_virial(del, fpair);
            for (acc, component) in self.virial.iter_mut().zip(v) {
                *acc += FULL_LIST_TALLY_WEIGHT * component;
            }
        }
    }
}

#[inline]
fn pair_virial(del: &Vector3<f64>, fpair: f64) -> Virial {
    [
        del.x * del.x * fpair,
        del.y * del.y * fpair,
        del.z * del.z * fpair,
        del.x * del.y * fpair,
        del.x * del.z * fpair,
        del.y * del.z * fpair,
    ]
}

/// Per-particle forces plus global and per-atom energy/virial tallies for one step.
///
/// Force rows are accumulated, never overwritten, so the accelerated path and the host
/// loop can both add into the same accumulator as long as they own disjoint rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceAccumulator {
    forces: Vec<Vector3<f64>>,
    energy: EnergyTerm,
    virial: Virial,
    per_atom_energy: Option<Vec<f64>>,
    per_atom_virial: Option<Vec<Virial>>,
    flags: EvFlags,
}

impl ForceAccumulator {
    pub fn new(n: usize, flags: EvFlags) -> Self {
        let mut accumulator = Self {
            forces: Vec::new(),
            energy: EnergyTerm::default(),
            virial: [0.0; 6],
            per_atom_energy: None,
            per_atom_virial: None,
            flags,
        };
        accumulator.reset(n, flags);
        accumulator
    }

    /// Zeroes everything and resizes to `n` particles. Called once per step.
    pub fn reset(&mut self, n: usize, flags: EvFlags) {
        self.flags = flags;
        self.forces.clear();
        self.forces.resize(n, Vector3::zeros());
        self.energy = EnergyTerm::default();
        self.virial = [0.0; 6];
        self.per_atom_energy = flags.per_atom_energy.then(|| vec![0.0; n]);
        self.per_atom_virial = flags.per_atom_virial.then(|| vec![[0.0; 6]; n]);
    }

    /// Folds one particle's contribution into the step totals.
    pub fn apply(&mut self, tally: &AtomTally) {
        self.forces[tally.i] += tally.force;

        if self.flags.energy {
            self.energy += tally.energy;
        }
        if self.flags.virial {
            for (acc, component) in self.virial.iter_mut().zip(tally.virial) {
                *acc += component;
            }
        }
        if let Some(eatom) = self.per_atom_energy.as_mut() {
            eatom[tally.i] += tally.energy.total();
        }
        if let Some(vatom) = self.per_atom_virial.as_mut() {
            for (acc, component) in vatom[tally.i].iter_mut().zip(tally.virial) {
                *acc += component;
            }
        }
    }

    #[inline]
    pub fn flags(&self) -> EvFlags {
        self.flags
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn forces(&self) -> &[Vector3<f64>] {
        &self.forces
    }

    pub fn energy(&self) -> EnergyTerm {
        self.energy
    }

    pub fn virial(&self) -> Virial {
        self.virial
    }

    pub fn per_atom_energy(&self) -> Option<&[f64]> {
        self.per_atom_energy.as_deref()
    }

    pub fn per_atom_virial(&self) -> Option<&[Virial]> {
        self.per_atom_virial.as_deref()
    }

    /// Bytes held by the per-atom tally arrays.
    pub fn memory_bytes(&self) -> usize {
        self.per_atom_energy
            .as_ref()
            .map_or(0, |e| e.len() * std::mem::size_of::<f64>())
            + self
                .per_atom_virial
                .as_ref()
                .map_or(0, |v| v.len() * std::mem::size_of::<Virial>())
    }
}
