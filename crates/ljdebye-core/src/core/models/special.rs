/// Topological relationship between two particles that scales their non-bonded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SpecialBond {
    /// Not a special pair; both factors are 1.
    #[default]
    None,
    /// Directly bonded.
    OneTwo,
    /// Separated by two bonds (angle partners).
    OneThree,
    /// Separated by three bonds (dihedral partners).
    OneFour,
}

impl SpecialBond {
    pub const ALL: [SpecialBond; 4] = [
        SpecialBond::None,
        SpecialBond::OneTwo,
        SpecialBond::OneThree,
        SpecialBond::OneFour,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category for a 2-bit selector. Higher bits are ignored.
    #[inline]
    pub fn from_bits(bits: u32) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }
}

/// What the neighbor machinery does with a pair in a given special category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialTreatment {
    /// Both factors are zero: the pair never enters the list.
    Exclude,
    /// Both factors are one: stored as a plain neighbor.
    Plain,
    /// Stored with its category so the kernel can scale it.
    Scaled,
}

/// LJ and Coulomb scaling factors indexed by [`SpecialBond`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialBonds {
    lj: [f64; 4],
    coul: [f64; 4],
}

impl Default for SpecialBonds {
    fn default() -> Self {
        Self::new([0.0; 3], [0.0; 3])
    }
}

impl SpecialBonds {
    /// Builds the table from 1-2, 1-3, 1-4 factors; non-special pairs always get 1.
    pub fn new(lj: [f64; 3], coul: [f64; 3]) -> Self {
        Self {
            lj: [1.0, lj[0], lj[1], lj[2]],
            coul: [1.0, coul[0], coul[1], coul[2]],
        }
    }

    /// Every category interacts at full strength.
    pub fn unscaled() -> Self {
        Self::new([1.0; 3], [1.0; 3])
    }

    #[inline]
    pub fn factors(&self, bond: SpecialBond) -> SpecialFactors {
        SpecialFactors {
            lj: self.lj[bond.index()],
            coul: self.coul[bond.index()],
        }
    }

    pub fn lj(&self) -> &[f64; 4] {
        &self.lj
    }

    pub fn coul(&self) -> &[f64; 4] {
        &self.coul
    }

    pub fn treatment(&self, bond: SpecialBond) -> SpecialTreatment {
        let SpecialFactors { lj, coul } = self.factors(bond);
        if lj == 0.0 && coul == 0.0 {
            SpecialTreatment::Exclude
        } else if lj == 1.0 && coul == 1.0 {
            SpecialTreatment::Plain
        } else {
            SpecialTreatment::Scaled
        }
    }
}

/// Scaling factors applied to one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialFactors {
    pub lj: f64,
    pub coul: f64,
}

impl SpecialFactors {
    pub const UNSCALED: SpecialFactors = SpecialFactors { lj: 1.0, coul: 1.0 };
}
