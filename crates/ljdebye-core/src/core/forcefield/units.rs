use serde::Deserialize;

/// Unit systems understood by the pair style.
///
/// Only the Coulomb conversion factor `qqr2e` depends on the unit system inside this
/// crate; positions, energies and forces are taken as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UnitSystem {
    /// Reduced Lennard-Jones units.
    #[default]
    Lj,
    /// Angstrom, kcal/mol, elementary charge.
    Real,
    /// Angstrom, eV, elementary charge.
    Metal,
    Si,
    Cgs,
    Electron,
    Micro,
    Nano,
}

impl UnitSystem {
    /// Coulomb conversion constant `q_i q_j / r` to energy for this unit system.
    pub fn qqr2e(self) -> f64 {
        match self {
            UnitSystem::Lj => 1.0,
            UnitSystem::Real => 332.06371,
            UnitSystem::Metal => 14.399645,
            UnitSystem::Si => 8.9876e9,
            UnitSystem::Cgs => 1.0,
            UnitSystem::Electron => 1.0,
            UnitSystem::Micro => 8.987556e6,
            UnitSystem::Nano => 230.7078669,
        }
    }

    /// `qqr2e` divided by the relative dielectric constant.
    #[inline]
    pub fn qqrd2e(self, dielectric: f64) -> f64 {
        self.qqr2e() / dielectric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduced_units_have_unit_coulomb_constant() {
        assert_eq!(UnitSystem::Lj.qqr2e(), 1.0);
        assert_eq!(UnitSystem::default(), UnitSystem::Lj);
    }

    #[test]
    fn dielectric_divides_conversion_constant() {
        let qqrd2e = UnitSystem::Real.qqrd2e(2.0);
        assert!((qqrd2e - 332.06371 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn unit_names_deserialize_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            units: UnitSystem,
        }
        let parsed: Wrapper = toml::from_str(r#"units = "metal""#).unwrap();
        assert_eq!(parsed.units, UnitSystem::Metal);
    }
}
