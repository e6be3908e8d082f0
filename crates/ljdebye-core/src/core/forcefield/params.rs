use super::mixing::MixingRule;
use super::units::UnitSystem;
use crate::core::models::special::SpecialBonds;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

fn default_dielectric() -> f64 {
    1.0
}

/// Global settings of the pair style.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StyleParams {
    /// Inverse Debye screening length.
    pub kappa: f64,
    /// Global Lennard-Jones cutoff, used by pairs that do not set their own.
    pub cut_lj: f64,
    /// Global Coulomb cutoff. Defaults to `cut_lj`.
    #[serde(default)]
    pub cut_coul: Option<f64>,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default = "default_dielectric")]
    pub dielectric: f64,
    #[serde(default)]
    pub mixing: MixingRule,
    /// Shift the LJ energy to zero at its cutoff.
    #[serde(default)]
    pub shift: bool,
}

impl StyleParams {
    pub fn cut_coul(&self) -> f64 {
        self.cut_coul.unwrap_or(self.cut_lj)
    }

    /// Coulomb conversion constant including the dielectric.
    pub fn qqrd2e(&self) -> f64 {
        self.units.qqrd2e(self.dielectric)
    }
}

/// Scaling factors for 1-2, 1-3 and 1-4 neighbors.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SpecialBondParams {
    #[serde(default)]
    pub lj: [f64; 3],
    #[serde(default)]
    pub coul: [f64; 3],
}

impl From<SpecialBondParams> for SpecialBonds {
    fn from(p: SpecialBondParams) -> Self {
        SpecialBonds::new(p.lj, p.coul)
    }
}

/// Coefficients for one type pair. Types are 0-based.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PairCoeff {
    pub types: [usize; 2],
    pub epsilon: f64,
    pub sigma: f64,
    #[serde(default)]
    pub cut_lj: Option<f64>,
    #[serde(default)]
    pub cut_coul: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForceField {
    pub style: StyleParams,
    #[serde(default)]
    pub special_bonds: SpecialBondParams,
    #[serde(default, rename = "coeff")]
    pub coeffs: Vec<PairCoeff>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl ForceField {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn special_bonds(&self) -> SpecialBonds {
        self.special_bonds.into()
    }
}
