use super::mixing::MixingRule;
use super::params::{ForceField, PairCoeff, StyleParams};
use crate::core::models::special::SpecialBonds;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum TableError {
    #[error("Pair coefficient references type {type_index}, but only {ntypes} types exist")]
    TypeOutOfRange { type_index: usize, ntypes: usize },
    #[error("Invalid value {value} for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Coefficients of one type pair after defaults and mixing have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCoeff {
    pub epsilon: f64,
    pub sigma: f64,
    pub cut_lj: f64,
    pub cut_coul: f64,
    /// `true` when the pair was derived from the diagonal entries.
    pub mixed: bool,
}

/// Precomputed kernel coefficients for one type pair.
///
/// All squared cutoffs are non-negative; a zero `cutsq` means the pair never interacts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairParams {
    pub cutsq: f64,
    pub cut_ljsq: f64,
    pub cut_coulsq: f64,
    pub lj1: f64,
    pub lj2: f64,
    pub lj3: f64,
    pub lj4: f64,
    /// LJ energy at `cut_lj`, subtracted so the shifted potential vanishes there.
    pub offset: f64,
}

impl PairParams {
    /// Derives kernel coefficients from resolved coefficients.
    pub fn from_coeff(coeff: &ResolvedCoeff, shift: bool) -> Self {
        let cut = coeff.cut_lj.max(coeff.cut_coul);
        let sig6 = coeff.sigma.powi(6);
        let sig12 = sig6 * sig6;

        let offset = if shift && coeff.cut_lj > 0.0 {
            let ratio = coeff.sigma / coeff.cut_lj;
            4.0 * coeff.epsilon * (ratio.powi(12) - ratio.powi(6))
        } else {
            0.0
        };

        Self {
            cutsq: cut * cut,
            cut_ljsq: coeff.cut_lj * coeff.cut_lj,
            cut_coulsq: coeff.cut_coul * coeff.cut_coul,
            lj1: 48.0 * coeff.epsilon * sig12,
            lj2: 24.0 * coeff.epsilon * sig6,
            lj3: 4.0 * coeff.epsilon * sig12,
            lj4: 4.0 * coeff.epsilon * sig6,
            offset,
        }
    }
}

/// Screened-Coulomb constants shared by every pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebyeScreening {
    /// Inverse Debye length.
    pub kappa: f64,
    /// Coulomb conversion constant, already divided by the dielectric.
    pub qqrd2e: f64,
}

/// Immutable, symmetric type-pair parameter table.
///
/// Built once at setup and replaced wholesale when the force field changes; the
/// kernel only ever sees it through shared references.
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    ntypes: usize,
    params: Vec<PairParams>,
    coeffs: Vec<Option<ResolvedCoeff>>,
    screening: DebyeScreening,
    special_bonds: SpecialBonds,
    max_cutoff_sq: f64,
}

impl PairTable {
    pub fn build(ntypes: usize, force_field: &ForceField) -> Result<Self, TableError> {
        let style = &force_field.style;
        validate_style(style)?;

        let mut explicit: Vec<Option<&PairCoeff>> = vec![None; ntypes * ntypes];
        for coeff in &force_field.coeffs {
            let [a, b] = coeff.types;
            for type_index in [a, b] {
                if type_index >= ntypes {
                    return Err(TableError::TypeOutOfRange { type_index, ntypes });
                }
            }
            validate_coeff(coeff)?;
            explicit[a * ntypes + b] = Some(coeff);
            explicit[b * ntypes + a] = Some(coeff);
        }

        let mut params = vec![PairParams::default(); ntypes * ntypes];
        let mut coeffs = vec![None; ntypes * ntypes];
        let mut max_cutoff_sq = 0.0_f64;

        for i in 0..ntypes {
            for j in i..ntypes {
                let resolved = match explicit[i * ntypes + j] {
                    Some(coeff) => Some(resolve_explicit(coeff, style)),
                    None => match (explicit[i * ntypes + i], explicit[j * ntypes + j]) {
                        (Some(ci), Some(cj)) => Some(resolve_mixed(ci, cj, style)),
                        _ => None,
                    },
                };

                let Some(resolved) = resolved else {
                    continue;
                };
                let pair = PairParams::from_coeff(&resolved, style.shift);
                max_cutoff_sq = max_cutoff_sq.max(pair.cutsq);

                params[i * ntypes + j] = pair;
                params[j * ntypes + i] = pair;
                coeffs[i * ntypes + j] = Some(resolved);
                coeffs[j * ntypes + i] = Some(resolved);
            }
        }

        Ok(Self {
            ntypes,
            params,
            coeffs,
            screening: DebyeScreening {
                kappa: style.kappa,
                qqrd2e: style.qqrd2e(),
            },
            special_bonds: force_field.special_bonds(),
            max_cutoff_sq,
        })
    }

    #[inline]
    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    #[inline]
    pub fn pair(&self, itype: usize, jtype: usize) -> &PairParams {
        &self.params[itype * self.ntypes + jtype]
    }

    pub fn coeff(&self, itype: usize, jtype: usize) -> Option<&ResolvedCoeff> {
        self.coeffs[itype * self.ntypes + jtype].as_ref()
    }

    #[inline]
    pub fn screening(&self) -> &DebyeScreening {
        &self.screening
    }

    #[inline]
    pub fn special_bonds(&self) -> &SpecialBonds {
        &self.special_bonds
    }

    /// Largest combined cutoff squared over all interacting pairs, 0 when none interact.
    pub fn max_cutoff_sq(&self) -> f64 {
        self.max_cutoff_sq
    }

    /// Bin size for a neighbor search: the longest cutoff plus the skin.
    pub fn cell_size(&self, skin: f64) -> f64 {
        self.max_cutoff_sq.sqrt() + skin
    }

    pub fn memory_bytes(&self) -> usize {
        self.params.len() * std::mem::size_of::<PairParams>()
            + self.coeffs.len() * std::mem::size_of::<Option<ResolvedCoeff>>()
    }
}

fn resolve_explicit(coeff: &PairCoeff, style: &StyleParams) -> ResolvedCoeff {
    ResolvedCoeff {
        epsilon: coeff.epsilon,
        sigma: coeff.sigma,
        cut_lj: coeff.cut_lj.unwrap_or(style.cut_lj),
        cut_coul: coeff.cut_coul.unwrap_or_else(|| style.cut_coul()),
        mixed: false,
    }
}

fn resolve_mixed(ci: &PairCoeff, cj: &PairCoeff, style: &StyleParams) -> ResolvedCoeff {
    let rule: MixingRule = style.mixing;
    let ii = resolve_explicit(ci, style);
    let jj = resolve_explicit(cj, style);
    ResolvedCoeff {
        epsilon: rule.mix_energy(ii.epsilon, jj.epsilon, ii.sigma, jj.sigma),
        sigma: rule.mix_distance(ii.sigma, jj.sigma),
        cut_lj: rule.mix_distance(ii.cut_lj, jj.cut_lj),
        cut_coul: rule.mix_distance(ii.cut_coul, jj.cut_coul),
        mixed: true,
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), TableError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TableError::InvalidParameter { name, value })
    }
}

fn validate_style(style: &StyleParams) -> Result<(), TableError> {
    non_negative("kappa", style.kappa)?;
    non_negative("cut-lj", style.cut_lj)?;
    non_negative("cut-coul", style.cut_coul())?;
    if !(style.dielectric > 0.0) {
        return Err(TableError::InvalidParameter {
            name: "dielectric",
            value: style.dielectric,
        });
    }
    Ok(())
}

fn validate_coeff(coeff: &PairCoeff) -> Result<(), TableError> {
    non_negative("epsilon", coeff.epsilon)?;
    non_negative("sigma", coeff.sigma)?;
    if let Some(cut) = coeff.cut_lj {
        non_negative("cut-lj", cut)?;
    }
    if let Some(cut) = coeff.cut_coul {
        non_negative("cut-coul", cut)?;
    }
    Ok(())
}
