use super::table::{DebyeScreening, PairParams};
use crate::core::models::special::SpecialFactors;

/// Result of one pair evaluation.
///
/// `fpair` is the radial force divided by `r`, so the force on `i` is `del * fpair`
/// with `del = x_i - x_j`. Energies are already scaled by the special factors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairInteraction {
    pub fpair: f64,
    pub evdwl: f64,
    pub ecoul: f64,
}

/// Cut Lennard-Jones plus Debye-screened Coulomb interaction for one pair.
///
/// Returns zero when `rsq >= pair.cutsq`. Each term is also gated by its own cutoff,
/// so a pair can sit inside one and outside the other. The raw force terms are
/// scaled once, when they are combined into `fpair`.
///
/// `rsq` must be strictly positive.
#[inline]
pub fn lj_cut_coul_debye(
    rsq: f64,
    qi: f64,
    qj: f64,
    factors: SpecialFactors,
    pair: &PairParams,
    screening: &DebyeScreening,
    want_energy: bool,
) -> PairInteraction {
    if rsq >= pair.cutsq {
        return PairInteraction::default();
    }

    let r2inv = 1.0 / rsq;
    let in_coul = rsq < pair.cut_coulsq;
    let in_lj = rsq < pair.cut_ljsq;

    let mut rinv = 0.0;
    let mut screened = 0.0;
    let forcecoul = if in_coul {
        let r = rsq.sqrt();
        rinv = 1.0 / r;
        screened = (-screening.kappa * r).exp();
        screening.qqrd2e * qi * qj * screened * (screening.kappa + rinv)
    } else {
        0.0
    };

    let r6inv = r2inv * r2inv * r2inv;
    let forcelj = if in_lj {
        r6inv * (pair.lj1 * r6inv - pair.lj2)
    } else {
        0.0
    };

    let fpair = (factors.coul * forcecoul + factors.lj * forcelj) * r2inv;

    let (evdwl, ecoul) = if want_energy {
        let ecoul = if in_coul {
            factors.coul * screening.qqrd2e * qi * qj * rinv * screened
        } else {
            0.0
        };
        let evdwl = if in_lj {
            factors.lj * (r6inv * (pair.lj3 * r6inv - pair.lj4) - pair.offset)
        } else {
            0.0
        };
        (evdwl, ecoul)
    } else {
        (0.0, 0.0)
    };

    PairInteraction {
        fpair,
        evdwl,
        ecoul,
    }
}
