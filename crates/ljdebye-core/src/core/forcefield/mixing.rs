use serde::Deserialize;

/// Rule used to derive cross-type coefficients from the diagonal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MixingRule {
    #[default]
    Geometric,
    Arithmetic,
    Sixthpower,
}

impl MixingRule {
    /// Mixes two well depths. `sig1`/`sig2` only matter for the sixth-power rule.
    pub fn mix_energy(self, eps1: f64, eps2: f64, sig1: f64, sig2: f64) -> f64 {
        match self {
            MixingRule::Geometric | MixingRule::Arithmetic => (eps1 * eps2).sqrt(),
            MixingRule::Sixthpower => {
                let s13 = sig1.powi(3);
                let s23 = sig2.powi(3);
                2.0 * (eps1 * eps2).sqrt() * s13 * s23 / (s13 * s13 + s23 * s23)
            }
        }
    }

    /// Mixes two lengths (sigma or cutoff).
    pub fn mix_distance(self, sig1: f64, sig2: f64) -> f64 {
        match self {
            MixingRule::Geometric => (sig1 * sig2).sqrt(),
            MixingRule::Arithmetic => 0.5 * (sig1 + sig2),
            MixingRule::Sixthpower => (0.5 * (sig1.powi(6) + sig2.powi(6))).powf(1.0 / 6.0),
        }
    }
}
