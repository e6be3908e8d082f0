use super::accelerator::AcceleratorMode;
use crate::core::forcefield::table::TableError;
use thiserror::Error;

/// Default `neigh_modify one` value: the most neighbors a single particle may have.
pub const DEFAULT_NEIGHBOR_ONE: usize = 2000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value {value} for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Pair style lj/cut/coul/debye requires the per-particle charge attribute")]
    MissingCharge,

    #[error("Cannot use Newton's third law pair optimization with the accelerated lj/cut/coul/debye pair style")]
    NewtonPairEnabled,

    #[error("Particle type {type_index} has no entry in a table with {ntypes} types")]
    UnknownParticleType { type_index: usize, ntypes: usize },

    #[error("Invalid pair parameters: {0}")]
    Table(#[from] TableError),
}

/// Runtime settings of the force engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Extra distance added to the longest cutoff when sizing neighbor bins.
    pub skin: f64,
    /// Newton's third-law pair optimization. Incompatible with this pair style.
    pub newton_pair: bool,
    /// How work is split with the accelerated collaborator. Fixed for the whole run.
    pub mode: AcceleratorMode,
    /// Upper bound on neighbors of one particle.
    pub neighbor_one: usize,
}

impl EngineConfig {
    /// Per-atom neighbor budget handed to the accelerator, 5% of `neighbor_one`.
    pub fn max_neighbors_hint(&self) -> usize {
        (0.05 * self.neighbor_one as f64) as usize
    }
}

#[derive(Default)]
pub struct EngineConfigBuilder {
    skin: Option<f64>,
    newton_pair: Option<bool>,
    mode: Option<AcceleratorMode>,
    neighbor_one: Option<usize>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skin(mut self, skin: f64) -> Self {
        self.skin = Some(skin);
        self
    }
    pub fn newton_pair(mut self, enabled: bool) -> Self {
        self.newton_pair = Some(enabled);
        self
    }
    pub fn mode(mut self, mode: AcceleratorMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn neighbor_one(mut self, n: usize) -> Self {
        self.neighbor_one = Some(n);
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let skin = self.skin.ok_or(ConfigError::MissingParameter("skin"))?;
        if !(skin >= 0.0 && skin.is_finite()) {
            return Err(ConfigError::InvalidParameter { name: "skin", value: skin });
        }
        Ok(EngineConfig {
            skin,
            newton_pair: self.newton_pair.unwrap_or(false),
            mode: self.mode.ok_or(ConfigError::MissingParameter("mode"))?,
            neighbor_one: self.neighbor_one.unwrap_or(DEFAULT_NEIGHBOR_ONE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults_for_optional_fields() {
        let config = EngineConfigBuilder::new()
            .skin(0.3)
            .mode(AcceleratorMode::Force)
            .build()
            .unwrap();
        assert_eq!(config.skin, 0.3);
        assert!(!config.newton_pair);
        assert_eq!(config.neighbor_one, DEFAULT_NEIGHBOR_ONE);
        assert_eq!(config.max_neighbors_hint(), 100);
    }

    #[test]
    fn build_fails_without_required_fields() {
        let missing_skin = EngineConfigBuilder::new().mode(AcceleratorMode::Neighbor).build();
        assert_eq!(missing_skin, Err(ConfigError::MissingParameter("skin")));

        let missing_mode = EngineConfigBuilder::new().skin(0.3).build();
        assert_eq!(missing_mode, Err(ConfigError::MissingParameter("mode")));
    }

    #[test]
    fn build_rejects_negative_skin() {
        let result = EngineConfigBuilder::new()
            .skin(-1.0)
            .mode(AcceleratorMode::Force)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "skin", .. })
        ));
    }

    #[test]
    fn builder_overrides_are_kept() {
        let config = EngineConfigBuilder::new()
            .skin(0.5)
            .mode(AcceleratorMode::HybridNeighbor)
            .newton_pair(true)
            .neighbor_one(400)
            .build()
            .unwrap();
        assert!(config.newton_pair);
        assert_eq!(config.max_neighbors_hint(), 20);
        assert_eq!(config.mode, AcceleratorMode::HybridNeighbor);
    }
}
