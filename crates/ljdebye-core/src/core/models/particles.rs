use super::special::SpecialBond;
use nalgebra::Point3;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParticleError {
    #[error("Per-particle field '{field}' has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Local particle count {local} exceeds total count {total}")]
    LocalCountExceedsTotal { local: usize, total: usize },
    #[error("Charge column is present for some particles but missing for particle {0}")]
    PartialCharges(u64),
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Special-bond partners of one particle, stored by global id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialPartners {
    pub one_two: Vec<u64>,
    pub one_three: Vec<u64>,
    pub one_four: Vec<u64>,
}

impl SpecialPartners {
    /// Closest topological relationship to `tag`, searched 1-2 first.
    pub fn category_of(&self, tag: u64) -> SpecialBond {
        if self.one_two.contains(&tag) {
            SpecialBond::OneTwo
        } else if self.one_three.contains(&tag) {
            SpecialBond::OneThree
        } else if self.one_four.contains(&tag) {
            SpecialBond::OneFour
        } else {
            SpecialBond::None
        }
    }

    pub fn len(&self) -> usize {
        self.one_two.len() + self.one_three.len() + self.one_four.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only view of per-particle state for one step.
///
/// Particles `[0, local)` are owned by this process and receive forces; particles
/// `[local, total)` are ghost images that only act as neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    positions: Vec<Point3<f64>>,
    types: Vec<usize>,
    charges: Option<Vec<f64>>,
    tags: Vec<u64>,
    specials: Vec<SpecialPartners>,
    local: usize,
}

impl ParticleSet {
    /// All particles are local, tags are `1..=n` and nobody has special partners.
    pub fn new(
        positions: Vec<Point3<f64>>,
        types: Vec<usize>,
        charges: Option<Vec<f64>>,
    ) -> Result<Self, ParticleError> {
        let n = positions.len();
        check_len("types", n, types.len())?;
        if let Some(q) = &charges {
            check_len("charges", n, q.len())?;
        }
        Ok(Self {
            positions,
            types,
            charges,
            tags: (1..=n as u64).collect(),
            specials: vec![SpecialPartners::default(); n],
            local: n,
        })
    }

    pub fn with_local_count(mut self, local: usize) -> Result<Self, ParticleError> {
        if local > self.total() {
            return Err(ParticleError::LocalCountExceedsTotal {
                local,
                total: self.total(),
            });
        }
        self.local = local;
        Ok(self)
    }

    pub fn with_tags(mut self, tags: Vec<u64>) -> Result<Self, ParticleError> {
        check_len("tags", self.total(), tags.len())?;
        self.tags = tags;
        Ok(self)
    }

    pub fn with_specials(mut self, specials: Vec<SpecialPartners>) -> Result<Self, ParticleError> {
        check_len("specials", self.total(), specials.len())?;
        self.specials = specials;
        Ok(self)
    }

    /// Reads `id,type,x,y,z[,charge]` records. All particles are local.
    pub fn from_csv(path: &Path) -> Result<Self, ParticleError> {
        let csv_error = |e| ParticleError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let mut records = Vec::new();
        for result in reader.deserialize::<ParticleRecord>() {
            records.push(result.map_err(csv_error)?);
        }

        let has_charges = records.first().is_some_and(|r| r.charge.is_some());
        let mut charges = Vec::with_capacity(records.len());
        if has_charges {
            for record in &records {
                charges.push(record.charge.ok_or(ParticleError::PartialCharges(record.id))?);
            }
        }

        let positions = records
            .iter()
            .map(|r| Point3::new(r.x, r.y, r.z))
            .collect();
        let types = records.iter().map(|r| r.r#type).collect();
        let tags = records.iter().map(|r| r.id).collect();

        Self::new(positions, types, has_charges.then_some(charges))?.with_tags(tags)
    }

    #[inline]
    pub fn local(&self) -> usize {
        self.local
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn types(&self) -> &[usize] {
        &self.types
    }

    /// `None` when the particle style carries no charge attribute.
    #[inline]
    pub fn charges(&self) -> Option<&[f64]> {
        self.charges.as_deref()
    }

    #[inline]
    pub fn tags(&self) -> &[u64] {
        &self.tags
    }

    #[inline]
    pub fn specials(&self) -> &[SpecialPartners] {
        &self.specials
    }

    pub fn max_specials(&self) -> usize {
        self.specials.iter().map(SpecialPartners::len).max().unwrap_or(0)
    }

    pub fn max_type(&self) -> Option<usize> {
        self.types.iter().copied().max()
    }
}

#[derive(Debug, Deserialize)]
struct ParticleRecord {
    id: u64,
    r#type: usize,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    charge: Option<f64>,
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), ParticleError> {
    if expected == found {
        Ok(())
    } else {
        Err(ParticleError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}
