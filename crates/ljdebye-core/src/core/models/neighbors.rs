use super::particles::ParticleSet;
use super::special::{SpecialBond, SpecialBonds, SpecialTreatment};
use nalgebra::distance_squared;
use thiserror::Error;

/// Bits of a packed neighbor word that hold the particle index.
pub const NEIGHBOR_INDEX_MASK: u32 = 0x1FFF_FFFF;
/// Position of the 2-bit special-bond selector in a packed neighbor word.
pub const SPECIAL_SHIFT: u32 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NeighborError {
    #[error("Packed list has {rows} rows but {counts} neighbor counts")]
    RowCountMismatch { rows: usize, counts: usize },
    #[error("Row {row} declares {declared} neighbors but only {available} are stored")]
    TruncatedRow {
        row: usize,
        declared: usize,
        available: usize,
    },
    #[error("Row {row} references particle {index}, but only {total} particles exist")]
    IndexOutOfRange {
        row: usize,
        index: usize,
        total: usize,
    },
}

/// One candidate `j` of a row, with its special-bond category decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborEntry {
    pub index: usize,
    pub special: SpecialBond,
}

impl NeighborEntry {
    pub fn plain(index: usize) -> Self {
        Self {
            index,
            special: SpecialBond::None,
        }
    }

    /// Decodes a packed word. Bit 29 carries no special information and is dropped.
    #[inline]
    pub fn from_packed(raw: u32) -> Self {
        Self {
            index: (raw & NEIGHBOR_INDEX_MASK) as usize,
            special: SpecialBond::from_bits(raw >> SPECIAL_SHIFT),
        }
    }

    #[inline]
    pub fn to_packed(self) -> u32 {
        (self.index as u32 & NEIGHBOR_INDEX_MASK) | ((self.special.index() as u32) << SPECIAL_SHIFT)
    }
}

/// Neighbors of a single owned particle `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborRow {
    pub i: usize,
    pub neighbors: Vec<NeighborEntry>,
}

/// A full neighbor list: every interacting ordered pair appears from both ends.
///
/// Rows are visited in order; the split index handed out by an accelerator refers to
/// row positions, not particle indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborList {
    rows: Vec<NeighborRow>,
}

impl NeighborList {
    pub fn new(rows: Vec<NeighborRow>) -> Self {
        Self { rows }
    }

    /// Decodes a packed `ilist`/`numneigh`/`firstneigh` triple once, up front.
    pub fn from_packed(
        ilist: &[usize],
        numneigh: &[usize],
        firstneigh: &[Vec<u32>],
    ) -> Result<Self, NeighborError> {
        if ilist.len() != numneigh.len() || ilist.len() != firstneigh.len() {
            return Err(NeighborError::RowCountMismatch {
                rows: ilist.len(),
                counts: numneigh.len().min(firstneigh.len()),
            });
        }

        let rows = ilist
            .iter()
            .zip(numneigh)
            .zip(firstneigh)
            .enumerate()
            .map(|(row, ((&i, &count), words))| {
                let words = words.get(..count).ok_or(NeighborError::TruncatedRow {
                    row,
                    declared: count,
                    available: words.len(),
                })?;
                Ok(NeighborRow {
                    i,
                    neighbors: words.iter().copied().map(NeighborEntry::from_packed).collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    /// Brute-force full list over the owned particles of `particles`.
    ///
    /// A pair is listed when its separation is below `cutoff_sq`. Ghost images of `i`
    /// itself are ordinary neighbors. Special pairs are tagged, kept plain or dropped
    /// according to `special_bonds`.
    pub fn build_full(particles: &ParticleSet, cutoff_sq: f64, special_bonds: &SpecialBonds) -> Self {
        let positions = particles.positions();
        let tags = particles.tags();
        let specials = particles.specials();

        let rows = (0..particles.local())
            .map(|i| {
                let neighbors = (0..particles.total())
                    .filter(|&j| j != i)
                    .filter(|&j| distance_squared(&positions[i], &positions[j]) < cutoff_sq)
                    .filter_map(|j| {
                        let category = specials[i].category_of(tags[j]);
                        match special_bonds.treatment(category) {
                            SpecialTreatment::Exclude => None,
                            SpecialTreatment::Plain => Some(NeighborEntry::plain(j)),
                            SpecialTreatment::Scaled => Some(NeighborEntry {
                                index: j,
                                special: category,
                            }),
                        }
                    })
                    .collect();
                NeighborRow { i, neighbors }
            })
            .collect();

        Self { rows }
    }

    /// Checks that every row particle and neighbor exists in a set of `total` particles.
    pub fn check_indices(&self, total: usize) -> Result<(), NeighborError> {
        for (row, entry) in self.rows.iter().enumerate() {
            let out_of_range = std::iter::once(entry.i)
                .chain(entry.neighbors.iter().map(|n| n.index))
                .find(|&index| index >= total);
            if let Some(index) = out_of_range {
                return Err(NeighborError::IndexOutOfRange { row, index, total });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn rows(&self) -> &[NeighborRow] {
        &self.rows
    }

    /// Number of `i` rows (`inum`).
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_neighbors(&self) -> usize {
        self.rows.iter().map(|r| r.neighbors.len()).max().unwrap_or(0)
    }

    pub fn total_entries(&self) -> usize {
        self.rows.iter().map(|r| r.neighbors.len()).sum()
    }
}
