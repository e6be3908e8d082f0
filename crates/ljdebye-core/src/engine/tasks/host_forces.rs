use crate::core::forcefield::potentials::lj_cut_coul_debye;
use crate::core::forcefield::table::PairTable;
use crate::core::models::neighbors::NeighborRow;
use crate::engine::accumulator::{AtomTally, EvFlags, ForceAccumulator};
use nalgebra::Point3;
use tracing::{instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Borrowed per-particle arrays the kernel reads.
#[derive(Debug, Clone, Copy)]
pub struct KernelInputs<'a> {
    pub positions: &'a [Point3<f64>],
    pub types: &'a [usize],
    pub charges: &'a [f64],
}

/// Evaluates every neighbor of one row and returns the contribution to its particle.
pub fn tally_row(
    row: &NeighborRow,
    inputs: &KernelInputs<'_>,
    table: &PairTable,
    flags: &EvFlags,
) -> AtomTally {
    let i = row.i;
    let xi = inputs.positions[i];
    let qi = inputs.charges[i];
    let itype = inputs.types[i];
    let want_energy = flags.wants_energy();
    let special_bonds = table.special_bonds();
    let screening = table.screening();

    let mut tally = AtomTally::new(i);
    for entry in &row.neighbors {
        let j = entry.index;
        let del = xi - inputs.positions[j];
        let rsq = del.norm_squared();
        let pair = table.pair(itype, inputs.types[j]);

        if rsq < pair.cutsq {
            let result = lj_cut_coul_debye(
                rsq,
                qi,
                inputs.charges[j],
                special_bonds.factors(entry.special),
                pair,
                screening,
                want_energy,
            );
            tally.add_full_visit(&del, result.fpair, result.evdwl, result.ecoul, flags);
        }
    }
    tally
}

/// Host force-accumulation loop over a contiguous slice of full-list rows.
///
/// Each row only writes its own particle's force, so rows are evaluated independently
/// into per-row tallies which are then folded into `accumulator` in row order.
#[instrument(skip_all, name = "host_forces_task", fields(rows = rows.len()))]
pub fn run(
    rows: &[NeighborRow],
    inputs: &KernelInputs<'_>,
    table: &PairTable,
    accumulator: &mut ForceAccumulator,
) {
    if rows.is_empty() {
        return;
    }
    let flags = accumulator.flags();

    #[cfg(not(feature = "parallel"))]
    let iterator = rows.iter();

    #[cfg(feature = "parallel")]
    let iterator = rows.par_iter();

    let tallies: Vec<AtomTally> = iterator
        .map(|row| tally_row(row, inputs, table, &flags))
        .collect();

    for tally in &tallies {
        accumulator.apply(tally);
    }
    trace!("Folded {} host rows into the accumulator.", tallies.len());
}
