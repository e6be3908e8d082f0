use crate::cli::TableArgs;
use crate::error::Result;
use ljdebye::core::forcefield::params::ForceField;
use ljdebye::core::forcefield::table::PairTable;
use ljdebye::engine::config::ConfigError;
use ljdebye::engine::error::EngineError;
use std::fmt::Write;
use tracing::info;

pub fn run(args: TableArgs) -> Result<()> {
    info!("Loading force field from {:?}", &args.force_field);
    let force_field = ForceField::load(&args.force_field).map_err(EngineError::from)?;
    let ntypes = args.types.unwrap_or_else(|| {
        force_field
            .coeffs
            .iter()
            .flat_map(|c| c.types)
            .max()
            .map_or(0, |t| t + 1)
    });

    let table = PairTable::build(ntypes, &force_field)
        .map_err(|e| EngineError::from(ConfigError::from(e)))?;
    print!("{}", render(&table));
    Ok(())
}

/// One line per interacting type pair `i <= j`, then the style-wide constants.
fn render(table: &PairTable) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>4} {:>10} {:>10} {:>10} {:>10} {:>6} {:>14}",
        "i", "j", "epsilon", "sigma", "cut_lj", "cut_coul", "mixed", "offset"
    );
    for i in 0..table.ntypes() {
        for j in i..table.ntypes() {
            let Some(coeff) = table.coeff(i, j) else {
                continue;
            };
            let _ = writeln!(
                out,
                "{:>4} {:>4} {:>10.5} {:>10.5} {:>10.5} {:>10.5} {:>6} {:>14.6e}",
                i,
                j,
                coeff.epsilon,
                coeff.sigma,
                coeff.cut_lj,
                coeff.cut_coul,
                if coeff.mixed { "yes" } else { "no" },
                table.pair(i, j).offset
            );
        }
    }
    let screening = table.screening();
    let _ = writeln!(
        out,
        "kappa = {}, qqrd2e = {}, max cutoff = {:.5}",
        screening.kappa,
        screening.qqrd2e,
        table.max_cutoff_sq().sqrt()
    );
    out
}
