use crate::cli::ComputeArgs;
use crate::error::{CliError, Result};
use crate::utils::output::write_forces;
use crate::utils::progress::CliProgressHandler;
use ljdebye::{
    core::{forcefield::params::ForceField, models::particles::ParticleSet},
    engine::{
        accumulator::EvFlags,
        config::{EngineConfig, EngineConfigBuilder},
        error::EngineError,
        progress::ProgressReporter,
    },
    workflows::{
        self,
        evaluate::{EvaluationOptions, EvaluationResult},
    },
};
use tracing::info;

fn engine_config(args: &ComputeArgs) -> Result<EngineConfig> {
    let mut builder = EngineConfigBuilder::new()
        .skin(args.skin)
        .mode(args.mode.into())
        .newton_pair(args.newton_pair);
    if let Some(n) = args.neighbor_one {
        builder = builder.neighbor_one(n);
    }
    builder.build().map_err(|e| CliError::Engine(e.into()))
}

fn evaluation_options(args: &ComputeArgs) -> Result<EvaluationOptions> {
    if !(0.0..=1.0).contains(&args.split) {
        return Err(CliError::Argument(format!(
            "--split must lie in [0, 1], got {}",
            args.split
        )));
    }
    Ok(EvaluationOptions {
        steps: args.steps,
        rebuild_every: args.rebuild_every,
        flags: if args.per_atom {
            EvFlags::all()
        } else {
            EvFlags::global()
        },
        split: args.split,
        memory_limit: args.memory_limit,
    })
}

pub fn run(args: ComputeArgs, progress: CliProgressHandler) -> Result<EvaluationResult> {
    let config = engine_config(&args)?;
    let options = evaluation_options(&args)?;

    info!("Loading force field from {:?}", &args.force_field);
    let force_field = ForceField::load(&args.force_field).map_err(EngineError::from)?;
    info!("Loading particles from {:?}", &args.particles);
    let particles = ParticleSet::from_csv(&args.particles).map_err(EngineError::from)?;

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let result = workflows::evaluate::run(&force_field, &particles, &config, &options, &reporter)?;

    print_summary(&result);

    if let Some(path) = &args.output {
        info!("Writing per-particle forces to {:?}", path);
        write_forces(path, &particles, &result.accumulator)?;
        println!("Forces written to: {}", path.display());
    }
    Ok(result)
}

fn print_summary(result: &EvaluationResult) {
    let energy = result.accumulator.energy();
    let virial = result.accumulator.virial();
    println!("E_vdwl  = {:>16.8}", energy.vdw);
    println!("E_coul  = {:>16.8}", energy.coulomb);
    println!("E_total = {:>16.8}", energy.total());
    println!(
        "Virial  = [{:.6}, {:.6}, {:.6}, {:.6}, {:.6}, {:.6}]",
        virial[0], virial[1], virial[2], virial[3], virial[4], virial[5]
    );
    if let Some(last) = result.steps.last() {
        println!(
            "Split   = accelerator {} / host {} of {} rows (host {:.3} ms)",
            last.host_start,
            last.host_rows(),
            last.rows,
            last.host_time.as_secs_f64() * 1e3
        );
    }
    println!(
        "Cell size {:.4}, memory {} bytes",
        result.setup.cell_size, result.memory_bytes
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ModeArg;
    use ljdebye::engine::config::ConfigError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    const FORCE_FIELD: &str = r#"
[style]
kappa = 0.5
cut-lj = 2.5
cut-coul = 3.0

[[coeff]]
types = [0, 0]
epsilon = 1.0
sigma = 1.0

[[coeff]]
types = [1, 1]
epsilon = 0.5
sigma = 1.2
"#;

    const PARTICLES: &str = "\
id,type,x,y,z,charge
1,0,0.0,0.0,0.0,0.5
2,1,1.1,0.0,0.0,-0.5
3,0,0.0,1.2,0.0,0.25
4,1,0.4,0.3,1.0,-0.25
";

    fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let ff = dir.join("ff.toml");
        let atoms = dir.join("atoms.csv");
        fs::write(&ff, FORCE_FIELD).unwrap();
        fs::write(&atoms, PARTICLES).unwrap();
        (ff, atoms)
    }

    fn args(force_field: PathBuf, particles: PathBuf) -> ComputeArgs {
        ComputeArgs {
            force_field,
            particles,
            output: None,
            mode: ModeArg::Neighbor,
            split: 0.5,
            memory_limit: None,
            skin: 0.3,
            neighbor_one: None,
            newton_pair: false,
            steps: 2,
            rebuild_every: 10,
            per_atom: false,
        }
    }

    #[test]
    fn compute_runs_and_writes_forces() {
        let dir = tempdir().unwrap();
        let (ff, atoms) = write_inputs(dir.path());
        let out = dir.path().join("forces.csv");
        let mut args = args(ff, atoms);
        args.output = Some(out.clone());
        args.per_atom = true;

        let result = run(args, CliProgressHandler::hidden()).unwrap();

        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.accumulator.len(), 4);
        assert!(result.accumulator.energy().total() != 0.0);
        let content = fs::read_to_string(out).unwrap();
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn modes_agree_on_the_total_energy() {
        let dir = tempdir().unwrap();
        let (ff, atoms) = write_inputs(dir.path());
        let mut energies = Vec::new();
        for mode in [ModeArg::Force, ModeArg::Neighbor, ModeArg::HybridNeighbor] {
            let mut args = args(ff.clone(), atoms.clone());
            args.mode = mode;
            let result = run(args, CliProgressHandler::hidden()).unwrap();
            energies.push(result.accumulator.energy().total());
        }
        assert!((energies[0] - energies[1]).abs() < 1e-9);
        assert!((energies[0] - energies[2]).abs() < 1e-9);
    }

    #[test]
    fn newton_pair_flag_is_rejected() {
        let dir = tempdir().unwrap();
        let (ff, atoms) = write_inputs(dir.path());
        let mut args = args(ff, atoms);
        args.newton_pair = true;

        let result = run(args, CliProgressHandler::hidden());
        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::Config {
                source: ConfigError::NewtonPairEnabled
            }))
        ));
    }

    #[test]
    fn split_outside_the_unit_interval_is_rejected() {
        let dir = tempdir().unwrap();
        let (ff, atoms) = write_inputs(dir.path());
        let mut args = args(ff, atoms);
        args.split = 1.5;
        assert!(matches!(
            run(args, CliProgressHandler::hidden()),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn missing_force_field_file_is_reported() {
        let dir = tempdir().unwrap();
        let (_, atoms) = write_inputs(dir.path());
        let args = args(dir.path().join("absent.toml"), atoms);
        assert!(matches!(
            run(args, CliProgressHandler::hidden()),
            Err(CliError::Engine(EngineError::ParamLoad { .. }))
        ));
    }
}
