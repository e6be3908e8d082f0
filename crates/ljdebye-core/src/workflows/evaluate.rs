use crate::core::forcefield::params::ForceField;
use crate::core::forcefield::table::PairTable;
use crate::core::models::neighbors::NeighborList;
use crate::core::models::particles::ParticleSet;
use crate::engine::accelerator::reference::ReferenceAccelerator;
use crate::engine::accumulator::{EvFlags, ForceAccumulator};
use crate::engine::config::{ConfigError, EngineConfig};
use crate::engine::coordinator::{ForceEngine, StepReport};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::setup::SetupReport;
use tracing::{info, instrument};

/// How many steps to run and how the work is divided.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOptions {
    pub steps: usize,
    /// Steps between neighbor-list rebuilds.
    pub rebuild_every: usize,
    pub flags: EvFlags,
    /// Fraction of rows handed to the accelerator, in `[0, 1]`.
    pub split: f64,
    /// Simulated accelerator memory budget in bytes.
    pub memory_limit: Option<usize>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            steps: 1,
            rebuild_every: 10,
            flags: EvFlags::global(),
            split: 1.0,
            memory_limit: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub table: PairTable,
    pub setup: SetupReport,
    /// Tallies of the last step.
    pub accumulator: ForceAccumulator,
    pub steps: Vec<StepReport>,
    pub memory_bytes: usize,
}

/// Number of types needed to cover both the particles and the coefficients.
pub fn type_count(force_field: &ForceField, particles: &ParticleSet) -> usize {
    let from_particles = particles.max_type().map_or(0, |t| t + 1);
    let from_coeffs = force_field
        .coeffs
        .iter()
        .flat_map(|c| c.types)
        .max()
        .map_or(0, |t| t + 1);
    from_particles.max(from_coeffs)
}

#[instrument(skip_all, name = "evaluation_workflow")]
pub fn run(
    force_field: &ForceField,
    particles: &ParticleSet,
    config: &EngineConfig,
    options: &EvaluationOptions,
    reporter: &ProgressReporter,
) -> Result<EvaluationResult, EngineError> {
    if options.steps == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "steps",
            value: 0.0,
        }
        .into());
    }
    if options.rebuild_every == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "rebuild-every",
            value: 0.0,
        }
        .into());
    }

    // === Phase 1: Resolve parameters and initialize ===
    reporter.report(Progress::PhaseStart { name: "Setup" });
    let ntypes = type_count(force_field, particles);
    let table = PairTable::build(ntypes, force_field).map_err(ConfigError::from)?;

    let mut accelerator = ReferenceAccelerator::new(options.split);
    if let Some(limit) = options.memory_limit {
        accelerator = accelerator.with_memory_limit(limit);
    }
    let mut engine = ForceEngine::new(table, config.clone(), Box::new(accelerator), particles)?;

    let external_list = if engine.setup_report().requires_external_list {
        let cell_size = engine.setup_report().cell_size;
        let list = NeighborList::build_full(
            particles,
            cell_size * cell_size,
            engine.table().special_bonds(),
        );
        let message = format!(
            "Built external full neighbor list: {} rows, {} entries.",
            list.len(),
            list.total_entries()
        );
        info!("{}", message);
        reporter.report(Progress::Message(message));
        Some(list)
    } else {
        None
    };
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Force evaluations ===
    let mut accumulator = ForceAccumulator::new(particles.total(), options.flags);
    let mut steps = Vec::with_capacity(options.steps);
    reporter.report(Progress::StepsStart {
        total_steps: options.steps as u64,
    });
    for step in 0..options.steps {
        let report = engine.compute(
            step % options.rebuild_every,
            particles,
            external_list.as_ref(),
            options.flags,
            &mut accumulator,
        )?;
        reporter.report(Progress::StepFinished {
            host_rows: report.host_rows(),
            rows: report.rows,
        });
        steps.push(report);
    }
    reporter.report(Progress::StepsFinish);

    let memory_bytes = engine.memory_usage(&accumulator);
    info!(
        "Evaluation complete after {} step(s): E_vdw = {:.6}, E_coul = {:.6}.",
        steps.len(),
        accumulator.energy().vdw,
        accumulator.energy().coulomb
    );

    Ok(EvaluationResult {
        table: engine.table().clone(),
        setup: *engine.setup_report(),
        accumulator,
        steps,
        memory_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::mixing::MixingRule;
    use crate::core::forcefield::params::{PairCoeff, SpecialBondParams, StyleParams};
    use crate::core::forcefield::units::UnitSystem;
    use crate::engine::accelerator::AcceleratorMode;
    use crate::engine::config::EngineConfigBuilder;
    use nalgebra::{Point3, Vector3};
    use std::sync::Mutex;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn force_field(kappa: f64) -> ForceField {
        ForceField {
            style: StyleParams {
                kappa,
                cut_lj: 2.5,
                cut_coul: Some(3.0),
                units: UnitSystem::Lj,
                dielectric: 1.0,
                mixing: MixingRule::Geometric,
                shift: false,
            },
            special_bonds: SpecialBondParams::default(),
            coeffs: vec![PairCoeff {
                types: [0, 0],
                epsilon: 1.0,
                sigma: 1.0,
                cut_lj: None,
                cut_coul: None,
            }],
        }
    }

    fn config(mode: AcceleratorMode) -> EngineConfig {
        EngineConfigBuilder::new().skin(0.3).mode(mode).build().unwrap()
    }

    fn pair(r: f64) -> ParticleSet {
        ParticleSet::new(
            vec![Point3::origin(), Point3::new(r, 0.0, 0.0)],
            vec![0, 0],
            Some(vec![1.0, -1.0]),
        )
        .unwrap()
    }

    fn cluster() -> ParticleSet {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.1, 0.0, 0.0),
            Point3::new(0.0, 1.2, 0.0),
            Point3::new(0.3, 0.4, 1.0),
            Point3::new(1.5, 1.4, 0.6),
        ];
        ParticleSet::new(
            positions,
            vec![0; 5],
            Some(vec![0.5, -0.5, 0.25, -0.25, 0.1]),
        )
        .unwrap()
    }

    #[test]
    fn two_particles_match_the_closed_form() {
        let r = 1.2_f64;
        let kappa = 0.5;
        let options = EvaluationOptions {
            flags: EvFlags::all(),
            split: 0.5,
            ..Default::default()
        };
        let result = run(
            &force_field(kappa),
            &pair(r),
            &config(AcceleratorMode::Neighbor),
            &options,
            &ProgressReporter::new(),
        )
        .unwrap();

        let r2inv = 1.0 / (r * r);
        let r6inv = r2inv * r2inv * r2inv;
        let screening = (-kappa * r).exp();
        let forcecoul = -screening * (kappa + 1.0 / r);
        let forcelj = r6inv * (48.0 * r6inv - 24.0);
        let fpair = (forcecoul + forcelj) * r2inv;
        let evdwl = 4.0 * r6inv * (r6inv - 1.0);
        let ecoul = -screening / r;

        let acc = &result.accumulator;
        let expected_f0 = Vector3::new(-r * fpair, 0.0, 0.0);
        assert!((acc.forces()[0] - expected_f0).norm() < TOLERANCE);
        assert!((acc.forces()[1] + expected_f0).norm() < TOLERANCE);
        assert!(f64_approx_equal(acc.energy().vdw, evdwl));
        assert!(f64_approx_equal(acc.energy().coulomb, ecoul));
        assert!(f64_approx_equal(acc.virial()[0], r * r * fpair));
        assert!(f64_approx_equal(acc.virial()[1], 0.0));

        let eatom = acc.per_atom_energy().unwrap();
        assert!(f64_approx_equal(eatom[0] + eatom[1], evdwl + ecoul));
        assert_eq!(result.steps[0].host_start, 1);
    }

    #[test]
    fn every_mode_and_split_produces_the_same_totals() {
        let ff = force_field(1.0);
        let particles = cluster();
        let baseline = run(
            &ff,
            &particles,
            &config(AcceleratorMode::Force),
            &EvaluationOptions {
                split: 0.0,
                ..Default::default()
            },
            &ProgressReporter::new(),
        )
        .unwrap()
        .accumulator;

        for mode in [AcceleratorMode::Force, AcceleratorMode::Neighbor, AcceleratorMode::HybridNeighbor] {
            for split in [0.0, 0.4, 1.0] {
                let options = EvaluationOptions {
                    split,
                    steps: 3,
                    rebuild_every: 2,
                    ..Default::default()
                };
                let acc = run(&ff, &particles, &config(mode), &options, &ProgressReporter::new())
                    .unwrap()
                    .accumulator;

                assert!(f64_approx_equal(acc.energy().total(), baseline.energy().total()));
                for (a, b) in acc.forces().iter().zip(baseline.forces()) {
                    assert!((a - b).norm() < TOLERANCE);
                }
            }
        }
    }

    #[test]
    fn net_force_on_an_isolated_cluster_vanishes() {
        let result = run(
            &force_field(0.8),
            &cluster(),
            &config(AcceleratorMode::HybridNeighbor),
            &EvaluationOptions::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let net: Vector3<f64> = result.accumulator.forces().iter().sum();
        assert!(net.norm() < TOLERANCE);
    }

    #[test]
    fn zero_steps_is_rejected() {
        let result = run(
            &force_field(1.0),
            &pair(1.0),
            &config(AcceleratorMode::Neighbor),
            &EvaluationOptions {
                steps: 0,
                ..Default::default()
            },
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config {
                source: ConfigError::InvalidParameter { name: "steps", .. }
            })
        ));
    }

    #[test]
    fn uncharged_particles_are_rejected_before_any_step() {
        let particles = ParticleSet::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![0, 0],
            None,
        )
        .unwrap();
        let result = run(
            &force_field(1.0),
            &particles,
            &config(AcceleratorMode::Neighbor),
            &EvaluationOptions::default(),
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config {
                source: ConfigError::MissingCharge
            })
        ));
    }

    #[test]
    fn exhausted_accelerator_memory_is_fatal() {
        let ff = force_field(1.0);
        let particles = cluster();
        let table = PairTable::build(1, &ff).unwrap();
        let options = EvaluationOptions {
            memory_limit: Some(table.memory_bytes()),
            ..Default::default()
        };

        let result = run(
            &ff,
            &particles,
            &config(AcceleratorMode::Neighbor),
            &options,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::ResourceExhaustion(_))));
    }

    #[test]
    fn progress_is_reported_for_every_step() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        run(
            &force_field(1.0),
            &cluster(),
            &config(AcceleratorMode::Neighbor),
            &EvaluationOptions {
                steps: 4,
                ..Default::default()
            },
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let finished = events
            .iter()
            .filter(|e| matches!(e, Progress::StepFinished { .. }))
            .count();
        assert_eq!(finished, 4);
        assert_eq!(events.last(), Some(&Progress::StepsFinish));
    }

    #[test]
    fn force_mode_announces_the_external_list() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        run(
            &force_field(1.0),
            &cluster(),
            &config(AcceleratorMode::Force),
            &EvaluationOptions::default(),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let messages: Vec<&String> = events
            .iter()
            .filter_map(|e| match e {
                Progress::Message(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("5 rows"));
        let message_at = events
            .iter()
            .position(|e| matches!(e, Progress::Message(_)))
            .unwrap();
        assert_eq!(events[message_at + 1], Progress::PhaseFinish);
    }

    #[test]
    fn type_count_covers_particles_and_coefficients() {
        let mut ff = force_field(1.0);
        ff.coeffs.push(PairCoeff {
            types: [2, 2],
            epsilon: 1.0,
            sigma: 1.0,
            cut_lj: None,
            cut_coul: None,
        });
        assert_eq!(type_count(&ff, &pair(1.0)), 3);

        let particles = ParticleSet::new(
            vec![Point3::origin()],
            vec![4],
            Some(vec![0.0]),
        )
        .unwrap();
        assert_eq!(type_count(&force_field(1.0), &particles), 5);
    }
}
