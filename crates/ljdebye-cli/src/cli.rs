use clap::{Args, Parser, Subcommand, ValueEnum};
use ljdebye::engine::accelerator::AcceleratorMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ljdebye - Lennard-Jones plus Debye-screened Coulomb pair forces with an accelerator/host work split.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the host force loop.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate forces, energies and the virial for a particle set.
    Compute(ComputeArgs),
    /// Print the resolved per-type-pair parameter table.
    Table(TableArgs),
}

/// How work is divided with the accelerator.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Accelerator computes forces over a host-built neighbor list.
    Force,
    /// Accelerator builds the neighbor list and computes forces.
    Neighbor,
    /// Neighbor construction shared between accelerator and host.
    HybridNeighbor,
}

impl From<ModeArg> for AcceleratorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Force => AcceleratorMode::Force,
            ModeArg::Neighbor => AcceleratorMode::Neighbor,
            ModeArg::HybridNeighbor => AcceleratorMode::HybridNeighbor,
        }
    }
}

/// Arguments for the `compute` subcommand.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    // --- Inputs ---
    /// Force-field parameter file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub force_field: PathBuf,

    /// Particle file in CSV format with columns id,type,x,y,z,charge.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub particles: PathBuf,

    /// Write per-particle forces to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Work Split ---
    /// Division of labour between the accelerator and the host.
    #[arg(short, long, value_enum, default_value_t = ModeArg::Neighbor)]
    pub mode: ModeArg,

    /// Fraction of neighbor-list rows computed by the accelerator.
    #[arg(short, long, default_value_t = 1.0, value_name = "FLOAT")]
    pub split: f64,

    /// Simulated accelerator memory budget in bytes.
    #[arg(long, value_name = "BYTES")]
    pub memory_limit: Option<usize>,

    // --- Engine Settings ---
    /// Neighbor skin distance added to the longest cutoff.
    #[arg(long, default_value_t = 0.3, value_name = "FLOAT")]
    pub skin: f64,

    /// Maximum neighbors of a single particle.
    #[arg(long, value_name = "INT")]
    pub neighbor_one: Option<usize>,

    /// Enable Newton's third-law pair optimization (rejected by this pair style).
    #[arg(long)]
    pub newton_pair: bool,

    // --- Run Control ---
    /// Number of force evaluations.
    #[arg(short = 'n', long, default_value_t = 1, value_name = "INT")]
    pub steps: usize,

    /// Steps between neighbor-list rebuilds.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    pub rebuild_every: usize,

    /// Also tally per-particle energies and virials.
    #[arg(long)]
    pub per_atom: bool,
}

/// Arguments for the `table` subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Force-field parameter file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub force_field: PathBuf,

    /// Number of particle types. Defaults to the highest type in the file plus one.
    #[arg(short = 't', long, value_name = "INT")]
    pub types: Option<usize>,
}
