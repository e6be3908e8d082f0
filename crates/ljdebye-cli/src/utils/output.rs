use crate::error::{CliError, Result};
use ljdebye::core::models::particles::ParticleSet;
use ljdebye::engine::accumulator::ForceAccumulator;
use std::path::Path;

/// Writes one `id,fx,fy,fz` row per particle, plus per-atom energy and virial columns
/// when those were tallied.
pub fn write_forces(path: &Path, particles: &ParticleSet, acc: &ForceAccumulator) -> Result<()> {
    let to_cli_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_cli_error)?;

    let eatom = acc.per_atom_energy();
    let vatom = acc.per_atom_virial();

    let mut header = vec!["id", "fx", "fy", "fz"];
    if eatom.is_some() {
        header.push("energy");
    }
    if vatom.is_some() {
        header.extend(["vxx", "vyy", "vzz", "vxy", "vxz", "vyz"]);
    }
    writer.write_record(&header).map_err(to_cli_error)?;

    for (i, (tag, force)) in particles.tags().iter().zip(acc.forces()).enumerate() {
        let mut record = vec![
            tag.to_string(),
            force.x.to_string(),
            force.y.to_string(),
            force.z.to_string(),
        ];
        if let Some(eatom) = eatom {
            record.push(eatom[i].to_string());
        }
        if let Some(vatom) = vatom {
            record.extend(vatom[i].iter().map(|v| v.to_string()));
        }
        writer.write_record(&record).map_err(to_cli_error)?;
    }
    writer.flush()?;
    Ok(())
}
