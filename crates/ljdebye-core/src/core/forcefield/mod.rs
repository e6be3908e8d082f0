//! # Force Field Module
//!
//! Parameters and pure math for the `lj/cut/coul/debye` pair interaction.
//!
//! ## Overview
//!
//! Raw per-type coefficients are read from a TOML file ([`params`]), unset cross
//! terms are filled in with a mixing rule ([`mixing`]) and the result is frozen into
//! an immutable [`table::PairTable`]. The kernel in [`potentials`] maps one pair
//! separation plus its table entry to a radial force factor and energies.
//!
//! ## Key Components
//!
//! - [`params`] - File-backed coefficients and global style settings
//! - [`mixing`] - Geometric, arithmetic and sixth-power mixing rules
//! - [`units`] - Unit systems and their Coulomb conversion constants
//! - [`table`] - The resolved, symmetric type-pair parameter table
//! - [`potentials`] - The interaction kernel
//! - [`term`] - Energy term aggregation
//!
//! ## Usage
//!
//! ```ignore
//! use ljdebye::core::forcefield::params::ForceField;
//! use ljdebye::core::forcefield::table::PairTable;
//!
//! let force_field = ForceField::load(path)?;
//! let ntypes = 2;
//! let table = PairTable::build(ntypes, &force_field)?;
//! ```

pub mod mixing;
pub mod params;
pub mod potentials;
pub mod table;
pub mod term;
pub mod units;
