//! Particle-side data consumed by the pair style.
//!
//! - [`particles`] - Positions, types, charges, global ids and special-bond partners
//! - [`special`] - Special-bond categories and their LJ/Coulomb scaling factors
//! - [`neighbors`] - Full neighbor lists with explicitly decoded special categories

pub mod neighbors;
pub mod particles;
pub mod special;
