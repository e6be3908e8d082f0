//! # Core Module
//!
//! Stateless building blocks shared by the engine: particle and neighbor-list models
//! and the force field (parameters, mixing, the resolved pair table and the kernel).
//!
//! - **Particle and neighbor data** ([`models`]) - Positions, types, charges, special
//!   bonds and the decoded full neighbor list
//! - **Force field** ([`forcefield`]) - Coefficients, unit systems, the pair table and
//!   the Lennard-Jones + Debye interaction kernel

pub mod forcefield;
pub mod models;
