//! # ljdebye Core Library
//!
//! Short-range pair forces for molecular dynamics: a cut Lennard-Jones term plus a
//! Debye-screened (Yukawa) Coulomb term, evaluated over a full neighbor list and
//! split between an accelerated collaborator and a host loop.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ParticleSet`, `NeighborList`),
//!   the resolved per-type-pair parameter table and the pure interaction kernel.
//!
//! - **[`engine`]: The Logic Core.** Setup/validation, force and virial accumulators,
//!   the host force-accumulation loop, the accelerator contract and the work-split
//!   coordinator that ties them together each step.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the two layers
//!   above, such as evaluating forces for a particle set from a parameter file.

pub mod core;
pub mod engine;
pub mod workflows;
