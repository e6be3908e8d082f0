//! # Workflows Module
//!
//! Top-level entry points that wire the core and engine layers into complete runs.
//!
//! - **Evaluation Workflow** ([`evaluate`]) - Resolves the pair table from a force field,
//!   initializes the reference accelerator and runs a number of force evaluations over
//!   one particle set.

pub mod evaluate;
