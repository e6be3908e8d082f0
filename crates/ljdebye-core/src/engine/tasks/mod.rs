//! Computational units run by the engine during a step.
//!
//! - [`host_forces`] - The host force-accumulation loop over full-list rows

pub mod host_forces;
