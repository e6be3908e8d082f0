//! # Engine Module
//!
//! Runs the pair style: validates a run once, then computes forces every step by
//! splitting the neighbor-list rows between an accelerated collaborator and the host.
//!
//! ## Architecture
//!
//! - **Setup** ([`setup`]) - One-time preconditions and accelerator initialization
//! - **Coordinator** ([`coordinator`]) - The per-step work split and host-time feedback
//! - **Accelerator Contract** ([`accelerator`]) - The trait the accelerated path implements,
//!   plus an in-process reference implementation
//! - **Accumulators** ([`accumulator`]) - Forces, energies and virials for one step
//! - **Configuration** ([`config`]) - Runtime settings and their builder
//! - **Progress Monitoring** ([`progress`]) - Events for front ends that report progress
//! - **Error Handling** ([`error`]) - Engine-level error types
//!
//! The host force-accumulation loop lives in the internal `tasks` module and is shared
//! by the coordinator and the reference accelerator.

pub mod accelerator;
pub mod accumulator;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod progress;
pub mod setup;
pub(crate) mod tasks;
