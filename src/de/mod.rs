//! Differential Evolution (DE).
//!
//! A population-based stochastic minimizer. Each generation perturbs every
//! mutable individual with a scaled difference of two other members added
//! to a third, crosses the result with the parent coordinate-wise, and
//! keeps the trial only if it is strictly better.
//!
//! # Key Types
//!
//! - [`DifferentialEvolver`]: the engine; step it, insert into it, read it
//! - [`Candidate`] / [`Gene`]: what a search point must provide
//! - [`Projector`]: in-place repair of infeasible trials
//! - [`DeRunner`]: restart loop driving fresh engines around the best so far
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution – A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces"
//! - Price, Storn & Lampinen (2005), *Differential Evolution: A Practical
//!   Approach to Global Optimization*

mod config;
mod error;
mod evolver;
mod runner;
mod types;

pub use config::{DeConfig, EvolverConfig};
pub use error::{DeError, Result};
pub use evolver::{DifferentialEvolver, StepStats, MIN_POPULATION};
pub use runner::{DeResult, DeRunner};
pub use types::{Candidate, DeProblem, Gene, Identity, Projector};
