//! Differential evolution with projection, frozen donors and restart
//! injection.
//!
//! - **Differential Evolution (DE)**: a generic population-based
//!   minimizer over any [`de::Candidate`] representation. Trials are
//!   repaired by a pluggable [`de::Projector`], trailing individuals can be
//!   frozen as donor-only material, and new individuals can be injected
//!   between generations.
//! - **Restart runner**: a meta-epoch loop that re-seeds fresh engines
//!   with the best solution so far, randomizes crossover probability and
//!   force per step, and injects random newcomers on stagnation.
//! - **Triangle packing**: equal-circle packing in a triangle, expressed
//!   as a [`de::DeProblem`] over circle centers.
//!
//! # Architecture
//!
//! The engine knows nothing about the problem it minimizes: it sees only a
//! cost closure, a projector and candidates offering indexed coordinates
//! closed under `+`, `-` and scaling. The packing module is one consumer.

pub mod de;
pub mod packing;
