//! Core trait definitions for the differential-evolution engine.
//!
//! [`Gene`] and [`Candidate`] describe what the engine needs from a search
//! point, [`Projector`] is the optional repair step, and [`DeProblem`]
//! bundles everything the restart runner needs from a problem.

use rand::Rng;
use std::ops::{Add, Mul, Sub};

/// A single coordinate of a candidate vector.
///
/// Anything closed under addition, subtraction and scaling by an `f64`
/// qualifies, which is exactly what `A + F * (B - C)` requires. Scalars
/// (`f64`) and small geometric types (2-D points) are both genes.
pub trait Gene: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> {}

impl<T> Gene for T where T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T> {}

/// A point in the search space: a fixed-dimension sequence of genes.
///
/// # Implementing
///
/// `Vec<G>` and `[G; N]` work out of the box. A custom representation only
/// needs indexed reads and writes:
///
/// ```ignore
/// #[derive(Clone)]
/// struct Pose { xyz: [f64; 3], yaw: f64 }
///
/// impl Candidate for Pose {
///     type Gene = f64;
///     fn dim(&self) -> usize { 4 }
///     fn gene(&self, i: usize) -> f64 { if i < 3 { self.xyz[i] } else { self.yaw } }
///     fn set_gene(&mut self, i: usize, g: f64) {
///         if i < 3 { self.xyz[i] = g } else { self.yaw = g }
///     }
/// }
/// ```
pub trait Candidate: Clone {
    /// The coordinate type.
    type Gene: Gene;

    /// Number of coordinates. Constant for the lifetime of a run.
    fn dim(&self) -> usize;

    /// Returns coordinate `i`.
    ///
    /// # Panics
    /// May panic if `i >= self.dim()`.
    fn gene(&self, i: usize) -> Self::Gene;

    /// Overwrites coordinate `i`.
    ///
    /// # Panics
    /// May panic if `i >= self.dim()`.
    fn set_gene(&mut self, i: usize, gene: Self::Gene);
}

impl<G: Gene> Candidate for Vec<G> {
    type Gene = G;

    fn dim(&self) -> usize {
        self.len()
    }

    fn gene(&self, i: usize) -> G {
        self[i]
    }

    fn set_gene(&mut self, i: usize, gene: G) {
        self[i] = gene;
    }
}

impl<G: Gene, const N: usize> Candidate for [G; N] {
    type Gene = G;

    fn dim(&self) -> usize {
        N
    }

    fn gene(&self, i: usize) -> G {
        self[i]
    }

    fn set_gene(&mut self, i: usize, gene: G) {
        self[i] = gene;
    }
}

/// In-place repair applied to every trial vector before it is evaluated.
///
/// A projector maps an infeasible trial back onto the feasible region and
/// must not touch anything but the vector it is given. Any
/// `FnMut(&mut V)` closure is a projector.
pub trait Projector<V> {
    /// Repairs `candidate` in place.
    fn project(&mut self, candidate: &mut V);
}

impl<V, F> Projector<V> for F
where
    F: FnMut(&mut V),
{
    fn project(&mut self, candidate: &mut V) {
        self(candidate)
    }
}

/// The no-op projector: unconstrained search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<V> Projector<V> for Identity {
    fn project(&mut self, _candidate: &mut V) {}
}

/// Defines a problem for the restart runner.
///
/// The engine itself only needs a cost closure; the runner additionally
/// has to create fresh candidates (initial populations and diversity
/// injections) and repair trials.
///
/// # Minimization
///
/// The cost is minimized. For maximization, negate it.
///
/// # Examples
///
/// ```ignore
/// struct Sphere { dim: usize }
///
/// impl DeProblem for Sphere {
///     type Vector = Vec<f64>;
///
///     fn random_candidate<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
///         (0..self.dim).map(|_| rng.random_range(-5.0..5.0)).collect()
///     }
///
///     fn cost(&self, x: &Vec<f64>) -> f64 {
///         x.iter().map(|v| v * v).sum()
///     }
/// }
/// ```
pub trait DeProblem {
    /// The candidate representation.
    type Vector: Candidate;

    /// Creates a random feasible candidate.
    fn random_candidate<R: Rng>(&self, rng: &mut R) -> Self::Vector;

    /// Computes the cost of a candidate. Lower is better.
    fn cost(&self, candidate: &Self::Vector) -> f64;

    /// Repairs a trial vector that may have left the feasible region.
    ///
    /// The default is the identity (unconstrained search).
    fn project<R: Rng>(&self, _candidate: &mut Self::Vector, _rng: &mut R) {}

    /// Called whenever the runner adopts a new overall best.
    ///
    /// The default implementation is a no-op.
    fn on_improvement(&self, _meta_epoch: usize, _best_cost: f64) {}
}
