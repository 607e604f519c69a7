//! Equal-circle packing in a triangle.
//!
//! Finds `k` equal circles of maximal radius that fit in a triangle
//! without overlapping. Circle centers are the DE genes; trials that push
//! a center outside the triangle are repaired by resampling that center.
//!
//! # References
//!
//! - Melissen (1993), "Densest Packings of Congruent Circles in an
//!   Equilateral Triangle"
//! - Graham & Lubachevsky (1995), "Dense Packings of Equal Disks in an
//!   Equilateral Triangle"

mod geometry;
mod problem;

pub use geometry::{Point, Triangle};
pub use problem::{sage_script, TrianglePacking};
