//! Equal-circle packing in a triangle as a DE problem.

use super::geometry::{Point, Triangle};
use crate::de::DeProblem;
use rand::Rng;

/// Place `circles` equal circles inside a triangle, maximizing their
/// common radius.
///
/// A candidate is the list of circle centers. For given centers the
/// largest feasible radius is
///
/// ```text
/// r = min( min_{i<j} |c_i - c_j| / 2 , min_{i, side} dist(c_i, side) )
/// ```
///
/// and the cost is `-r`, so minimizing the cost maximizes the radius.
#[derive(Debug, Clone)]
pub struct TrianglePacking {
    pub triangle: Triangle,
    pub circles: usize,
}

impl TrianglePacking {
    pub fn new(triangle: Triangle, circles: usize) -> Self {
        Self { triangle, circles }
    }

    /// Packing problem in the unit equilateral triangle.
    pub fn equilateral(circles: usize) -> Self {
        Self::new(Triangle::equilateral(), circles)
    }

    /// Largest common radius of circles centered at `centers` that stay
    /// inside the triangle without overlapping.
    ///
    /// Centers are assumed to lie inside the triangle.
    pub fn radius(&self, centers: &[Point]) -> f64 {
        let mut to_others = f64::INFINITY;
        for (j, cj) in centers.iter().enumerate() {
            for ci in &centers[..j] {
                to_others = to_others.min(ci.distance_sq(cj));
            }
        }

        let mut to_sides = f64::INFINITY;
        for c in centers {
            for (a, b) in self.triangle.sides() {
                to_sides = to_sides.min(c.distance_sq_to_line(&a, &b));
            }
        }

        // Squared diameters: pairwise distance vs twice the side distance.
        to_others.min(4.0 * to_sides).sqrt() / 2.0
    }

    /// Random circle centers, uniform in the triangle.
    pub fn random_centers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Point> {
        (0..self.circles)
            .map(|_| self.triangle.random_point(rng))
            .collect()
    }
}

impl DeProblem for TrianglePacking {
    type Vector = Vec<Point>;

    fn random_candidate<R: Rng>(&self, rng: &mut R) -> Vec<Point> {
        self.random_centers(rng)
    }

    fn cost(&self, centers: &Vec<Point>) -> f64 {
        -self.radius(centers)
    }

    /// Replaces every center that left the triangle by a fresh random one.
    fn project<R: Rng>(&self, centers: &mut Vec<Point>, rng: &mut R) {
        for c in centers.iter_mut() {
            if !self.triangle.contains(c) {
                *c = self.triangle.random_point(rng);
            }
        }
    }
}

/// Renders a packing as a SageMath plotting script.
///
/// The script draws the triangle outline, one circle of the given radius
/// per center and a label with the radius, then shows the plot.
pub fn sage_script(triangle: &Triangle, centers: &[Point], radius: f64) -> String {
    let [a, b, c] = triangle.vertices;
    let mut out = format!("P = line([{a}, {b}, {c}, {a}], color=\"black\")\n");
    for center in centers {
        out.push_str(&format!("P += circle({center}, {radius})\n"));
    }
    let label = Point::new((a.x + b.x + c.x) / 3.0, a.y.max(b.y).max(c.y));
    out.push_str(&format!("P += text(\"r = {radius}\", {label}, color=\"red\")\n"));
    out.push_str("P.show()\n");
    out
}
