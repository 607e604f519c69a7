//! Planar primitives: points and triangles.

use rand::Rng;
use std::fmt;
use std::ops::{Add, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point (or vector) in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Z component of the cross product `self × other`.
    pub fn cross(&self, other: &Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_sq(&self, other: &Point) -> f64 {
        (*self - *other).norm_sq()
    }

    /// Whether the point lies on the left of the directed line `a → b`.
    /// Points on the line count as left.
    pub fn is_left_of(&self, a: &Point, b: &Point) -> bool {
        (*b - *a).cross(&(*self - *a)) >= 0.0
    }

    /// Squared distance to the infinite line through `a` and `b`.
    ///
    /// Degenerates to the distance to `a` when `a == b`.
    pub fn distance_sq_to_line(&self, a: &Point, b: &Point) -> f64 {
        let dir = *b - *a;
        let len_sq = dir.norm_sq();
        if len_sq == 0.0 {
            return self.distance_sq(a);
        }
        let c = dir.cross(&(*self - *a));
        c * c / len_sq
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;

    fn mul(self, p: Point) -> Point {
        p * self
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A triangle with counter-clockwise vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    pub vertices: [Point; 3],
}

impl Triangle {
    /// Builds a triangle, reordering the vertices counter-clockwise.
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        if (b - a).cross(&(c - a)) < 0.0 {
            Self { vertices: [a, c, b] }
        } else {
            Self { vertices: [a, b, c] }
        }
    }

    /// Unit-side equilateral triangle with vertices `(0, 0)`, `(1, 0)`
    /// and `(1/2, √3/2)`.
    pub fn equilateral() -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.5, 3.0_f64.sqrt() / 2.0),
        )
    }

    /// Directed sides `(v0, v1)`, `(v1, v2)`, `(v2, v0)`.
    pub fn sides(&self) -> [(Point, Point); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: &Point) -> bool {
        self.sides().iter().all(|(a, b)| p.is_left_of(a, b))
    }

    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).abs() / 2.0
    }

    /// Uniformly distributed point inside the triangle.
    ///
    /// Samples the parallelogram spanned by two edges and folds the far
    /// half back onto the triangle.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let [a, b, c] = self.vertices;
        let mut u: f64 = rng.random_range(0.0..1.0);
        let mut v: f64 = rng.random_range(0.0..1.0);
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        a + u * (b - a) + v * (c - a)
    }
}
