//! Bounded 2D vascular perfusion domain.
//!
//! Ported from `original_source/VascularDomain.py`. RNGs are passed in
//! explicitly (spec.md §9: "no global mutable domain/RNG").

use rand::Rng;

use crate::geometry::Vec2;
use crate::heuristic::point_sample_triangle;

/// Capabilities shared by every perfusion region shape.
pub trait VascularDomain {
    /// Total area of the domain.
    fn area(&self) -> f64;

    /// True if `p` lies within the domain (inclusive of the boundary).
    fn contains(&self, p: Vec2) -> bool;

    /// Draw a uniformly random point inside the domain. Terminates with
    /// probability 1 for the convex domains implemented here.
    fn generate_point(&self, rng: &mut impl Rng) -> Vec2;

    /// Enumerate an `intervals x intervals` grid of points covering the
    /// domain (filtered to points actually inside it).
    fn point_grid(&self, intervals: usize) -> Vec<Vec2>;

    /// A domain-dependent length scale used for diagnostics (spec.md
    /// glossary: "characteristic length").
    fn characteristic_length(&self) -> f64;
}

/// An axis-aligned rectangle `[0, w] x [0, h]`.
#[derive(Debug, Clone, Copy)]
pub struct RectangularDomain {
    pub width: f64,
    pub height: f64,
}

impl RectangularDomain {
    pub fn new(width: f64, height: f64) -> Self {
        RectangularDomain { width, height }
    }
}

impl VascularDomain for RectangularDomain {
    fn area(&self) -> f64 {
        self.width * self.height
    }

    fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    fn generate_point(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(rng.gen_range(0.0..=self.width), rng.gen_range(0.0..=self.height))
    }

    fn point_grid(&self, intervals: usize) -> Vec<Vec2> {
        let s = intervals as f64;
        let mut out = Vec::with_capacity(intervals * intervals);
        for i in 0..intervals {
            for j in 0..intervals {
                out.push(Vec2::new(self.width * (i as f64 / s), self.height * (j as f64 / s)));
            }
        }
        out
    }

    fn characteristic_length(&self) -> f64 {
        (self.width.min(self.height)) * 0.5
    }
}

/// A disc of the given radius, built atop a square enclosure via rejection
/// sampling.
#[derive(Debug, Clone, Copy)]
pub struct CircularDomain {
    pub radius: f64,
    enclosure: RectangularDomain,
}

impl CircularDomain {
    pub fn new(radius: f64) -> Self {
        CircularDomain { radius, enclosure: RectangularDomain::new(radius * 2.0, radius * 2.0) }
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.radius, self.radius)
    }
}

impl VascularDomain for CircularDomain {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    fn contains(&self, p: Vec2) -> bool {
        (p - self.center()).magnitude() <= self.radius
    }

    fn generate_point(&self, rng: &mut impl Rng) -> Vec2 {
        loop {
            let p = self.enclosure.generate_point(rng);
            if self.contains(p) {
                return p;
            }
        }
    }

    fn point_grid(&self, intervals: usize) -> Vec<Vec2> {
        self.enclosure.point_grid(intervals).into_iter().filter(|p| self.contains(*p)).collect()
    }

    fn characteristic_length(&self) -> f64 {
        self.radius
    }
}

/// Exposed for domain discretization consumers that want the raw triangular
/// sampler rather than a rectangular/circular grid (spec.md §4.D is shared
/// between the optimizer and domain discretization).
pub fn triangular_grid(p: Vec2, q: Vec2, r: Vec2, intervals: usize) -> Vec<Vec2> {
    point_sample_triangle(p, q, r, intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn rectangular_area_and_containment() {
        let d = RectangularDomain::new(10.0, 4.0);
        assert!((d.area() - 40.0).abs() < 1e-12);
        assert!(d.contains(Vec2::new(5.0, 2.0)));
        assert!(!d.contains(Vec2::new(-1.0, 2.0)));
    }

    #[test]
    fn rectangular_grid_has_expected_count() {
        let d = RectangularDomain::new(10.0, 10.0);
        assert_eq!(d.point_grid(5).len(), 25);
    }

    #[test]
    fn circular_generate_point_stays_inside() {
        let d = CircularDomain::new(40.0);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..500 {
            let p = d.generate_point(&mut rng);
            assert!(d.contains(p));
        }
    }

    #[test]
    fn circular_area_matches_pi_r_squared() {
        let d = CircularDomain::new(2.0);
        assert!((d.area() - std::f64::consts::PI * 4.0).abs() < 1e-9);
    }

    #[test]
    fn circular_grid_is_subset_of_enclosure_and_inside_disc() {
        let d = CircularDomain::new(5.0);
        let grid = d.point_grid(20);
        assert!(!grid.is_empty());
        for p in grid {
            assert!(d.contains(p));
        }
    }
}
