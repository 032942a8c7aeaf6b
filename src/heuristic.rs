//! Triangular point-sample heuristic, used for both bifurcation geometric
//! optimization and domain grid discretization.
//!
//! Ported from `original_source/main/python/PointSampleHeuristic.py`.

use crate::geometry::Vec2;

/// Sample the triangular grid `{ p + i*(q-p)/(n-1) + j*(r-p)/(n-1) :
/// i >= 0, j >= 0, i+j <= n-1 }`. Produces exactly `n*(n+1)/2` points.
///
/// # Panics
/// Panics if `n < 2` (matching the original's precondition).
pub fn point_sample_triangle(p: Vec2, q: Vec2, r: Vec2, n: usize) -> Vec<Vec2> {
    assert!(n >= 2, "point_sample_triangle requires n >= 2");
    let unit_pq = (q - p) * (1.0 / (n - 1) as f64);
    let unit_pr = (r - p) * (1.0 / (n - 1) as f64);
    let mut points = Vec::with_capacity(n * (n + 1) / 2);
    let mut component_pq = Vec2::ZERO;
    for i in 0..n {
        let mut component_pr = Vec2::ZERO;
        for _j in 0..(n - i) {
            points.push(p + component_pq + component_pr);
            component_pr = component_pr + unit_pr;
        }
        component_pq = component_pq + unit_pq;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_triangular_count() {
        let pts = point_sample_triangle(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0), 10);
        assert_eq!(pts.len(), 10 * 11 / 2);
    }

    #[test]
    fn first_point_is_p_and_corners_match() {
        let p = Vec2::new(1.0, 1.0);
        let q = Vec2::new(11.0, 1.0);
        let r = Vec2::new(1.0, 11.0);
        let n = 5;
        let pts = point_sample_triangle(p, q, r, n);
        assert!((pts[0].x - p.x).abs() < 1e-12 && (pts[0].y - p.y).abs() < 1e-12);
        // last point of the first row (i=0, j=n-1) should be r
        let last_row0 = &pts[n - 1];
        assert!((last_row0.x - r.x).abs() < 1e-9 && (last_row0.y - r.y).abs() < 1e-9);
        // final point overall (i=n-1, j=0) should be q
        let last = pts.last().unwrap();
        assert!((last.x - q.x).abs() < 1e-9 && (last.y - q.y).abs() < 1e-9);
    }

    #[test]
    #[should_panic]
    fn rejects_too_few_intervals() {
        point_sample_triangle(Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), 1);
    }
}
