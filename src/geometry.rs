//! 2D geometry kernel: vectors, line segments, and line intersection.
//!
//! Ported from `original_source/LinAlg.py` (`Vec2D`, `LineSegment`, `Line`).
//! Pure value types; no side effects.

/// A point or displacement in the plane.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// A line expressed as a position vector and a direction vector.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub p: Vec2,
    pub d: Vec2,
}

impl Line {
    pub fn new(p: Vec2, d: Vec2) -> Self {
        Line { p, d }
    }

    /// Solve for the scalars `(s, t)` such that `self.p + s*self.d ==
    /// other.p + t*other.d`. Returns `None` for parallel lines (singular
    /// 2x2 system).
    pub fn find_scalars_at_intersection(&self, other: &Line) -> Option<(f64, f64)> {
        let rhs = other.p - self.p;
        // [ d.x  -od.x ] [s]   [rhs.x]
        // [ d.y  -od.y ] [t] = [rhs.y]
        let a11 = self.d.x;
        let a12 = -other.d.x;
        let a21 = self.d.y;
        let a22 = -other.d.y;
        let det = a11 * a22 - a12 * a21;
        if det.abs() < 1e-15 {
            return None;
        }
        let s = (rhs.x * a22 - a12 * rhs.y) / det;
        let t = (a11 * rhs.y - rhs.x * a21) / det;
        Some((s, t))
    }

    /// The point at which this line and `other` intersect, or `None` if
    /// they are parallel.
    pub fn find_point_of_intersection(&self, other: &Line) -> Option<Vec2> {
        let (s, _t) = self.find_scalars_at_intersection(other)?;
        Some(self.p + self.d * s)
    }
}

/// The line segment bounded by endpoints `a` and `b`.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct LineSegment {
    pub a: Vec2,
    pub b: Vec2,
}

impl LineSegment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        LineSegment { a, b }
    }

    pub fn length(&self) -> f64 {
        (self.a - self.b).magnitude()
    }

    pub fn vector(&self) -> Vec2 {
        self.b - self.a
    }

    pub fn line(&self) -> Line {
        Line::new(self.a, self.vector())
    }

    /// Euclidean distance from `p` to the closest point on the segment.
    /// If the segment is degenerate (zero length), the projection
    /// parameter is treated as -1 so the distance to `a` is used.
    pub fn distance_to(&self, p: Vec2) -> f64 {
        let ab = self.vector();
        let ap = p - self.a;
        let len_sq = ab.dot(ab);
        let param = if len_sq != 0.0 { ab.dot(ap) / len_sq } else { -1.0 };
        let closest = if param < 0.0 {
            self.a
        } else if param > 1.0 {
            self.b
        } else {
            self.a + ab * param
        };
        (p - closest).magnitude()
    }

    fn on_segment(p: Vec2, q: Vec2, r: Vec2) -> bool {
        q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
    }

    /// 0 if p, q, r are collinear; 1 if clockwise; -1 if anticlockwise.
    fn orientation(p: Vec2, q: Vec2, r: Vec2) -> i32 {
        let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
        if val > 0.0 {
            1
        } else if val < 0.0 {
            -1
        } else {
            0
        }
    }

    /// True when this segment shares any point with `other`, including
    /// endpoint-touching and collinear overlap.
    pub fn intersects(&self, other: &LineSegment) -> bool {
        let (p1, q1) = (self.a, self.b);
        let (p2, q2) = (other.a, other.b);

        let o1 = Self::orientation(p1, q1, p2);
        let o2 = Self::orientation(p1, q1, q2);
        let o3 = Self::orientation(p2, q2, p1);
        let o4 = Self::orientation(p2, q2, q1);

        if o1 != o2 && o3 != o4 {
            return true;
        }
        if o1 == 0 && Self::on_segment(p1, p2, q1) {
            return true;
        }
        if o2 == 0 && Self::on_segment(p1, q2, q1) {
            return true;
        }
        if o3 == 0 && Self::on_segment(p2, p1, q2) {
            return true;
        }
        if o4 == 0 && Self::on_segment(p2, q1, q2) {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_midpoint_projection() {
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert!((seg.distance_to(Vec2::new(5.0, 3.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn distance_to_beyond_endpoint_uses_nearer_endpoint() {
        let seg = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        let d = seg.distance_to(Vec2::new(15.0, 4.0));
        let expect = ((15.0f64 - 10.0).powi(2) + 4.0f64.powi(2)).sqrt();
        assert!((d - expect).abs() < 1e-12);
    }

    #[test]
    fn distance_to_degenerate_segment_is_distance_to_a() {
        let seg = LineSegment::new(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0));
        let d = seg.distance_to(Vec2::new(6.0, 7.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = LineSegment::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        let a = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let b = LineSegment::new(Vec2::new(0.0, 5.0), Vec2::new(1.0, 5.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn touching_endpoint_counts_as_intersection() {
        let a = LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0));
        let b = LineSegment::new(Vec2::new(5.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn parallel_lines_have_no_intersection_point() {
        let l1 = Line::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let l2 = Line::new(Vec2::new(0.0, 1.0), Vec2::new(2.0, 0.0));
        assert!(l1.find_point_of_intersection(&l2).is_none());
    }

    #[test]
    fn crossing_lines_intersect_at_expected_point() {
        let l1 = Line::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let l2 = Line::new(Vec2::new(0.0, 10.0), Vec2::new(1.0, -1.0));
        let p = l1.find_point_of_intersection(&l2).unwrap();
        assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9);
    }
}
