//! Cubic bezier math and path-command generation.
//!
//! Path strings use the SVG/Slint `Path` command syntax (`M`, `L`, `C`, `Z`)
//! and are emitted in whatever space the input points are in.

use std::fmt::Write;

use crate::transform::Point;

/// Endpoints closer than this (canvas units) are joined by a straight line
/// to avoid zig-zag curves.
pub const STRAIGHT_LINE_THRESHOLD: f64 = 10.0;

/// Cubic bezier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    /// Left-to-right S-curve between two port anchors.
    ///
    /// Control points extend horizontally, start to the right and end to the
    /// left, by `curvature * |dx|` but never less than `min_offset`.
    ///
    /// # Arguments
    /// * `start` - Source anchor
    /// * `end` - Target anchor
    /// * `curvature` - Fraction of the horizontal distance (default: 0.5)
    /// * `min_offset` - Minimum control point offset (default: 50.0)
    pub fn from_endpoints(start: Point, end: Point, curvature: f64, min_offset: f64) -> Self {
        if start.distance_to(end) < STRAIGHT_LINE_THRESHOLD {
            return Self::line(start, end);
        }

        let offset = ((end.x - start.x).abs() * curvature).max(min_offset);

        CubicBezier {
            p0: start,
            p1: Point::new(start.x + offset, start.y),
            p2: Point::new(end.x - offset, end.y),
            p3: end,
        }
    }

    /// Degenerate bezier that traces the straight segment `start`-`end`.
    pub fn line(start: Point, end: Point) -> Self {
        CubicBezier {
            p0: start,
            p1: start,
            p2: end,
            p3: end,
        }
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f64) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x;
        let y = mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y;

        Point::new(x, y)
    }

    /// Direction of travel arriving at the end point, in radians.
    ///
    /// Taken from the second control point so arrowheads follow the curve's
    /// tangent rather than the chord. Falls back to the chord when the
    /// control point coincides with the end.
    pub fn end_angle(&self) -> f64 {
        angle_between(self.p2, self.p3).unwrap_or_else(|| chord_angle(self.p0, self.p3))
    }

    /// Direction pointing out of the start point, toward where the curve came from.
    pub fn start_angle(&self) -> f64 {
        angle_between(self.p1, self.p0).unwrap_or_else(|| chord_angle(self.p3, self.p0))
    }

    /// Map every point through `f`; used to move a curve between spaces.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        CubicBezier {
            p0: f(self.p0),
            p1: f(self.p1),
            p2: f(self.p2),
            p3: f(self.p3),
        }
    }
}

fn angle_between(from: Point, to: Point) -> Option<f64> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        None
    } else {
        Some(dy.atan2(dx))
    }
}

fn chord_angle(from: Point, to: Point) -> f64 {
    angle_between(from, to).unwrap_or(0.0)
}

/// Generate path commands for a bezier: `M x y C x1 y1 x2 y2 x y`
pub fn generate_bezier_path(curve: &CubicBezier) -> String {
    format!(
        "M {} {} C {} {} {} {} {} {}",
        curve.p0.x, curve.p0.y, curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y, curve.p3.x, curve.p3.y
    )
}

/// Generate path commands for a straight segment: `M x y L x y`
pub fn generate_line_path(start: Point, end: Point) -> String {
    format!("M {} {} L {} {}", start.x, start.y, end.x, end.y)
}

/// Generate path commands for a polyline, closed with `Z` when `closed`.
pub fn generate_polyline_path(points: &[Point], closed: bool) -> String {
    let mut commands = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        let op = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            commands.push(' ');
        }
        let _ = write!(commands, "{} {} {}", op, p.x, p.y);
    }
    if closed && !points.is_empty() {
        commands.push_str(" Z");
    }
    commands
}

/// Calculate the distance from a point to a line segment
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (point.x - a.x, point.y - a.y);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f64::EPSILON {
        // Degenerate segment (a == b)
        return (ap.0 * ap.0 + ap.1 * ap.1).sqrt();
    }

    // Project point onto line, clamped to segment
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);

    let closest = Point::new(a.x + t * ab.0, a.y + t * ab.1);
    point.distance_to(closest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    // ========================================================================
    // CubicBezier::from_endpoints() - Construction
    // ========================================================================

    #[test]
    fn test_bezier_from_endpoints_creates_correct_points() {
        let bezier = CubicBezier::from_endpoints(p(0.0, 0.0), p(100.0, 100.0), 0.5, 50.0);

        assert_eq!(bezier.p0, p(0.0, 0.0));
        assert_eq!(bezier.p3, p(100.0, 100.0));
        // Control points should extend horizontally
        assert_eq!(bezier.p1, p(50.0, 0.0));
        assert_eq!(bezier.p2, p(50.0, 100.0));
    }

    #[test]
    fn test_bezier_min_offset_applies_to_short_spans() {
        let bezier = CubicBezier::from_endpoints(p(0.0, 0.0), p(40.0, 80.0), 0.5, 50.0);
        assert_eq!(bezier.p1.x, 50.0);
        assert_eq!(bezier.p2.x, -10.0);
    }

    #[test]
    fn test_bezier_backwards_edge_still_bulges_outward() {
        // Target to the left of source: controls still point right from start, left from end
        let bezier = CubicBezier::from_endpoints(p(200.0, 0.0), p(0.0, 50.0), 0.5, 50.0);
        assert!(bezier.p1.x > bezier.p0.x);
        assert!(bezier.p2.x < bezier.p3.x);
    }

    #[test]
    fn test_bezier_short_distance_is_straight() {
        let bezier = CubicBezier::from_endpoints(p(0.0, 0.0), p(5.0, 0.0), 0.5, 50.0);
        assert_eq!(bezier.p1, bezier.p0);
        assert_eq!(bezier.p2, bezier.p3);
    }

    // ========================================================================
    // CubicBezier::eval() - Boundary Values
    // ========================================================================

    #[test]
    fn test_bezier_eval_endpoints() {
        let bezier = CubicBezier::from_endpoints(p(10.0, 20.0), p(100.0, 80.0), 0.5, 50.0);
        assert!(bezier.eval(0.0).distance_to(p(10.0, 20.0)) < 1e-9);
        assert!(bezier.eval(1.0).distance_to(p(100.0, 80.0)) < 1e-9);
    }

    #[test]
    fn test_bezier_symmetry() {
        let bezier = CubicBezier::from_endpoints(p(0.0, 0.0), p(100.0, 0.0), 0.5, 50.0);

        let left = bezier.eval(0.25);
        let right = bezier.eval(0.75);

        assert!((left.y - right.y).abs() < 1e-9);
        assert!((left.x + right.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bezier_eval_degenerate_point() {
        let bezier = CubicBezier::line(p(50.0, 50.0), p(50.0, 50.0));
        assert_eq!(bezier.eval(0.5), p(50.0, 50.0));
    }

    // ========================================================================
    // Tangent angles
    // ========================================================================

    #[test]
    fn test_end_angle_follows_tangent_not_chord() {
        // Chord points down-right, but the curve arrives horizontally
        let bezier = CubicBezier::from_endpoints(p(0.0, 0.0), p(200.0, 100.0), 0.5, 50.0);
        assert!(bezier.end_angle().abs() < 1e-9);
        let chord = (100.0f64).atan2(200.0);
        assert!((bezier.end_angle() - chord).abs() > 0.1);
    }

    #[test]
    fn test_start_angle_points_back_out_of_source() {
        let bezier = CubicBezier::from_endpoints(p(0.0, 0.0), p(200.0, 100.0), 0.5, 50.0);
        assert!((bezier.start_angle().abs() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_end_angle_of_straight_line_uses_chord() {
        let bezier = CubicBezier::line(p(0.0, 0.0), p(0.0, 5.0));
        assert!((bezier.end_angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    // ========================================================================
    // Path commands
    // ========================================================================

    #[test]
    fn test_bezier_path_format() {
        let bezier = CubicBezier::from_endpoints(p(10.0, 20.0), p(110.0, 80.0), 0.5, 50.0);
        let path = generate_bezier_path(&bezier);
        assert_eq!(path, "M 10 20 C 60 20 60 80 110 80");
    }

    #[test]
    fn test_line_path_format() {
        assert_eq!(generate_line_path(p(0.0, 0.0), p(5.0, -2.5)), "M 0 0 L 5 -2.5");
    }

    #[test]
    fn test_polyline_path_closed() {
        let path = generate_polyline_path(&[p(0.0, 0.0), p(10.0, 0.0), p(5.0, 5.0)], true);
        assert_eq!(path, "M 0 0 L 10 0 L 5 5 Z");
    }

    #[test]
    fn test_polyline_path_empty() {
        assert_eq!(generate_polyline_path(&[], true), "");
    }

    // ========================================================================
    // distance_to_segment()
    // ========================================================================

    #[test]
    fn test_distance_to_segment_perpendicular() {
        let d = distance_to_segment(p(50.0, 5.0), p(0.0, 0.0), p(100.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_segment_past_end_clamps() {
        let d = distance_to_segment(p(103.0, 4.0), p(0.0, 0.0), p(100.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let d = distance_to_segment(p(3.0, 4.0), p(0.0, 0.0), p(0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
    }
}
