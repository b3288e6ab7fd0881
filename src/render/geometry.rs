//! Shared geometry calculations for annotations
//!
//! This module contains the constants and path construction shared by
//! hit testing, bounds computation and image rendering (tiny-skia).
//! Everything here works in scene units; rotation is baked into the
//! emitted points so renderers only ever need an identity transform.

use crate::config::constants;
use crate::domain::{ArrowStyle, Point, Rect, ShapePath, bounding_box};

/// Arrow geometry constants
pub mod arrow {
    use crate::config::constants;

    /// Body pen width per unit of user-facing width
    pub const BODY_WIDTH_FACTOR: f64 = 0.1;
    /// Head length grows with width past this floor
    pub const MIN_HEAD_SCALE: f64 = 0.8;
    /// Head length per unit of user-facing width
    pub const HEAD_WIDTH_FACTOR: f64 = 0.25;
    /// Fraction of the head length the body stops short of the tip
    pub const BODY_INSET: f64 = 0.7;

    /// Arrowhead length for a user-facing width
    pub fn head_length(width: f64) -> f64 {
        constants::ANNOTATION_ARROW_HEAD_LENGTH * MIN_HEAD_SCALE.max(width * HEAD_WIDTH_FACTOR)
    }

    /// Stroke width of the body for a user-facing width
    pub fn body_width(width: f64) -> f64 {
        width * BODY_WIDTH_FACTOR
    }
}

/// Zigzag (dribble) geometry constants
pub mod zigzag {
    /// Samples per period of oscillation
    pub const SAMPLES_PER_PERIOD: f64 = 10.0;
    /// Minimum samples per segment
    pub const MIN_SAMPLES: usize = 30;
    /// Segments shorter than this are skipped
    pub const MIN_SEGMENT: f64 = 1e-6;
    /// The last segment goes straight past this fraction so the head lands cleanly
    pub const STRAIGHT_TAIL: f64 = 0.85;
}

/// Zone (rectangle/ellipse/cone) geometry constants
pub mod shape {
    /// Zone border pen width per unit of user-facing width
    pub const STROKE_FACTOR: f64 = 0.25;
    /// Dash pattern for dashed borders and dotted arrows, in pen widths
    pub const DASH_PATTERN: [f64; 2] = [4.0, 2.0];

    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f64 = 0.552_284_8;
}

/// Derived drawable geometry for one arrow
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrowGeometry {
    /// Stroked body, stopping short of the tip when a head exists
    pub body: ShapePath,
    /// Filled head triangle: tip, then both wings
    pub head: Option<[Point; 3]>,
    /// Body stroke width in scene units
    pub pen_width: f64,
    /// Body is drawn with a dash pattern
    pub dashed: bool,
}

impl ArrowGeometry {
    /// Bounds of body and head together
    pub fn bounds(&self) -> Option<Rect> {
        let body = self.body.control_bounds();
        let head = self.head.and_then(|h| bounding_box(&h));
        match (body, head) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Calculate arrowhead triangle for the segment `start -> end`
///
/// Returns `None` for a zero-length final segment.
pub fn head_points(start: Point, end: Point, length: f64) -> Option<[Point; 3]> {
    let d = end - start;
    if d.x.hypot(d.y) <= 0.0 {
        return None;
    }
    let angle = d.y.atan2(d.x);
    let wing = constants::ANNOTATION_ARROW_HEAD_ANGLE.to_radians();
    let p1 = Point::new(
        end.x - length * (angle + wing).cos(),
        end.y - length * (angle + wing).sin(),
    );
    let p2 = Point::new(
        end.x - length * (angle - wing).cos(),
        end.y - length * (angle - wing).sin(),
    );
    Some([end, p1, p2])
}

/// Point where the body stops so the head covers the tip
fn shortened_end(start: Point, end: Point, head_length: f64) -> Point {
    let length = start.distance_to(end);
    if length <= 0.0 {
        return end;
    }
    let ratio = ((length - head_length * arrow::BODY_INSET) / length).max(0.0);
    start.lerp(end, ratio)
}

/// Build body and head for an arrow polyline
///
/// `points` must hold at least two points.
pub fn arrow_geometry(points: &[Point], width: f64, style: ArrowStyle, curved: bool) -> ArrowGeometry {
    let [.., start, end] = points else {
        return ArrowGeometry::default();
    };
    let head_length = arrow::head_length(width);
    let body_end = shortened_end(*start, *end, head_length);

    let body = match style {
        ArrowStyle::Zigzag => zigzag_path(points, body_end),
        _ if curved && points.len() > 2 => curved_path(points, body_end),
        _ => straight_path(points, body_end),
    };

    ArrowGeometry {
        body,
        head: head_points(*start, *end, head_length),
        pen_width: arrow::body_width(width),
        dashed: style == ArrowStyle::Dotted,
    }
}

/// Polyline through every point, last point replaced by `end`
pub fn straight_path(points: &[Point], end: Point) -> ShapePath {
    let mut path = ShapePath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    if let Some((_, middle)) = rest.split_last() {
        for p in middle {
            path.line_to(*p);
        }
        path.line_to(end);
    }
    path
}

/// Smooth curve using the interior points as quadratic controls
pub fn curved_path(points: &[Point], end: Point) -> ShapePath {
    let mut path = ShapePath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for pair in points[1..].windows(2) {
        path.quad_to(pair[0], pair[0].midpoint(pair[1]));
    }
    path.line_to(end);
    path
}

/// Sinusoidal zigzag along each segment, straightening out before the head
pub fn zigzag_path(points: &[Point], end: Point) -> ShapePath {
    let mut path = ShapePath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);

    let period = constants::ZIGZAG_PERIOD;
    let amplitude = constants::ZIGZAG_AMPLITUDE;
    let last_segment = points.len().saturating_sub(2);

    for (idx, pair) in points.windows(2).enumerate() {
        let is_last = idx == last_segment;
        let start = pair[0];
        let seg_end = if is_last { end } else { pair[1] };
        let d = seg_end - start;
        let seg_len = d.x.hypot(d.y);
        if seg_len <= zigzag::MIN_SEGMENT {
            continue;
        }
        // Unit perpendicular
        let (px, py) = (-d.y / seg_len, d.x / seg_len);

        let num_samples =
            ((seg_len / period * zigzag::SAMPLES_PER_PERIOD) as usize).max(zigzag::MIN_SAMPLES);
        // Samples past `curved` lie on the straight line to `seg_end`
        let curved = if is_last {
            (num_samples as f64 * zigzag::STRAIGHT_TAIL).floor() as usize
        } else {
            num_samples
        };
        let samples: Vec<Point> = (1..=num_samples)
            .map(|i| {
                let t = i as f64 / num_samples as f64;
                let base = start.lerp(seg_end, t);
                if i > curved {
                    base
                } else {
                    let osc = amplitude * (t * seg_len / period * std::f64::consts::TAU).sin();
                    base.translate(osc * px, osc * py)
                }
            })
            .collect();

        let smooth_until = curved.saturating_sub(1);
        for i in 0..smooth_until {
            path.quad_to(samples[i], samples[i].midpoint(samples[i + 1]));
        }
        for p in samples.iter().skip(smooth_until) {
            path.line_to(*p);
        }
    }
    path
}

/// Closed outline of `rect` rotated by `rotation_deg` about its center
pub fn rect_outline(rect: Rect, rotation_deg: f64) -> ShapePath {
    let center = rect.center();
    let corners = [
        Point::new(rect.left(), rect.top()),
        Point::new(rect.right(), rect.top()),
        Point::new(rect.right(), rect.bottom()),
        Point::new(rect.left(), rect.bottom()),
    ]
    .map(|p| p.rotate_around(center, rotation_deg));

    let mut path = ShapePath::new();
    path.move_to(corners[0]);
    for p in &corners[1..] {
        path.line_to(*p);
    }
    path.close();
    path
}

/// Ellipse inscribed in `rect`, rotated by `rotation_deg` about its center
///
/// Four cubic bezier quadrants; control points are rotated along with the
/// on-curve points, which keeps the approximation exact under rotation.
pub fn ellipse_outline(rect: Rect, rotation_deg: f64) -> ShapePath {
    let c = rect.center();
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;
    let rot = |dx: f64, dy: f64| Point::new(c.x + dx, c.y + dy).rotate_around(c, rotation_deg);

    let mut path = ShapePath::new();
    path.move_to(rot(rx, 0.0));
    path.cubic_to(rot(rx, ky), rot(kx, ry), rot(0.0, ry));
    path.cubic_to(rot(-kx, ry), rot(-rx, ky), rot(-rx, 0.0));
    path.cubic_to(rot(-rx, -ky), rot(-kx, -ry), rot(0.0, -ry));
    path.cubic_to(rot(kx, -ry), rot(rx, -ky), rot(rx, 0.0));
    path.close();
    path
}

/// Point on a circle at a math angle (y up, counter-clockwise positive)
pub fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Point::new(center.x + radius * cos, center.y - radius * sin)
}

/// Closed circular sector: apex, arc from `start_deg` sweeping `sweep_deg`
/// counter-clockwise (math convention), back to apex
pub fn sector_outline(apex: Point, radius: f64, start_deg: f64, sweep_deg: f64) -> ShapePath {
    let mut path = ShapePath::new();
    path.move_to(apex);
    path.line_to(polar(apex, radius, start_deg));

    let pieces = (sweep_deg.abs() / 90.0).ceil().max(1.0) as usize;
    let step = sweep_deg / pieces as f64;
    // Control distance for a circular arc of `step` degrees
    let k = 4.0 / 3.0 * (step.to_radians() / 4.0).tan() * radius;
    for i in 0..pieces {
        let a0 = start_deg + step * i as f64;
        let a1 = a0 + step;
        let p0 = polar(apex, radius, a0);
        let p1 = polar(apex, radius, a1);
        // Tangent of a math-angle arc in y-down coordinates is (-sin, -cos)
        let (s0, c0) = a0.to_radians().sin_cos();
        let (s1, c1) = a1.to_radians().sin_cos();
        let ctrl1 = Point::new(p0.x - k * s0, p0.y - k * c0);
        let ctrl2 = Point::new(p1.x + k * s1, p1.y + k * c1);
        path.cubic_to(ctrl1, ctrl2, p1);
    }
    path.close();
    path
}

/// Exact bounding box of a sector: apex, arc ends and any axis crossings
pub fn sector_bounds(apex: Point, radius: f64, start_deg: f64, sweep_deg: f64) -> Rect {
    let mut points = vec![
        apex,
        polar(apex, radius, start_deg),
        polar(apex, radius, start_deg + sweep_deg),
    ];
    let (lo, hi) = if sweep_deg >= 0.0 {
        (start_deg, start_deg + sweep_deg)
    } else {
        (start_deg + sweep_deg, start_deg)
    };
    let mut axis = (lo / 90.0).ceil() * 90.0;
    while axis <= hi {
        points.push(polar(apex, radius, axis));
        axis += 90.0;
    }
    bounding_box(&points).unwrap_or_default()
}

/// Distance from `p` to the segment `a-b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f64::EPSILON {
        return p.distance_to(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance_to(a.lerp(b, t))
}

/// Check if a point lies inside a triangle (edges included)
pub fn triangle_contains(tri: &[Point; 3], p: Point) -> bool {
    let cross = |a: Point, b: Point, c: Point| (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    let d1 = cross(tri[0], tri[1], p);
    let d2 = cross(tri[1], tri[2], p);
    let d3 = cross(tri[2], tri[0], p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PathCommand;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_head_length_scales_with_floor() {
        assert!(approx(arrow::head_length(1.0), 1.6));
        assert!(approx(arrow::head_length(4.0), 2.0));
        assert!(approx(arrow::head_length(8.0), 4.0));
    }

    #[test]
    fn test_straight_arrow_is_shortened_for_head() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let geom = arrow_geometry(&pts, 1.0, ArrowStyle::Solid, false);
        let end = geom.body.current_point().unwrap();
        // 10 - 1.6 * 0.7
        assert!(approx(end.x, 8.88));
        let head = geom.head.unwrap();
        assert_eq!(head[0], Point::new(10.0, 0.0));
        assert!(head[1].x < 10.0 && head[2].x < 10.0);
        assert!(approx(head[1].y, -head[2].y));
        assert!(!geom.dashed);
        assert!(approx(geom.pen_width, 0.1));
    }

    #[test]
    fn test_dotted_arrow_is_dashed() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(arrow_geometry(&pts, 1.0, ArrowStyle::Dotted, false).dashed);
    }

    #[test]
    fn test_zero_length_arrow_has_no_head() {
        let pts = [Point::new(3.0, 3.0), Point::new(3.0, 3.0)];
        let geom = arrow_geometry(&pts, 1.0, ArrowStyle::Solid, false);
        assert!(geom.head.is_none());
        assert_eq!(geom.body.current_point(), Some(Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_curved_path_uses_interior_points_as_controls() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 0.0),
        ];
        let path = curved_path(&pts, pts[2]);
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(pts[0]),
                PathCommand::QuadTo(pts[1], Point::new(7.5, 2.5)),
                PathCommand::LineTo(pts[2]),
            ]
        );
    }

    #[test]
    fn test_zigzag_ends_straight_on_shortened_end() {
        let pts = [Point::new(0.0, 0.0), Point::new(20.0, 0.0)];
        let geom = arrow_geometry(&pts, 1.0, ArrowStyle::Zigzag, false);
        let verts = geom.body.vertices();
        let last = *verts.last().unwrap();
        assert!(approx(last.x, 20.0 - 1.6 * 0.7));
        assert!(approx(last.y, 0.0));
        // The body oscillates within the amplitude somewhere before the tail
        let max_offset = verts.iter().map(|p| p.y.abs()).fold(0.0, f64::max);
        assert!(max_offset > 0.1 && max_offset <= constants::ZIGZAG_AMPLITUDE + 1e-9);
    }

    #[test]
    fn test_zigzag_tail_is_collinear_past_cutoff() {
        // 9 m and 8 m segments give 45 and 40 samples
        for len in [9.0, 8.0] {
            let start = Point::new(0.0, 0.0);
            let end = Point::new(len, 0.0);
            let path = zigzag_path(&[start, end], end);
            let mut past_cutoff = 0;
            for cmd in path.commands() {
                let points: Vec<Point> = match *cmd {
                    PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
                    PathCommand::QuadTo(c, p) => vec![c, p],
                    PathCommand::CubicTo(c1, c2, p) => vec![c1, c2, p],
                    PathCommand::Close => vec![],
                };
                for p in points {
                    if p.x / len > zigzag::STRAIGHT_TAIL + 1e-9 {
                        past_cutoff += 1;
                        assert!(p.y.abs() < 1e-9, "vertex {p:?} off the tail for length {len}");
                    }
                }
            }
            assert!(past_cutoff >= 5);
            assert_eq!(path.vertices().last().copied(), Some(end));
        }
    }

    #[test]
    fn test_zigzag_skips_degenerate_segments() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        ];
        let path = zigzag_path(&pts, Point::new(9.0, 0.0));
        assert!(path.commands().len() > 10);
        assert_eq!(path.commands()[0], PathCommand::MoveTo(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_rect_outline_rotation_keeps_center() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0);
        let path = rect_outline(r, 90.0);
        let bounds = path.control_bounds().unwrap();
        assert!(approx(bounds.width, 4.0));
        assert!(approx(bounds.height, 10.0));
        assert!(approx(bounds.center().x, 5.0));
    }

    #[test]
    fn test_sector_bounds_symmetric_cone() {
        let apex = Point::new(0.0, 0.0);
        // Pointing along +X with 60 degrees spread
        let b = sector_bounds(apex, 10.0, -30.0, 60.0);
        assert!(approx(b.left(), 0.0));
        assert!(approx(b.right(), 10.0));
        assert!(approx(b.top(), -5.0));
        assert!(approx(b.bottom(), 5.0));
    }

    #[test]
    fn test_sector_outline_arc_stays_on_circle() {
        let apex = Point::new(2.0, 3.0);
        let path = sector_outline(apex, 5.0, 10.0, 200.0);
        for v in path.vertices().iter().skip(1) {
            assert!(approx(v.distance_to(apex), 5.0));
        }
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(approx(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0));
        assert!(approx(distance_to_segment(Point::new(-4.0, 3.0), a, b), 5.0));
    }
}
