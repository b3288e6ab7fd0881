//! Corner-handle resize and body-drag move, shared by every shape type
//!
//! A [`TransformController`] owns the interaction state for one shape at a
//! time: `Idle -> Resizing -> Idle` on handle press/release, or
//! `Idle -> Moving -> Idle` on body drag. The two are mutually exclusive.
//! Each resize update starts again from the snapshot taken on press, so the
//! result depends only on the original geometry and the current pointer.

use crate::domain::{
    Arrow, ConeZone, Corner, EllipseZone, Point, Rect, RectangleZone, ShapeId, ShapeOps,
    bounding_box, rotated_ellipse_aabb, rotated_rect_aabb,
};

/// Smallest width/height a resize may produce
pub const MIN_DIMENSION: f64 = 1.0;

/// Rotations closer than this to 45 degrees use proportional scaling
const DEGENERATE_DET: f64 = 1e-6;

/// Shapes that can be resized from a corner handle
pub trait Resizable: ShapeOps {
    /// Geometry captured when a resize starts
    type Snapshot: Clone + std::fmt::Debug;

    fn snapshot(&self, press: Point) -> Self::Snapshot;

    /// Recompute geometry for `corner` dragged to `pos`
    ///
    /// Returns `false` (leaving the shape untouched) when the result would be
    /// degenerate.
    fn resize_from(&mut self, snapshot: &Self::Snapshot, corner: Corner, pos: Point) -> bool;
}

/// Interaction state of a transform session
#[derive(Debug, Clone)]
pub enum DragState<S> {
    Idle,
    Resizing { corner: Corner, snapshot: S },
    Moving { last: Point },
}

impl<S> Default for DragState<S> {
    fn default() -> Self {
        DragState::Idle
    }
}

/// Resize/move state machine for the selected shape of one manager
#[derive(Debug)]
pub struct TransformController<T: Resizable> {
    state: DragState<T::Snapshot>,
    target: Option<ShapeId>,
}

impl<T: Resizable> Default for TransformController<T> {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            target: None,
        }
    }
}

impl<T: Resizable> TransformController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState<T::Snapshot> {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, DragState::Resizing { .. })
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, DragState::Moving { .. })
    }

    /// Shape the current session acts on
    pub fn target(&self) -> Option<ShapeId> {
        self.target
    }

    /// Start resizing from a handle press; refused while moving
    pub fn begin_resize(&mut self, shape: &T, corner: Corner, press: Point) -> bool {
        if self.is_moving() {
            return false;
        }
        self.state = DragState::Resizing {
            corner,
            snapshot: shape.snapshot(press),
        };
        self.target = Some(shape.id());
        true
    }

    /// Apply a handle drag; returns whether the geometry changed
    pub fn drag_resize(&mut self, shape: &mut T, pos: Point) -> bool {
        if self.target != Some(shape.id()) {
            return false;
        }
        match &self.state {
            DragState::Resizing { corner, snapshot } => shape.resize_from(snapshot, *corner, pos),
            _ => false,
        }
    }

    pub fn end_resize(&mut self) -> bool {
        if !self.is_resizing() {
            return false;
        }
        self.reset();
        true
    }

    /// Start dragging the body; refused while resizing
    pub fn begin_move(&mut self, shape: &T, pos: Point) -> bool {
        if self.is_resizing() {
            return false;
        }
        self.state = DragState::Moving { last: pos };
        self.target = Some(shape.id());
        true
    }

    /// Translate by the pointer delta since the last move update
    pub fn drag_move(&mut self, shape: &mut T, pos: Point) -> bool {
        if self.target != Some(shape.id()) {
            return false;
        }
        let DragState::Moving { last } = &mut self.state else {
            return false;
        };
        let (dx, dy) = (pos.x - last.x, pos.y - last.y);
        *last = pos;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        shape.translate(dx, dy);
        true
    }

    pub fn end_move(&mut self) -> bool {
        if !self.is_moving() {
            return false;
        }
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.target = None;
    }
}

// ============================================================================
// Rotation-aware solvers
// ============================================================================

/// Absolute sine and cosine of a rotation
fn abs_sin_cos(deg: f64) -> (f64, f64) {
    let (s, c) = deg.to_radians().sin_cos();
    (s.abs(), c.abs())
}

/// Target bounding box: `corner` moved to `pos`, the opposite corner of `bounds` fixed
fn target_bounds(bounds: Rect, corner: Corner, pos: Point) -> Option<Rect> {
    let fixed = bounds.corner(corner.opposite());
    let target = Rect::from_points(pos, fixed);
    (target.width > MIN_DIMENSION && target.height > MIN_DIMENSION).then_some(target)
}

/// Unrotated rectangle whose rotated bounding box matches the dragged one
pub fn solve_rotated_rect(orig: Rect, rotation_deg: f64, corner: Corner, pos: Point) -> Option<Rect> {
    let bounds = rotated_rect_aabb(orig, rotation_deg);
    let target = target_bounds(bounds, corner, pos)?;
    let (s, c) = abs_sin_cos(rotation_deg);
    let (bw, bh) = (target.width, target.height);
    let det = c * c - s * s;

    let (w, h) = if det.abs() < DEGENERATE_DET {
        (
            orig.width * bw / bounds.width.max(DEGENERATE_DET),
            orig.height * bh / bounds.height.max(DEGENERATE_DET),
        )
    } else {
        ((bw * c - bh * s) / det, (bh * c - bw * s) / det)
    };
    Some(Rect::from_center(
        target.center(),
        w.max(MIN_DIMENSION),
        h.max(MIN_DIMENSION),
    ))
}

/// Unrotated ellipse rectangle whose rotated ellipse bounds match the dragged box
pub fn solve_rotated_ellipse(
    orig: Rect,
    rotation_deg: f64,
    corner: Corner,
    pos: Point,
) -> Option<Rect> {
    let bounds = rotated_ellipse_aabb(orig, rotation_deg);
    let target = target_bounds(bounds, corner, pos)?;
    let (s, c) = abs_sin_cos(rotation_deg);
    let half_w = (target.width / 2.0).max(MIN_DIMENSION);
    let half_h = (target.height / 2.0).max(MIN_DIMENSION);
    let det = c * c - s * s;

    let (a, b) = if det.abs() < DEGENERATE_DET {
        let a0 = orig.width / 2.0;
        let b0 = orig.height / 2.0;
        (
            a0 * target.width / bounds.width.max(DEGENERATE_DET),
            b0 * target.height / bounds.height.max(DEGENERATE_DET),
        )
    } else {
        let (c2, s2) = (c * c, s * s);
        let a_sq = ((half_w * half_w * c2 - half_h * half_h * s2) / det).max(1e-6);
        let b_sq = ((half_h * half_h * c2 - half_w * half_w * s2) / det).max(1e-6);
        (a_sq.sqrt(), b_sq.sqrt())
    };
    Some(Rect::from_center(
        target.center(),
        (2.0 * a).max(MIN_DIMENSION),
        (2.0 * b).max(MIN_DIMENSION),
    ))
}

/// Bounding box after moving `corner` by `delta`
///
/// An axis with zero original extent stays as it is and is exempt from the
/// minimum-dimension check, so straight horizontal or vertical arrows can
/// still be stretched along their length.
pub fn stretch_bounds(orig: Rect, corner: Corner, delta: Point) -> Option<Rect> {
    let (mut left, mut right) = (orig.left(), orig.right());
    let (mut top, mut bottom) = (orig.top(), orig.bottom());

    if orig.width > 0.0 {
        if corner.is_left() {
            left += delta.x;
        } else {
            right += delta.x;
        }
        if right - left <= MIN_DIMENSION {
            return None;
        }
    }
    if orig.height > 0.0 {
        if corner.is_top() {
            top += delta.y;
        } else {
            bottom += delta.y;
        }
        if bottom - top <= MIN_DIMENSION {
            return None;
        }
    }
    Some(Rect {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}

/// Map `p` from its normalized position in `from` onto `to`
pub fn rescale_point(p: Point, from: Rect, to: Rect) -> Point {
    let nx = if from.width > 0.0 {
        (p.x - from.x) / from.width
    } else {
        0.0
    };
    let ny = if from.height > 0.0 {
        (p.y - from.y) / from.height
    } else {
        0.0
    };
    Point::new(to.x + nx * to.width, to.y + ny * to.height)
}

// ============================================================================
// Shape implementations
// ============================================================================

#[derive(Debug, Clone)]
pub struct ArrowSnapshot {
    points: Vec<Point>,
    press: Point,
}

impl Resizable for Arrow {
    type Snapshot = ArrowSnapshot;

    fn snapshot(&self, press: Point) -> ArrowSnapshot {
        ArrowSnapshot {
            points: self.points().to_vec(),
            press,
        }
    }

    fn resize_from(&mut self, snapshot: &ArrowSnapshot, corner: Corner, pos: Point) -> bool {
        let Some(orig) = bounding_box(&snapshot.points) else {
            return false;
        };
        let Some(new_bounds) = stretch_bounds(orig, corner, pos - snapshot.press) else {
            return false;
        };
        let points = snapshot
            .points
            .iter()
            .map(|p| rescale_point(*p, orig, new_bounds))
            .collect();
        self.set_points(points);
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RotatedRectSnapshot {
    rect: Rect,
    rotation_deg: f64,
}

impl Resizable for RectangleZone {
    type Snapshot = RotatedRectSnapshot;

    fn snapshot(&self, _press: Point) -> RotatedRectSnapshot {
        RotatedRectSnapshot {
            rect: self.rect(),
            rotation_deg: self.rotation_deg(),
        }
    }

    fn resize_from(&mut self, snapshot: &RotatedRectSnapshot, corner: Corner, pos: Point) -> bool {
        match solve_rotated_rect(snapshot.rect, snapshot.rotation_deg, corner, pos) {
            Some(rect) => {
                self.set_rect(rect);
                true
            }
            None => false,
        }
    }
}

impl Resizable for EllipseZone {
    type Snapshot = RotatedRectSnapshot;

    fn snapshot(&self, _press: Point) -> RotatedRectSnapshot {
        RotatedRectSnapshot {
            rect: self.rect(),
            rotation_deg: self.rotation_deg(),
        }
    }

    fn resize_from(&mut self, snapshot: &RotatedRectSnapshot, corner: Corner, pos: Point) -> bool {
        match solve_rotated_ellipse(snapshot.rect, snapshot.rotation_deg, corner, pos) {
            Some(rect) => {
                self.set_rect(rect);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConeSnapshot {
    apex: Point,
    direction: Point,
    edge2: Option<Point>,
    bounds: Rect,
    press: Point,
}

impl Resizable for ConeZone {
    type Snapshot = ConeSnapshot;

    fn snapshot(&self, press: Point) -> ConeSnapshot {
        ConeSnapshot {
            apex: self.apex(),
            direction: self.direction(),
            edge2: self.edge2(),
            bounds: self.bounds(),
            press,
        }
    }

    fn resize_from(&mut self, snapshot: &ConeSnapshot, corner: Corner, pos: Point) -> bool {
        let Some(new_bounds) = stretch_bounds(snapshot.bounds, corner, pos - snapshot.press) else {
            return false;
        };
        let map = |p: Point| rescale_point(p, snapshot.bounds, new_bounds);
        self.set_points(
            map(snapshot.apex),
            map(snapshot.direction),
            snapshot.edge2.map(map),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{ArrowStyle, ZoneAppearance, ZoneStyle};

    fn appearance() -> ZoneAppearance {
        ZoneAppearance {
            color: ShapeColor::BLACK,
            border_width: 1.0,
            style: ZoneStyle::Solid,
            fill_alpha: 0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_unrotated_rect_resize_keeps_opposite_corner() {
        let mut zone = RectangleZone::new(Rect::new(0.0, 0.0, 10.0, 10.0), appearance());
        let mut ctl = TransformController::new();
        assert!(ctl.begin_resize(&zone, Corner::BottomRight, Point::new(10.0, 10.0)));
        assert!(ctl.drag_resize(&mut zone, Point::new(15.0, 12.0)));
        assert_eq!(zone.rect(), Rect::new(0.0, 0.0, 15.0, 12.0));
        assert!(ctl.end_resize());
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_rotated_rect_resize_matches_dragged_bounds() {
        let mut zone = RectangleZone::new(Rect::new(0.0, 0.0, 10.0, 4.0), appearance());
        zone.set_rotation(30.0);
        let before = zone.bounds();
        let mut ctl = TransformController::new();
        ctl.begin_resize(&zone, Corner::BottomRight, before.corner(Corner::BottomRight));
        let target = before.corner(Corner::BottomRight).translate(2.0, 1.5);
        assert!(ctl.drag_resize(&mut zone, target));

        let after = zone.bounds();
        assert!(after.width > before.width && after.height > before.height);
        assert!(approx(after.left(), before.left()));
        assert!(approx(after.top(), before.top()));
        assert!(approx(after.right(), target.x));
        assert!(approx(after.bottom(), target.y));
    }

    #[test]
    fn test_rect_resize_at_45_degrees_scales_proportionally() {
        let orig = Rect::from_center(Point::default(), 10.0, 4.0);
        let bounds = rotated_rect_aabb(orig, 45.0);
        let pos = bounds.corner(Corner::BottomRight).translate(bounds.width, bounds.height);
        let rect = solve_rotated_rect(orig, 45.0, Corner::BottomRight, pos).unwrap();
        assert!(approx(rect.width, 20.0));
        assert!(approx(rect.height, 8.0));
    }

    #[test]
    fn test_ellipse_resize_recovers_semi_axes() {
        let orig = Rect::from_center(Point::default(), 10.0, 4.0);
        let rot = 20.0;
        let wanted = Rect::from_center(Point::default(), 16.0, 6.0);
        let wanted_bounds = rotated_ellipse_aabb(wanted, rot);
        let orig_bounds = rotated_ellipse_aabb(orig, rot);

        // Keep the top-left of the original bounds, drag bottom-right so the box has the wanted size
        let pos = orig_bounds
            .corner(Corner::TopLeft)
            .translate(wanted_bounds.width, wanted_bounds.height);
        let rect = solve_rotated_ellipse(orig, rot, Corner::BottomRight, pos).unwrap();
        assert!((rect.width - 16.0).abs() < 1e-6);
        assert!((rect.height - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_resize_is_rejected_and_session_continues() {
        let mut zone = EllipseZone::new(Rect::new(0.0, 0.0, 10.0, 10.0), appearance());
        let mut ctl = TransformController::new();
        ctl.begin_resize(&zone, Corner::BottomRight, Point::new(10.0, 10.0));
        assert!(!ctl.drag_resize(&mut zone, Point::new(0.5, 8.0)));
        assert_eq!(zone.rect(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(ctl.is_resizing());
        assert!(ctl.drag_resize(&mut zone, Point::new(6.0, 8.0)));
        assert_eq!(zone.rect(), Rect::new(0.0, 0.0, 6.0, 8.0));
    }

    #[test]
    fn test_arrow_resize_rescales_points() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(10.0, 5.0),
        ];
        let mut arrow = Arrow::new(pts, ShapeColor::BLACK, 1.0, ArrowStyle::Solid, true).unwrap();
        let mut ctl = TransformController::new();
        ctl.begin_resize(&arrow, Corner::BottomRight, Point::new(10.0, 10.0));
        assert!(ctl.drag_resize(&mut arrow, Point::new(20.0, 30.0)));
        assert_eq!(
            arrow.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 30.0),
                Point::new(20.0, 15.0),
            ]
        );
        // Shrinking below the minimum is a no-op
        assert!(!ctl.drag_resize(&mut arrow, Point::new(0.5, 30.0)));
        assert_eq!(arrow.points()[2], Point::new(20.0, 15.0));
    }

    #[test]
    fn test_horizontal_arrow_can_be_stretched() {
        let pts = vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)];
        let mut arrow = Arrow::new(pts, ShapeColor::BLACK, 1.0, ArrowStyle::Solid, false).unwrap();
        let mut ctl = TransformController::new();
        ctl.begin_resize(&arrow, Corner::TopLeft, Point::new(0.0, 5.0));
        assert!(ctl.drag_resize(&mut arrow, Point::new(-5.0, 9.0)));
        assert_eq!(arrow.points(), &[Point::new(-5.0, 5.0), Point::new(10.0, 5.0)]);
    }

    #[test]
    fn test_cone_resize_scales_defining_points() {
        let mut cone = ConeZone::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 90.0, appearance());
        let before = cone.bounds();
        let mut ctl = TransformController::new();
        let press = before.corner(Corner::BottomRight);
        ctl.begin_resize(&cone, Corner::BottomRight, press);
        assert!(ctl.drag_resize(&mut cone, press.translate(10.0, 0.0)));
        assert!(approx(cone.apex().x, 0.0));
        assert!(approx(cone.apex().y, 0.0));
        assert!(approx(cone.direction().x, 20.0));
        assert!(cone.radius() > 10.0);
    }

    #[test]
    fn test_move_and_resize_are_exclusive() {
        let mut zone = RectangleZone::new(Rect::new(0.0, 0.0, 10.0, 10.0), appearance());
        let mut ctl = TransformController::new();
        assert!(ctl.begin_move(&zone, Point::new(5.0, 5.0)));
        assert!(!ctl.begin_resize(&zone, Corner::TopLeft, Point::new(0.0, 0.0)));
        assert!(ctl.drag_move(&mut zone, Point::new(8.0, 9.0)));
        assert_eq!(zone.rect(), Rect::new(3.0, 4.0, 10.0, 10.0));
        assert!(ctl.end_move());

        assert!(ctl.begin_resize(&zone, Corner::TopLeft, Point::new(3.0, 4.0)));
        assert!(!ctl.begin_move(&zone, Point::new(5.0, 5.0)));
        assert!(!ctl.drag_move(&mut zone, Point::new(9.0, 9.0)));
    }

    #[test]
    fn test_controller_ignores_other_shapes() {
        let a = RectangleZone::new(Rect::new(0.0, 0.0, 10.0, 10.0), appearance());
        let mut b = RectangleZone::new(Rect::new(0.0, 0.0, 10.0, 10.0), appearance());
        let mut ctl = TransformController::new();
        ctl.begin_resize(&a, Corner::BottomRight, Point::new(10.0, 10.0));
        assert!(!ctl.drag_resize(&mut b, Point::new(20.0, 20.0)));
        assert_eq!(b.rect(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }
}
