//! Annotation types drawn on the pitch
//!
//! All annotation types store coordinates in scene units. Derived geometry
//! (paths, bounds) is recomputed on every mutation.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, ShapePath, bounding_box, rotated_ellipse_aabb, rotated_rect_aabb};
use crate::config::ShapeColor;
use crate::render::geometry::{
    self as shape_geometry, ArrowGeometry, distance_to_segment, polar, triangle_contains,
};

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a shape for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl ShapeId {
    pub fn next() -> Self {
        ShapeId(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arrow line style, which also decides the simulated action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    #[default]
    Solid,
    Dotted,
    Zigzag,
}

impl ArrowStyle {
    pub fn parse(name: &str) -> Option<ArrowStyle> {
        match name.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(ArrowStyle::Solid),
            "dotted" | "dot" => Some(ArrowStyle::Dotted),
            "zigzag" | "zig-zag" => Some(ArrowStyle::Zigzag),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArrowStyle::Solid => "solid",
            ArrowStyle::Dotted => "dotted",
            ArrowStyle::Zigzag => "zigzag",
        }
    }
}

/// Zone border style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStyle {
    #[default]
    Solid,
    Dashed,
}

impl ZoneStyle {
    /// Map any style name onto a zone style; dash synonyms become dashed
    pub fn normalize(name: &str) -> ZoneStyle {
        match name.trim().to_ascii_lowercase().as_str() {
            "dash" | "dashed" | "--" => ZoneStyle::Dashed,
            _ => ZoneStyle::Solid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneStyle::Solid => "solid",
            ZoneStyle::Dashed => "dashed",
        }
    }
}

/// Which family a shape belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Arrow,
    Rectangle,
    Ellipse,
    Cone,
}

/// Capabilities shared by every annotation shape
pub trait ShapeOps {
    fn id(&self) -> ShapeId;
    fn kind(&self) -> ShapeKind;
    /// Axis-aligned bounds of the drawn shape, used for selection handles
    fn bounds(&self) -> Rect;
    fn is_selected(&self) -> bool;
    fn set_selected(&mut self, selected: bool);
    fn translate(&mut self, dx: f64, dy: f64);
    fn hit_test(&self, p: Point, tolerance: f64) -> bool;
}

// ============================================================================
// Arrow
// ============================================================================

/// Polyline arrow with a filled head at its last point
#[derive(Clone, Debug, PartialEq)]
pub struct Arrow {
    id: ShapeId,
    points: Vec<Point>,
    color: ShapeColor,
    width: f64,
    style: ArrowStyle,
    curved: bool,
    from_player: Option<String>,
    to_player: Option<String>,
    selected: bool,
    geometry: ArrowGeometry,
}

impl Arrow {
    /// Create an arrow; `None` when fewer than two points are given
    pub fn new(
        points: Vec<Point>,
        color: ShapeColor,
        width: f64,
        style: ArrowStyle,
        curved: bool,
    ) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let mut arrow = Self {
            id: ShapeId::next(),
            points,
            color,
            width,
            style,
            curved,
            from_player: None,
            to_player: None,
            selected: false,
            geometry: ArrowGeometry::default(),
        };
        arrow.refresh();
        Some(arrow)
    }

    fn refresh(&mut self) {
        self.geometry =
            shape_geometry::arrow_geometry(&self.points, self.width, self.style, self.curved);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Replace all points; ignored when fewer than two are given
    pub fn set_points(&mut self, points: Vec<Point>) {
        if points.len() >= 2 {
            self.points = points;
            self.refresh();
        }
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Straight-line distance from first to last point
    pub fn chord_length(&self) -> f64 {
        self.start().distance_to(self.end())
    }

    pub fn color(&self) -> ShapeColor {
        self.color
    }

    pub fn set_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.refresh();
    }

    pub fn style(&self) -> ArrowStyle {
        self.style
    }

    pub fn set_style(&mut self, style: ArrowStyle) {
        self.style = style;
        self.refresh();
    }

    pub fn is_curved(&self) -> bool {
        self.curved
    }

    pub fn geometry(&self) -> &ArrowGeometry {
        &self.geometry
    }

    pub fn from_player(&self) -> Option<&str> {
        self.from_player.as_deref()
    }

    pub fn set_from_player(&mut self, player: Option<String>) {
        self.from_player = player;
    }

    pub fn to_player(&self) -> Option<&str> {
        self.to_player.as_deref()
    }

    pub fn set_to_player(&mut self, player: Option<String>) {
        self.to_player = player;
    }

    /// Bounding box of the defining points
    pub fn point_bounds(&self) -> Rect {
        bounding_box(&self.points).unwrap_or_default()
    }
}

impl ShapeOps for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Arrow
    }

    fn bounds(&self) -> Rect {
        self.point_bounds()
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            *p = p.translate(dx, dy);
        }
        self.refresh();
    }

    fn hit_test(&self, p: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.geometry.pen_width / 2.0;
        if let Some(head) = &self.geometry.head
            && triangle_contains(head, p)
        {
            return true;
        }
        self.points
            .windows(2)
            .any(|w| distance_to_segment(p, w[0], w[1]) <= reach)
    }
}

// ============================================================================
// Zones
// ============================================================================

/// Styling shared by all zone kinds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneAppearance {
    pub color: ShapeColor,
    /// User-facing border width; the pen is `STROKE_FACTOR` times this
    pub border_width: f64,
    pub style: ZoneStyle,
    /// Fill alpha, 0 = transparent
    pub fill_alpha: u8,
}

impl ZoneAppearance {
    pub fn pen_width(&self) -> f64 {
        self.border_width * shape_geometry::shape::STROKE_FACTOR
    }

    pub fn fill_color(&self) -> ShapeColor {
        self.color.with_alpha(self.fill_alpha as f32 / 255.0)
    }
}

/// Rectangle zone rotated about its center
#[derive(Clone, Debug, PartialEq)]
pub struct RectangleZone {
    id: ShapeId,
    /// Unrotated rectangle
    rect: Rect,
    rotation_deg: f64,
    pub appearance: ZoneAppearance,
    selected: bool,
}

impl RectangleZone {
    pub fn new(rect: Rect, appearance: ZoneAppearance) -> Self {
        Self {
            id: ShapeId::next(),
            rect,
            rotation_deg: 0.0,
            appearance,
            selected: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn set_rotation(&mut self, deg: f64) {
        self.rotation_deg = deg;
    }

    pub fn outline(&self) -> ShapePath {
        shape_geometry::rect_outline(self.rect, self.rotation_deg)
    }
}

impl ShapeOps for RectangleZone {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn bounds(&self) -> Rect {
        rotated_rect_aabb(self.rect, self.rotation_deg)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.rect = self.rect.translate(dx, dy);
    }

    fn hit_test(&self, p: Point, tolerance: f64) -> bool {
        // Undo rotation, then test the plain rectangle
        let local = p.rotate_around(self.rect.center(), -self.rotation_deg);
        self.rect.inflate(tolerance).contains_point(local)
    }
}

/// Ellipse zone inscribed in a rotated rectangle
#[derive(Clone, Debug, PartialEq)]
pub struct EllipseZone {
    id: ShapeId,
    /// Unrotated bounding rectangle of the ellipse
    rect: Rect,
    rotation_deg: f64,
    pub appearance: ZoneAppearance,
    selected: bool,
}

impl EllipseZone {
    pub fn new(rect: Rect, appearance: ZoneAppearance) -> Self {
        Self {
            id: ShapeId::next(),
            rect,
            rotation_deg: 0.0,
            appearance,
            selected: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn set_rotation(&mut self, deg: f64) {
        self.rotation_deg = deg;
    }

    pub fn outline(&self) -> ShapePath {
        shape_geometry::ellipse_outline(self.rect, self.rotation_deg)
    }
}

impl ShapeOps for EllipseZone {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Ellipse
    }

    fn bounds(&self) -> Rect {
        rotated_ellipse_aabb(self.rect, self.rotation_deg)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.rect = self.rect.translate(dx, dy);
    }

    fn hit_test(&self, p: Point, tolerance: f64) -> bool {
        let c = self.rect.center();
        let local = p.rotate_around(c, -self.rotation_deg) - c;
        let a = self.rect.width / 2.0 + tolerance;
        let b = self.rect.height / 2.0 + tolerance;
        if a <= 0.0 || b <= 0.0 {
            return false;
        }
        (local.x / a).powi(2) + (local.y / b).powi(2) <= 1.0
    }
}

/// Circular sector anchored at an apex
///
/// Two construction modes: symmetric (apex + direction point + spread) and
/// two-edge (apex + both boundary points, shortest sweep between them).
#[derive(Clone, Debug, PartialEq)]
pub struct ConeZone {
    id: ShapeId,
    apex: Point,
    direction: Point,
    edge2: Option<Point>,
    spread_deg: f64,
    pub appearance: ZoneAppearance,
    selected: bool,
}

/// Arc parameters of a cone in math angles (y up, counter-clockwise)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
    pub radius: f64,
    pub start_deg: f64,
    pub sweep_deg: f64,
}

impl ConeZone {
    /// Symmetric cone whose bisector runs from `apex` through `direction`
    pub fn new(apex: Point, direction: Point, spread_deg: f64, appearance: ZoneAppearance) -> Self {
        Self {
            id: ShapeId::next(),
            apex,
            direction,
            edge2: None,
            spread_deg: spread_deg.max(0.0),
            appearance,
            selected: false,
        }
    }

    /// Cone bounded by the rays through `edge1` and `edge2`
    pub fn with_edges(apex: Point, edge1: Point, edge2: Point, appearance: ZoneAppearance) -> Self {
        Self {
            edge2: Some(edge2),
            ..Self::new(apex, edge1, 0.0, appearance)
        }
    }

    pub fn apex(&self) -> Point {
        self.apex
    }

    /// Direction point (symmetric mode) or first edge point (two-edge mode)
    pub fn direction(&self) -> Point {
        self.direction
    }

    pub fn edge2(&self) -> Option<Point> {
        self.edge2
    }

    /// Replace the defining points
    pub fn set_points(&mut self, apex: Point, direction: Point, edge2: Option<Point>) {
        self.apex = apex;
        self.direction = direction;
        self.edge2 = edge2;
    }

    pub fn radius(&self) -> f64 {
        self.apex.distance_to(self.direction).max(1.0)
    }

    /// Math angle of the apex-to-direction vector
    pub fn orientation_deg(&self) -> f64 {
        math_angle(self.apex, self.direction)
    }

    pub fn spread_deg(&self) -> f64 {
        match self.edge2 {
            None => self.spread_deg,
            Some(_) => self.sector().sweep_deg,
        }
    }

    pub fn set_spread_deg(&mut self, deg: f64) {
        self.spread_deg = deg.max(0.0);
    }

    /// Rotate so the bisector points at `deg` (math angle) while keeping the radius
    ///
    /// In two-edge mode both edge points turn together about the apex.
    pub fn set_rotation(&mut self, deg: f64) {
        match self.edge2 {
            None => self.direction = polar(self.apex, self.radius(), deg),
            Some(edge2) => {
                let sector = self.sector();
                let bisector = sector.start_deg + sector.sweep_deg / 2.0;
                // Screen rotation is clockwise-positive, math angles counter-clockwise
                let screen_delta = -(deg - bisector);
                self.direction = self.direction.rotate_around(self.apex, screen_delta);
                self.edge2 = Some(edge2.rotate_around(self.apex, screen_delta));
            }
        }
    }

    pub fn rotation_deg(&self) -> f64 {
        let sector = self.sector();
        sector.start_deg + sector.sweep_deg / 2.0
    }

    pub fn sector(&self) -> Sector {
        match self.edge2 {
            None => Sector {
                radius: self.radius(),
                start_deg: self.orientation_deg() - self.spread_deg / 2.0,
                sweep_deg: self.spread_deg,
            },
            Some(edge2) => {
                let r1 = self.radius();
                let r2 = self.apex.distance_to(edge2).max(1.0);
                let a1 = self.orientation_deg();
                let a2 = math_angle(self.apex, edge2);
                let delta = super::geometry::shortest_angle_delta(a1, a2);
                let (start_deg, sweep_deg) = if delta >= 0.0 { (a1, delta) } else { (a2, -delta) };
                Sector {
                    radius: r1.max(r2),
                    start_deg,
                    sweep_deg,
                }
            }
        }
    }

    pub fn outline(&self) -> ShapePath {
        let s = self.sector();
        shape_geometry::sector_outline(self.apex, s.radius, s.start_deg, s.sweep_deg)
    }

    /// Bounding box of the defining points (used for proportional resize)
    pub fn point_bounds(&self) -> Rect {
        let mut pts = vec![self.apex, self.direction];
        pts.extend(self.edge2);
        bounding_box(&pts).unwrap_or_default()
    }
}

/// Math angle (y up, counter-clockwise) from `from` to `to`, in degrees
fn math_angle(from: Point, to: Point) -> f64 {
    (-(to.y - from.y)).atan2(to.x - from.x).to_degrees()
}

impl ShapeOps for ConeZone {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Cone
    }

    fn bounds(&self) -> Rect {
        let s = self.sector();
        shape_geometry::sector_bounds(self.apex, s.radius, s.start_deg, s.sweep_deg)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.apex = self.apex.translate(dx, dy);
        self.direction = self.direction.translate(dx, dy);
        self.edge2 = self.edge2.map(|p| p.translate(dx, dy));
    }

    fn hit_test(&self, p: Point, tolerance: f64) -> bool {
        let s = self.sector();
        let dist = self.apex.distance_to(p);
        if dist <= tolerance {
            return true;
        }
        if dist > s.radius + tolerance {
            return false;
        }
        let offset = (math_angle(self.apex, p) - s.start_deg).rem_euclid(360.0);
        offset <= s.sweep_deg
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Borrowed view over any shape, for rendering and hit testing across families
#[derive(Clone, Copy, Debug)]
pub enum ShapeRef<'a> {
    Arrow(&'a Arrow),
    Rectangle(&'a RectangleZone),
    Ellipse(&'a EllipseZone),
    Cone(&'a ConeZone),
}

impl ShapeRef<'_> {
    fn ops(&self) -> &dyn ShapeOps {
        match *self {
            ShapeRef::Arrow(a) => a,
            ShapeRef::Rectangle(r) => r,
            ShapeRef::Ellipse(e) => e,
            ShapeRef::Cone(c) => c,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.ops().id()
    }

    pub fn kind(&self) -> ShapeKind {
        self.ops().kind()
    }

    pub fn bounds(&self) -> Rect {
        self.ops().bounds()
    }

    pub fn is_selected(&self) -> bool {
        self.ops().is_selected()
    }

    pub fn hit_test(&self, p: Point, tolerance: f64) -> bool {
        self.ops().hit_test(p, tolerance)
    }
}
