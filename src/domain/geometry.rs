//! Geometric types for pitch annotations, in scene units

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use super::selection::Corner;

/// Point in scene coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build from an `[x, y]` pair, rejecting NaN or infinite coordinates
    pub fn from_xy(xy: [f64; 2]) -> Option<Self> {
        let p = Self::new(xy[0], xy[1]);
        p.is_finite().then_some(p)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation, `t = 0` gives `self`
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn midpoint(&self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate around `center` by `deg`, clockwise on screen (y axis down)
    pub fn rotate_around(&self, center: Point, deg: f64) -> Point {
        let (sin, cos) = deg.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
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

/// Axis-aligned rectangle, always normalized (non-negative width and height)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle, normalizing negative extents
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_points(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Normalized rectangle spanning two opposite corners
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Position of the given corner
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.left(), self.top()),
            Corner::TopRight => Point::new(self.right(), self.top()),
            Corner::BottomLeft => Point::new(self.left(), self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// The four corners in `Corner::ALL` order
    pub fn corners(&self) -> [Point; 4] {
        Corner::ALL.map(|c| self.corner(c))
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Grow by `margin` on every side
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Check if this rectangle contains a point (edges included)
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: Rect) -> Rect {
        Rect::from_points(
            Point::new(self.left().min(other.left()), self.top().min(other.top())),
            Point::new(
                self.right().max(other.right()),
                self.bottom().max(other.bottom()),
            ),
        )
    }
}

/// Axis-aligned bounding box of a point set
pub fn bounding_box(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min, mut max) = (*first, *first);
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some(Rect::from_points(min, max))
}

/// Total length of a polyline
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(w[1])).sum()
}

/// Signed shortest angular difference `a2 - a1`, in degrees within [-180, 180)
pub fn shortest_angle_delta(a1: f64, a2: f64) -> f64 {
    (a2 - a1 + 540.0).rem_euclid(360.0) - 180.0
}

/// Bounding box of a rectangle rotated by `deg` about its center
pub fn rotated_rect_aabb(rect: Rect, deg: f64) -> Rect {
    let (s, c) = deg.to_radians().sin_cos();
    let (s, c) = (s.abs(), c.abs());
    Rect::from_center(
        rect.center(),
        rect.width * c + rect.height * s,
        rect.width * s + rect.height * c,
    )
}

/// Bounding box of the ellipse inscribed in `rect`, rotated by `deg` about its center
pub fn rotated_ellipse_aabb(rect: Rect, deg: f64) -> Rect {
    let (s, c) = deg.to_radians().sin_cos();
    let a = rect.width / 2.0;
    let b = rect.height / 2.0;
    let half_w = ((a * c).powi(2) + (b * s).powi(2)).sqrt();
    let half_h = ((a * s).powi(2) + (b * c).powi(2)).sqrt();
    Rect::from_center(rect.center(), half_w * 2.0, half_h * 2.0)
}

/// One segment of a vector path
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Renderer-independent vector path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePath {
    commands: Vec<PathCommand>,
}

impl ShapePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) {
        self.commands.push(PathCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.commands.push(PathCommand::LineTo(p));
    }

    pub fn quad_to(&mut self, ctrl: Point, p: Point) {
        self.commands.push(PathCommand::QuadTo(ctrl, p));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.commands.push(PathCommand::CubicTo(c1, c2, p));
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// End point of the last drawing command
    pub fn current_point(&self) -> Option<Point> {
        self.commands.iter().rev().find_map(|cmd| match *cmd {
            PathCommand::MoveTo(p)
            | PathCommand::LineTo(p)
            | PathCommand::QuadTo(_, p)
            | PathCommand::CubicTo(_, _, p) => Some(p),
            PathCommand::Close => None,
        })
    }

    /// On-curve points only, in drawing order
    pub fn vertices(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|cmd| match *cmd {
                PathCommand::MoveTo(p)
                | PathCommand::LineTo(p)
                | PathCommand::QuadTo(_, p)
                | PathCommand::CubicTo(_, _, p) => Some(p),
                PathCommand::Close => None,
            })
            .collect()
    }

    /// Bounding box of every point including control points
    pub fn control_bounds(&self) -> Option<Rect> {
        let mut points = Vec::with_capacity(self.commands.len() * 2);
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
                PathCommand::QuadTo(c, p) => points.extend([c, p]),
                PathCommand::CubicTo(c1, c2, p) => points.extend([c1, c2, p]),
                PathCommand::Close => {}
            }
        }
        bounding_box(&points)
    }
}
