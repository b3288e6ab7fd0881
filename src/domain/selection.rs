//! Selection and resize-handle types shared by shapes, managers and the scene

use super::annotation::ShapeId;
use super::geometry::{Point, Rect};

/// Bounding-box corner a resize handle sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The corner diagonally across, which stays fixed while this one is dragged
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopRight => "top_right",
            Corner::BottomLeft => "bottom_left",
            Corner::BottomRight => "bottom_right",
        }
    }

    pub fn from_name(name: &str) -> Option<Corner> {
        Corner::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }
}

/// Phase of a handle interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePhase {
    Press,
    Drag,
    Release,
}

/// Pointer interaction on one resize handle, addressed to the shape's owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleEvent {
    pub shape: ShapeId,
    pub corner: Corner,
    pub pos: Point,
    pub phase: HandlePhase,
}

/// Geometry notification published by a shape owner to the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryEvent {
    /// Shape became the owner's selection
    Selected { shape: ShapeId, bounds: Rect },
    /// Selected shape changed geometry
    Updated { shape: ShapeId, bounds: Rect },
    /// Shape lost selection
    Deselected { shape: ShapeId },
    /// Shape left the scene
    Removed { shape: ShapeId },
}

impl GeometryEvent {
    pub fn shape(&self) -> ShapeId {
        match *self {
            GeometryEvent::Selected { shape, .. }
            | GeometryEvent::Updated { shape, .. }
            | GeometryEvent::Deselected { shape }
            | GeometryEvent::Removed { shape } => shape,
        }
    }
}

/// Square marker drawn on a selected shape's bounding-box corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMarker {
    pub corner: Corner,
    pub center: Point,
    pub size: f64,
}

impl HandleMarker {
    /// Default marker edge length in scene units
    pub const SIZE: f64 = 1.2;

    pub fn new(corner: Corner, center: Point) -> Self {
        Self {
            corner,
            center,
            size: Self::SIZE,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size, self.size)
    }

    /// Check if a point falls on this handle, with extra tolerance around it
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.rect().inflate(tolerance).contains_point(point)
    }
}

/// The four markers for one bounding box
pub fn markers_for(bounds: Rect) -> [HandleMarker; 4] {
    Corner::ALL.map(|corner| HandleMarker::new(corner, bounds.corner(corner)))
}
