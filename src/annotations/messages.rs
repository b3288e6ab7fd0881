//! Message types for the annotation board
//!
//! Input arrives as [`BoardMsg`]s; [`BoardEvent`]s report what changed so
//! the caller can follow up (player association, simulation refresh).

use crate::config::ShapeColor;
use crate::domain::{ArrowStyle, HandleEvent, Point, ShapeId, ShapeKind};

// ============================================================================
// Tools and pointer input
// ============================================================================

/// Active drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Arrow,
    Curve,
    RectangleZone,
    EllipseZone,
    ConeZone,
}

impl Tool {
    pub fn from_name(name: &str) -> Option<Tool> {
        match name {
            "select" => Some(Tool::Select),
            "arrow" => Some(Tool::Arrow),
            "curve" => Some(Tool::Curve),
            "rectangle_zone" => Some(Tool::RectangleZone),
            "ellipse_zone" => Some(Tool::EllipseZone),
            "cone_zone" => Some(Tool::ConeZone),
            _ => None,
        }
    }

    pub fn is_zone(self) -> bool {
        matches!(self, Tool::RectangleZone | Tool::EllipseZone | Tool::ConeZone)
    }

    pub fn is_arrow(self) -> bool {
        matches!(self, Tool::Arrow | Tool::Curve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

/// Pointer input in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Press(Point, PointerButton),
    Move(Point),
    Release(Point, PointerButton),
}

// ============================================================================
// Style changes
// ============================================================================

/// Property edits, applied to the selection or else to creation defaults
#[derive(Debug, Clone, PartialEq)]
pub enum StyleMsg {
    Color(ShapeColor),
    Width(f64),
    ArrowStyle(ArrowStyle),
    /// Zone border style name; dash synonyms are normalized
    ZoneStyle(String),
    FillAlpha(u8),
    /// Rotation of the selected zone in degrees
    Rotation(f64),
    /// Cone interior angle in degrees
    Spread(f64),
}

// ============================================================================
// Board messages
// ============================================================================

/// All board messages
#[derive(Debug, Clone, PartialEq)]
pub enum BoardMsg {
    /// Switch the active tool
    SetTool(Tool),
    /// Pointer input on the pitch
    Pointer(PointerAction),
    /// Direct handle interaction (from an overlay that hit-tests handles itself)
    Handle(HandleEvent),
    /// Interrupt key: finish or cancel the current drawing and return to select
    Interrupt,
    /// Delete whatever is selected
    DeleteSelected,
    /// Edit style properties
    Style(StyleMsg),
}

/// Outcome of a board message worth reacting to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardEvent {
    /// A new arrow was committed
    ArrowCommitted(ShapeId),
    /// A new zone was committed
    ZoneCommitted(ShapeKind, ShapeId),
    /// A shape was selected
    Selected(ShapeKind, ShapeId),
    /// A shape was deleted
    Deleted(ShapeKind, ShapeId),
}
