//! Annotation board state: the scene plus one manager per shape family

use super::arrows::ArrowManager;
use super::messages::Tool;
use super::zones::{ConeZoneManager, EllipseZoneManager, RectangleZoneManager, ZoneDefaults};
use crate::config::{ShapeColor, TactiboardConfig};
use crate::domain::{Point, ShapeId, ShapeKind, ShapeOps, ShapeRef};
use crate::render::scene::Scene;

/// Click distance within which a shape counts as hit
pub const HIT_TOLERANCE: f64 = 5.0;

/// Click distance within which a resize handle counts as hit
pub const HANDLE_TOLERANCE: f64 = 0.3;

#[derive(Debug)]
pub struct Board {
    pub scene: Scene,
    pub arrows: ArrowManager,
    pub rectangles: RectangleZoneManager,
    pub ellipses: EllipseZoneManager,
    pub cones: ConeZoneManager,
    pub tool: Tool,
    /// New arrows are tactical and need player association
    pub simulation_mode: bool,
    pub hit_tolerance: f64,
    /// Family whose shape is being moved or resized by the pointer
    pub(crate) dragging: Option<ShapeKind>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&TactiboardConfig::default())
    }
}

impl Board {
    pub fn new(config: &TactiboardConfig) -> Self {
        let defaults = ZoneDefaults::from_config(config);
        Self {
            scene: Scene::new(),
            arrows: ArrowManager::from_config(config),
            rectangles: RectangleZoneManager::new(defaults),
            ellipses: EllipseZoneManager::new(defaults),
            cones: ConeZoneManager::new(defaults),
            tool: Tool::Select,
            simulation_mode: false,
            hit_tolerance: HIT_TOLERANCE,
            dragging: None,
        }
    }

    pub fn set_simulation_mode(&mut self, enabled: bool) {
        self.simulation_mode = enabled;
        self.arrows.set_tactical_mode(enabled);
    }

    /// Deselect shapes in every family
    pub fn clear_all_selections(&mut self) {
        self.arrows.clear_selection(&mut self.scene);
        self.rectangles.clear_selection(&mut self.scene);
        self.ellipses.clear_selection(&mut self.scene);
        self.cones.clear_selection(&mut self.scene);
        self.dragging = None;
    }

    /// Cancel in-progress zone creation in every zone family
    pub fn cancel_zones(&mut self) {
        self.rectangles.cancel_zone();
        self.ellipses.cancel_zone();
        self.cones.cancel_zone();
    }

    /// The current selection, if any
    pub fn selection(&self) -> Option<(ShapeKind, ShapeId)> {
        let arrow = self.arrows.selected().map(|s| (s.kind(), s.id()));
        arrow
            .or_else(|| self.rectangles.selected().map(|s| (s.kind(), s.id())))
            .or_else(|| self.ellipses.selected().map(|s| (s.kind(), s.id())))
            .or_else(|| self.cones.selected().map(|s| (s.kind(), s.id())))
    }

    /// Family of a live shape, as recorded by the scene
    pub fn kind_of(&self, id: ShapeId) -> Option<ShapeKind> {
        self.scene.kind_of(id)
    }

    pub fn shape(&self, id: ShapeId) -> Option<ShapeRef<'_>> {
        match self.kind_of(id)? {
            ShapeKind::Arrow => self.arrows.get(id).map(ShapeRef::Arrow),
            ShapeKind::Rectangle => self.rectangles.get(id).map(ShapeRef::Rectangle),
            ShapeKind::Ellipse => self.ellipses.get(id).map(ShapeRef::Ellipse),
            ShapeKind::Cone => self.cones.get(id).map(ShapeRef::Cone),
        }
    }

    /// Live shapes in scene z-order, bottom first
    pub fn shapes(&self) -> Vec<ShapeRef<'_>> {
        self.scene
            .items()
            .iter()
            .filter_map(|id| self.shape(*id))
            .collect()
    }

    /// Shapes being drawn but not yet committed
    pub fn previews(&self) -> Vec<ShapeRef<'_>> {
        let mut previews = Vec::new();
        previews.extend(self.rectangles.preview().map(ShapeRef::Rectangle));
        previews.extend(self.ellipses.preview().map(ShapeRef::Ellipse));
        previews.extend(self.cones.preview().map(ShapeRef::Cone));
        previews.extend(self.arrows.preview().map(ShapeRef::Arrow));
        previews
    }

    /// Topmost arrow under `pos`; arrows are checked before zones
    pub fn shape_at(&self, pos: Point) -> Option<(ShapeKind, ShapeId)> {
        let tol = self.hit_tolerance;
        if let Some(id) = self.arrows.arrow_at(pos, tol) {
            return Some((ShapeKind::Arrow, id));
        }
        // Zones in reverse z-order across families
        self.scene.items().iter().rev().find_map(|id| {
            let shape = self.shape(*id)?;
            (shape.kind() != ShapeKind::Arrow && shape.hit_test(pos, tol))
                .then(|| (shape.kind(), *id))
        })
    }

    /// Make `id` the only selection across all families
    pub fn select(&mut self, id: ShapeId) -> Option<ShapeKind> {
        let kind = self.kind_of(id)?;
        self.clear_all_selections();
        let scene = &mut self.scene;
        let selected = match kind {
            ShapeKind::Arrow => self.arrows.select_arrow(id, scene),
            ShapeKind::Rectangle => self.rectangles.select_zone(id, scene),
            ShapeKind::Ellipse => self.ellipses.select_zone(id, scene),
            ShapeKind::Cone => self.cones.select_zone(id, scene),
        };
        selected.then_some(kind)
    }

    /// Recolor an arrow with its player's team color
    pub fn tint_arrow(&mut self, id: ShapeId, color: ShapeColor) -> bool {
        self.arrows.set_arrow_color(id, color, &mut self.scene)
    }

    /// Is any family mid-drawing
    pub fn is_drawing(&self) -> bool {
        self.arrows.is_drawing()
            || self.rectangles.is_drawing()
            || self.ellipses.is_drawing()
            || self.cones.is_drawing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_rect(board: &mut Board, a: Point, b: Point) -> ShapeId {
        board.rectangles.add_point(a);
        board.rectangles.add_point(b);
        board.rectangles.finish_zone(&mut board.scene).unwrap()
    }

    #[test]
    fn test_family_lookup_uses_scene_registry() {
        let mut board = Board::default();
        let id = commit_rect(&mut board, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert_eq!(board.kind_of(id), Some(ShapeKind::Rectangle));
        assert_eq!(board.shape(id).map(|s| s.kind()), Some(ShapeKind::Rectangle));

        // Off the scene the shape no longer resolves, even before the sweep
        board.scene.remove(id);
        assert_eq!(board.kind_of(id), None);
        assert!(board.shape(id).is_none());
        board.clear_all_selections();
        assert!(board.rectangles.zones().is_empty());
    }

    #[test]
    fn test_select_is_exclusive_across_families() {
        let mut board = Board::default();
        let rect = commit_rect(&mut board, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        board.ellipses.add_point(Point::new(30.0, 30.0));
        board.ellipses.add_point(Point::new(35.0, 35.0));
        let ellipse = board.ellipses.finish_zone(&mut board.scene).unwrap();

        assert_eq!(board.select(rect), Some(ShapeKind::Rectangle));
        assert_eq!(board.select(ellipse), Some(ShapeKind::Ellipse));
        assert_eq!(board.selection(), Some((ShapeKind::Ellipse, ellipse)));
        assert!(board.rectangles.selected().is_none());
        assert_eq!(board.select(ShapeId::next()), None);
    }
}
