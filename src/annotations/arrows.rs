//! Arrow creation, preview, selection and storage

use super::store::ShapeStore;
use crate::config::{ShapeColor, TactiboardConfig};
use crate::domain::{Arrow, ArrowStyle, Corner, HandleEvent, Point, ShapeId};
use crate::render::scene::Scene;

/// Alpha applied to the in-progress preview arrow
pub const PREVIEW_ALPHA: f32 = 0.5;

/// What clicks do for the arrow manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowMode {
    #[default]
    Select,
    /// Two clicks: start and end
    Straight,
    /// Any number of clicks, committed explicitly
    Curve,
}

#[derive(Debug)]
pub struct ArrowManager {
    store: ShapeStore<Arrow>,
    points: Vec<Point>,
    preview: Option<Arrow>,
    mode: ArrowMode,
    color: ShapeColor,
    width: f64,
    style: ArrowStyle,
    tactical_mode: bool,
}

impl Default for ArrowManager {
    fn default() -> Self {
        Self::from_config(&TactiboardConfig::default())
    }
}

impl ArrowManager {
    pub fn from_config(config: &TactiboardConfig) -> Self {
        Self {
            store: ShapeStore::new(),
            points: Vec::new(),
            preview: None,
            mode: ArrowMode::Select,
            color: config.arrow_color,
            width: config.clamped_arrow_width(),
            style: config.arrow_style,
            tactical_mode: false,
        }
    }

    pub fn mode(&self) -> ArrowMode {
        self.mode
    }

    fn is_curved(&self) -> bool {
        self.mode == ArrowMode::Curve
    }

    /// Switch mode, dropping any in-progress arrow and the selection
    pub fn set_mode(&mut self, mode: ArrowMode, scene: &mut Scene) {
        self.cancel_arrow();
        self.clear_selection(scene);
        self.mode = mode;
    }

    pub fn set_tactical_mode(&mut self, enabled: bool) {
        self.tactical_mode = enabled;
    }

    pub fn tactical_mode(&self) -> bool {
        self.tactical_mode
    }

    /// Points collected for the arrow being drawn
    pub fn pending_points(&self) -> &[Point] {
        &self.points
    }

    /// Add a creation click; straight arrows stop accepting after two points
    pub fn add_point(&mut self, pos: Point) {
        if self.is_curved() || self.points.len() < 2 {
            self.points.push(pos);
        }
    }

    /// Rebuild the preview from the collected points plus the pointer
    pub fn update_preview(&mut self, pos: Point) {
        let Some(first) = self.points.first() else {
            return;
        };
        let pts = if self.is_curved() {
            let mut pts = self.points.clone();
            pts.push(pos);
            pts
        } else {
            vec![*first, pos]
        };
        self.preview = Arrow::new(
            pts,
            self.color.with_alpha(PREVIEW_ALPHA),
            self.width,
            self.style,
            self.is_curved(),
        );
    }

    pub fn preview(&self) -> Option<&Arrow> {
        self.preview.as_ref()
    }

    /// Commit the collected points as an arrow
    ///
    /// With fewer than two points nothing is committed and the buffer is reset.
    pub fn finish_arrow(&mut self, scene: &mut Scene) -> Option<ShapeId> {
        let points = std::mem::take(&mut self.points);
        self.preview = None;
        let arrow = Arrow::new(points, self.color, self.width, self.style, self.is_curved())?;
        let id = self.store.push(arrow, scene);
        log::debug!("Committed arrow {}", id);
        Some(id)
    }

    /// Commit if enough points were collected, otherwise cancel
    pub fn try_finish_arrow(&mut self, scene: &mut Scene) -> Option<ShapeId> {
        if self.points.len() >= 2 {
            self.finish_arrow(scene)
        } else {
            self.cancel_arrow();
            None
        }
    }

    pub fn cancel_arrow(&mut self) {
        self.points.clear();
        self.preview = None;
    }

    pub fn is_drawing(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn clear_selection(&mut self, scene: &mut Scene) {
        self.store.clear_selection(scene);
    }

    pub fn select_arrow(&mut self, id: ShapeId, scene: &mut Scene) -> bool {
        self.store.select(id, scene)
    }

    pub fn selected(&self) -> Option<&Arrow> {
        self.store.selected()
    }

    pub fn arrows(&self) -> &[Arrow] {
        self.store.items()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Arrow> {
        self.store.get(id)
    }

    /// Topmost arrow under `pos`
    pub fn arrow_at(&self, pos: Point, tolerance: f64) -> Option<ShapeId> {
        self.store.shape_at(pos, tolerance)
    }

    /// Recolor the selection, or the default for new arrows
    pub fn set_color(&mut self, color: ShapeColor, scene: &mut Scene) {
        if !self.store.update_selected(scene, |a| a.set_color(color)) {
            self.color = color;
        }
    }

    pub fn set_width(&mut self, width: f64, scene: &mut Scene) {
        if !self.store.update_selected(scene, |a| a.set_width(width)) {
            self.width = width;
        }
    }

    pub fn set_style(&mut self, style: ArrowStyle, scene: &mut Scene) {
        if !self.store.update_selected(scene, |a| a.set_style(style)) {
            self.style = style;
        }
    }

    /// Recolor one specific arrow
    pub fn set_arrow_color(&mut self, id: ShapeId, color: ShapeColor, scene: &mut Scene) -> bool {
        self.store.update(id, scene, |a| a.set_color(color))
    }

    /// Record the players an arrow starts from and points to
    pub fn set_arrow_players(
        &mut self,
        id: ShapeId,
        from: Option<String>,
        to: Option<String>,
        scene: &mut Scene,
    ) -> bool {
        self.store.update(id, scene, |a| {
            a.set_from_player(from);
            a.set_to_player(to);
        })
    }

    pub fn default_color(&self) -> ShapeColor {
        self.color
    }

    pub fn default_width(&self) -> f64 {
        self.width
    }

    pub fn default_style(&self) -> ArrowStyle {
        self.style
    }

    pub fn delete_selected(&mut self, scene: &mut Scene) -> Option<Arrow> {
        self.store.delete_selected(scene)
    }

    pub fn delete_last_arrow(&mut self, scene: &mut Scene) -> Option<Arrow> {
        self.store.pop(scene)
    }

    /// Delete a specific arrow
    pub fn remove(&mut self, id: ShapeId, scene: &mut Scene) -> Option<Arrow> {
        self.store.remove(id, scene)
    }

    pub fn is_transforming(&self) -> bool {
        self.store.is_transforming()
    }

    pub fn begin_resize(&mut self, id: ShapeId, corner: Corner, press: Point) -> bool {
        self.store.begin_resize(id, corner, press)
    }

    pub fn drag_resize(&mut self, pos: Point, scene: &mut Scene) -> bool {
        self.store.drag_resize(pos, scene)
    }

    pub fn end_resize(&mut self) -> bool {
        self.store.end_resize()
    }

    pub fn handle_event(&mut self, event: HandleEvent, scene: &mut Scene) -> bool {
        self.store.handle_event(event, scene)
    }

    pub fn begin_move(&mut self, id: ShapeId, pos: Point) -> bool {
        self.store.begin_move(id, pos)
    }

    pub fn drag_move(&mut self, pos: Point, scene: &mut Scene) -> bool {
        self.store.drag_move(pos, scene)
    }

    pub fn end_move(&mut self) -> bool {
        self.store.end_move()
    }
}
