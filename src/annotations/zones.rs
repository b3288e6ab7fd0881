//! Zone creation, preview, selection and storage
//!
//! One generic manager serves rectangles, ellipses and cones; each kind only
//! says how two creation clicks turn into its geometry.

use super::arrows::PREVIEW_ALPHA;
use super::controller::{MIN_DIMENSION, Resizable};
use super::store::ShapeStore;
use crate::config::{ShapeColor, TactiboardConfig};
use crate::domain::{
    ConeZone, Corner, EllipseZone, HandleEvent, Point, Rect, RectangleZone, ShapeId, ShapeKind,
    ZoneAppearance, ZoneStyle,
};
use crate::render::scene::Scene;

/// Defaults applied to newly created zones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneDefaults {
    pub appearance: ZoneAppearance,
    /// Interior angle for new cones
    pub spread_deg: f64,
}

impl ZoneDefaults {
    pub fn from_config(config: &TactiboardConfig) -> Self {
        Self {
            appearance: ZoneAppearance {
                color: config.zone_color,
                border_width: config.zone_width,
                style: config.zone_style,
                fill_alpha: config.zone_fill_alpha,
            },
            spread_deg: config.cone_spread_deg.max(0.0),
        }
    }
}

impl Default for ZoneDefaults {
    fn default() -> Self {
        Self::from_config(&TactiboardConfig::default())
    }
}

/// A zone kind the generic manager can create
pub trait Zone: Resizable + Clone {
    const KIND: ShapeKind;

    /// Build from the anchor click and the far click
    fn from_clicks(anchor: Point, far: Point, defaults: &ZoneDefaults) -> Self;

    fn appearance(&self) -> &ZoneAppearance;

    fn appearance_mut(&mut self) -> &mut ZoneAppearance;

    fn set_rotation(&mut self, deg: f64);

    fn rotation_deg(&self) -> f64;
}

impl Zone for RectangleZone {
    const KIND: ShapeKind = ShapeKind::Rectangle;

    /// Corners at both clicks
    fn from_clicks(anchor: Point, far: Point, defaults: &ZoneDefaults) -> Self {
        RectangleZone::new(Rect::from_points(anchor, far), defaults.appearance)
    }

    fn appearance(&self) -> &ZoneAppearance {
        &self.appearance
    }

    fn appearance_mut(&mut self) -> &mut ZoneAppearance {
        &mut self.appearance
    }

    fn set_rotation(&mut self, deg: f64) {
        RectangleZone::set_rotation(self, deg);
    }

    fn rotation_deg(&self) -> f64 {
        RectangleZone::rotation_deg(self)
    }
}

impl Zone for EllipseZone {
    const KIND: ShapeKind = ShapeKind::Ellipse;

    /// Centered on the anchor; the far click gives both radii
    fn from_clicks(anchor: Point, far: Point, defaults: &ZoneDefaults) -> Self {
        let rx = (far.x - anchor.x).abs();
        let ry = (far.y - anchor.y).abs();
        EllipseZone::new(
            Rect::from_center(anchor, 2.0 * rx, 2.0 * ry),
            defaults.appearance,
        )
    }

    fn appearance(&self) -> &ZoneAppearance {
        &self.appearance
    }

    fn appearance_mut(&mut self) -> &mut ZoneAppearance {
        &mut self.appearance
    }

    fn set_rotation(&mut self, deg: f64) {
        EllipseZone::set_rotation(self, deg);
    }

    fn rotation_deg(&self) -> f64 {
        EllipseZone::rotation_deg(self)
    }
}

impl Zone for ConeZone {
    const KIND: ShapeKind = ShapeKind::Cone;

    /// Apex at the anchor, bisector through the far click
    fn from_clicks(anchor: Point, far: Point, defaults: &ZoneDefaults) -> Self {
        ConeZone::new(anchor, far, defaults.spread_deg, defaults.appearance)
    }

    fn appearance(&self) -> &ZoneAppearance {
        &self.appearance
    }

    fn appearance_mut(&mut self) -> &mut ZoneAppearance {
        &mut self.appearance
    }

    fn set_rotation(&mut self, deg: f64) {
        ConeZone::set_rotation(self, deg);
    }

    fn rotation_deg(&self) -> f64 {
        ConeZone::rotation_deg(self)
    }
}

/// What clicks do for a zone manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneMode {
    #[default]
    Select,
    Create,
}

#[derive(Debug)]
pub struct ZoneManager<Z: Zone> {
    store: ShapeStore<Z>,
    points: Vec<Point>,
    preview: Option<Z>,
    mode: ZoneMode,
    defaults: ZoneDefaults,
}

pub type RectangleZoneManager = ZoneManager<RectangleZone>;
pub type EllipseZoneManager = ZoneManager<EllipseZone>;
pub type ConeZoneManager = ZoneManager<ConeZone>;

impl<Z: Zone> Default for ZoneManager<Z> {
    fn default() -> Self {
        Self::new(ZoneDefaults::default())
    }
}

impl<Z: Zone> ZoneManager<Z> {
    pub fn new(defaults: ZoneDefaults) -> Self {
        Self {
            store: ShapeStore::new(),
            points: Vec::new(),
            preview: None,
            mode: ZoneMode::Select,
            defaults,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        Z::KIND
    }

    pub fn mode(&self) -> ZoneMode {
        self.mode
    }

    /// Switch mode, dropping any in-progress zone and the selection
    pub fn set_mode(&mut self, mode: ZoneMode, scene: &mut Scene) {
        self.cancel_zone();
        self.clear_selection(scene);
        self.mode = mode;
    }

    pub fn defaults(&self) -> &ZoneDefaults {
        &self.defaults
    }

    /// Add a creation click (anchor, then far point)
    pub fn add_point(&mut self, pos: Point) {
        if self.points.len() < 2 {
            self.points.push(pos);
        }
    }

    pub fn is_drawing(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn update_preview(&mut self, pos: Point) {
        let Some(anchor) = self.points.first() else {
            return;
        };
        let mut defaults = self.defaults;
        defaults.appearance.color = defaults.appearance.color.with_alpha(PREVIEW_ALPHA);
        self.preview = Some(Z::from_clicks(*anchor, pos, &defaults));
    }

    pub fn preview(&self) -> Option<&Z> {
        self.preview.as_ref()
    }

    /// Commit the zone spanned by the two clicks
    ///
    /// Nothing is committed until both clicks exist, or when they are closer
    /// than the minimum dimension.
    pub fn finish_zone(&mut self, scene: &mut Scene) -> Option<ShapeId> {
        let [anchor, far] = self.points[..] else {
            return None;
        };
        self.points.clear();
        self.preview = None;
        if anchor.distance_to(far) < MIN_DIMENSION {
            log::debug!("Ignoring degenerate {:?} zone", Z::KIND);
            return None;
        }
        let id = self.store.push(Z::from_clicks(anchor, far, &self.defaults), scene);
        log::debug!("Committed {:?} zone {}", Z::KIND, id);
        Some(id)
    }

    pub fn cancel_zone(&mut self) {
        self.points.clear();
        self.preview = None;
    }

    pub fn clear_selection(&mut self, scene: &mut Scene) {
        self.store.clear_selection(scene);
    }

    pub fn select_zone(&mut self, id: ShapeId, scene: &mut Scene) -> bool {
        self.store.select(id, scene)
    }

    pub fn selected(&self) -> Option<&Z> {
        self.store.selected()
    }

    pub fn zones(&self) -> &[Z] {
        self.store.items()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Z> {
        self.store.get(id)
    }

    /// Topmost zone under `pos`
    pub fn zone_at(&self, pos: Point, tolerance: f64) -> Option<ShapeId> {
        self.store.shape_at(pos, tolerance)
    }

    pub fn set_color(&mut self, color: ShapeColor, scene: &mut Scene) {
        if !self
            .store
            .update_selected(scene, |z| z.appearance_mut().color = color)
        {
            self.defaults.appearance.color = color;
        }
    }

    pub fn set_width(&mut self, width: f64, scene: &mut Scene) {
        if !self
            .store
            .update_selected(scene, |z| z.appearance_mut().border_width = width)
        {
            self.defaults.appearance.border_width = width;
        }
    }

    /// Set the border style; any dash synonym selects dashed
    pub fn set_style(&mut self, style: &str, scene: &mut Scene) {
        let style = ZoneStyle::normalize(style);
        if !self
            .store
            .update_selected(scene, |z| z.appearance_mut().style = style)
        {
            self.defaults.appearance.style = style;
        }
    }

    pub fn set_fill_alpha(&mut self, alpha: u8, scene: &mut Scene) {
        if !self
            .store
            .update_selected(scene, |z| z.appearance_mut().fill_alpha = alpha)
        {
            self.defaults.appearance.fill_alpha = alpha;
        }
    }

    /// Rotate the selected zone; `false` when nothing is selected
    pub fn set_rotation(&mut self, deg: f64, scene: &mut Scene) -> bool {
        self.store.update_selected(scene, |z| z.set_rotation(deg))
    }

    pub fn delete_selected_zone(&mut self, scene: &mut Scene) -> Option<Z> {
        self.store.delete_selected(scene)
    }

    pub fn handle_event(&mut self, event: HandleEvent, scene: &mut Scene) -> bool {
        self.store.handle_event(event, scene)
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

impl ZoneManager<ConeZone> {
    /// Set the interior angle of the selected cone, or the default for new ones
    pub fn set_spread_deg(&mut self, deg: f64, scene: &mut Scene) {
        let deg = deg.max(0.0);
        if !self.store.update_selected(scene, |c| c.set_spread_deg(deg)) {
            self.defaults.spread_deg = deg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HandlePhase, ShapeOps};

    fn drag<Z: Zone>(mgr: &mut ZoneManager<Z>, scene: &mut Scene, a: Point, b: Point) -> Option<ShapeId> {
        mgr.set_mode(ZoneMode::Create, scene);
        mgr.add_point(a);
        mgr.update_preview(b);
        mgr.add_point(b);
        mgr.finish_zone(scene)
    }

    #[test]
    fn test_rectangle_from_two_clicks() {
        let mut scene = Scene::new();
        let mut mgr = RectangleZoneManager::default();
        let id = drag(&mut mgr, &mut scene, Point::new(10.0, 8.0), Point::new(2.0, 3.0)).unwrap();
        assert_eq!(mgr.get(id).unwrap().rect(), Rect::new(2.0, 3.0, 8.0, 5.0));
        assert!(mgr.preview().is_none());
        assert!(scene.contains(id));
    }

    #[test]
    fn test_ellipse_centered_on_first_click() {
        let mut scene = Scene::new();
        let mut mgr = EllipseZoneManager::default();
        let id = drag(&mut mgr, &mut scene, Point::new(10.0, 10.0), Point::new(14.0, 7.0)).unwrap();
        let ellipse = mgr.get(id).unwrap();
        assert_eq!(ellipse.rect(), Rect::new(6.0, 7.0, 8.0, 6.0));
        assert_eq!(ellipse.rect().center(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_cone_uses_default_spread() {
        let mut scene = Scene::new();
        let mut mgr = ConeZoneManager::default();
        mgr.set_spread_deg(45.0, &mut scene);
        let id = drag(&mut mgr, &mut scene, Point::new(0.0, 0.0), Point::new(10.0, 0.0)).unwrap();
        let cone = mgr.get(id).unwrap();
        assert_eq!(cone.spread_deg(), 45.0);
        assert_eq!(cone.apex(), Point::new(0.0, 0.0));

        mgr.select_zone(id, &mut scene);
        mgr.set_spread_deg(-10.0, &mut scene);
        assert_eq!(mgr.get(id).unwrap().spread_deg(), 0.0);
    }

    #[test]
    fn test_zone_defaults() {
        let mgr = RectangleZoneManager::default();
        let d = mgr.defaults().appearance;
        assert_eq!(d.color.to_rgba_u8(), [0, 0, 0, 255]);
        assert_eq!(d.border_width, 1.0);
        assert_eq!(d.fill_alpha, 0);
        assert_eq!(d.style, ZoneStyle::Solid);
        assert_eq!(ConeZoneManager::default().defaults().spread_deg, 60.0);
    }

    #[test]
    fn test_incomplete_or_degenerate_zone_is_not_committed() {
        let mut scene = Scene::new();
        let mut mgr = RectangleZoneManager::default();
        mgr.set_mode(ZoneMode::Create, &mut scene);
        mgr.add_point(Point::new(1.0, 1.0));
        assert!(mgr.finish_zone(&mut scene).is_none());
        assert!(mgr.is_drawing());
        mgr.add_point(Point::new(1.2, 1.1));
        assert!(mgr.finish_zone(&mut scene).is_none());
        assert!(!mgr.is_drawing());
        assert!(mgr.zones().is_empty());
    }

    #[test]
    fn test_style_normalization_on_selected_zone() {
        let mut scene = Scene::new();
        let mut mgr = EllipseZoneManager::default();
        let id = drag(&mut mgr, &mut scene, Point::new(0.0, 0.0), Point::new(5.0, 5.0)).unwrap();
        mgr.set_style("--", &mut scene);
        assert_eq!(mgr.defaults().appearance.style, ZoneStyle::Dashed);
        assert_eq!(mgr.get(id).unwrap().appearance.style, ZoneStyle::Solid);
        mgr.select_zone(id, &mut scene);
        mgr.set_style("dash", &mut scene);
        mgr.set_fill_alpha(120, &mut scene);
        let zone = mgr.get(id).unwrap();
        assert_eq!(zone.appearance.style, ZoneStyle::Dashed);
        assert_eq!(zone.appearance.fill_alpha, 120);
    }

    #[test]
    fn test_rotation_requires_selection() {
        let mut scene = Scene::new();
        let mut mgr = RectangleZoneManager::default();
        let id = drag(&mut mgr, &mut scene, Point::new(0.0, 0.0), Point::new(10.0, 4.0)).unwrap();
        assert!(!mgr.set_rotation(30.0, &mut scene));
        mgr.select_zone(id, &mut scene);
        assert!(mgr.set_rotation(90.0, &mut scene));
        let bounds = mgr.get(id).unwrap().bounds();
        assert!((bounds.width - 4.0).abs() < 1e-9);
        let markers = scene.handles().markers(id).unwrap();
        assert!((markers[3].center.x - bounds.right()).abs() < 1e-9);
    }

    #[test]
    fn test_handle_events_resize_selected_zone() {
        let mut scene = Scene::new();
        let mut mgr = RectangleZoneManager::default();
        let id = drag(&mut mgr, &mut scene, Point::new(0.0, 0.0), Point::new(10.0, 10.0)).unwrap();
        mgr.select_zone(id, &mut scene);
        let event = |phase, pos| HandleEvent {
            shape: id,
            corner: Corner::BottomRight,
            pos,
            phase,
        };
        assert!(mgr.handle_event(event(HandlePhase::Press, Point::new(10.0, 10.0)), &mut scene));
        assert!(mgr.handle_event(event(HandlePhase::Drag, Point::new(12.0, 16.0)), &mut scene));
        assert!(mgr.handle_event(event(HandlePhase::Release, Point::new(12.0, 16.0)), &mut scene));
        assert_eq!(mgr.get(id).unwrap().rect(), Rect::new(0.0, 0.0, 12.0, 16.0));

        let foreign = HandleEvent {
            shape: ShapeId::next(),
            ..event(HandlePhase::Press, Point::new(0.0, 0.0))
        };
        assert!(!mgr.handle_event(foreign, &mut scene));
    }
}
