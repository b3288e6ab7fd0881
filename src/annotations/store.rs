//! Owned collection of committed shapes with single selection
//!
//! Both the arrow manager and the zone managers keep their shapes here. The
//! store publishes every selection and geometry change to the scene, which
//! is how resize handles stay in sync.

use super::controller::{Resizable, TransformController};
use crate::domain::{Corner, GeometryEvent, HandleEvent, HandlePhase, Point, ShapeId, ShapeOps};
use crate::render::scene::Scene;

#[derive(Debug)]
pub struct ShapeStore<T: Resizable> {
    items: Vec<T>,
    selected: Option<ShapeId>,
    transform: TransformController<T>,
}

impl<T: Resizable> Default for ShapeStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            transform: TransformController::new(),
        }
    }
}

impl<T: Resizable> ShapeStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&T> {
        self.items.iter().find(|s| s.id() == id)
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.items.iter().position(|s| s.id() == id)
    }

    /// Take ownership of a committed shape and put it on the scene
    pub fn push(&mut self, shape: T, scene: &mut Scene) -> ShapeId {
        let id = shape.id();
        scene.add(id, shape.kind());
        self.items.push(shape);
        id
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Deselect everything, dropping shapes that are no longer on the scene
    pub fn clear_selection(&mut self, scene: &mut Scene) {
        self.items.retain(|shape| {
            let live = scene.contains(shape.id());
            if !live {
                log::warn!("Dropping stale shape {} no longer on the scene", shape.id());
            }
            live
        });
        for shape in &mut self.items {
            if shape.is_selected() {
                shape.set_selected(false);
                scene.publish(GeometryEvent::Deselected { shape: shape.id() });
            }
        }
        self.selected = None;
        self.transform.reset();
    }

    /// Select one shape (deselecting the others); `false` if it isn't owned here
    pub fn select(&mut self, id: ShapeId, scene: &mut Scene) -> bool {
        self.clear_selection(scene);
        let Some(shape) = self.items.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        shape.set_selected(true);
        scene.publish(GeometryEvent::Selected {
            shape: id,
            bounds: shape.bounds(),
        });
        self.selected = Some(id);
        true
    }

    /// Mutate one shape and publish its new bounds if it is selected
    pub fn update(&mut self, id: ShapeId, scene: &mut Scene, f: impl FnOnce(&mut T)) -> bool {
        let Some(shape) = self.items.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        f(shape);
        if shape.is_selected() {
            scene.publish(GeometryEvent::Updated {
                shape: id,
                bounds: shape.bounds(),
            });
        }
        true
    }

    /// Mutate the selected shape, if any
    pub fn update_selected(&mut self, scene: &mut Scene, f: impl FnOnce(&mut T)) -> bool {
        match self.selected {
            Some(id) => self.update(id, scene, f),
            None => false,
        }
    }

    /// Remove a shape from the collection and the scene
    pub fn remove(&mut self, id: ShapeId, scene: &mut Scene) -> Option<T> {
        let idx = self.index_of(id)?;
        let shape = self.items.remove(idx);
        if shape.is_selected() {
            scene.publish(GeometryEvent::Deselected { shape: id });
        }
        scene.remove(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.transform.target() == Some(id) {
            self.transform.reset();
        }
        Some(shape)
    }

    /// Detach handles, remove the selected shape, then clear selection
    pub fn delete_selected(&mut self, scene: &mut Scene) -> Option<T> {
        let removed = self.selected.and_then(|id| self.remove(id, scene));
        self.clear_selection(scene);
        removed
    }

    /// Remove the most recently committed shape
    pub fn pop(&mut self, scene: &mut Scene) -> Option<T> {
        let removed = self.items.last().map(|s| s.id()).and_then(|id| self.remove(id, scene));
        self.clear_selection(scene);
        removed
    }

    /// Topmost shape under `pos`
    pub fn shape_at(&self, pos: Point, tolerance: f64) -> Option<ShapeId> {
        self.items
            .iter()
            .rev()
            .find(|s| s.hit_test(pos, tolerance))
            .map(|s| s.id())
    }

    pub fn is_transforming(&self) -> bool {
        !self.transform.is_idle()
    }

    pub fn is_resizing(&self) -> bool {
        self.transform.is_resizing()
    }

    pub fn begin_resize(&mut self, id: ShapeId, corner: Corner, press: Point) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.transform.begin_resize(&self.items[idx], corner, press)
    }

    pub fn drag_resize(&mut self, pos: Point, scene: &mut Scene) -> bool {
        let Some(idx) = self.transform.target().and_then(|id| self.index_of(id)) else {
            return false;
        };
        let shape = &mut self.items[idx];
        if !self.transform.drag_resize(shape, pos) {
            return false;
        }
        scene.publish(GeometryEvent::Updated {
            shape: shape.id(),
            bounds: shape.bounds(),
        });
        true
    }

    pub fn end_resize(&mut self) -> bool {
        self.transform.end_resize()
    }

    /// Drive a resize from a handle interaction on one of our shapes
    pub fn handle_event(&mut self, event: HandleEvent, scene: &mut Scene) -> bool {
        if self.get(event.shape).is_none() {
            return false;
        }
        match event.phase {
            HandlePhase::Press => self.begin_resize(event.shape, event.corner, event.pos),
            HandlePhase::Drag => self.drag_resize(event.pos, scene),
            HandlePhase::Release => self.end_resize(),
        }
    }

    pub fn begin_move(&mut self, id: ShapeId, pos: Point) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.transform.begin_move(&self.items[idx], pos)
    }

    pub fn drag_move(&mut self, pos: Point, scene: &mut Scene) -> bool {
        let Some(idx) = self.transform.target().and_then(|id| self.index_of(id)) else {
            return false;
        };
        let shape = &mut self.items[idx];
        if !self.transform.drag_move(shape, pos) {
            return false;
        }
        if shape.is_selected() {
            scene.publish(GeometryEvent::Updated {
                shape: shape.id(),
                bounds: shape.bounds(),
            });
        }
        true
    }

    pub fn end_move(&mut self) -> bool {
        self.transform.end_move()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{Rect, RectangleZone, ZoneAppearance, ZoneStyle};

    fn zone(x: f64) -> RectangleZone {
        RectangleZone::new(
            Rect::new(x, 0.0, 10.0, 10.0),
            ZoneAppearance {
                color: ShapeColor::BLACK,
                border_width: 1.0,
                style: ZoneStyle::Solid,
                fill_alpha: 0,
            },
        )
    }

    #[test]
    fn test_single_selection() {
        let mut scene = Scene::new();
        let mut store = ShapeStore::new();
        let a = store.push(zone(0.0), &mut scene);
        let b = store.push(zone(20.0), &mut scene);
        assert!(store.select(a, &mut scene));
        assert!(store.select(b, &mut scene));
        assert!(!store.get(a).unwrap().is_selected());
        assert!(store.get(b).unwrap().is_selected());
        assert_eq!(store.selected_id(), Some(b));
        assert!(scene.handles().markers(a).is_none());
        assert!(scene.handles().markers(b).is_some());
    }

    #[test]
    fn test_stale_shapes_are_swept_on_clear() {
        let mut scene = Scene::new();
        let mut store = ShapeStore::new();
        let a = store.push(zone(0.0), &mut scene);
        let b = store.push(zone(20.0), &mut scene);
        scene.remove(a);
        store.clear_selection(&mut scene);
        assert_eq!(store.len(), 1);
        assert!(store.get(b).is_some());
        assert!(!store.select(a, &mut scene));
    }

    #[test]
    fn test_delete_selected_cleans_everything() {
        let mut scene = Scene::new();
        let mut store = ShapeStore::new();
        let a = store.push(zone(0.0), &mut scene);
        store.select(a, &mut scene);
        let removed = store.delete_selected(&mut scene).unwrap();
        assert_eq!(removed.id(), a);
        assert!(store.is_empty());
        assert!(scene.is_empty());
        assert!(scene.handles().is_empty());
        assert!(store.selected().is_none());
        assert!(store.delete_selected(&mut scene).is_none());
    }

    #[test]
    fn test_resize_publishes_updated_bounds() {
        let mut scene = Scene::new();
        let mut store = ShapeStore::new();
        let a = store.push(zone(0.0), &mut scene);
        store.select(a, &mut scene);
        assert!(store.begin_resize(a, Corner::BottomRight, Point::new(10.0, 10.0)));
        assert!(store.drag_resize(Point::new(14.0, 12.0), &mut scene));
        let markers = scene.handles().markers(a).unwrap();
        assert_eq!(markers[3].center, Point::new(14.0, 12.0));
        assert!(store.end_resize());
    }

    #[test]
    fn test_shape_at_prefers_topmost() {
        let mut scene = Scene::new();
        let mut store = ShapeStore::new();
        let _a = store.push(zone(0.0), &mut scene);
        let b = store.push(zone(5.0), &mut scene);
        assert_eq!(store.shape_at(Point::new(7.0, 5.0), 0.0), Some(b));
        assert_eq!(store.shape_at(Point::new(50.0, 5.0), 0.0), None);
    }
}
