//! Rendering surface registry and resize-handle overlay
//!
//! The scene records which shapes are live, which family each belongs to and
//! in what z-order. Shape owners publish [`GeometryEvent`]s here; they go
//! straight to the handle layer, which keeps corner markers on the selected
//! shapes' bounding boxes. Nothing is queued.

use std::collections::HashMap;

use crate::domain::{
    Corner, GeometryEvent, HandleMarker, Point, ShapeId, ShapeKind, markers_for,
};

/// Corner markers for every shape that currently shows them
#[derive(Debug, Default)]
pub struct HandleLayer {
    markers: HashMap<ShapeId, [HandleMarker; 4]>,
}

impl HandleLayer {
    /// React to a geometry notification
    pub fn apply(&mut self, event: &GeometryEvent) {
        match *event {
            GeometryEvent::Selected { shape, bounds } | GeometryEvent::Updated { shape, bounds } => {
                self.markers.insert(shape, markers_for(bounds));
            }
            GeometryEvent::Deselected { shape } | GeometryEvent::Removed { shape } => {
                self.markers.remove(&shape);
            }
        }
    }

    pub fn markers(&self, shape: ShapeId) -> Option<&[HandleMarker; 4]> {
        self.markers.get(&shape)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShapeId, &[HandleMarker; 4])> {
        self.markers.iter()
    }

    /// Find the handle under `pos`
    pub fn hit(&self, pos: Point, tolerance: f64) -> Option<(ShapeId, Corner)> {
        self.markers.iter().find_map(|(shape, markers)| {
            markers
                .iter()
                .find(|m| m.hit_test(pos, tolerance))
                .map(|m| (*shape, m.corner))
        })
    }
}

/// Registry of shapes present on the rendering surface
#[derive(Debug, Default)]
pub struct Scene {
    items: Vec<ShapeId>,
    kinds: HashMap<ShapeId, ShapeKind>,
    handles: HandleLayer,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a shape on top of the z-order
    pub fn add(&mut self, shape: ShapeId, kind: ShapeKind) {
        if self.kinds.insert(shape, kind).is_none() {
            self.items.push(shape);
        }
    }

    /// Take a shape off the surface
    ///
    /// Owners may still hold the shape afterwards; they discover it is stale
    /// on their next selection sweep.
    pub fn remove(&mut self, shape: ShapeId) -> bool {
        let before = self.items.len();
        self.items.retain(|id| *id != shape);
        let removed = self.items.len() != before;
        self.kinds.remove(&shape);
        if removed {
            self.publish(GeometryEvent::Removed { shape });
        }
        removed
    }

    pub fn contains(&self, shape: ShapeId) -> bool {
        self.kinds.contains_key(&shape)
    }

    /// Family of a live shape
    pub fn kind_of(&self, shape: ShapeId) -> Option<ShapeKind> {
        self.kinds.get(&shape).copied()
    }

    /// Live shapes, bottom first
    pub fn items(&self) -> &[ShapeId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deliver a geometry notification to subscribers
    pub fn publish(&mut self, event: GeometryEvent) {
        log::trace!("scene event {:?}", event);
        self.handles.apply(&event);
    }

    pub fn handles(&self) -> &HandleLayer {
        &self.handles
    }
}
