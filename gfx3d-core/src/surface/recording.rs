/// In-memory surface that keeps the shape tree it was asked to build
use nalgebra::Point2;
use std::collections::BTreeMap;

use super::{Affine2, Ellipse, Geometry, Paint, ShapeId, Stroke, Surface};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedShape {
    pub geometry: Geometry,
    pub parent: Option<ShapeId>,
    pub children: Vec<ShapeId>,
    pub stroke: Option<Stroke>,
    pub fill: Option<Paint>,
    pub transform: Affine2,
}

impl RecordedShape {
    fn new(geometry: Geometry, parent: Option<ShapeId>) -> Self {
        Self {
            geometry,
            parent,
            children: Vec::new(),
            stroke: None,
            fill: None,
            transform: Affine2::identity(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.geometry, Geometry::Group)
    }
}

/// A [`Surface`] that records shapes instead of drawing them.
///
/// Used headless and in tests; other backends can wrap it and rasterize
/// the recorded tree in [`RecordingSurface::paint_order`].
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    shapes: BTreeMap<ShapeId, RecordedShape>,
    roots: Vec<ShapeId>,
    next_id: u64,
    created: usize,
    removed: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&RecordedShape> {
        self.shapes.get(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Number of live shapes, groups included.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn roots(&self) -> &[ShapeId] {
        &self.roots
    }

    pub fn children(&self, id: ShapeId) -> &[ShapeId] {
        self.shapes
            .get(&id)
            .map(|shape| shape.children.as_slice())
            .unwrap_or(&[])
    }

    /// Total shapes created since construction.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total shapes removed since construction.
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// Leaf shapes (everything but groups) back to front.
    pub fn paint_order(&self) -> Vec<ShapeId> {
        let mut order = Vec::new();
        for root in &self.roots {
            self.collect_leaves(*root, &mut order);
        }
        order
    }

    /// Leaf shapes below `group`, back to front.
    pub fn leaves_of(&self, group: ShapeId) -> Vec<ShapeId> {
        let mut order = Vec::new();
        self.collect_leaves(group, &mut order);
        order
    }

    /// Transform from shape space to surface space, including every ancestor group.
    pub fn world_transform(&self, id: ShapeId) -> Affine2 {
        let mut transform = Affine2::identity();
        let mut current = Some(id);
        while let Some(shape) = current.and_then(|id| self.shapes.get(&id)) {
            transform = shape.transform * transform;
            current = shape.parent;
        }
        transform
    }

    fn collect_leaves(&self, id: ShapeId, out: &mut Vec<ShapeId>) {
        let Some(shape) = self.shapes.get(&id) else {
            return;
        };
        if shape.is_group() {
            for child in &shape.children {
                self.collect_leaves(*child, out);
            }
        } else {
            out.push(id);
        }
    }

    fn insert(&mut self, geometry: Geometry, parent: Option<ShapeId>) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.created += 1;

        let parent = parent.filter(|p| self.shapes.contains_key(p));
        match parent {
            Some(p) => {
                if let Some(group) = self.shapes.get_mut(&p) {
                    group.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.shapes.insert(id, RecordedShape::new(geometry, parent));
        id
    }

    fn drop_subtree(&mut self, id: ShapeId) {
        if let Some(shape) = self.shapes.remove(&id) {
            self.removed += 1;
            for child in shape.children {
                self.drop_subtree(child);
            }
        }
    }
}

impl Surface for RecordingSurface {
    fn create_group(&mut self, parent: Option<ShapeId>) -> ShapeId {
        self.insert(Geometry::Group, parent)
    }

    fn create_path(&mut self, parent: ShapeId) -> ShapeId {
        self.insert(Geometry::Path(Vec::new()), Some(parent))
    }

    fn create_polyline(&mut self, parent: ShapeId, points: &[Point2<f64>]) -> ShapeId {
        self.insert(Geometry::Polyline(points.to_vec()), Some(parent))
    }

    fn create_ellipse(&mut self, parent: ShapeId, ellipse: Ellipse) -> ShapeId {
        self.insert(Geometry::Ellipse(ellipse), Some(parent))
    }

    fn set_shape(&mut self, shape: ShapeId, geometry: Geometry) {
        if let Some(s) = self.shapes.get_mut(&shape) {
            s.geometry = geometry;
        }
    }

    fn set_stroke(&mut self, shape: ShapeId, stroke: Option<Stroke>) {
        if let Some(s) = self.shapes.get_mut(&shape) {
            s.stroke = stroke;
        }
    }

    fn set_fill(&mut self, shape: ShapeId, fill: Option<Paint>) {
        if let Some(s) = self.shapes.get_mut(&shape) {
            s.fill = fill;
        }
    }

    fn set_transform(&mut self, shape: ShapeId, transform: Affine2) {
        if let Some(s) = self.shapes.get_mut(&shape) {
            s.transform = transform;
        }
    }

    fn apply_transform(&mut self, shape: ShapeId, transform: &Affine2) {
        if let Some(s) = self.shapes.get_mut(&shape) {
            s.transform *= transform;
        }
    }

    fn clear(&mut self, group: ShapeId) {
        let children = match self.shapes.get_mut(&group) {
            Some(g) => std::mem::take(&mut g.children),
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn remove(&mut self, shape: ShapeId) {
        let parent = match self.shapes.get(&shape) {
            Some(s) => s.parent,
            None => return,
        };
        match parent.and_then(|p| self.shapes.get_mut(&p)) {
            Some(group) => group.children.retain(|c| *c != shape),
            None => self.roots.retain(|c| *c != shape),
        }
        self.drop_subtree(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_paint_order_follows_creation() {
        let mut surface = RecordingSurface::new();
        let root = surface.create_group(None);
        let a = surface.create_polyline(root, &[Point2::new(0.0, 0.0)]);
        let inner = surface.create_group(Some(root));
        let b = surface.create_path(inner);
        let c = surface.create_ellipse(
            root,
            Ellipse {
                center: Point2::new(1.0, 1.0),
                rx: 2.0,
                ry: 1.0,
            },
        );
        assert_eq!(surface.paint_order(), vec![a, b, c]);
        assert_eq!(surface.leaves_of(inner), vec![b]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut surface = RecordingSurface::new();
        let root = surface.create_group(None);
        let inner = surface.create_group(Some(root));
        surface.create_path(inner);
        surface.create_path(inner);
        let keep = surface.create_path(root);

        surface.remove(inner);
        assert_eq!(surface.len(), 2);
        assert_eq!(surface.children(root), &[keep]);
        assert_eq!(surface.removed_count(), 3);

        surface.clear(root);
        assert_eq!(surface.len(), 1);
        assert!(surface.paint_order().is_empty());
    }

    #[test]
    fn test_stroke_fill_and_transform() {
        let mut surface = RecordingSurface::new();
        let root = surface.create_group(None);
        let shape = surface.create_path(root);
        surface.set_stroke(shape, Some(Stroke::new(Color::RED)));
        surface.set_fill(shape, Some(Paint::Solid(Color::BLUE)));
        let shift = crate::surface::translation(nalgebra::Vector2::new(2.0, 0.0));
        surface.apply_transform(root, &shift);

        let recorded = surface.shape(shape).unwrap();
        assert_eq!(recorded.stroke, Some(Stroke::new(Color::RED)));
        assert_eq!(recorded.fill, Some(Paint::Solid(Color::BLUE)));
        let world = surface.world_transform(shape);
        let p = world.transform_point(&Point2::new(1.0, 1.0));
        assert!((p.x - 3.0).abs() < 1e-12);
    }
}
