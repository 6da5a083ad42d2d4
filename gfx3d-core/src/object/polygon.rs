/// Closed planar polygon
use nalgebra::Point3;

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::matrix::Matrix3D;
use crate::projection::closed_ring;
use crate::surface::Geometry;
use crate::vector;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonDescriptor {
    pub points: Vec<Point3<f64>>,
}

impl PolygonDescriptor {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

#[derive(Debug, Clone)]
pub struct Polygon {
    pub(crate) base: ObjectBase,
    descriptor: PolygonDescriptor,
    cache: Option<Vec<Point3<f64>>>,
}

impl Polygon {
    pub fn new(descriptor: PolygonDescriptor) -> Result<Self> {
        let mut polygon = Self {
            base: ObjectBase::default(),
            descriptor: PolygonDescriptor::default(),
            cache: None,
        };
        polygon.set_object(descriptor)?;
        Ok(polygon)
    }

    pub fn descriptor(&self) -> &PolygonDescriptor {
        &self.descriptor
    }

    pub fn set_object(&mut self, descriptor: PolygonDescriptor) -> Result<()> {
        if descriptor.points.len() < 3 {
            return Err(Error::malformed(
                "polygon",
                format!("needs at least 3 points, got {}", descriptor.points.len()),
            ));
        }
        self.descriptor = descriptor;
        Ok(())
    }
}

impl Primitive for Polygon {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        self.cache = Some(self.descriptor.points.iter().map(|p| m.transform_point(p)).collect());
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let ring = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let normal = vector::ring_normal(ring);
        let points = closed_ring(ring);

        let shape = self
            .base
            .single(ctx, |surface, parent| surface.create_polyline(parent, &points));
        ctx.surface.set_shape(shape, Geometry::Polyline(points));
        self.base.paint(ctx, shape, &normal);
        Ok(())
    }

    fn z_order(&self) -> f64 {
        self.cache.as_deref().map(vector::mean_depth).unwrap_or(0.0)
    }

    fn outline(&self) -> Option<&[Point3<f64>]> {
        self.cache.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::lighting::{Ambient, Finish, Light, Lighting, Material};
    use crate::object::testing::draw_on;
    use crate::surface::Paint;
    use nalgebra::Vector3;

    fn triangle(z: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(0.0, 10.0, z),
            Point3::new(10.0, 0.0, z),
        ]
    }

    #[test]
    fn test_too_few_points() {
        assert!(Polygon::new(PolygonDescriptor::new(vec![Point3::origin(); 2])).is_err());
    }

    #[test]
    fn test_draws_closed_lit_polyline() {
        let mut polygon = Polygon::new(PolygonDescriptor::new(triangle(5.0))).unwrap();
        polygon.base.fill = Some(Material::new(Finish::Matte, Color::WHITE).into());
        polygon.render(&Matrix3D::identity());
        assert_eq!(polygon.z_order(), 5.0);
        assert_eq!(polygon.outline().unwrap().len(), 3);

        // (0,10,0) x (10,0,0) winding faces -z, toward the viewer
        let lighting = Lighting::new(
            Vector3::new(0.0, 0.0, 1.0),
            vec![Light::new(Vector3::new(0.0, 0.0, 1.0), Color::WHITE)],
            Ambient {
                color: Color::WHITE,
                intensity: 0.0,
            },
            Color::WHITE,
        );
        let (surface, root) = draw_on(&mut polygon, &lighting);
        let leaves = surface.leaves_of(root);
        assert_eq!(leaves.len(), 1);
        let shape = surface.shape(leaves[0]).unwrap();
        assert!(matches!(&shape.geometry, Geometry::Polyline(p) if p.len() == 4));
        match &shape.fill {
            Some(Paint::Solid(c)) => assert!((c.r - 0.8).abs() < 1e-9),
            other => panic!("unexpected fill {other:?}"),
        }
    }

    #[test]
    fn test_redraw_reuses_shape() {
        let mut polygon = Polygon::new(PolygonDescriptor::new(triangle(1.0))).unwrap();
        polygon.render(&Matrix3D::identity());
        let (mut surface, root) = draw_on(&mut polygon, &Lighting::default());
        let first = polygon.base.shape;

        polygon.render(&Matrix3D::translate(0.0, 0.0, 2.0));
        let lighting = Lighting::default();
        let mut ctx = DrawContext {
            surface: &mut surface,
            parent: root,
            lighting: &lighting,
            gradient_samples: 32,
        };
        polygon.draw(&mut ctx).unwrap();
        assert_eq!(polygon.base.shape, first);
        assert_eq!(surface.leaves_of(root).len(), 1);
    }
}
