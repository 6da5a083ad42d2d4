/// Flat circle in the local xy plane
use nalgebra::Point3;

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::geometry::{project_circle, rim_points, ProjectedCircle};
use crate::matrix::Matrix3D;
use crate::projection::to_screen;
use crate::surface::{rotate_at, Ellipse, Geometry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitDescriptor {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl OrbitDescriptor {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Default for OrbitDescriptor {
    fn default() -> Self {
        Self::new(Point3::origin(), 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct Orbit {
    pub(crate) base: ObjectBase,
    descriptor: OrbitDescriptor,
    cache: Option<(ProjectedCircle, [Point3<f64>; 3])>,
}

impl Orbit {
    pub fn new(descriptor: OrbitDescriptor) -> Result<Self> {
        let mut orbit = Self {
            base: ObjectBase::default(),
            descriptor: OrbitDescriptor::default(),
            cache: None,
        };
        orbit.set_object(descriptor)?;
        Ok(orbit)
    }

    pub fn descriptor(&self) -> &OrbitDescriptor {
        &self.descriptor
    }

    pub fn set_object(&mut self, descriptor: OrbitDescriptor) -> Result<()> {
        if !(descriptor.radius >= 0.0 && descriptor.radius.is_finite()) {
            return Err(Error::malformed(
                "orbit",
                format!("radius must be finite and non-negative, got {}", descriptor.radius),
            ));
        }
        self.descriptor = descriptor;
        Ok(())
    }
}

impl Primitive for Orbit {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        let d = &self.descriptor;
        self.cache = Some((
            project_circle(&m, &d.center, d.radius),
            rim_points(&m, &d.center, d.radius),
        ));
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let (circle, _) = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let center = to_screen(&circle.center);
        let ellipse = Ellipse {
            center,
            rx: circle.ellipse.rx,
            ry: circle.ellipse.ry,
        };
        // Shade the side that faces the viewer
        let normal = if circle.normal.dot(&ctx.lighting.incident) > 0.0 {
            -circle.normal
        } else {
            circle.normal
        };
        let rotation = rotate_at(circle.ellipse.theta, &center);

        let shape = self
            .base
            .single(ctx, |surface, parent| surface.create_ellipse(parent, ellipse));
        ctx.surface.set_shape(shape, Geometry::Ellipse(ellipse));
        ctx.surface.set_transform(shape, rotation);
        self.base.paint(ctx, shape, &normal);
        Ok(())
    }

    fn z_order(&self) -> f64 {
        self.cache.as_ref().map(|(c, _)| c.center.z).unwrap_or(0.0)
    }

    fn outline(&self) -> Option<&[Point3<f64>]> {
        self.cache.as_ref().map(|(_, rim)| rim.as_slice())
    }
}
