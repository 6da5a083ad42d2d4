/// Right circular cylinder with a gradient-shaded body
use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::f64::consts::PI;

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::geometry::{project_circle, rim_points, ProjectedCircle};
use crate::gradient::{build_gradient, visible_arc};
use crate::lighting::Fill;
use crate::matrix::Matrix3D;
use crate::projection::to_screen;
use crate::surface::{rotate_at, Ellipse, Geometry, Paint, PathSegment};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderDescriptor {
    /// Center of the bottom cap.
    pub center: Point3<f64>,
    pub radius: f64,
    /// Extent along local +z.
    pub height: f64,
}

impl CylinderDescriptor {
    pub fn new(center: Point3<f64>, radius: f64, height: f64) -> Self {
        Self {
            center,
            radius,
            height,
        }
    }

    pub fn top_center(&self) -> Point3<f64> {
        self.center + Vector3::new(0.0, 0.0, self.height)
    }
}

impl Default for CylinderDescriptor {
    fn default() -> Self {
        Self::new(Point3::origin(), 100.0, 100.0)
    }
}

#[derive(Debug, Clone)]
struct CylinderCache {
    matrix: Matrix3D,
    bottom: ProjectedCircle,
    top: ProjectedCircle,
    /// Rim samples of the bottom cap, then of the top cap.
    rim: Vec<Point3<f64>>,
}

#[derive(Debug, Clone)]
pub struct Cylinder {
    pub(crate) base: ObjectBase,
    descriptor: CylinderDescriptor,
    cache: Option<CylinderCache>,
}

impl Cylinder {
    pub fn new(descriptor: CylinderDescriptor) -> Result<Self> {
        let mut cylinder = Self {
            base: ObjectBase::default(),
            descriptor: CylinderDescriptor::default(),
            cache: None,
        };
        cylinder.set_object(descriptor)?;
        Ok(cylinder)
    }

    pub fn descriptor(&self) -> &CylinderDescriptor {
        &self.descriptor
    }

    pub fn set_object(&mut self, descriptor: CylinderDescriptor) -> Result<()> {
        if !(descriptor.radius >= 0.0 && descriptor.radius.is_finite()) {
            return Err(Error::malformed(
                "cylinder",
                format!("radius must be finite and non-negative, got {}", descriptor.radius),
            ));
        }
        self.descriptor = descriptor;
        Ok(())
    }
}

/// Outline of the visible body: the silhouette edges closed by the half of
/// the far cap that bulges away from the near one.
fn body_path(far: &ProjectedCircle, near: &ProjectedCircle) -> Vec<PathSegment> {
    let ellipse = far.ellipse;
    let (c0, c1) = (to_screen(&far.center), to_screen(&near.center));
    let across: Vector2<f64> = ellipse.major_axis() * ellipse.rx;
    let sweep = if ellipse.minor_axis().dot(&(c1 - c0)) > 0.0 {
        PI
    } else {
        -PI
    };
    vec![
        PathSegment::MoveTo(c0 + across),
        PathSegment::LineTo(c1 + across),
        PathSegment::LineTo(c1 - across),
        PathSegment::LineTo(c0 - across),
        PathSegment::Arc {
            center: c0,
            rx: ellipse.rx,
            ry: ellipse.ry,
            rotation: ellipse.theta,
            start: PI,
            sweep,
        },
        PathSegment::Close,
    ]
}

impl Primitive for Cylinder {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        let d = &self.descriptor;
        let top_center = d.top_center();
        let mut rim = rim_points(&m, &d.center, d.radius).to_vec();
        rim.extend(rim_points(&m, &top_center, d.radius));
        self.cache = Some(CylinderCache {
            matrix: m,
            bottom: project_circle(&m, &d.center, d.radius),
            top: project_circle(&m, &top_center, d.radius),
            rim,
        });
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let cache = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let axis = cache.bottom.normal;
        // The near cap is the one whose outward normal faces the viewer
        let (far, near, near_normal) = if axis.dot(&ctx.lighting.incident) < 0.0 {
            (&cache.bottom, &cache.top, axis)
        } else {
            (&cache.top, &cache.bottom, -axis)
        };

        let body_fill = match &self.base.fill {
            Some(Fill::Material(material)) => {
                let (from, to) = visible_arc(
                    &cache.matrix,
                    &far.ellipse.major_axis(),
                    &ctx.lighting.incident,
                );
                Some(Paint::Linear(build_gradient(
                    ctx.lighting,
                    material,
                    &self.descriptor.center,
                    self.descriptor.radius,
                    from,
                    to,
                    &cache.matrix,
                    ctx.gradient_samples,
                )))
            }
            Some(Fill::Flat(color)) => Some(Paint::Solid(*color)),
            None => None,
        };
        let body = body_path(far, near);
        let cap_center: Point2<f64> = to_screen(&near.center);
        let cap = Ellipse {
            center: cap_center,
            rx: near.ellipse.rx,
            ry: near.ellipse.ry,
        };
        let cap_rotation = rotate_at(near.ellipse.theta, &cap_center);

        let group = self.base.group(ctx);
        let path = ctx.surface.create_path(group);
        ctx.surface.set_shape(path, Geometry::Path(body));
        ctx.surface.set_stroke(path, self.base.stroke);
        ctx.surface.set_fill(path, body_fill);

        let ellipse = ctx.surface.create_ellipse(group, cap);
        ctx.surface.set_transform(ellipse, cap_rotation);
        self.base.paint(ctx, ellipse, &near_normal);
        Ok(())
    }

    fn z_order(&self) -> f64 {
        self.cache
            .as_ref()
            .map(|c| 0.5 * (c.bottom.center.z + c.top.center.z))
            .unwrap_or(0.0)
    }

    fn outline(&self) -> Option<&[Point3<f64>]> {
        self.cache.as_ref().map(|c| c.rim.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::lighting::{Finish, Lighting, Material};
    use crate::object::testing::draw_on;
    use crate::surface::RecordingSurface;

    const EPS: f64 = 1e-6;

    fn upright() -> CylinderDescriptor {
        CylinderDescriptor::new(Point3::origin(), 10.0, 20.0)
    }

    fn draw(cylinder: &mut Cylinder) -> (RecordingSurface, Vec<crate::surface::ShapeId>) {
        let (surface, root) = draw_on(cylinder, &Lighting::default());
        let leaves = surface.leaves_of(surface.children(root)[0]);
        (surface, leaves)
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert!(Cylinder::new(CylinderDescriptor::new(Point3::origin(), -1.0, 5.0)).is_err());
    }

    #[test]
    fn test_end_on_view() {
        let mut cylinder = Cylinder::new(upright()).unwrap();
        cylinder.render(&Matrix3D::identity());
        assert_eq!(cylinder.outline().unwrap().len(), 6);
        assert!((cylinder.z_order() - 10.0).abs() < EPS);

        let (surface, leaves) = draw(&mut cylinder);
        assert_eq!(leaves.len(), 2);
        assert!(matches!(surface.shape(leaves[0]).unwrap().geometry, Geometry::Path(_)));
        match surface.shape(leaves[1]).unwrap().geometry {
            Geometry::Ellipse(e) => {
                assert!((e.rx - 10.0).abs() < EPS);
                assert!((e.ry - 10.0).abs() < EPS);
                assert_eq!(e.center, Point2::origin());
            }
            ref other => panic!("unexpected cap {other:?}"),
        }
    }

    #[test]
    fn test_tilted_body_bulges_away_from_near_cap() {
        let mut cylinder = Cylinder::new(upright()).unwrap();
        cylinder.base.matrix = Matrix3D::rotate_x_deg(60.0);
        cylinder.base.fill = Some(Material::new(Finish::Matte, Color::WHITE).into());
        cylinder.render(&Matrix3D::identity());

        let (surface, leaves) = draw(&mut cylinder);
        let body = surface.shape(leaves[0]).unwrap();
        let Geometry::Path(segments) = &body.geometry else {
            panic!("expected the body path");
        };
        assert_eq!(segments.len(), 6);
        let PathSegment::Arc { center, rx, ry, rotation, start, sweep } = segments[4] else {
            panic!("expected the far cap arc");
        };
        assert!((rx - 10.0).abs() < EPS);
        assert!((ry - 5.0).abs() < EPS);

        // The bottom cap faces the viewer here, so the arc sits on the top cap
        let near = Point2::origin();
        let t = start + 0.5 * sweep;
        let (major, minor) = (
            Vector2::new(rotation.cos(), rotation.sin()),
            Vector2::new(-rotation.sin(), rotation.cos()),
        );
        let middle = center + major * (rx * t.cos()) + minor * (ry * t.sin());
        assert!((middle - center).dot(&(near - center)) < 0.0);

        match &body.fill {
            Some(Paint::Linear(gradient)) => assert_eq!(gradient.stops.len(), 33),
            other => panic!("unexpected body fill {other:?}"),
        }
        match surface.shape(leaves[1]).unwrap().geometry {
            Geometry::Ellipse(e) => assert_eq!(e.center, near),
            ref other => panic!("unexpected cap {other:?}"),
        }
    }

    #[test]
    fn test_flattened_caps_fall_back_to_disc() {
        let mut cylinder = Cylinder::new(upright()).unwrap();
        cylinder.render(&Matrix3D::scale(1.0, 0.0, 1.0));
        let (surface, leaves) = draw(&mut cylinder);
        match surface.shape(leaves[1]).unwrap().geometry {
            Geometry::Ellipse(e) => {
                assert_eq!(e.rx, 10.0);
                assert_eq!(e.ry, 0.0);
            }
            ref other => panic!("unexpected cap {other:?}"),
        }
    }
}
