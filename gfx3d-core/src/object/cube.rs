/// Axis-aligned box given by two opposite corners
use nalgebra::Point3;

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::matrix::Matrix3D;
use crate::projection::closed_ring;
use crate::vector;

// Corner indices of each face, wound counter-clockwise seen from outside
const FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeDescriptor {
    pub bottom: Point3<f64>,
    pub top: Point3<f64>,
}

impl CubeDescriptor {
    pub fn new(bottom: Point3<f64>, top: Point3<f64>) -> Self {
        Self { bottom, top }
    }

    /// The eight corners, low z face first.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.bottom.inf(&self.top), self.bottom.sup(&self.top));
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ]
    }
}

impl Default for CubeDescriptor {
    fn default() -> Self {
        Self {
            bottom: Point3::origin(),
            top: Point3::new(100.0, 100.0, 100.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cube {
    pub(crate) base: ObjectBase,
    descriptor: CubeDescriptor,
    cache: Option<Vec<Point3<f64>>>,
}

impl Cube {
    pub fn new(descriptor: CubeDescriptor) -> Self {
        Self {
            base: ObjectBase::default(),
            descriptor,
            cache: None,
        }
    }

    pub fn descriptor(&self) -> &CubeDescriptor {
        &self.descriptor
    }

    pub fn set_object(&mut self, descriptor: CubeDescriptor) -> Result<()> {
        self.descriptor = descriptor;
        Ok(())
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::new(CubeDescriptor::default())
    }
}

impl Primitive for Cube {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        self.cache = Some(
            self.descriptor
                .corners()
                .iter()
                .map(|p| m.transform_point(p))
                .collect(),
        );
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let corners = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let mut faces: Vec<[Point3<f64>; 4]> = FACES
            .iter()
            .map(|face| face.map(|i| corners[i]))
            .collect();
        faces.sort_by(|a, b| vector::mean_depth(b).total_cmp(&vector::mean_depth(a)));

        let group = self.base.group(ctx);
        for face in &faces {
            let shape = ctx.surface.create_polyline(group, &closed_ring(face));
            self.base.paint(ctx, shape, &vector::ring_normal(face));
        }
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
    use crate::surface::{Geometry, Paint};
    use nalgebra::Vector3;

    #[test]
    fn test_corners_match_box() {
        let mut cube = Cube::new(CubeDescriptor::new(
            Point3::new(10.0, 10.0, 10.0),
            Point3::new(0.0, 0.0, 0.0),
        ));
        cube.render(&Matrix3D::identity());
        let cached = cube.outline().unwrap();
        assert_eq!(cached.len(), 8);
        for x in [0.0, 10.0] {
            for y in [0.0, 10.0] {
                for z in [0.0, 10.0] {
                    assert!(cached.contains(&Point3::new(x, y, z)));
                }
            }
        }
        assert!((cube.z_order() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_faces_point_outward() {
        let corners = CubeDescriptor::default().corners();
        let center = vector::center(&corners);
        for face in FACES {
            let ring = face.map(|i| corners[i]);
            let outward = vector::center(&ring) - center;
            assert!(vector::ring_normal(&ring).dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_draws_six_quads_back_to_front() {
        let mut cube = Cube::new(CubeDescriptor::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 10.0),
        ));
        cube.base.fill = Some(Material::new(Finish::Matte, Color::WHITE).into());
        cube.render(&Matrix3D::identity());

        let lighting = Lighting::new(
            Vector3::new(0.0, 0.0, 1.0),
            vec![Light::new(Vector3::new(0.0, 0.0, 1.0), Color::WHITE)],
            Ambient {
                color: Color::WHITE,
                intensity: 0.0,
            },
            Color::WHITE,
        );
        let (surface, root) = draw_on(&mut cube, &lighting);
        let leaves = surface.leaves_of(surface.children(root)[0]);
        assert_eq!(leaves.len(), 6);
        for &leaf in &leaves {
            let geometry = &surface.shape(leaf).unwrap().geometry;
            assert!(matches!(geometry, Geometry::Polyline(p) if p.len() == 5));
        }

        let red = |id| match &surface.shape(id).unwrap().fill {
            Some(Paint::Solid(c)) => c.r,
            _ => f64::NAN,
        };
        // The far face looks away from the light, the near one straight at it
        assert!(red(leaves[0]).abs() < 1e-9);
        assert!((red(leaves[5]) - 0.8).abs() < 1e-9);
    }
}
