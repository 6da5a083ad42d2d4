/// Triangle and quad face lists in list, strip or fan topology
use nalgebra::Point3;

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::matrix::Matrix3D;
use crate::projection::closed_ring;
use crate::vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Consecutive, independent faces.
    #[default]
    List,
    /// Each face reuses the previous two vertices.
    Strip,
    /// Each face reuses the first vertex and the previous one.
    Fan,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshDescriptor {
    pub points: Vec<Point3<f64>>,
    pub topology: Topology,
}

impl MeshDescriptor {
    pub fn new(points: Vec<Point3<f64>>, topology: Topology) -> Self {
        Self { points, topology }
    }
}

/// Faces of 3 (triangles) or 4 (quads) vertices.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) base: ObjectBase,
    face_size: usize,
    descriptor: MeshDescriptor,
    faces: Vec<Vec<usize>>,
    cache: Option<Vec<Point3<f64>>>,
}

impl Mesh {
    pub fn triangles(descriptor: MeshDescriptor) -> Result<Self> {
        Self::with_face_size(3, descriptor)
    }

    pub fn quads(descriptor: MeshDescriptor) -> Result<Self> {
        Self::with_face_size(4, descriptor)
    }

    fn with_face_size(face_size: usize, descriptor: MeshDescriptor) -> Result<Self> {
        let mut mesh = Self {
            base: ObjectBase::default(),
            face_size,
            descriptor: MeshDescriptor::default(),
            faces: Vec::new(),
            cache: None,
        };
        mesh.set_object(descriptor)?;
        Ok(mesh)
    }

    fn kind(&self) -> &'static str {
        if self.face_size == 3 {
            "triangles"
        } else {
            "quads"
        }
    }

    pub fn face_size(&self) -> usize {
        self.face_size
    }

    pub fn descriptor(&self) -> &MeshDescriptor {
        &self.descriptor
    }

    /// Vertex indices of every face.
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn set_object(&mut self, descriptor: MeshDescriptor) -> Result<()> {
        self.faces = build_faces(
            self.kind(),
            self.face_size,
            descriptor.points.len(),
            descriptor.topology,
        )?;
        self.descriptor = descriptor;
        Ok(())
    }

    /// Cached faces, farthest first.
    fn sorted_faces(&self, vertices: &[Point3<f64>]) -> Vec<Vec<Point3<f64>>> {
        let mut faces: Vec<(f64, Vec<Point3<f64>>)> = self
            .faces
            .iter()
            .map(|face| {
                let points: Vec<Point3<f64>> = face.iter().map(|&i| vertices[i]).collect();
                (vector::mean_depth(&points), points)
            })
            .collect();
        faces.sort_by(|a, b| b.0.total_cmp(&a.0));
        faces.into_iter().map(|(_, points)| points).collect()
    }
}

fn build_faces(
    kind: &'static str,
    face_size: usize,
    count: usize,
    topology: Topology,
) -> Result<Vec<Vec<usize>>> {
    match topology {
        Topology::List => {
            if count % face_size != 0 {
                return Err(Error::malformed(
                    kind,
                    format!("point count {count} is not a multiple of {face_size}"),
                ));
            }
            Ok((0..count)
                .step_by(face_size)
                .map(|i| (i..i + face_size).collect())
                .collect())
        }
        Topology::Strip | Topology::Fan => {
            let shared = 2;
            let fresh = face_size - shared;
            if count < face_size || (count - shared) % fresh != 0 {
                return Err(Error::malformed(
                    kind,
                    format!("{count} points do not form a whole {topology:?} of {face_size}-gons"),
                ));
            }
            let faces = (count - shared) / fresh;
            Ok((0..faces)
                .map(|f| match (topology, face_size) {
                    // Alternate the winding so every strip triangle faces the same way
                    (Topology::Strip, 3) if f % 2 == 1 => vec![f + 1, f, f + 2],
                    (Topology::Strip, 3) => vec![f, f + 1, f + 2],
                    (Topology::Strip, _) => vec![2 * f, 2 * f + 1, 2 * f + 3, 2 * f + 2],
                    (_, 3) => vec![0, f + 1, f + 2],
                    _ => vec![0, 2 * f + 1, 2 * f + 2, 2 * f + 3],
                })
                .collect())
        }
    }
}

impl Primitive for Mesh {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        self.cache = Some(self.descriptor.points.iter().map(|p| m.transform_point(p)).collect());
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let vertices = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let faces = self.sorted_faces(vertices);

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
    use crate::lighting::Lighting;
    use crate::object::testing::draw_on;
    use crate::surface::Geometry;

    fn points(n: usize) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| Point3::new(i as f64, (i % 2) as f64, i as f64))
            .collect()
    }

    #[test]
    fn test_list_needs_whole_faces() {
        assert!(Mesh::triangles(MeshDescriptor::new(points(6), Topology::List)).is_ok());
        let err = Mesh::quads(MeshDescriptor::new(points(6), Topology::List)).unwrap_err();
        assert!(matches!(err, Error::MalformedDescriptor { kind: "quads", .. }));
        let err = Mesh::triangles(MeshDescriptor::new(points(7), Topology::List)).unwrap_err();
        assert!(matches!(err, Error::MalformedDescriptor { kind: "triangles", .. }));
    }

    #[test]
    fn test_triangle_strip_and_fan() {
        let strip = Mesh::triangles(MeshDescriptor::new(points(5), Topology::Strip)).unwrap();
        assert_eq!(strip.faces(), &[vec![0, 1, 2], vec![2, 1, 3], vec![2, 3, 4]]);
        let fan = Mesh::triangles(MeshDescriptor::new(points(5), Topology::Fan)).unwrap();
        assert_eq!(fan.faces(), &[vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]]);
        assert!(Mesh::triangles(MeshDescriptor::new(points(2), Topology::Fan)).is_err());
    }

    #[test]
    fn test_quad_strip_and_fan() {
        let strip = Mesh::quads(MeshDescriptor::new(points(6), Topology::Strip)).unwrap();
        assert_eq!(strip.faces(), &[vec![0, 1, 3, 2], vec![2, 3, 5, 4]]);
        let fan = Mesh::quads(MeshDescriptor::new(points(6), Topology::Fan)).unwrap();
        assert_eq!(fan.faces(), &[vec![0, 1, 2, 3], vec![0, 3, 4, 5]]);
        assert!(Mesh::quads(MeshDescriptor::new(points(5), Topology::Strip)).is_err());
    }

    #[test]
    fn test_draw_back_to_front() {
        let mut mesh = Mesh::triangles(MeshDescriptor::new(points(6), Topology::List)).unwrap();
        mesh.render(&Matrix3D::identity());
        let (surface, root) = draw_on(&mut mesh, &Lighting::default());

        let group = surface.children(root)[0];
        let leaves = surface.leaves_of(group);
        assert_eq!(leaves.len(), 2);
        let depth = |id| match &surface.shape(id).unwrap().geometry {
            Geometry::Polyline(p) => p[0].x,
            _ => f64::NAN,
        };
        // Face 3..6 is deeper, so it is painted first
        assert_eq!(depth(leaves[0]), 3.0);
        assert_eq!(depth(leaves[1]), 0.0);
    }
}
