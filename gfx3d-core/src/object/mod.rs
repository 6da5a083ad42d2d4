//! Drawable 3D objects.
//!
//! Every object goes through the same two steps each frame it is dirty:
//!
//! - `render` pushes its geometry through the composed transform chain and
//!   keeps the screen-space result in its cache. It never touches the
//!   surface.
//! - `draw` reads the cache and creates or updates the object's 2D shapes.
//!
//! [`Object3D`] is a closed set of variants; leaf variants share the
//! [`Primitive`] contract while [`Scene`] composites are driven by the
//! viewport that owns the object arena.

mod cube;
mod cylinder;
mod edges;
mod mesh;
mod orbit;
mod path;
mod polygon;
mod scene;

pub use cube::{Cube, CubeDescriptor};
pub use cylinder::{Cylinder, CylinderDescriptor};
pub use edges::{EdgeStyle, Edges, EdgesDescriptor};
pub use mesh::{Mesh, MeshDescriptor, Topology};
pub use orbit::{Orbit, OrbitDescriptor};
pub use path::{Path3D, Path3DDescriptor, PathCommand};
pub use polygon::{Polygon, PolygonDescriptor};
pub use scene::{Composite, Scene};

use nalgebra::{Point3, Vector3};
use slotmap::new_key_type;

use crate::error::{Error, Result};
use crate::lighting::{Fill, Lighting};
use crate::matrix::Matrix3D;
use crate::surface::{ShapeId, Stroke, Surface};

new_key_type! {
    /// Handle to an object owned by a viewport.
    pub struct ObjectId;
}

/// Everything a leaf needs to put itself on the surface.
pub struct DrawContext<'a> {
    pub surface: &'a mut dyn Surface,
    /// Group the object's shapes are created in.
    pub parent: ShapeId,
    pub lighting: &'a Lighting,
    pub gradient_samples: usize,
}

/// State shared by every object variant.
#[derive(Debug, Clone, Default)]
pub struct ObjectBase {
    pub(crate) matrix: Matrix3D,
    pub(crate) fill: Option<Fill>,
    pub(crate) stroke: Option<Stroke>,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) shape: Option<ShapeId>,
}

impl ObjectBase {
    /// Clears the object's group, creating it on first use.
    pub(crate) fn group(&mut self, ctx: &mut DrawContext<'_>) -> ShapeId {
        match self.shape {
            Some(group) => {
                ctx.surface.clear(group);
                group
            }
            None => {
                let group = ctx.surface.create_group(Some(ctx.parent));
                self.shape = Some(group);
                group
            }
        }
    }

    /// Returns the object's single shape, creating it with `create` on first use.
    pub(crate) fn single(
        &mut self,
        ctx: &mut DrawContext<'_>,
        create: impl FnOnce(&mut dyn Surface, ShapeId) -> ShapeId,
    ) -> ShapeId {
        match self.shape {
            Some(shape) => shape,
            None => {
                let shape = create(&mut *ctx.surface, ctx.parent);
                self.shape = Some(shape);
                shape
            }
        }
    }

    /// Applies the stroke and a fill lit with `normal`.
    pub(crate) fn paint(&self, ctx: &mut DrawContext<'_>, shape: ShapeId, normal: &Vector3<f64>) {
        ctx.surface.set_stroke(shape, self.stroke);
        let fill = self.fill.as_ref().map(|fill| ctx.lighting.fill(normal, fill));
        ctx.surface.set_fill(shape, fill);
    }

    /// Applies the stroke only; line work is never filled.
    pub(crate) fn outline_only(&self, ctx: &mut DrawContext<'_>, shape: ShapeId) {
        ctx.surface.set_stroke(shape, self.stroke);
        ctx.surface.set_fill(shape, None);
    }

    pub(crate) fn destroy(&mut self, surface: &mut dyn Surface) {
        if let Some(shape) = self.shape.take() {
            surface.remove(shape);
        }
    }
}

/// The per-frame contract of leaf objects.
pub trait Primitive {
    /// Recomputes the cache for `parent` composed with the local matrix.
    fn render(&mut self, parent: &Matrix3D);

    /// Creates or updates the 2D shapes from the cache.
    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()>;

    /// Mean cached depth; larger is farther from the viewer.
    fn z_order(&self) -> f64;

    /// Cached points of the object; the first three define its partition plane.
    fn outline(&self) -> Option<&[Point3<f64>]>;
}

/// Variant-specific descriptor accepted by [`Object3D::set_object`].
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Edges(EdgesDescriptor),
    Polygon(PolygonDescriptor),
    Triangles(MeshDescriptor),
    Quads(MeshDescriptor),
    Cube(CubeDescriptor),
    Cylinder(CylinderDescriptor),
    Orbit(OrbitDescriptor),
    Path3D(Path3DDescriptor),
}

impl Descriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::Edges(_) => "edges",
            Descriptor::Polygon(_) => "polygon",
            Descriptor::Triangles(_) => "triangles",
            Descriptor::Quads(_) => "quads",
            Descriptor::Cube(_) => "cube",
            Descriptor::Cylinder(_) => "cylinder",
            Descriptor::Orbit(_) => "orbit",
            Descriptor::Path3D(_) => "path3d",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Object3D {
    Edges(Edges),
    Polygon(Polygon),
    Triangles(Mesh),
    Quads(Mesh),
    Cube(Cube),
    Cylinder(Cylinder),
    Orbit(Orbit),
    Path3D(Path3D),
    Scene(Scene),
}

macro_rules! each_variant {
    ($value:expr, $object:ident => $body:expr) => {
        match $value {
            Object3D::Edges($object) => $body,
            Object3D::Polygon($object) => $body,
            Object3D::Triangles($object) => $body,
            Object3D::Quads($object) => $body,
            Object3D::Cube($object) => $body,
            Object3D::Cylinder($object) => $body,
            Object3D::Orbit($object) => $body,
            Object3D::Path3D($object) => $body,
            Object3D::Scene($object) => $body,
        }
    };
}

impl Object3D {
    pub fn kind(&self) -> &'static str {
        match self {
            Object3D::Edges(_) => "edges",
            Object3D::Polygon(_) => "polygon",
            Object3D::Triangles(_) => "triangles",
            Object3D::Quads(_) => "quads",
            Object3D::Cube(_) => "cube",
            Object3D::Cylinder(_) => "cylinder",
            Object3D::Orbit(_) => "orbit",
            Object3D::Path3D(_) => "path3d",
            Object3D::Scene(_) => "scene",
        }
    }

    pub(crate) fn base(&self) -> &ObjectBase {
        each_variant!(self, o => &o.base)
    }

    pub(crate) fn base_mut(&mut self) -> &mut ObjectBase {
        each_variant!(self, o => &mut o.base)
    }

    /// The leaf contract, or `None` for composites.
    pub fn primitive(&self) -> Option<&dyn Primitive> {
        match self {
            Object3D::Edges(o) => Some(o),
            Object3D::Polygon(o) => Some(o),
            Object3D::Triangles(o) | Object3D::Quads(o) => Some(o),
            Object3D::Cube(o) => Some(o),
            Object3D::Cylinder(o) => Some(o),
            Object3D::Orbit(o) => Some(o),
            Object3D::Path3D(o) => Some(o),
            Object3D::Scene(_) => None,
        }
    }

    pub fn primitive_mut(&mut self) -> Option<&mut dyn Primitive> {
        match self {
            Object3D::Edges(o) => Some(o),
            Object3D::Polygon(o) => Some(o),
            Object3D::Triangles(o) | Object3D::Quads(o) => Some(o),
            Object3D::Cube(o) => Some(o),
            Object3D::Cylinder(o) => Some(o),
            Object3D::Orbit(o) => Some(o),
            Object3D::Path3D(o) => Some(o),
            Object3D::Scene(_) => None,
        }
    }

    pub fn as_scene(&self) -> Option<&Scene> {
        match self {
            Object3D::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn as_scene_mut(&mut self) -> Option<&mut Scene> {
        match self {
            Object3D::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Replaces the geometry descriptor; it must match the variant.
    pub fn set_object(&mut self, descriptor: Descriptor) -> Result<()> {
        match (self, descriptor) {
            (Object3D::Edges(o), Descriptor::Edges(d)) => o.set_object(d),
            (Object3D::Polygon(o), Descriptor::Polygon(d)) => o.set_object(d),
            (Object3D::Triangles(o), Descriptor::Triangles(d)) => o.set_object(d),
            (Object3D::Quads(o), Descriptor::Quads(d)) => o.set_object(d),
            (Object3D::Cube(o), Descriptor::Cube(d)) => o.set_object(d),
            (Object3D::Cylinder(o), Descriptor::Cylinder(d)) => o.set_object(d),
            (Object3D::Orbit(o), Descriptor::Orbit(d)) => o.set_object(d),
            (Object3D::Path3D(o), Descriptor::Path3D(d)) => o.set_object(d),
            (object, descriptor) => Err(Error::DescriptorMismatch {
                expected: object.kind(),
                found: descriptor.kind(),
            }),
        }
    }

    pub fn matrix(&self) -> &Matrix3D {
        &self.base().matrix
    }

    pub fn set_transform(&mut self, matrix: Matrix3D) -> &mut Self {
        self.base_mut().matrix = matrix;
        self
    }

    /// Composes `matrix` on the local side: it applies before the current transform.
    pub fn apply_transform(&mut self, matrix: Matrix3D) -> &mut Self {
        let base = self.base_mut();
        base.matrix = Matrix3D::multiply(&[base.matrix, matrix]);
        self
    }

    /// Composes `matrix` on the parent side: it applies after the current transform.
    pub fn apply_left_transform(&mut self, matrix: Matrix3D) -> &mut Self {
        let base = self.base_mut();
        base.matrix = Matrix3D::multiply(&[matrix, base.matrix]);
        self
    }

    pub fn fill(&self) -> Option<&Fill> {
        self.base().fill.as_ref()
    }

    pub fn set_fill(&mut self, fill: impl Into<Fill>) -> &mut Self {
        self.base_mut().fill = Some(fill.into());
        self
    }

    pub fn clear_fill(&mut self) -> &mut Self {
        self.base_mut().fill = None;
        self
    }

    pub fn stroke(&self) -> Option<&Stroke> {
        self.base().stroke.as_ref()
    }

    pub fn set_stroke(&mut self, stroke: Option<Stroke>) -> &mut Self {
        self.base_mut().stroke = stroke;
        self
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.base().parent
    }

    /// The object's shape (or group) on the surface, once drawn.
    pub fn shape(&self) -> Option<ShapeId> {
        self.base().shape
    }
}

impl From<Edges> for Object3D {
    fn from(object: Edges) -> Self {
        Object3D::Edges(object)
    }
}

impl From<Polygon> for Object3D {
    fn from(object: Polygon) -> Self {
        Object3D::Polygon(object)
    }
}

impl From<Cube> for Object3D {
    fn from(object: Cube) -> Self {
        Object3D::Cube(object)
    }
}

impl From<Cylinder> for Object3D {
    fn from(object: Cylinder) -> Self {
        Object3D::Cylinder(object)
    }
}

impl From<Orbit> for Object3D {
    fn from(object: Orbit) -> Self {
        Object3D::Orbit(object)
    }
}

impl From<Path3D> for Object3D {
    fn from(object: Path3D) -> Self {
        Object3D::Path3D(object)
    }
}

impl From<Scene> for Object3D {
    fn from(object: Scene) -> Self {
        Object3D::Scene(object)
    }
}
