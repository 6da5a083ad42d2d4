//! gfx3d core library - software 3D scene graph over a 2D vector surface
//!
//! Objects described in 3D are transformed, depth ordered and shaded on the
//! CPU, then handed to a [`Surface`] as ordinary 2D paths, polylines and
//! ellipses. There is no depth buffer: painter's order comes from a
//! [`Scheduler`] and the cross-frame shape bookkeeping from a [`Drawer`].

pub mod color;
pub mod drawer;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod lighting;
pub mod matrix;
pub mod object;
pub mod projection;
pub mod scheduler;
pub mod surface;
pub mod vector;
pub mod viewport;

// Re-export commonly used types
pub use color::Color;
pub use drawer::{DrawPlan, Drawer};
pub use error::{Error, Result};
pub use lighting::{Ambient, Fill, Finish, Light, Lighting, Material};
pub use matrix::Matrix3D;
pub use object::{
    Cube, CubeDescriptor, Cylinder, CylinderDescriptor, Descriptor, EdgeStyle, Edges,
    EdgesDescriptor, Mesh, MeshDescriptor, Object3D, ObjectId, Orbit, OrbitDescriptor, Path3D,
    Path3DDescriptor, PathCommand, Polygon, PolygonDescriptor, Scene, Topology,
};
pub use scheduler::Scheduler;
pub use surface::{
    Affine2, Ellipse, Geometry, GradientStop, LinearGradient, Paint, PathSegment,
    RecordingSurface, ShapeId, Stroke, Surface,
};
pub use viewport::{Viewport, ViewportConfig};
