/// Free-form 3D path of move, line and close commands
use nalgebra::{Point3, Vector3};

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::matrix::Matrix3D;
use crate::projection::to_screen;
use crate::surface::{Geometry, PathSegment};
use crate::vector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Starts a new subpath. A relative move is an offset from the current point.
    MoveTo { to: Point3<f64>, relative: bool },
    LineTo { to: Point3<f64>, relative: bool },
    /// Returns to the start of the current subpath.
    Close,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path3DDescriptor {
    pub commands: Vec<PathCommand>,
}

impl Path3DDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, to: Point3<f64>) -> Self {
        self.commands.push(PathCommand::MoveTo { to, relative: false });
        self
    }

    pub fn move_by(mut self, offset: Vector3<f64>) -> Self {
        self.commands.push(PathCommand::MoveTo {
            to: Point3::from(offset),
            relative: true,
        });
        self
    }

    pub fn line_to(mut self, to: Point3<f64>) -> Self {
        self.commands.push(PathCommand::LineTo { to, relative: false });
        self
    }

    pub fn line_by(mut self, offset: Vector3<f64>) -> Self {
        self.commands.push(PathCommand::LineTo {
            to: Point3::from(offset),
            relative: true,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Absolute local-space point of every move and line, in order.
    pub fn resolve(&self) -> Vec<Point3<f64>> {
        let mut current = Point3::origin();
        let mut start = current;
        let mut points = Vec::with_capacity(self.commands.len());
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo { to, relative } => {
                    current = if relative { current + to.coords } else { to };
                    start = current;
                    points.push(current);
                }
                PathCommand::LineTo { to, relative } => {
                    current = if relative { current + to.coords } else { to };
                    points.push(current);
                }
                PathCommand::Close => current = start,
            }
        }
        points
    }
}

#[derive(Debug, Clone)]
pub struct Path3D {
    pub(crate) base: ObjectBase,
    descriptor: Path3DDescriptor,
    cache: Option<Vec<Point3<f64>>>,
}

impl Path3D {
    pub fn new(descriptor: Path3DDescriptor) -> Result<Self> {
        let mut path = Self {
            base: ObjectBase::default(),
            descriptor: Path3DDescriptor::default(),
            cache: None,
        };
        path.set_object(descriptor)?;
        Ok(path)
    }

    pub fn descriptor(&self) -> &Path3DDescriptor {
        &self.descriptor
    }

    pub fn set_object(&mut self, descriptor: Path3DDescriptor) -> Result<()> {
        match descriptor.commands.first() {
            None | Some(PathCommand::MoveTo { .. }) => {
                self.descriptor = descriptor;
                Ok(())
            }
            Some(_) => Err(Error::malformed("path3d", "a path must start with a move")),
        }
    }
}

impl Primitive for Path3D {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        self.cache = Some(
            self.descriptor
                .resolve()
                .iter()
                .map(|p| m.transform_point(p))
                .collect(),
        );
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let points = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let mut resolved = points.iter();
        let mut segments = Vec::with_capacity(self.descriptor.commands.len());
        for command in &self.descriptor.commands {
            let segment = match command {
                PathCommand::MoveTo { .. } => {
                    resolved.next().map(|p| PathSegment::MoveTo(to_screen(p)))
                }
                PathCommand::LineTo { .. } => {
                    resolved.next().map(|p| PathSegment::LineTo(to_screen(p)))
                }
                PathCommand::Close => Some(PathSegment::Close),
            };
            segments.extend(segment);
        }
        let normal = vector::ring_normal(points);

        let shape = self.base.single(ctx, |surface, parent| surface.create_path(parent));
        ctx.surface.set_shape(shape, Geometry::Path(segments));
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
