/// Stroke-only line work: segment pairs, open strips and closed loops
use nalgebra::Point3;

use super::{DrawContext, ObjectBase, Primitive};
use crate::error::{Error, Result};
use crate::matrix::Matrix3D;
use crate::projection::{closed_ring, to_screen};
use crate::surface::{Geometry, PathSegment};
use crate::vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeStyle {
    /// Every two points form an independent segment.
    #[default]
    Lines,
    Strip,
    Loop,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgesDescriptor {
    pub points: Vec<Point3<f64>>,
    pub style: EdgeStyle,
}

impl EdgesDescriptor {
    pub fn new(points: Vec<Point3<f64>>, style: EdgeStyle) -> Self {
        Self { points, style }
    }
}

#[derive(Debug, Clone)]
pub struct Edges {
    pub(crate) base: ObjectBase,
    descriptor: EdgesDescriptor,
    cache: Option<Vec<Point3<f64>>>,
}

impl Edges {
    pub fn new(descriptor: EdgesDescriptor) -> Result<Self> {
        let mut edges = Self {
            base: ObjectBase::default(),
            descriptor: EdgesDescriptor::default(),
            cache: None,
        };
        edges.set_object(descriptor)?;
        Ok(edges)
    }

    pub fn descriptor(&self) -> &EdgesDescriptor {
        &self.descriptor
    }

    pub fn set_object(&mut self, descriptor: EdgesDescriptor) -> Result<()> {
        if descriptor.style == EdgeStyle::Lines && descriptor.points.len() % 2 != 0 {
            return Err(Error::malformed(
                "edges",
                format!(
                    "line segments need an even point count, got {}",
                    descriptor.points.len()
                ),
            ));
        }
        self.descriptor = descriptor;
        Ok(())
    }
}

impl Primitive for Edges {
    fn render(&mut self, parent: &Matrix3D) {
        let m = parent.then(&self.base.matrix);
        self.cache = Some(self.descriptor.points.iter().map(|p| m.transform_point(p)).collect());
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let points = self.cache.as_ref().ok_or(Error::NotRendered)?;
        let geometry = match self.descriptor.style {
            EdgeStyle::Lines => Geometry::Path(
                points
                    .chunks(2)
                    .flat_map(|pair| {
                        [
                            PathSegment::MoveTo(to_screen(&pair[0])),
                            PathSegment::LineTo(to_screen(&pair[1])),
                        ]
                    })
                    .collect(),
            ),
            EdgeStyle::Strip => Geometry::Polyline(points.iter().map(to_screen).collect()),
            EdgeStyle::Loop => Geometry::Polyline(closed_ring(points)),
        };

        let shape = self.base.single(ctx, |surface, parent| surface.create_path(parent));
        ctx.surface.set_shape(shape, geometry);
        self.base.outline_only(ctx, shape);
        Ok(())
    }

    fn z_order(&self) -> f64 {
        self.cache.as_deref().map(vector::mean_depth).unwrap_or(0.0)
    }

    fn outline(&self) -> Option<&[Point3<f64>]> {
        self.cache.as_deref()
    }
}
