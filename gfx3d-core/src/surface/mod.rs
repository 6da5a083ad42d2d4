//! The 2D vector-graphics surface the renderer draws onto.
//!
//! Objects never rasterize anything themselves. They create shapes (groups,
//! paths, polylines, ellipses) on a [`Surface`] and mutate them through the
//! returned [`ShapeId`] handles. Paint order is creation order within a
//! group, so the drawer controls visibility purely by the order in which it
//! (re)creates shapes.

mod recording;

pub use recording::{RecordedShape, RecordingSurface};

use nalgebra::{Matrix3, Point2, Vector2};

use crate::color::Color;

/// Homogeneous 2D affine transform.
pub type Affine2 = Matrix3<f64>;

/// Handle to a shape owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Color) -> Self {
        Self { color, width: 1.0 }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// Linear gradient between two points; offsets run from 0 at `start` to 1 at `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Interpolated color at a gradient offset; offsets outside the stops clamp.
    pub fn color_at(&self, offset: f64) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::BLACK;
        };
        if offset <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if offset <= b.offset {
                let span = b.offset - a.offset;
                if span <= f64::EPSILON {
                    return b.color;
                }
                return a.color.lerp(&b.color, (offset - a.offset) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// Offset of `point` projected onto the gradient axis.
    pub fn offset_of(&self, point: &Point2<f64>) -> f64 {
        let axis = self.end - self.start;
        let length = axis.norm_squared();
        if length <= f64::EPSILON {
            return 0.0;
        }
        (point - self.start).dot(&axis) / length
    }

    pub fn sample(&self, point: &Point2<f64>) -> Color {
        self.color_at(self.offset_of(point))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

/// Axis-aligned ellipse; rotation is carried by the shape transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point2<f64>,
    pub rx: f64,
    pub ry: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point2<f64>),
    LineTo(Point2<f64>),
    /// Elliptical arc around `center`, connected to the current point by a line.
    ///
    /// `rotation` is the angle of the `rx` axis; `start` and `sweep` are
    /// parametric angles in radians.
    Arc {
        center: Point2<f64>,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        sweep: f64,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Group,
    Path(Vec<PathSegment>),
    Polyline(Vec<Point2<f64>>),
    Ellipse(Ellipse),
}

/// An external 2D vector-graphics backend.
pub trait Surface {
    /// Creates a group under `parent`, or a top-level group.
    fn create_group(&mut self, parent: Option<ShapeId>) -> ShapeId;
    fn create_path(&mut self, parent: ShapeId) -> ShapeId;
    fn create_polyline(&mut self, parent: ShapeId, points: &[Point2<f64>]) -> ShapeId;
    fn create_ellipse(&mut self, parent: ShapeId, ellipse: Ellipse) -> ShapeId;

    fn set_shape(&mut self, shape: ShapeId, geometry: Geometry);
    fn set_stroke(&mut self, shape: ShapeId, stroke: Option<Stroke>);
    fn set_fill(&mut self, shape: ShapeId, fill: Option<Paint>);
    fn set_transform(&mut self, shape: ShapeId, transform: Affine2);
    /// Post-multiplies the shape transform (`transform` applies first).
    fn apply_transform(&mut self, shape: ShapeId, transform: &Affine2);

    /// Removes every child of a group.
    fn clear(&mut self, group: ShapeId);
    /// Removes a shape (and its children) from its parent.
    fn remove(&mut self, shape: ShapeId);
}

pub fn translation(offset: Vector2<f64>) -> Affine2 {
    Matrix3::new_translation(&offset)
}

/// Rotation by `angle` radians around `center`.
pub fn rotate_at(angle: f64, center: &Point2<f64>) -> Affine2 {
    translation(center.coords) * Matrix3::new_rotation(angle) * translation(-center.coords)
}

pub fn transform_point(transform: &Affine2, point: &Point2<f64>) -> Point2<f64> {
    transform.transform_point(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn ramp() -> LinearGradient {
        LinearGradient {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(10.0, 0.0),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Color::BLACK,
                },
                GradientStop {
                    offset: 1.0,
                    color: Color::WHITE,
                },
            ],
        }
    }

    #[test]
    fn test_gradient_sampling() {
        let g = ramp();
        assert!((g.sample(&Point2::new(5.0, 3.0)).r - 0.5).abs() < 1e-12);
        assert_eq!(g.sample(&Point2::new(-4.0, 0.0)), Color::BLACK);
        assert_eq!(g.sample(&Point2::new(40.0, 0.0)), Color::WHITE);
    }

    #[test]
    fn test_rotate_at_keeps_center() {
        let c = Point2::new(3.0, 4.0);
        let m = rotate_at(PI / 2.0, &c);
        assert!((transform_point(&m, &c) - c).norm() < 1e-12);
        let p = transform_point(&m, &Point2::new(4.0, 4.0));
        assert!((p - Point2::new(3.0, 5.0)).norm() < 1e-12);
    }
}
