/// Screen-space conventions of the renderer
///
/// Camera space is right handed with the viewer on +z looking toward -z.
/// Screen space has its origin in the top-left corner with y growing down,
/// so the viewer ends up on the -z side looking toward +z. Projection is
/// orthographic: a screen-space point draws at its `(x, y)`.
use nalgebra::{Point2, Point3, Vector3};

use crate::matrix::Matrix3D;

/// View direction in screen space.
pub fn screen_incident() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, 1.0)
}

/// Maps camera space onto screen space for a surface `height` pixels tall.
pub fn screen_basis(height: f64) -> Matrix3D {
    // 180 degree rotation about X, written exactly
    let flip = Matrix3D::scale(1.0, -1.0, -1.0);
    Matrix3D::multiply(&[Matrix3D::translate(0.0, height, 0.0), flip])
}

/// Full transform from world space to screen space.
pub fn view_matrix(camera: &Matrix3D, height: f64) -> Matrix3D {
    Matrix3D::multiply(&[screen_basis(height), *camera])
}

pub fn to_screen(point: &Point3<f64>) -> Point2<f64> {
    Point2::new(point.x, point.y)
}

/// Projects a ring of points and closes it by repeating the first point.
pub fn closed_ring(points: &[Point3<f64>]) -> Vec<Point2<f64>> {
    let mut ring: Vec<Point2<f64>> = points.iter().map(to_screen).collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}
