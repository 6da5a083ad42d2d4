/// Projected-circle geometry shared by cylinders and orbits
use nalgebra::{Matrix3, Point3, Vector2, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::matrix::Matrix3D;

/// Parametric angles sampled on a circle to recover its projected ellipse.
///
/// No two are antipodal, so the three samples pin down a centered conic.
pub const CONIC_SAMPLE_ANGLES: [f64; 3] = [0.0, PI / 3.0, 2.0 * PI / 3.0];

/// Semi-axes and rotation of a projected circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFit {
    /// Semi-axis along `theta`; always the larger one for a successful fit.
    pub rx: f64,
    pub ry: f64,
    pub theta: f64,
}

impl EllipseFit {
    /// Replacement used when the conic solve breaks down.
    pub fn disc(radius: f64) -> Self {
        Self {
            rx: radius,
            ry: 0.0,
            theta: 0.0,
        }
    }

    /// Unit vector along the `rx` axis.
    pub fn major_axis(&self) -> Vector2<f64> {
        Vector2::new(self.theta.cos(), self.theta.sin())
    }

    /// Unit vector along the `ry` axis.
    pub fn minor_axis(&self) -> Vector2<f64> {
        Vector2::new(-self.theta.sin(), self.theta.cos())
    }
}

/// Fits `A x^2 + B xy + C y^2 = 1` through three points relative to the
/// ellipse center and recovers its semi-axes and rotation.
///
/// Collinear samples (a circle seen edge-on) make the system singular; the
/// fit then falls back to [`EllipseFit::disc`] with `nominal_radius`.
pub fn fit_ellipse(samples: &[Vector2<f64>; 3], nominal_radius: f64) -> EllipseFit {
    match solve_conic(samples) {
        Some(fit) => fit,
        None => {
            log::warn!("degenerate conic fit, falling back to a disc of radius {nominal_radius}");
            EllipseFit::disc(nominal_radius)
        }
    }
}

fn solve_conic(samples: &[Vector2<f64>; 3]) -> Option<EllipseFit> {
    let [p, q, r] = samples;
    let system = Matrix3::new(
        p.x * p.x, p.x * p.y, p.y * p.y,
        q.x * q.x, q.x * q.y, q.y * q.y,
        r.x * r.x, r.x * r.y, r.y * r.y,
    );
    let coefficients = system.lu().solve(&Vector3::repeat(1.0))?;
    let (a, b, c) = (coefficients.x, coefficients.y, coefficients.z);

    let theta = 0.5 * b.atan2(a - c);
    let (s, co) = theta.sin_cos();
    let lambda1 = a * co * co + b * s * co + c * s * s;
    let lambda2 = a + c - lambda1;
    if !(lambda1 > 0.0 && lambda2 > 0.0) {
        return None;
    }

    let (rx, ry) = (1.0 / lambda1.sqrt(), 1.0 / lambda2.sqrt());
    if !(rx.is_finite() && ry.is_finite()) {
        return None;
    }
    Some(if rx >= ry {
        EllipseFit { rx, ry, theta }
    } else {
        EllipseFit {
            rx: ry,
            ry: rx,
            theta: theta + FRAC_PI_2,
        }
    })
}

/// A circle of `radius` around `center` in the local xy plane, pushed
/// through `matrix`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedCircle {
    pub center: Point3<f64>,
    pub normal: Vector3<f64>,
    pub ellipse: EllipseFit,
}

/// The circle point at each of [`CONIC_SAMPLE_ANGLES`], pushed through `matrix`.
pub fn rim_points(matrix: &Matrix3D, center: &Point3<f64>, radius: f64) -> [Point3<f64>; 3] {
    CONIC_SAMPLE_ANGLES.map(|angle| {
        matrix.transform_point(&Point3::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
            center.z,
        ))
    })
}

pub fn project_circle(matrix: &Matrix3D, center: &Point3<f64>, radius: f64) -> ProjectedCircle {
    let projected_center = matrix.transform_point(center);
    let samples = rim_points(matrix, center, radius)
        .map(|p| Vector2::new(p.x - projected_center.x, p.y - projected_center.y));
    ProjectedCircle {
        center: projected_center,
        normal: matrix.transform_vector(&Vector3::new(0.0, 0.0, 1.0)),
        ellipse: fit_ellipse(&samples, radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_circle_facing_viewer() {
        let circle = project_circle(&Matrix3D::identity(), &Point3::new(5.0, 5.0, 0.0), 3.0);
        assert!((circle.ellipse.rx - 3.0).abs() < EPS);
        assert!((circle.ellipse.ry - 3.0).abs() < EPS);
        assert_eq!(circle.center, Point3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_tilted_circle() {
        // Tilting around X by 60 degrees squashes the y extent by cos(60) = 0.5
        let circle = project_circle(&Matrix3D::rotate_x_deg(60.0), &Point3::origin(), 2.0);
        assert!((circle.ellipse.rx - 2.0).abs() < 1e-6);
        assert!((circle.ellipse.ry - 1.0).abs() < 1e-6);
        assert!(circle.ellipse.theta.sin().abs() < 1e-6);
    }

    #[test]
    fn test_rotated_ellipse() {
        let m = Matrix3D::multiply(&[
            Matrix3D::rotate_z_deg(30.0),
            Matrix3D::scale(4.0, 1.0, 1.0),
        ]);
        let circle = project_circle(&m, &Point3::origin(), 1.0);
        assert!((circle.ellipse.rx - 4.0).abs() < 1e-6);
        assert!((circle.ellipse.ry - 1.0).abs() < 1e-6);
        let expected = 30f64.to_radians();
        assert!((circle.ellipse.theta.tan() - expected.tan()).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_samples_fall_back_to_disc() {
        let samples = [
            Vector2::new(1.0, 0.0),
            Vector2::new(0.5, 0.0),
            Vector2::new(-0.25, 0.0),
        ];
        let fit = fit_ellipse(&samples, 7.0);
        assert_eq!(fit, EllipseFit::disc(7.0));
        assert_eq!((fit.rx, fit.ry, fit.theta), (7.0, 0.0, 0.0));
    }

    #[test]
    fn test_edge_on_circle_is_finite() {
        let circle = project_circle(&Matrix3D::rotate_x_deg(90.0), &Point3::origin(), 2.0);
        assert!(circle.ellipse.rx.is_finite());
        assert!(circle.ellipse.ry.is_finite());
    }
}
