/// Affine 3D transforms: a 3x3 linear part plus a translation
use nalgebra::{Point3, Vector3};
use std::ops::Mul;

/// An affine transform laid out row by row.
///
/// A point `p` maps to `(xx*x + xy*y + xz*z + dx, yx*x + .. + dy, zx*x + .. + dz)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3D {
    pub xx: f64,
    pub xy: f64,
    pub xz: f64,
    pub yx: f64,
    pub yy: f64,
    pub yz: f64,
    pub zx: f64,
    pub zy: f64,
    pub zz: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Matrix3D {
    pub const IDENTITY: Self = Self {
        xx: 1.0,
        xy: 0.0,
        xz: 0.0,
        yx: 0.0,
        yy: 1.0,
        yz: 0.0,
        zx: 0.0,
        zy: 0.0,
        zz: 1.0,
        dx: 0.0,
        dy: 0.0,
        dz: 0.0,
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        Self {
            dx: x,
            dy: y,
            dz: z,
            ..Self::IDENTITY
        }
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self {
            xx: x,
            yy: y,
            zz: z,
            ..Self::IDENTITY
        }
    }

    pub fn scale_uniform(factor: f64) -> Self {
        Self::scale(factor, factor, factor)
    }

    /// Rotation around the X axis (radians)
    pub fn rotate_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            yy: c,
            yz: -s,
            zy: s,
            zz: c,
            ..Self::IDENTITY
        }
    }

    /// Rotation around the Y axis (radians)
    pub fn rotate_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            xx: c,
            xz: s,
            zx: -s,
            zz: c,
            ..Self::IDENTITY
        }
    }

    /// Rotation around the Z axis (radians)
    pub fn rotate_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            xx: c,
            xy: -s,
            yx: s,
            yy: c,
            ..Self::IDENTITY
        }
    }

    pub fn rotate_x_deg(degrees: f64) -> Self {
        Self::rotate_x(degrees.to_radians())
    }

    pub fn rotate_y_deg(degrees: f64) -> Self {
        Self::rotate_y(degrees.to_radians())
    }

    pub fn rotate_z_deg(degrees: f64) -> Self {
        Self::rotate_z(degrees.to_radians())
    }

    /// Moves the camera to `(x, y, z)`, i.e. moves the world the opposite way.
    pub fn camera_translate(x: f64, y: f64, z: f64) -> Self {
        Self::translate(-x, -y, -z)
    }

    pub fn camera_rotate_x(angle: f64) -> Self {
        Self::rotate_x(-angle)
    }

    pub fn camera_rotate_y(angle: f64) -> Self {
        Self::rotate_y(-angle)
    }

    pub fn camera_rotate_z(angle: f64) -> Self {
        Self::rotate_z(-angle)
    }

    pub fn camera_rotate_x_deg(degrees: f64) -> Self {
        Self::camera_rotate_x(degrees.to_radians())
    }

    pub fn camera_rotate_y_deg(degrees: f64) -> Self {
        Self::camera_rotate_y(degrees.to_radians())
    }

    pub fn camera_rotate_z_deg(degrees: f64) -> Self {
        Self::camera_rotate_z(degrees.to_radians())
    }

    /// Composes a chain of transforms.
    ///
    /// The list reads like a `[parent, local]` chain: `multiply(&[a, b])`
    /// maps a point through `b` first and then through `a`. An empty list is
    /// the identity.
    pub fn multiply(chain: &[Matrix3D]) -> Self {
        chain
            .iter()
            .fold(Self::IDENTITY, |acc, matrix| acc.then(matrix))
    }

    /// `self` composed with `local` (`local` is applied first).
    pub fn then(&self, local: &Matrix3D) -> Self {
        let a = self;
        let b = local;
        Self {
            xx: a.xx * b.xx + a.xy * b.yx + a.xz * b.zx,
            xy: a.xx * b.xy + a.xy * b.yy + a.xz * b.zy,
            xz: a.xx * b.xz + a.xy * b.yz + a.xz * b.zz,
            yx: a.yx * b.xx + a.yy * b.yx + a.yz * b.zx,
            yy: a.yx * b.xy + a.yy * b.yy + a.yz * b.zy,
            yz: a.yx * b.xz + a.yy * b.yz + a.yz * b.zz,
            zx: a.zx * b.xx + a.zy * b.yx + a.zz * b.zx,
            zy: a.zx * b.xy + a.zy * b.yy + a.zz * b.zy,
            zz: a.zx * b.xz + a.zy * b.yz + a.zz * b.zz,
            dx: a.xx * b.dx + a.xy * b.dy + a.xz * b.dz + a.dx,
            dy: a.yx * b.dx + a.yy * b.dy + a.yz * b.dz + a.dy,
            dz: a.zx * b.dx + a.zy * b.dy + a.zz * b.dz + a.dz,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.xx * (self.yy * self.zz - self.yz * self.zy)
            - self.xy * (self.yx * self.zz - self.yz * self.zx)
            + self.xz * (self.yx * self.zy - self.yy * self.zx)
    }

    /// Closed-form inverse.
    ///
    /// A singular matrix (zero scale on some axis) produces non-finite
    /// entries; check with [`Matrix3D::is_finite`] when the input is not
    /// known to be invertible.
    pub fn invert(&self) -> Self {
        let det = self.determinant();
        let xx = (self.yy * self.zz - self.yz * self.zy) / det;
        let xy = (self.xz * self.zy - self.xy * self.zz) / det;
        let xz = (self.xy * self.yz - self.xz * self.yy) / det;
        let yx = (self.yz * self.zx - self.yx * self.zz) / det;
        let yy = (self.xx * self.zz - self.xz * self.zx) / det;
        let yz = (self.xz * self.yx - self.xx * self.yz) / det;
        let zx = (self.yx * self.zy - self.yy * self.zx) / det;
        let zy = (self.xy * self.zx - self.xx * self.zy) / det;
        let zz = (self.xx * self.yy - self.xy * self.yx) / det;

        // Solve for the translation that maps the original offset back to the origin
        Self {
            xx,
            xy,
            xz,
            yx,
            yy,
            yz,
            zx,
            zy,
            zz,
            dx: -(xx * self.dx + xy * self.dy + xz * self.dz),
            dy: -(yx * self.dx + yy * self.dy + yz * self.dz),
            dz: -(zx * self.dx + zy * self.dy + zz * self.dz),
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.xx, self.xy, self.xz, self.yx, self.yy, self.yz, self.zx, self.zy, self.zz,
            self.dx, self.dy, self.dz,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            self.xx * p.x + self.xy * p.y + self.xz * p.z + self.dx,
            self.yx * p.x + self.yy * p.y + self.yz * p.z + self.dy,
            self.zx * p.x + self.zy * p.y + self.zz * p.z + self.dz,
        )
    }

    /// Applies only the linear part (directions, normals of rigid transforms).
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.xx * v.x + self.xy * v.y + self.xz * v.z,
            self.yx * v.x + self.yy * v.y + self.yz * v.z,
            self.zx * v.x + self.zy * v.y + self.zz * v.z,
        )
    }
}

impl Default for Matrix3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix3D {
    type Output = Matrix3D;

    fn mul(self, rhs: Matrix3D) -> Matrix3D {
        self.then(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-9;

    fn assert_close(a: &Matrix3D, b: &Matrix3D) {
        let pairs = [
            (a.xx, b.xx),
            (a.xy, b.xy),
            (a.xz, b.xz),
            (a.yx, b.yx),
            (a.yy, b.yy),
            (a.yz, b.yz),
            (a.zx, b.zx),
            (a.zy, b.zy),
            (a.zz, b.zz),
            (a.dx, b.dx),
            (a.dy, b.dy),
            (a.dz, b.dz),
        ];
        for (x, y) in pairs {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    fn samples() -> Vec<Matrix3D> {
        vec![
            Matrix3D::translate(1.0, -2.0, 3.5),
            Matrix3D::rotate_x(0.3),
            Matrix3D::multiply(&[Matrix3D::rotate_y(1.1), Matrix3D::scale(2.0, 0.5, 3.0)]),
            Matrix3D::multiply(&[
                Matrix3D::rotate_z_deg(37.0),
                Matrix3D::translate(4.0, 0.0, -1.0),
                Matrix3D::rotate_x(-0.7),
            ]),
        ]
    }

    #[test]
    fn test_identity_point() {
        let p = Point3::new(1.25, -7.5, 3.0);
        assert_eq!(Matrix3D::identity().transform_point(&p), p);
    }

    #[test]
    fn test_multiply_is_associative() {
        let m = samples();
        for a in &m {
            for b in &m {
                for c in &m {
                    let left = Matrix3D::multiply(&[Matrix3D::multiply(&[*a, *b]), *c]);
                    let right = Matrix3D::multiply(&[*a, Matrix3D::multiply(&[*b, *c])]);
                    assert_close(&left, &right);
                }
            }
        }
    }

    #[test]
    fn test_multiply_applies_last_first() {
        let m = Matrix3D::multiply(&[
            Matrix3D::translate(10.0, 0.0, 0.0),
            Matrix3D::scale_uniform(2.0),
        ]);
        let p = m.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!((p.x - 12.0).abs() < EPS);
        assert!((p.y - 2.0).abs() < EPS);
    }

    #[test]
    fn test_invert() {
        for a in samples() {
            assert_close(&Matrix3D::multiply(&[a, a.invert()]), &Matrix3D::IDENTITY);
            assert_close(&Matrix3D::multiply(&[a.invert(), a]), &Matrix3D::IDENTITY);
        }
    }

    #[test]
    fn test_singular_invert_is_not_finite() {
        let m = Matrix3D::scale(1.0, 0.0, 1.0);
        assert!(!m.invert().is_finite());
    }

    #[test]
    fn test_rotation_round_trip() {
        for theta in [0.1, 1.0, PI / 3.0, -2.5] {
            let m = Matrix3D::multiply(&[Matrix3D::rotate_x(theta), Matrix3D::rotate_x(-theta)]);
            assert_close(&m, &Matrix3D::IDENTITY);
        }
    }

    #[test]
    fn test_camera_rotation_is_inverse() {
        let m = Matrix3D::rotate_y_deg(30.0) * Matrix3D::camera_rotate_y_deg(30.0);
        assert_close(&m, &Matrix3D::IDENTITY);
        let t = Matrix3D::translate(1.0, 2.0, 3.0) * Matrix3D::camera_translate(1.0, 2.0, 3.0);
        assert_close(&t, &Matrix3D::IDENTITY);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let p = Matrix3D::rotate_z(PI / 2.0).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < EPS);
        assert!((p.y - 1.0).abs() < EPS);
    }
}
