/// Interactive camera rotation state
use gfx3d_core::Matrix3D;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Rotation matrix, applying X first, then Y, then Z.
    pub fn matrix(&self) -> Matrix3D {
        Matrix3D::multiply(&[
            Matrix3D::rotate_z(self.z),
            Matrix3D::rotate_y(self.y),
            Matrix3D::rotate_x(self.x),
        ])
    }
}
