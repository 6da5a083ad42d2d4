/// Linear-gradient approximation of a lit curved surface
use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::lighting::{Lighting, Material};
use crate::matrix::Matrix3D;
use crate::surface::{GradientStop, LinearGradient};

pub const DEFAULT_GRADIENT_SAMPLES: usize = 32;

/// Samples the arc of the circle `(center, radius)` in the local xy plane
/// between the parametric angles `from` and `to`, shading the outward normal
/// at each step.
///
/// The stops are placed by projecting each sample onto the chord between
/// the projected arc endpoints, which is where the gradient runs. The result
/// only depends on its inputs: `samples` steps give `samples + 1` stops.
#[allow(clippy::too_many_arguments)]
pub fn build_gradient(
    lighting: &Lighting,
    material: &Material,
    center: &Point3<f64>,
    radius: f64,
    from: f64,
    to: f64,
    matrix: &Matrix3D,
    samples: usize,
) -> LinearGradient {
    let steps = samples.max(1);
    let project = |angle: f64| {
        let local = Point3::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
            center.z,
        );
        let p = matrix.transform_point(&local);
        Point2::new(p.x, p.y)
    };

    let start = project(from);
    let end = project(to);
    let chord = end - start;
    let length = chord.norm_squared();

    let mut stops: Vec<GradientStop> = (0..=steps)
        .map(|i| {
            let angle = from + (to - from) * i as f64 / steps as f64;
            let normal = matrix.transform_vector(&Vector3::new(angle.cos(), angle.sin(), 0.0));
            let offset = if length > f64::EPSILON {
                ((project(angle) - start).dot(&chord) / length).clamp(0.0, 1.0)
            } else {
                i as f64 / steps as f64
            };
            GradientStop {
                offset,
                color: lighting.shade(&normal, material),
            }
        })
        .collect();
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    LinearGradient { start, end, stops }
}

/// Parametric angles `(from, to)` of the half circle that faces the viewer,
/// with endpoints on the silhouette measured along `across`.
pub fn visible_arc(
    matrix: &Matrix3D,
    across: &Vector2<f64>,
    incident: &Vector3<f64>,
) -> (f64, f64) {
    let ex = matrix.transform_vector(&Vector3::new(1.0, 0.0, 0.0));
    let ey = matrix.transform_vector(&Vector3::new(0.0, 1.0, 0.0));
    let extreme = (ey.x * across.x + ey.y * across.y).atan2(ex.x * across.x + ex.y * across.y);

    let middle = extreme + FRAC_PI_2;
    let normal = ex * middle.cos() + ey * middle.sin();
    if normal.dot(incident) <= 0.0 {
        (extreme, extreme + PI)
    } else {
        (extreme + PI, extreme + 2.0 * PI)
    }
}
