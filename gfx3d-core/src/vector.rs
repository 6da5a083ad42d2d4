/// Point and vector helpers on top of nalgebra
use nalgebra::{Point3, Vector3};

pub fn sum(points: &[Point3<f64>]) -> Vector3<f64> {
    points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords)
}

/// Centroid of a point set (origin for an empty set).
pub fn center(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    Point3::from(sum(points) / points.len() as f64)
}

pub fn difference(a: &Point3<f64>, b: &Point3<f64>) -> Vector3<f64> {
    a - b
}

pub fn dot(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b)
}

pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.cross(b)
}

/// Unit vector in the direction of `v`; the zero vector stays zero.
pub fn normalize(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Unnormalized normal of the plane through `a`, `b`, `c`.
pub fn plane_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    cross(&(b - a), &(c - a))
}

/// Newell normal of a closed ring; tolerant of collinear leading vertices.
pub fn ring_normal(ring: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, current) in ring.iter().enumerate() {
        let next = &ring[(i + 1) % ring.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Mean depth of a point set, the sort key of the Z-order scheduler.
pub fn mean_depth(points: &[Point3<f64>]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.z).sum::<f64>() / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center() {
        let c = center(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -6.0)]);
        assert_eq!(c, Point3::new(1.0, 2.0, -3.0));
        assert_eq!(center(&[]), Point3::origin());
    }

    #[test]
    fn test_signed_distance_from_difference_and_dot() {
        let d = difference(&Point3::new(3.0, 1.0, 7.0), &Point3::new(1.0, 1.0, 2.0));
        assert_eq!(d, Vector3::new(2.0, 0.0, 5.0));
        assert_eq!(dot(&Vector3::new(0.0, 0.0, 1.0), &d), 5.0);
        assert_eq!(dot(&Vector3::new(0.0, 0.0, -1.0), &d), -5.0);
    }

    #[test]
    fn test_plane_normal_matches_ring_normal() {
        let ring = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let a = normalize(&plane_normal(&ring[0], &ring[1], &ring[2]));
        let b = normalize(&ring_normal(&ring));
        assert!((a - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert!((a - b).norm() < 1e-12);
    }

    #[test]
    fn test_ring_normal_with_collinear_start() {
        let ring = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        let n = normalize(&ring_normal(&ring));
        assert!((n.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(normalize(&Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn test_mean_depth() {
        let pts = [Point3::new(9.0, 9.0, 1.0), Point3::new(-3.0, 0.0, 3.0)];
        assert!((mean_depth(&pts) - 2.0).abs() < 1e-12);
    }
}
