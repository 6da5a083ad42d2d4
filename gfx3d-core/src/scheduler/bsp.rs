//! Binary space partition over object outline planes.
//!
//! Nodes live in a flat arena and point at their subtrees by index. Each
//! object is partitioned by the plane through the first three points of its
//! outline; an object with points on both sides of an existing plane cannot
//! be placed and the build fails with [`Error::InvalidGeometry`], since
//! splitting polygons is not supported.

use nalgebra::{Point3, Vector3};

use super::Schedulable;
use crate::error::{Error, Result};
use crate::vector;

/// A point far on the viewer side of screen space, used to pick the far
/// subtree at every node.
pub fn viewpoint() -> Point3<f64> {
    Point3::new(0.0, 0.0, -10000.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    /// Index of the object in the scheduled slice.
    pub item: usize,
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
    pub plus: Option<usize>,
    pub minus: Option<usize>,
}

impl BspNode {
    fn new(item: usize, outline: &[Point3<f64>]) -> Self {
        let (point, normal) = match outline {
            [a, b, c, ..] => (*a, vector::normalize(&vector::plane_normal(a, b, c))),
            [a, ..] => (*a, Vector3::zeros()),
            [] => (Point3::origin(), Vector3::zeros()),
        };
        Self {
            item,
            point,
            normal,
            plus: None,
            minus: None,
        }
    }

    /// Rounded signed distance of `p` from the plane.
    fn side(&self, p: &Point3<f64>) -> f64 {
        (0.5 + vector::dot(&self.normal, &vector::difference(p, &self.point))).floor()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Default)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    /// Inserts the items in order; the first becomes the root.
    pub fn build<T: Schedulable>(items: &[T]) -> Result<Self> {
        let mut tree = Self {
            nodes: Vec::with_capacity(items.len()),
        };
        for (index, item) in items.iter().enumerate() {
            let outline = item.outline().ok_or(Error::MissingOutline)?;
            tree.insert(index, outline)?;
        }
        log::debug!("built BSP tree over {} objects", tree.nodes.len());
        Ok(tree)
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, item: usize, outline: &[Point3<f64>]) -> Result<()> {
        let node = self.nodes.len();
        if node == 0 {
            self.nodes.push(BspNode::new(item, outline));
            return Ok(());
        }

        let mut current = 0;
        loop {
            let plane = &self.nodes[current];
            let branch = classify(plane, outline).ok_or(Error::InvalidGeometry {
                object: item,
                plane: plane.item,
            })?;
            let next = match branch {
                Branch::Plus => plane.plus,
                Branch::Minus => plane.minus,
            };
            match next {
                Some(child) => current = child,
                None => {
                    let slot = &mut self.nodes[current];
                    match branch {
                        Branch::Plus => slot.plus = Some(node),
                        Branch::Minus => slot.minus = Some(node),
                    }
                    self.nodes.push(BspNode::new(item, outline));
                    return Ok(());
                }
            }
        }
    }

    /// Item indices back to front as seen from `eye`.
    pub fn iterate(&self, eye: &Point3<f64>) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        if !self.nodes.is_empty() {
            self.visit(0, eye, &mut order);
        }
        order
    }

    fn visit(&self, index: usize, eye: &Point3<f64>, order: &mut Vec<usize>) {
        let node = &self.nodes[index];
        // Whatever lies on the eye's side of the plane is nearer: paint it last
        let (far, near) = if node.side(eye) > 0.0 {
            (node.minus, node.plus)
        } else {
            (node.plus, node.minus)
        };
        if let Some(far) = far {
            self.visit(far, eye, order);
        }
        order.push(node.item);
        if let Some(near) = near {
            self.visit(near, eye, order);
        }
    }
}

/// Side of `plane` that every point of `outline` lies on, or `None` when
/// the outline straddles it. Coplanar outlines go to the plus side.
fn classify(plane: &BspNode, outline: &[Point3<f64>]) -> Option<Branch> {
    let sides: Vec<f64> = outline.iter().map(|p| plane.side(p)).collect();
    if sides.iter().all(|&s| s >= 0.0) {
        Some(Branch::Plus)
    } else if sides.iter().all(|&s| s <= 0.0) {
        Some(Branch::Minus)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{ScheduleEntry, Scheduler};

    fn square(z: f64) -> ScheduleEntry {
        ScheduleEntry {
            z,
            outline: Some(vec![
                Point3::new(0.0, 0.0, z),
                Point3::new(10.0, 0.0, z),
                Point3::new(10.0, 10.0, z),
                Point3::new(0.0, 10.0, z),
            ]),
        }
    }

    fn depths(items: &[ScheduleEntry], order: &[usize]) -> Vec<f64> {
        order.iter().map(|&i| items[i].z).collect()
    }

    #[test]
    fn test_parallel_faces_back_to_front() {
        let items = vec![square(1.0), square(2.0), square(3.0)];
        let order = Scheduler::Bsp.schedule(&items).unwrap();
        assert_eq!(depths(&items, &order), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let items = vec![square(2.0), square(3.0), square(1.0)];
        let order = Scheduler::Bsp.schedule(&items).unwrap();
        assert_eq!(depths(&items, &order), vec![3.0, 2.0, 1.0]);

        // Flipped winding turns every normal around
        let mut flipped = items.clone();
        for item in &mut flipped {
            if let Some(outline) = item.outline.as_mut() {
                outline.reverse();
            }
        }
        let order = Scheduler::Bsp.schedule(&flipped).unwrap();
        assert_eq!(depths(&flipped, &order), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_arena_links() {
        let tree = BspTree::build(&[square(1.0), square(2.0), square(0.0)]).unwrap();
        assert_eq!(tree.len(), 3);
        let root = &tree.nodes()[0];
        assert_eq!(root.plus, Some(1));
        assert_eq!(root.minus, Some(2));
        assert!(tree.nodes()[1..].iter().all(|n| n.plus.is_none() && n.minus.is_none()));
    }

    #[test]
    fn test_straddling_face_is_rejected() {
        let wall = ScheduleEntry {
            z: 5.0,
            outline: Some(vec![
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(5.0, 10.0, 0.0),
                Point3::new(5.0, 10.0, 10.0),
                Point3::new(5.0, 0.0, 10.0),
            ]),
        };
        let items = vec![square(5.0), wall];
        assert_eq!(
            BspTree::build(&items).unwrap_err(),
            Error::InvalidGeometry { object: 1, plane: 0 }
        );
    }

    #[test]
    fn test_empty() {
        let items: Vec<ScheduleEntry> = Vec::new();
        assert!(Scheduler::Bsp.schedule(&items).unwrap().is_empty());
    }
}
