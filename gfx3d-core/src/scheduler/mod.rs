//! Back-to-front ordering strategies.
//!
//! A scheduler receives the renderable children of a composite and returns
//! the indices in paint order: the first index is drawn first and ends up
//! behind everything drawn after it.

mod bsp;

pub use bsp::{BspNode, BspTree};

use nalgebra::Point3;

use crate::error::Result;

/// What a scheduler needs to know about each object.
pub trait Schedulable {
    /// Mean cached depth; larger is farther from the viewer.
    fn z_order(&self) -> f64;

    /// Cached points whose first three define the partition plane, or `None`
    /// for composites.
    fn outline(&self) -> Option<&[Point3<f64>]>;
}

/// Snapshot of one object's scheduling inputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleEntry {
    pub z: f64,
    pub outline: Option<Vec<Point3<f64>>>,
}

impl Schedulable for ScheduleEntry {
    fn z_order(&self) -> f64 {
        self.z
    }

    fn outline(&self) -> Option<&[Point3<f64>]> {
        self.outline.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduler {
    /// Stable sort on mean depth, farthest first.
    #[default]
    ZOrder,
    /// Binary space partition over the objects' outline planes.
    Bsp,
}

impl Scheduler {
    pub fn schedule<T: Schedulable>(self, items: &[T]) -> Result<Vec<usize>> {
        match self {
            Scheduler::ZOrder => Ok(z_order(items)),
            Scheduler::Bsp => {
                let tree = BspTree::build(items)?;
                Ok(tree.iterate(&bsp::viewpoint()))
            }
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Scheduler::ZOrder => Scheduler::Bsp,
            Scheduler::Bsp => Scheduler::ZOrder,
        }
    }
}

/// Indices of `items` sorted by descending depth; ties keep their input order.
pub fn z_order<T: Schedulable>(items: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].z_order().total_cmp(&items[a].z_order()));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(z: f64) -> ScheduleEntry {
        ScheduleEntry { z, outline: None }
    }

    #[test]
    fn test_z_order_strictly_descending() {
        let items: Vec<ScheduleEntry> = [3.0, -1.0, 10.0, 0.5, 7.25].map(entry).to_vec();
        let order = z_order(&items);
        assert_eq!(order, vec![2, 4, 0, 3, 1]);
        assert!(order.windows(2).all(|w| items[w[0]].z > items[w[1]].z));
    }

    #[test]
    fn test_z_order_is_stable() {
        let items: Vec<ScheduleEntry> = [1.0, 2.0, 1.0, 2.0].map(entry).to_vec();
        assert_eq!(z_order(&items), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_bsp_needs_outlines() {
        let items = vec![entry(1.0)];
        assert_eq!(
            Scheduler::Bsp.schedule(&items),
            Err(crate::error::Error::MissingOutline)
        );
        assert_eq!(Scheduler::ZOrder.schedule(&items), Ok(vec![0]));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Scheduler::ZOrder.toggled(), Scheduler::Bsp);
        assert_eq!(Scheduler::Bsp.toggled(), Scheduler::ZOrder);
    }
}
