/// Composite objects: an ordered child list with its own strategies
use super::{ObjectBase, ObjectId};
use crate::drawer::Drawer;
use crate::scheduler::Scheduler;

/// Children, dirty set and last drawn order of a group of objects.
///
/// The viewport root and every [`Scene`] own one.
#[derive(Debug, Clone, Default)]
pub struct Composite {
    pub(crate) children: Vec<ObjectId>,
    pub(crate) todos: Vec<ObjectId>,
    pub(crate) drawn: Vec<ObjectId>,
    pub(crate) scheduler: Scheduler,
    pub(crate) drawer: Drawer,
}

impl Composite {
    pub fn new(scheduler: Scheduler, drawer: Drawer) -> Self {
        Self {
            scheduler,
            drawer,
            ..Self::default()
        }
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Children waiting for the next frame, in the order they were marked.
    pub fn todos(&self) -> &[ObjectId] {
        &self.todos
    }

    /// Children in the order of the last frame.
    pub fn drawn(&self) -> &[ObjectId] {
        &self.drawn
    }

    pub fn scheduler(&self) -> Scheduler {
        self.scheduler
    }

    pub fn drawer(&self) -> Drawer {
        self.drawer
    }

    pub(crate) fn attach(&mut self, id: ObjectId) {
        if !self.children.contains(&id) {
            self.children.push(id);
        }
        self.mark(id);
    }

    pub(crate) fn detach(&mut self, id: ObjectId) {
        self.children.retain(|&c| c != id);
        self.todos.retain(|&c| c != id);
        self.drawn.retain(|&c| c != id);
    }

    pub(crate) fn mark(&mut self, id: ObjectId) {
        if !self.todos.contains(&id) {
            self.todos.push(id);
        }
    }

    pub(crate) fn mark_all(&mut self) {
        self.todos = self.children.clone();
    }

    pub fn is_dirty(&self) -> bool {
        !self.todos.is_empty()
    }
}

/// A nested group of objects with its own local matrix, drawn into a 2D group.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub(crate) base: ObjectBase,
    pub(crate) composite: Composite,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategies(scheduler: Scheduler, drawer: Drawer) -> Self {
        Self {
            base: ObjectBase::default(),
            composite: Composite::new(scheduler, drawer),
        }
    }

    pub fn composite(&self) -> &Composite {
        &self.composite
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.composite.children
    }

    pub fn scheduler(&self) -> Scheduler {
        self.composite.scheduler
    }

    pub fn set_scheduler(&mut self, scheduler: Scheduler) -> &mut Self {
        log::debug!("scene scheduler set to {scheduler:?}");
        self.composite.scheduler = scheduler;
        self
    }

    pub fn drawer(&self) -> Drawer {
        self.composite.drawer
    }

    pub fn set_drawer(&mut self, drawer: Drawer) -> &mut Self {
        log::debug!("scene drawer set to {drawer:?}");
        self.composite.drawer = drawer;
        self
    }
}
