/// Strategies deciding which objects get their 2D shapes rebuilt each frame

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drawer {
    /// Destroy every shape drawn last frame and redraw the whole scheduled
    /// order, so the surface always matches the new paint order.
    #[default]
    Conservative,
    /// Redraw only the dirty objects in place. Shapes of objects that did
    /// not change keep their old stacking, which can be stale after the
    /// camera or another object moved.
    Incremental,
}

/// What a drawer wants done this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawPlan<K> {
    /// Objects whose shapes are removed first.
    pub destroy: Vec<K>,
    /// Objects drawn afterwards, in this order.
    pub draw: Vec<K>,
}

impl Drawer {
    /// Plans a frame from the dirty set, last frame's order and the new order.
    pub fn plan<K: Copy + PartialEq>(self, todos: &[K], drawn: &[K], order: &[K]) -> DrawPlan<K> {
        match self {
            Drawer::Conservative => DrawPlan {
                destroy: drawn.to_vec(),
                draw: order.to_vec(),
            },
            Drawer::Incremental => DrawPlan {
                destroy: Vec::new(),
                draw: order.iter().copied().filter(|k| todos.contains(k)).collect(),
            },
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Drawer::Conservative => Drawer::Incremental,
            Drawer::Incremental => Drawer::Conservative,
        }
    }
}
