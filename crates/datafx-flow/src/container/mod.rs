//! View containers
//!
//! A [`ViewContainer`] owns the node the flow is displayed in and performs the
//! visual swap when the current view changes.

mod animated;
mod tab;

use std::rc::Rc;
use std::time::Instant;

use datafx_core::prelude::*;
use datafx_core::{Node, NodeRef};

use crate::view::FlowView;

pub use animated::{AnimatedContainer, TransitionKind, DEFAULT_TRANSITION_DURATION};
pub use tab::TabContainer;

pub trait ViewContainer {
    /// Node to embed in the host UI
    fn root(&self) -> NodeRef;

    /// Make `view`'s root the visible child. `remove_old` drops the previous
    /// view's node from the container instead of keeping it hidden.
    fn switch_view(&mut self, view: &FlowView, remove_old: bool) -> Result<()>;

    /// Advance running transitions. Returns whether a transition is still running.
    fn tick(&mut self, _now: Instant) -> bool {
        false
    }

    fn is_animating(&self) -> bool {
        false
    }
}

/// Immediate swap inside a stack node
#[derive(Debug)]
pub struct DefaultContainer {
    root: NodeRef,
}

impl Default for DefaultContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultContainer {
    pub fn new() -> Self {
        Self { root: Node::stack() }
    }

    /// Use `root` as the container node. Its children are replaced on every switch.
    pub fn with_root(root: NodeRef) -> Self {
        Self { root }
    }
}

impl ViewContainer for DefaultContainer {
    fn root(&self) -> NodeRef {
        Rc::clone(&self.root)
    }

    fn switch_view(&mut self, view: &FlowView, _remove_old: bool) -> Result<()> {
        let node = view.root()?;
        self.root.clear_children();
        node.visible().set(true);
        self.root.add_child(node);
        Ok(())
    }
}
