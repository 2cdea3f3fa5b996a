use std::rc::Rc;
use std::time::Instant;

use datafx_core::prelude::*;
use datafx_core::{Node, NodeKind, NodeRef};

use super::{DefaultContainer, ViewContainer};
use crate::view::FlowView;

/// Wraps another container in a tab whose caption follows the current view title
#[derive(Debug)]
pub struct TabContainer<C = DefaultContainer> {
    tab: NodeRef,
    inner: C,
}

impl Default for TabContainer<DefaultContainer> {
    fn default() -> Self {
        Self::new(DefaultContainer::new())
    }
}

impl<C: ViewContainer> TabContainer<C> {
    pub fn new(inner: C) -> Self {
        let tab = Node::new(NodeKind::Tab);
        tab.add_child(inner.root());
        Self { tab, inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: ViewContainer> ViewContainer for TabContainer<C> {
    fn root(&self) -> NodeRef {
        Rc::clone(&self.tab)
    }

    fn switch_view(&mut self, view: &FlowView, remove_old: bool) -> Result<()> {
        self.inner.switch_view(view, remove_old)?;
        self.tab.text().bind(&view.title()?);
        Ok(())
    }

    fn tick(&mut self, now: Instant) -> bool {
        self.inner.tick(now)
    }

    fn is_animating(&self) -> bool {
        self.inner.is_animating()
    }
}
