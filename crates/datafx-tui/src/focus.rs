//! Keyboard focus over the activatable nodes of a tree

use std::rc::{Rc, Weak};

use datafx_core::{Node, NodeRef};

/// Nodes that can take focus, in drawing order
///
/// Hidden and mouse-transparent subtrees are skipped; a node qualifies when
/// it carries an action and is enabled.
pub fn focusable_nodes(root: &NodeRef) -> Vec<NodeRef> {
    let mut nodes = Vec::new();
    collect(root, &mut nodes);
    nodes
}

fn collect(node: &NodeRef, out: &mut Vec<NodeRef>) {
    if !node.visible().get() || node.is_mouse_transparent() {
        return;
    }
    if node.action().is_some() && node.is_interactive() {
        out.push(Rc::clone(node));
    }
    for child in node.children() {
        collect(&child, out);
    }
}

/// Tracks the focused node across redraws and view switches
#[derive(Debug, Default)]
pub struct FocusRing {
    focused: Option<Weak<Node>>,
}

impl FocusRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focused node, falling back to the first focusable one when the
    /// previous focus left the tree or became inactive
    pub fn focused(&mut self, root: &NodeRef) -> Option<NodeRef> {
        let nodes = focusable_nodes(root);
        let current = self
            .focused
            .as_ref()
            .and_then(Weak::upgrade)
            .filter(|node| nodes.iter().any(|n| Rc::ptr_eq(n, node)));
        let focused = current.or_else(|| nodes.first().cloned());
        self.focused = focused.as_ref().map(Rc::downgrade);
        focused
    }

    pub fn next(&mut self, root: &NodeRef) -> Option<NodeRef> {
        self.step(root, 1)
    }

    pub fn previous(&mut self, root: &NodeRef) -> Option<NodeRef> {
        self.step(root, -1)
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }

    fn step(&mut self, root: &NodeRef, delta: isize) -> Option<NodeRef> {
        let nodes = focusable_nodes(root);
        if nodes.is_empty() {
            self.focused = None;
            return None;
        }
        let len = nodes.len() as isize;
        let index = self
            .focused
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|node| nodes.iter().position(|n| Rc::ptr_eq(n, &node)))
            .map(|i| (i as isize + delta).rem_euclid(len))
            .unwrap_or(if delta < 0 { len - 1 } else { 0 });
        let node = Rc::clone(&nodes[index as usize]);
        self.focused = Some(Rc::downgrade(&node));
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafx_core::NodeAction;

    fn action_button(text: &str) -> NodeRef {
        let button = Node::button(text);
        button.set_action(Some(NodeAction::Action(text.to_lowercase())));
        button
    }

    #[test]
    fn test_only_action_nodes_are_focusable() {
        let next = action_button("Next");
        let root = Node::vbox([Node::label("Title"), Node::button("Inert"), Rc::clone(&next)]);
        let nodes = focusable_nodes(&root);
        assert_eq!(nodes.len(), 1);
        assert!(Rc::ptr_eq(&nodes[0], &next));
    }

    #[test]
    fn test_hidden_disabled_and_transparent_are_skipped() {
        let hidden = action_button("Hidden");
        hidden.visible().set(false);
        let disabled = action_button("Disabled");
        disabled.disabled().set(true);
        let fading = Node::vbox([action_button("Old")]);
        fading.set_mouse_transparent(true);

        let root = Node::stack();
        for child in [hidden, disabled, fading] {
            root.add_child(child);
        }
        assert!(focusable_nodes(&root).is_empty());
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let first = action_button("First");
        let second = action_button("Second");
        let root = Node::vbox([Rc::clone(&first), Rc::clone(&second)]);
        let mut ring = FocusRing::new();

        assert!(Rc::ptr_eq(&ring.focused(&root).unwrap(), &first));
        assert!(Rc::ptr_eq(&ring.next(&root).unwrap(), &second));
        assert!(Rc::ptr_eq(&ring.next(&root).unwrap(), &first));
        assert!(Rc::ptr_eq(&ring.previous(&root).unwrap(), &second));
    }

    #[test]
    fn test_focus_falls_back_when_node_leaves_tree() {
        let first = action_button("First");
        let second = action_button("Second");
        let root = Node::stack();
        root.add_child(Node::vbox([Rc::clone(&first), Rc::clone(&second)]));
        let mut ring = FocusRing::new();
        ring.next(&root);
        ring.next(&root);

        root.clear_children();
        let other = action_button("Other");
        root.add_child(Rc::clone(&other));

        assert!(Rc::ptr_eq(&ring.focused(&root).unwrap(), &other));
    }
}
