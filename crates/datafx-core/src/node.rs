//! Retained UI node tree
//!
//! Views render into a small tree of [`Node`]s owned by the framework. Host
//! adapters (see `datafx-tui`) draw the tree and dispatch activations of nodes
//! carrying a [`NodeAction`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::property::Property;

/// Shared handle to a node
pub type NodeRef = Rc<Node>;

/// Node kinds known to the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Children drawn on top of each other, last child on top
    Stack,
    VBox,
    HBox,
    Label,
    Button,
    TextField,
    /// `text` holds the image resource name
    Image,
    /// Titled container, `text` is the tab caption
    Tab,
}

impl NodeKind {
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "stack" | "stackpane" => NodeKind::Stack,
            "vbox" => NodeKind::VBox,
            "hbox" => NodeKind::HBox,
            "label" => NodeKind::Label,
            "button" => NodeKind::Button,
            "textfield" | "text_field" => NodeKind::TextField,
            "image" => NodeKind::Image,
            "tab" => NodeKind::Tab,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Stack | NodeKind::VBox | NodeKind::HBox | NodeKind::Tab
        )
    }
}

/// What activating a node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    /// Dispatch the action with this id on the flow
    Action(String),
    /// Navigate back in the flow
    Back,
}

/// Transient visual state set by animated transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect {
    pub opacity: f32,
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Effect {
    pub const NONE: Effect = Effect {
        opacity: 1.0,
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };
}

impl Default for Effect {
    fn default() -> Self {
        Self::NONE
    }
}

pub struct Node {
    kind: NodeKind,
    id: RefCell<Option<String>>,
    text: Property<String>,
    visible: Property<bool>,
    disabled: Property<bool>,
    mouse_transparent: Cell<bool>,
    action: RefCell<Option<NodeAction>>,
    effect: Cell<Effect>,
    children: RefCell<Vec<NodeRef>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("id", &self.id.borrow())
            .field("text", &self.text.get())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// Nodes are equal only to themselves
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Node {}

impl Node {
    pub fn new(kind: NodeKind) -> NodeRef {
        Rc::new(Self {
            kind,
            id: RefCell::new(None),
            text: Property::new(String::new()),
            visible: Property::new(true),
            disabled: Property::new(false),
            mouse_transparent: Cell::new(false),
            action: RefCell::new(None),
            effect: Cell::new(Effect::NONE),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn with_text(kind: NodeKind, text: impl Into<String>) -> NodeRef {
        let node = Self::new(kind);
        node.text.set(text.into());
        node
    }

    pub fn stack() -> NodeRef {
        Self::new(NodeKind::Stack)
    }

    pub fn vbox(children: impl IntoIterator<Item = NodeRef>) -> NodeRef {
        let node = Self::new(NodeKind::VBox);
        for child in children {
            node.add_child(child);
        }
        node
    }

    pub fn label(text: impl Into<String>) -> NodeRef {
        Self::with_text(NodeKind::Label, text)
    }

    pub fn button(text: impl Into<String>) -> NodeRef {
        Self::with_text(NodeKind::Button, text)
    }

    /// Builder-style id assignment
    pub fn identified(self: Rc<Self>, id: impl Into<String>) -> NodeRef {
        self.set_id(id);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn id(&self) -> Option<String> {
        self.id.borrow().clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        *self.id.borrow_mut() = Some(id.into());
    }

    pub fn text(&self) -> &Property<String> {
        &self.text
    }

    pub fn visible(&self) -> &Property<bool> {
        &self.visible
    }

    pub fn disabled(&self) -> &Property<bool> {
        &self.disabled
    }

    pub fn is_mouse_transparent(&self) -> bool {
        self.mouse_transparent.get()
    }

    pub fn set_mouse_transparent(&self, transparent: bool) {
        self.mouse_transparent.set(transparent);
    }

    pub fn action(&self) -> Option<NodeAction> {
        self.action.borrow().clone()
    }

    pub fn set_action(&self, action: Option<NodeAction>) {
        *self.action.borrow_mut() = action;
    }

    pub fn effect(&self) -> Effect {
        self.effect.get()
    }

    pub fn set_effect(&self, effect: Effect) {
        self.effect.set(effect);
    }

    /// Snapshot of the current children
    pub fn children(&self) -> Vec<NodeRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn add_child(&self, child: NodeRef) {
        self.children.borrow_mut().push(child);
    }

    pub fn insert_child(&self, index: usize, child: NodeRef) {
        let mut children = self.children.borrow_mut();
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn remove_child(&self, child: &NodeRef) -> bool {
        let mut children = self.children.borrow_mut();
        let before = children.len();
        children.retain(|c| !Rc::ptr_eq(c, child));
        children.len() != before
    }

    pub fn contains_child(&self, child: &NodeRef) -> bool {
        self.children.borrow().iter().any(|c| Rc::ptr_eq(c, child))
    }

    pub fn clear_children(&self) {
        self.children.borrow_mut().clear();
    }

    /// Depth-first search of this subtree, the node itself included
    pub fn lookup(self: &Rc<Self>, id: &str) -> Option<NodeRef> {
        if self.id.borrow().as_deref() == Some(id) {
            return Some(Rc::clone(self));
        }
        self.children
            .borrow()
            .iter()
            .find_map(|child| child.lookup(id))
    }

    /// Whether the node can be activated: visible, enabled and reachable
    pub fn is_interactive(&self) -> bool {
        self.visible.get() && !self.disabled.get() && !self.mouse_transparent.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> NodeRef {
        let next = Node::button("Next").identified("next");
        let inner = Node::vbox([Node::label("Step 1").identified("title"), next]);
        let root = Node::stack().identified("root");
        root.add_child(inner);
        root
    }

    #[test]
    fn test_lookup_finds_nested_node() {
        let root = sample_tree();
        let next = root.lookup("next").unwrap();
        assert_eq!(next.kind(), NodeKind::Button);
        assert_eq!(next.text().get(), "Next");
    }

    #[test]
    fn test_lookup_matches_root_itself() {
        let root = sample_tree();
        assert!(Rc::ptr_eq(&root.lookup("root").unwrap(), &root));
        assert!(root.lookup("missing").is_none());
    }

    #[test]
    fn test_add_remove_children() {
        let stack = Node::stack();
        let a = Node::label("a");
        let b = Node::label("b");
        stack.add_child(Rc::clone(&a));
        stack.insert_child(0, Rc::clone(&b));
        assert_eq!(stack.children()[0].text().get(), "b");

        assert!(stack.remove_child(&b));
        assert!(!stack.remove_child(&b));
        assert!(stack.contains_child(&a));

        stack.clear_children();
        assert_eq!(stack.child_count(), 0);
    }

    #[test]
    fn test_node_kind_parse() {
        assert_eq!(NodeKind::parse("Button"), Some(NodeKind::Button));
        assert_eq!(NodeKind::parse("StackPane"), Some(NodeKind::Stack));
        assert_eq!(NodeKind::parse("canvas"), None);
        assert!(NodeKind::VBox.is_container());
        assert!(!NodeKind::Label.is_container());
    }

    #[test]
    fn test_is_interactive() {
        let button = Node::button("Go");
        assert!(button.is_interactive());
        button.disabled().set(true);
        assert!(!button.is_interactive());
        button.disabled().set(false);
        button.set_mouse_transparent(true);
        assert!(!button.is_interactive());
    }

    #[test]
    fn test_nodes_compare_by_identity() {
        let first = Node::label("Same");
        let second = Node::label("Same");
        assert_eq!(first, Rc::clone(&first));
        assert_ne!(first, second);

        let graphic = Property::new(Some(Rc::clone(&first)));
        graphic.set(Some(second.clone()));
        assert_eq!(graphic.get(), Some(second));
    }
}
