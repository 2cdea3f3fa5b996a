//! Declarative layout documents
//!
//! A layout is a TOML description of a node tree:
//!
//! ```toml
//! kind = "vbox"
//! id = "content"
//!
//! [[children]]
//! kind = "label"
//! text = "%welcome"
//!
//! [[children]]
//! kind = "button"
//! id = "next"
//! text = "Next"
//! action = "next"
//! ```

use datafx_core::prelude::*;
use datafx_core::{Node, NodeAction, NodeKind, NodeRef};
use serde::Deserialize;

use crate::config::ViewConfiguration;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutNode {
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    /// Action id fired when the node is activated
    #[serde(default)]
    action: Option<String>,
    /// Navigate back when the node is activated
    #[serde(default)]
    back: bool,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    children: Vec<LayoutNode>,
}

fn default_true() -> bool {
    true
}

/// Build the node tree described by `content`. `resource` names the document in errors.
pub fn parse_layout(resource: &str, content: &str, config: &ViewConfiguration) -> Result<NodeRef> {
    let document: LayoutNode =
        toml::from_str(content).map_err(|e| Error::layout(resource, e.to_string()))?;
    build_node(resource, &document, config)
}

fn build_node(resource: &str, layout: &LayoutNode, config: &ViewConfiguration) -> Result<NodeRef> {
    let kind = NodeKind::parse(&layout.kind)
        .ok_or_else(|| Error::layout(resource, format!("unknown node kind '{}'", layout.kind)))?;

    if layout.action.is_some() && layout.back {
        return Err(Error::layout(
            resource,
            "a node can't have both an action and back",
        ));
    }
    if !layout.children.is_empty() && !kind.is_container() {
        return Err(Error::layout(
            resource,
            format!("{} nodes can't have children", layout.kind),
        ));
    }

    let node = Node::new(kind);
    if let Some(id) = &layout.id {
        node.set_id(id.clone());
    }
    if let Some(text) = &layout.text {
        node.text().set(config.resolve_text(text));
    }
    if let Some(action) = &layout.action {
        node.set_action(Some(NodeAction::Action(action.clone())));
    } else if layout.back {
        node.set_action(Some(NodeAction::Back));
    }
    node.visible().set(layout.visible);
    node.disabled().set(layout.disabled);

    for child in &layout.children {
        node.add_child(build_node(resource, child, config)?);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIZARD: &str = r#"
        kind = "vbox"
        id = "content"

        [[children]]
        kind = "label"
        id = "title"
        text = "%welcome"

        [[children]]
        kind = "hbox"

        [[children.children]]
        kind = "button"
        id = "back"
        text = "Back"
        back = true

        [[children.children]]
        kind = "button"
        id = "next"
        text = "Next"
        action = "next"
        disabled = true
    "#;

    #[test]
    fn test_parse_nested_layout() {
        let mut config = ViewConfiguration::default();
        config.strings.insert("welcome".into(), "Welcome".into());

        let root = parse_layout("Wizard.toml", WIZARD, &config).unwrap();
        assert_eq!(root.kind(), NodeKind::VBox);
        assert_eq!(root.lookup("title").unwrap().text().get(), "Welcome");

        let next = root.lookup("next").unwrap();
        assert_eq!(next.action(), Some(NodeAction::Action("next".into())));
        assert!(next.disabled().get());

        let back = root.lookup("back").unwrap();
        assert_eq!(back.action(), Some(NodeAction::Back));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = parse_layout("Bad.toml", "kind = \"canvas\"", &ViewConfiguration::default())
            .unwrap_err();
        assert!(matches!(err, Error::Layout { ref resource, .. } if resource == "Bad.toml"));
    }

    #[test]
    fn test_children_on_leaf_are_rejected() {
        let content = r#"
            kind = "label"
            [[children]]
            kind = "button"
        "#;
        assert!(parse_layout("Leaf.toml", content, &ViewConfiguration::default()).is_err());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(matches!(
            parse_layout("X.toml", "kind = ", &ViewConfiguration::default()),
            Err(Error::Layout { .. })
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let content = "kind = \"label\"\ncolour = \"red\"";
        assert!(parse_layout("X.toml", content, &ViewConfiguration::default()).is_err());
    }
}
