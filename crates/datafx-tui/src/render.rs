//! Drawing node trees into a ratatui buffer

use std::rc::Rc;

use datafx_core::{Effect, NodeKind, NodeRef};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Widget};

use crate::theme::styles;

/// Opacity below which a node is not drawn at all
const INVISIBLE_OPACITY: f32 = 0.1;

/// Opacity below which a node is drawn dimmed
const DIM_OPACITY: f32 = 0.6;

/// Widget drawing a node and its visible descendants
pub struct NodeWidget<'a> {
    node: &'a NodeRef,
    focused: Option<&'a NodeRef>,
}

impl<'a> NodeWidget<'a> {
    pub fn new(node: &'a NodeRef) -> Self {
        Self {
            node,
            focused: None,
        }
    }

    pub fn focused(mut self, focused: Option<&'a NodeRef>) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for NodeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_node(self.node, area, buf, self.focused, false);
    }
}

fn render_node(
    node: &NodeRef,
    area: Rect,
    buf: &mut Buffer,
    focused: Option<&NodeRef>,
    dimmed: bool,
) {
    if !node.visible().get() || area.is_empty() {
        return;
    }
    let effect = node.effect();
    if effect.opacity < INVISIBLE_OPACITY {
        return;
    }
    let area = apply_effect(area, effect);
    if area.is_empty() {
        return;
    }
    let dimmed = dimmed || effect.opacity < DIM_OPACITY;
    let is_focused = focused.is_some_and(|f| Rc::ptr_eq(f, node));

    match node.kind() {
        NodeKind::Stack => {
            for (index, child) in node.children().iter().enumerate() {
                if index > 0
                    && child.visible().get()
                    && child.effect().opacity >= INVISIBLE_OPACITY
                {
                    Clear.render(apply_effect(area, child.effect()), buf);
                }
                render_node(child, area, buf, focused, dimmed);
            }
        }
        NodeKind::VBox => {
            let children = node.children();
            let constraints = children
                .iter()
                .map(|c| Constraint::Length(preferred_height(c)));
            let rows = Layout::vertical(constraints).split(area);
            for (child, row) in children.iter().zip(rows.iter()) {
                render_node(child, *row, buf, focused, dimmed);
            }
        }
        NodeKind::HBox => {
            let children = node.children();
            let constraints = children
                .iter()
                .map(|c| Constraint::Length(preferred_width(c)));
            let columns = Layout::horizontal(constraints).spacing(1).split(area);
            for (child, column) in children.iter().zip(columns.iter()) {
                render_node(child, *column, buf, focused, dimmed);
            }
        }
        NodeKind::Tab => {
            let caption = node.text().get();
            let block = styles::tab_block(is_focused).title(Line::from(Span::styled(
                format!(" {caption} "),
                styles::text_primary().add_modifier(Modifier::BOLD),
            )));
            let inner = block.inner(area);
            block.render(area, buf);
            for child in node.children() {
                render_node(&child, inner, buf, focused, dimmed);
            }
        }
        NodeKind::Label => {
            leaf(node.text().get(), styles::text_primary(), node, dimmed).render(area, buf);
        }
        NodeKind::Button => {
            let style = if is_focused {
                styles::button_focused()
            } else {
                styles::button()
            };
            leaf(format!("[ {} ]", node.text().get()), style, node, dimmed).render(area, buf);
        }
        NodeKind::TextField => {
            leaf(node.text().get(), styles::text_field(), node, dimmed).render(area, buf);
        }
        NodeKind::Image => {
            leaf(
                format!("[image: {}]", node.text().get()),
                styles::text_secondary(),
                node,
                dimmed,
            )
            .render(area, buf);
        }
    }
}

fn leaf(text: String, style: Style, node: &NodeRef, dimmed: bool) -> Paragraph<'static> {
    let mut style = if node.disabled().get() {
        styles::text_muted()
    } else {
        style
    };
    if dimmed {
        style = style.add_modifier(Modifier::DIM);
    }
    Paragraph::new(Line::from(Span::styled(text, style)))
}

/// Rows a node needs when laid out vertically
pub fn preferred_height(node: &NodeRef) -> u16 {
    if !node.visible().get() {
        return 0;
    }
    match node.kind() {
        NodeKind::VBox => node.children().iter().map(preferred_height).sum(),
        NodeKind::HBox | NodeKind::Stack => node
            .children()
            .iter()
            .map(preferred_height)
            .max()
            .unwrap_or(0),
        NodeKind::Tab => {
            node.children()
                .iter()
                .map(preferred_height)
                .max()
                .unwrap_or(0)
                + 2
        }
        _ => 1,
    }
}

/// Columns a node needs when laid out horizontally
pub fn preferred_width(node: &NodeRef) -> u16 {
    if !node.visible().get() {
        return 0;
    }
    let text_width = || node.text().with(|t| t.chars().count()) as u16;
    match node.kind() {
        NodeKind::HBox => {
            let children = node.children();
            let spacing = children.len().saturating_sub(1) as u16;
            children.iter().map(preferred_width).sum::<u16>() + spacing
        }
        NodeKind::VBox | NodeKind::Stack => node
            .children()
            .iter()
            .map(preferred_width)
            .max()
            .unwrap_or(0),
        NodeKind::Tab => {
            let content = node
                .children()
                .iter()
                .map(preferred_width)
                .max()
                .unwrap_or(0);
            content.max(text_width() + 2) + 2
        }
        NodeKind::Button => text_width() + 4,
        NodeKind::Image => text_width() + 9,
        NodeKind::Label | NodeKind::TextField => text_width(),
    }
}

/// Scale around the center and translate by a fraction of the area,
/// clipped to the original area
pub fn apply_effect(area: Rect, effect: Effect) -> Rect {
    let mut target = area;
    if effect.scale < 1.0 {
        let scale = effect.scale.max(0.0);
        let width = (f32::from(area.width) * scale).round() as u16;
        let height = (f32::from(area.height) * scale).round() as u16;
        target = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
    }

    let dx = (effect.translate_x * f32::from(area.width)).round() as i32;
    let dy = (effect.translate_y * f32::from(area.height)).round() as i32;
    if dx == 0 && dy == 0 {
        return target;
    }

    let left = (i32::from(target.x) + dx).max(i32::from(area.x));
    let top = (i32::from(target.y) + dy).max(i32::from(area.y));
    let right = (i32::from(target.right()) + dx).min(i32::from(area.right()));
    let bottom = (i32::from(target.bottom()) + dy).min(i32::from(area.bottom()));
    if right <= left || bottom <= top {
        return Rect::new(area.x, area.y, 0, 0);
    }
    Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafx_core::{Node, NodeKind};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(node: &NodeRef, focused: Option<&NodeRef>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_widget(NodeWidget::new(node).focused(focused), frame.area())
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_vbox_renders_children_in_rows() {
        let root = Node::vbox([Node::label("Welcome"), Node::button("Next")]);
        let screen = draw(&root, None, 20, 4);
        let lines: Vec<&str> = screen.lines().collect();
        assert!(lines[0].starts_with("Welcome"));
        assert!(lines[1].starts_with("[ Next ]"));
    }

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let secret = Node::label("Secret");
        secret.visible().set(false);
        let root = Node::vbox([secret, Node::label("Public")]);
        let screen = draw(&root, None, 20, 3);
        assert!(!screen.contains("Secret"));
        assert!(screen.lines().next().unwrap().starts_with("Public"));
    }

    #[test]
    fn test_hbox_places_children_side_by_side() {
        let root = Node::new(NodeKind::HBox);
        root.add_child(Node::button("Back"));
        root.add_child(Node::button("Next"));
        let screen = draw(&root, None, 30, 1);
        assert!(screen.starts_with("[ Back ] [ Next ]"));
    }

    #[test]
    fn test_tab_shows_caption() {
        let tab = Node::with_text(NodeKind::Tab, "Settings");
        tab.add_child(Node::label("Body"));
        let screen = draw(&tab, None, 30, 4);
        assert!(screen.contains("Settings"));
        assert!(screen.contains("Body"));
    }

    #[test]
    fn test_stack_draws_last_child_on_top() {
        let root = Node::stack();
        root.add_child(Node::label("Underneath"));
        root.add_child(Node::label("Top"));
        let screen = draw(&root, None, 20, 1);
        assert!(screen.starts_with("Top"));
        assert!(!screen.contains("Underneath"));
    }

    #[test]
    fn test_faded_node_is_not_drawn() {
        let label = Node::label("Fading");
        label.set_effect(Effect {
            opacity: 0.05,
            ..Effect::NONE
        });
        assert!(!draw(&label, None, 20, 1).contains("Fading"));
    }

    #[test]
    fn test_translation_offsets_area() {
        let area = Rect::new(0, 0, 40, 10);
        let moved = apply_effect(
            area,
            Effect {
                translate_x: 0.5,
                ..Effect::NONE
            },
        );
        assert_eq!(moved, Rect::new(20, 0, 20, 10));

        let gone = apply_effect(
            area,
            Effect {
                translate_x: -1.0,
                ..Effect::NONE
            },
        );
        assert!(gone.is_empty());
    }

    #[test]
    fn test_scale_shrinks_around_center() {
        let area = Rect::new(0, 0, 40, 10);
        let scaled = apply_effect(
            area,
            Effect {
                scale: 0.5,
                ..Effect::NONE
            },
        );
        assert_eq!(scaled, Rect::new(10, 2, 20, 5));
    }

    #[test]
    fn test_preferred_sizes() {
        let row = Node::new(NodeKind::HBox);
        row.add_child(Node::button("Ok"));
        row.add_child(Node::label("Hint"));
        assert_eq!(preferred_width(&row), 6 + 1 + 4);
        assert_eq!(preferred_height(&Node::vbox([Node::label("a"), Rc::clone(&row)])), 2);
    }
}
