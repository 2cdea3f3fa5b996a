//! Terminal setup and the stage a flow is shown on

use datafx_core::prelude::*;
use datafx_core::{NodeRef, Property};
use datafx_flow::{FlowHandler, ViewId};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::render::NodeWidget;
use crate::theme::styles;

/// Install a panic hook that restores the terminal
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));
}

const KEY_HINTS: &str = "Tab focus · Enter activate · Esc back · q quit";

/// Window around the flow, titled after the current view
#[derive(Debug)]
pub struct TerminalStage {
    app_name: String,
    title: Property<String>,
    bound_view: Option<ViewId>,
}

impl TerminalStage {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            title: Property::new(String::new()),
            bound_view: None,
        }
    }

    /// Title of the current view, following it while it changes
    pub fn title(&self) -> &Property<String> {
        &self.title
    }

    pub fn window_title(&self) -> String {
        let title = self.title.get();
        if title.is_empty() {
            self.app_name.clone()
        } else {
            format!("{} - {}", title, self.app_name)
        }
    }

    /// Rebind the title when the handler's current view changed
    pub fn sync(&mut self, handler: &FlowHandler) -> Result<()> {
        match handler.current_view() {
            Some(view) => {
                let view = view.borrow();
                if self.bound_view != Some(view.id()) {
                    trace!("Stage title follows {}", view.id());
                    self.title.bind(&view.title()?);
                    self.bound_view = Some(view.id());
                }
            }
            None => {
                if self.bound_view.take().is_some() {
                    self.title.unbind();
                }
            }
        }
        Ok(())
    }

    /// Draw the stage with `root` inside and an optional status line
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        root: &NodeRef,
        focused: Option<&NodeRef>,
        status: Option<&str>,
    ) {
        let block = styles::stage_block().title(format!(" {} ", self.window_title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [content, footer] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
        frame.render_widget(NodeWidget::new(root).focused(focused), content);

        let footer_line = match status {
            Some(message) => Line::from(Span::styled(message.to_string(), styles::status_red())),
            None => Line::from(Span::styled(KEY_HINTS, styles::text_muted())),
        };
        frame.render_widget(Paragraph::new(footer_line), footer);
    }
}
