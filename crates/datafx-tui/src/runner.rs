//! Main TUI runner - entry point and event loop
//!
//! The loop drains queued flow requests, advances container animations,
//! redraws, then waits for the next key press.

use std::time::{Duration, Instant};

use datafx_core::prelude::*;
use datafx_core::{NodeAction, NodeRef};
use datafx_flow::FlowHandler;
use ratatui::Frame;

use crate::event::{self, InputKey};
use crate::focus::FocusRing;
use crate::terminal::{self, TerminalStage};

/// Poll timeout while a transition is running (about 60 FPS)
const ANIMATION_FRAME: Duration = Duration::from_millis(16);

/// Poll timeout when idle
const IDLE_POLL: Duration = Duration::from_millis(50);

/// A started flow handler together with its terminal state
pub struct App {
    handler: FlowHandler,
    root: NodeRef,
    stage: TerminalStage,
    focus: FocusRing,
    should_quit: bool,
}

impl App {
    /// `root` is the node returned by [`FlowHandler::start`]
    pub fn new(handler: FlowHandler, root: NodeRef, app_name: impl Into<String>) -> Self {
        Self {
            handler,
            root,
            stage: TerminalStage::new(app_name),
            focus: FocusRing::new(),
            should_quit: false,
        }
    }

    pub fn handler(&self) -> &FlowHandler {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut FlowHandler {
        &mut self.handler
    }

    pub fn stage(&self) -> &TerminalStage {
        &self.stage
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_animating(&self) -> bool {
        self.handler
            .container()
            .is_some_and(|container| container.is_animating())
    }

    /// Focused node, if any node can take focus
    pub fn focused(&mut self) -> Option<NodeRef> {
        self.focus.focused(&self.root)
    }

    pub fn handle_key(&mut self, key: InputKey) {
        match key {
            InputKey::Char('q') | InputKey::CharCtrl('c') => self.should_quit = true,
            InputKey::Tab | InputKey::Down | InputKey::Right => {
                self.focus.next(&self.root);
            }
            InputKey::BackTab | InputKey::Up | InputKey::Left => {
                self.focus.previous(&self.root);
            }
            InputKey::Enter | InputKey::Char(' ') => self.activate_focused(),
            InputKey::Esc | InputKey::Backspace => {
                self.handler.navigate_back_with_exception_handler();
                self.after_navigation();
            }
            _ => {}
        }
    }

    fn activate_focused(&mut self) {
        let Some(node) = self.focus.focused(&self.root) else {
            return;
        };
        match node.action() {
            Some(NodeAction::Action(action_id)) => {
                debug!("Activating '{}'", action_id);
                self.handler.handle_with_exception_handler(&action_id);
            }
            Some(NodeAction::Back) => self.handler.navigate_back_with_exception_handler(),
            None => return,
        }
        self.after_navigation();
    }

    fn after_navigation(&mut self) {
        self.focus.clear();
        if let Err(e) = self.stage.sync(&self.handler) {
            warn!("Stage could not follow the current view: {}", e);
        }
    }

    /// Run queued requests and advance animations
    pub fn update(&mut self, now: Instant) -> Result<()> {
        let processed = self.handler.process_pending();
        if processed > 0 {
            trace!("Processed {} queued request(s)", processed);
            self.focus.clear();
        }
        self.handler.tick(now);
        self.stage.sync(&self.handler)
    }

    /// Draw the stage
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let focused = self.focus.focused(&self.root);
        let status = self
            .handler
            .exception_handler()
            .last_exception()
            .map(|record| record.error.to_string());
        self.stage.render(
            frame,
            area,
            &self.root,
            focused.as_ref(),
            status.as_deref(),
        );
    }

    /// Destroy the flow handler, logging cleanup failures
    pub fn shutdown(mut self) {
        if let Err(e) = self.handler.destroy() {
            warn!("Flow cleanup failed: {}", e);
        }
    }
}

/// Show a started flow in the terminal until the user quits
pub fn run(handler: FlowHandler, root: NodeRef, app_name: &str) -> Result<()> {
    terminal::install_panic_hook();
    let mut app = App::new(handler, root, app_name);
    app.stage.sync(&app.handler)?;

    let mut term = ratatui::init();
    info!("Terminal stage started");
    let result = run_loop(&mut term, &mut app);
    ratatui::restore();

    app.shutdown();
    result
}

fn run_loop(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        app.update(Instant::now())?;
        terminal.draw(|frame| app.view(frame))?;

        let timeout = if app.is_animating() {
            ANIMATION_FRAME
        } else {
            IDLE_POLL
        };
        if let Some(key) = event::poll(timeout)? {
            app.handle_key(key);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafx_core::Node;
    use datafx_flow::{
        ActionTrigger, BackTrigger, ControllerDescriptor, DefaultContainer, Field, Flow,
        ViewController,
    };
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[derive(Default)]
    struct StartController {
        next: Option<NodeRef>,
    }

    impl ViewController for StartController {
        fn descriptor() -> ControllerDescriptor<Self> {
            ControllerDescriptor::from_default()
                .title("Welcome")
                .root(|| Node::vbox([Node::label("Start page"), Node::button("Next").identified("next")]))
                .field(Field::node("next", |c: &mut Self| &mut c.next).annotate(ActionTrigger::new("next")))
        }
    }

    #[derive(Default)]
    struct DoneController {
        back: Option<NodeRef>,
    }

    impl ViewController for DoneController {
        fn descriptor() -> ControllerDescriptor<Self> {
            ControllerDescriptor::from_default()
                .title("Done")
                .root(|| Node::vbox([Node::label("All done"), Node::button("Back").identified("back")]))
                .field(Field::node("back", |c: &mut Self| &mut c.back).annotate(BackTrigger))
        }
    }

    fn app() -> App {
        let (handler, root) = Flow::new::<StartController>()
            .with_link::<StartController, DoneController>("next")
            .start(DefaultContainer::new())
            .unwrap();
        let mut app = App::new(handler, root, "Wizard");
        app.update(Instant::now()).unwrap();
        app
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();
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
    fn test_stage_title_follows_current_view() {
        let mut app = app();
        assert_eq!(app.stage().window_title(), "Welcome - Wizard");

        app.handle_key(InputKey::Enter);
        assert!(app.handler().current_controller_type().unwrap().is::<DoneController>());
        assert_eq!(app.stage().window_title(), "Done - Wizard");
    }

    #[test]
    fn test_enter_on_back_trigger_navigates_back() {
        let mut app = app();
        app.handle_key(InputKey::Enter);
        app.handle_key(InputKey::Enter);
        assert!(app.handler().current_controller_type().unwrap().is::<StartController>());
        assert!(app.handler().history().is_empty());
    }

    #[test]
    fn test_escape_with_empty_history_reports_error() {
        let mut app = app();
        app.handle_key(InputKey::Esc);
        assert_eq!(app.handler().exception_handler().exception_count(), 1);
        assert!(screen(&mut app).contains("Navigation history is empty"));
    }

    #[test]
    fn test_view_renders_current_page() {
        let mut app = app();
        let text = screen(&mut app);
        assert!(text.contains("Welcome - Wizard"));
        assert!(text.contains("Start page"));
        assert!(text.contains("[ Next ]"));
        assert!(text.contains("q quit"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(InputKey::Char('x'));
        assert!(!app.should_quit());
        app.handle_key(InputKey::CharCtrl('c'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_queued_navigation_runs_on_update() {
        let mut app = app();
        app.handler().action_handle().handle("next").unwrap();
        app.update(Instant::now()).unwrap();
        assert_eq!(app.stage().window_title(), "Done - Wizard");
    }
}
