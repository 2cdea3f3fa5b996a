//! Driving the sample wizard through the terminal host
//!
//! Run with: cargo test --test terminal_host

use std::rc::Rc;
use std::time::{Duration, Instant};

use datafx::featuretoggle::FeatureHandler;
use datafx::flow::{DefaultContainer, TabContainer};
use datafx::tui::{App, InputKey};
use datafx::wizard::{self, Wizard1Controller, Wizard2Controller, HELP_FEATURE};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn wizard_app(features: Rc<FeatureHandler>) -> App {
    let (handler, root) = wizard::wizard_flow(features, Duration::ZERO)
        .with_configuration(wizard::embedded_configuration().unwrap())
        .with_resources(wizard::embedded_resources())
        .start(TabContainer::new(DefaultContainer::new()))
        .unwrap();
    let mut app = App::new(handler, root, "DataFX Wizard");
    app.update(Instant::now()).unwrap();
    app
}

fn screen(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
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
fn test_enter_on_next_advances_the_wizard() {
    let mut app = wizard_app(Rc::new(FeatureHandler::new()));
    assert_eq!(app.stage().window_title(), "Wizard: Step 1 - DataFX Wizard");

    app.handle_key(InputKey::Enter);

    assert!(app
        .handler()
        .current_controller_type()
        .unwrap()
        .is::<Wizard2Controller>());
    assert_eq!(app.stage().window_title(), "Wizard: Step 2 - DataFX Wizard");
}

#[test]
fn test_escape_goes_back() {
    let mut app = wizard_app(Rc::new(FeatureHandler::new()));
    app.handle_key(InputKey::Enter);
    app.handle_key(InputKey::Esc);

    assert!(app
        .handler()
        .current_controller_type()
        .unwrap()
        .is::<Wizard1Controller>());
    assert!(app.handler().history().is_empty());
}

#[test]
fn test_screen_shows_current_step() {
    let mut app = wizard_app(Rc::new(FeatureHandler::new()));
    let text = screen(&mut app);
    assert!(text.contains("Step 1: welcome to the wizard"));
    assert!(text.contains("[ Next ]"));
    assert!(text.contains("[ Help ]"));
}

#[test]
fn test_disabled_help_is_not_drawn() {
    let features = Rc::new(FeatureHandler::new());
    features.disable(HELP_FEATURE);
    let mut app = wizard_app(features);

    let text = screen(&mut app);
    assert!(!text.contains("[ Help ]"));
    assert!(text.contains("[ Finish ]"));
}
