//! Sample wizard flow
//!
//! Three steps, a help page and a final page. Every step embeds the
//! [`WizardActionBar`], whose back / finish / help buttons are declared once
//! and inherited. Step 3 is loaded from the `Wizard3.toml` layout resource and
//! submits through a background task.

use std::rc::Rc;
use std::time::Duration;

use datafx_core::prelude::*;
use datafx_core::{Node, NodeKind, NodeRef};
use datafx_featuretoggle::{FeatureHandler, HideByFeature};
use datafx_flow::{
    ActionTrigger, BackTrigger, ControllerDescriptor, Field, Flow, StaticResources, TaskAction,
    ViewConfiguration, ViewController,
};

/// Feature controlling the help buttons
pub const HELP_FEATURE: &str = "HELP";

const STEP3_LAYOUT: &str = include_str!("../resources/Wizard3.toml");
const CONFIGURATION: &str = include_str!("../datafx.toml");

/// Back, finish and help buttons shown on every step
#[derive(Default)]
pub struct WizardActionBar {
    pub back: Option<NodeRef>,
    pub finish: Option<NodeRef>,
    pub help: Option<NodeRef>,
}

impl ViewController for WizardActionBar {
    fn descriptor() -> ControllerDescriptor<Self> {
        ControllerDescriptor::from_default()
            .field(Field::node("back", |c: &mut Self| &mut c.back).annotate(BackTrigger))
            .field(
                Field::node("finish", |c: &mut Self| &mut c.finish)
                    .annotate(ActionTrigger::new("finish")),
            )
            .field(
                Field::node("help", |c: &mut Self| &mut c.help)
                    .annotate(ActionTrigger::new("help"))
                    .annotate(HideByFeature::new(HELP_FEATURE)),
            )
    }
}

fn action_bar() -> NodeRef {
    let bar = Node::new(NodeKind::HBox).identified("action-bar");
    bar.add_child(Node::button("Back").identified("back"));
    bar.add_child(Node::button("Finish").identified("finish"));
    bar.add_child(Node::button("Help").identified("help"));
    bar
}

fn step(text: &str) -> NodeRef {
    Node::vbox([
        Node::label(text),
        Node::button("Next").identified("next"),
        action_bar(),
    ])
}

#[derive(Default)]
pub struct Wizard1Controller {
    pub bar: WizardActionBar,
    pub next: Option<NodeRef>,
}

impl ViewController for Wizard1Controller {
    fn descriptor() -> ControllerDescriptor<Self> {
        ControllerDescriptor::from_default()
            .title("Wizard: Step 1")
            .root(|| step("Step 1: welcome to the wizard"))
            .inherit(|c: &mut Self| &mut c.bar, WizardActionBar::descriptor())
            .field(
                Field::node("next", |c: &mut Self| &mut c.next)
                    .annotate(ActionTrigger::new("next")),
            )
            .post_construct(|_| {
                debug!("Wizard1Controller constructed");
                Ok(())
            })
    }
}

#[derive(Default)]
pub struct Wizard2Controller {
    pub bar: WizardActionBar,
    pub next: Option<NodeRef>,
    pub visits: u32,
}

impl ViewController for Wizard2Controller {
    fn descriptor() -> ControllerDescriptor<Self> {
        ControllerDescriptor::from_default()
            .title("Wizard: Step 2")
            .root(|| step("Step 2: pick your options"))
            .inherit(|c: &mut Self| &mut c.bar, WizardActionBar::descriptor())
            .field(
                Field::node("next", |c: &mut Self| &mut c.next)
                    .annotate(ActionTrigger::new("next")),
            )
            .on_show(|c| {
                c.visits += 1;
                Ok(())
            })
    }
}

/// Loaded from `Wizard3.toml`
#[derive(Default)]
pub struct Wizard3Controller {
    pub bar: WizardActionBar,
    pub name: Option<NodeRef>,
}

impl ViewController for Wizard3Controller {
    fn descriptor() -> ControllerDescriptor<Self> {
        ControllerDescriptor::from_default()
            .title("Wizard: Step 3")
            .inherit(|c: &mut Self| &mut c.bar, WizardActionBar::descriptor())
            .field(Field::node("name", |c: &mut Self| &mut c.name))
    }
}

#[derive(Default)]
pub struct WizardHelpController {
    pub back: Option<NodeRef>,
}

impl ViewController for WizardHelpController {
    fn descriptor() -> ControllerDescriptor<Self> {
        ControllerDescriptor::from_default()
            .title("Wizard: Help")
            .root(|| {
                Node::vbox([
                    Node::label("Use Next to continue and Back to return."),
                    Node::button("Close").identified("close"),
                ])
            })
            .field(
                Field::node("back", |c: &mut Self| &mut c.back)
                    .with_id("close")
                    .annotate(BackTrigger),
            )
    }
}

#[derive(Default)]
pub struct WizardDoneController;

impl ViewController for WizardDoneController {
    fn descriptor() -> ControllerDescriptor<Self> {
        ControllerDescriptor::from_default()
            .title("Wizard: Done")
            .root(|| Node::vbox([Node::label("All done. Press q to quit.")]))
    }
}

/// Layout resources compiled into the binary
pub fn embedded_resources() -> StaticResources {
    StaticResources::new().with("Wizard3.toml", STEP3_LAYOUT)
}

/// View configuration compiled into the binary
pub fn embedded_configuration() -> Result<ViewConfiguration> {
    ViewConfiguration::from_toml(CONFIGURATION)
        .map_err(|e| Error::config(format!("Failed to parse embedded configuration: {e}")))
}

/// The wizard flow. `submit_delay` simulates the time the submit task takes.
pub fn wizard_flow(features: Rc<FeatureHandler>, submit_delay: Duration) -> Flow {
    let flow = Flow::new::<Wizard1Controller>()
        .with_link::<Wizard1Controller, Wizard2Controller>("next")
        .with_link::<Wizard2Controller, Wizard3Controller>("next")
        .with_task_action::<Wizard3Controller>(
            "submit",
            TaskAction::background(move |handle| {
                std::thread::sleep(submit_delay);
                handle.navigate_to::<WizardDoneController>()?;
                Ok(())
            }),
        )
        .with_global_link::<WizardDoneController>("finish")
        .with_global_link::<WizardHelpController>("help")
        .with_global_back_action("back");
    datafx_featuretoggle::install_with(flow, features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_configuration_resolves_step3_text() {
        let config = embedded_configuration().unwrap();
        assert_eq!(
            config.resolve_text("%wizard.step3"),
            "Step 3: confirm your name and submit"
        );
    }

    #[test]
    fn test_action_bar_is_inherited() {
        let model = Wizard2Controller::descriptor().into_model();
        let names: Vec<&str> = model.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["back", "finish", "help", "next"]);
    }
}
