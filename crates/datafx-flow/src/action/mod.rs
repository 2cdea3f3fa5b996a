//! Flow actions
//!
//! Everything a flow can do in response to an action id is a [`FlowAction`]:
//! navigation ([`LinkAction`], [`BackAction`]), work ([`TaskAction`]),
//! controller methods ([`MethodAction`]) and sequences of those
//! ([`CompositeAction`]).

mod task;

use std::fmt;
use std::rc::Rc;

use datafx_core::prelude::*;

use crate::controller::{ControllerType, ViewController};
use crate::handler::FlowHandler;

pub use task::{Runnable, TaskAction};

/// A named unit of behavior executed against a flow handler
pub trait FlowAction: fmt::Debug {
    fn handle(&self, handler: &mut FlowHandler, action_id: &str) -> Result<()>;
}

/// Shared action reference, as stored in action tables
pub type ActionRef = Rc<dyn FlowAction>;

/// Navigate to the view of a fixed controller type
#[derive(Debug, Clone, Copy)]
pub struct LinkAction {
    target: ControllerType,
}

impl LinkAction {
    pub fn new(target: ControllerType) -> Self {
        Self { target }
    }

    pub fn to<C: ViewController>() -> Self {
        Self::new(ControllerType::of::<C>())
    }

    pub fn target(&self) -> ControllerType {
        self.target
    }
}

impl FlowAction for LinkAction {
    fn handle(&self, handler: &mut FlowHandler, action_id: &str) -> Result<()> {
        handler
            .switch_view(self.target, false)
            .map(|_| ())
            .map_err(|e| {
                Error::flow(
                    format!("action '{}' can't navigate to {}", action_id, self.target),
                    e,
                )
            })
    }
}

/// Navigate to the most recent history entry, destroying the current view
#[derive(Debug, Clone, Copy, Default)]
pub struct BackAction;

impl FlowAction for BackAction {
    fn handle(&self, handler: &mut FlowHandler, _action_id: &str) -> Result<()> {
        handler.navigate_back()
    }
}

/// Invoke an action method declared on the current view's controller
#[derive(Debug, Clone)]
pub struct MethodAction {
    controller_type: ControllerType,
    method: String,
}

impl MethodAction {
    pub fn new(controller_type: ControllerType, method: impl Into<String>) -> Self {
        Self {
            controller_type,
            method: method.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl FlowAction for MethodAction {
    fn handle(&self, handler: &mut FlowHandler, action_id: &str) -> Result<()> {
        let view = handler.current_view().ok_or(Error::NotStarted)?;
        let mut view = view.borrow_mut();
        if view.controller_type() != self.controller_type {
            return Err(Error::ControllerMismatch {
                expected: self.controller_type.name().to_string(),
                actual: view.controller_type().name().to_string(),
            });
        }
        trace!(
            "Invoking {}::{} for action '{}'",
            self.controller_type,
            self.method,
            action_id
        );
        view.invoke_action_method(&self.method)
            .map_err(|e| match e {
                Error::ActionInvocation {
                    controller, source, ..
                } => Error::ActionInvocation {
                    action_id: action_id.to_string(),
                    controller,
                    source,
                },
                other => other,
            })
    }
}

/// Run several actions in order, stopping at the first failure
#[derive(Debug, Clone, Default)]
pub struct CompositeAction {
    actions: Vec<ActionRef>,
}

impl CompositeAction {
    pub fn new(actions: impl IntoIterator<Item = ActionRef>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    pub fn then(mut self, action: impl FlowAction + 'static) -> Self {
        self.actions.push(Rc::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FlowAction for CompositeAction {
    fn handle(&self, handler: &mut FlowHandler, action_id: &str) -> Result<()> {
        for action in &self.actions {
            action.handle(handler, action_id)?;
        }
        Ok(())
    }
}
