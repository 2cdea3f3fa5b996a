//! Deferred requests
//!
//! Code that cannot borrow the handler (lifecycle hooks, background tasks,
//! UI callbacks) talks to the flow through a [`FlowActionHandle`]. Requests
//! are queued and executed on the UI thread by
//! [`FlowHandler::process_pending`](super::FlowHandler::process_pending).

use std::fmt;

use datafx_core::prelude::*;
use tokio::sync::mpsc;

use super::FlowHandler;
use crate::controller::{ControllerType, ViewController};

pub(crate) type UiCallback = Box<dyn FnOnce(&mut FlowHandler) -> Result<()> + Send>;

pub(crate) enum FlowRequest {
    Handle(String),
    NavigateTo(ControllerType),
    NavigateBack,
    RunOnUiThread(UiCallback),
    ReportError(Error),
}

impl fmt::Debug for FlowRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowRequest::Handle(id) => f.debug_tuple("Handle").field(id).finish(),
            FlowRequest::NavigateTo(target) => f.debug_tuple("NavigateTo").field(target).finish(),
            FlowRequest::NavigateBack => f.write_str("NavigateBack"),
            FlowRequest::RunOnUiThread(_) => f.write_str("RunOnUiThread"),
            FlowRequest::ReportError(e) => f.debug_tuple("ReportError").field(e).finish(),
        }
    }
}

/// Cloneable, `Send` handle for queueing work on a flow handler
#[derive(Clone)]
pub struct FlowActionHandle {
    tx: mpsc::UnboundedSender<FlowRequest>,
}

impl fmt::Debug for FlowActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowActionHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl FlowActionHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<FlowRequest>) -> Self {
        Self { tx }
    }

    fn send(&self, request: FlowRequest) -> Result<()> {
        self.tx.send(request).map_err(|_| Error::HandlerDestroyed)
    }

    /// Queue dispatch of `action_id`
    pub fn handle(&self, action_id: impl Into<String>) -> Result<()> {
        self.send(FlowRequest::Handle(action_id.into()))
    }

    pub fn navigate_to<C: ViewController>(&self) -> Result<()> {
        self.send(FlowRequest::NavigateTo(ControllerType::of::<C>()))
    }

    pub fn navigate_back(&self) -> Result<()> {
        self.send(FlowRequest::NavigateBack)
    }

    /// Queue `f` to run on the UI thread with the handler
    pub fn run_on_ui_thread(
        &self,
        f: impl FnOnce(&mut FlowHandler) -> Result<()> + Send + 'static,
    ) -> Result<()> {
        self.send(FlowRequest::RunOnUiThread(Box::new(f)))
    }

    /// Forward `error` to the handler's exception handler
    pub fn report_error(&self, error: Error) -> Result<()> {
        self.send(FlowRequest::ReportError(error))
    }

    /// Whether the handler behind this handle is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
