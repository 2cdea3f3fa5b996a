//! Flow handler: the navigation engine
//!
//! A [`FlowHandler`] executes one [`Flow`]. It owns the current view, a cache
//! with at most one view per controller type and the navigation history
//! (most recent first), and dispatches actions through the
//! before / vetoable / after hook pipeline.
//!
//! Navigation needs `&mut FlowHandler`. Lifecycle hooks only see their
//! controller, so they can't navigate while a switch is in progress; they
//! queue a request through a [`FlowActionHandle`] and the host drains the
//! queue with [`FlowHandler::process_pending`]. UI tasks and [`Runnable`]s get
//! the handler itself and may call [`FlowHandler::handle`] or
//! [`FlowHandler::navigate_back`] from inside an action; such nested calls
//! run to completion before the outer action returns.
//!
//! [`Runnable`]: crate::action::Runnable

mod request;


use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use datafx_core::prelude::*;
use datafx_core::{ExceptionHandler, NodeRef, WorkerPool};
use tokio::sync::mpsc;

use crate::action::{ActionRef, FlowAction, LinkAction};
use crate::container::ViewContainer;
use crate::controller::{ControllerModel, ControllerType, ViewController};
use crate::flow::{Flow, FlowContext};
use crate::injection::InjectionRegistry;
use crate::resources::ResourceLoader;
use crate::view::{FlowView, ViewEnvironment, ViewId, ViewRef};

pub use request::FlowActionHandle;
use request::FlowRequest;

/// Prefix of the action ids generated by [`FlowHandler::navigate_to`]
pub const NAVIGATE_ACTION_PREFIX: &str = "navigateAction-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Created, [`FlowHandler::start`] not called yet
    Uninitialized,
    Idle,
    /// A view switch is in progress
    Navigating,
    Destroyed,
}

/// Cooperative cancellation raised by a vetoable hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
    action_id: String,
    reason: String,
}

impl Veto {
    pub fn new(action_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            reason: reason.into(),
        }
    }

    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<Veto> for Error {
    fn from(veto: Veto) -> Self {
        Error::Vetoed {
            action_id: veto.action_id,
            reason: veto.reason,
        }
    }
}

/// The action a hook is called for
pub struct ActionEvent<'a> {
    pub action_id: &'a str,
    pub action: &'a dyn FlowAction,
    /// Controller type of the current view when the hook runs
    pub current: Option<ControllerType>,
}

type ActionHook = Rc<dyn Fn(&ActionEvent<'_>) -> HookResult>;
type VetoableHook = Rc<dyn Fn(&ActionEvent<'_>) -> std::result::Result<(), Veto>>;
type VetoHandler = Rc<dyn Fn(&Veto)>;

pub struct FlowHandler {
    flow: Flow,
    injection: InjectionRegistry,
    resources: Rc<dyn ResourceLoader>,
    models: HashMap<ControllerType, Rc<ControllerModel>>,
    cache: HashMap<ControllerType, ViewRef>,
    current: Option<ViewRef>,
    history: VecDeque<ViewRef>,
    container: Option<Box<dyn ViewContainer>>,
    state: HandlerState,

    before_action: Option<ActionHook>,
    vetoable_before_action: Option<VetoableHook>,
    after_action: Option<ActionHook>,
    veto_handler: Option<VetoHandler>,

    exception_handler: Rc<ExceptionHandler>,
    worker_pool: Option<WorkerPool>,
    handle: FlowActionHandle,
    requests: mpsc::UnboundedReceiver<FlowRequest>,

    next_view_id: u64,
    next_navigation_id: u64,
}

impl fmt::Debug for FlowHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history: Vec<&'static str> = self
            .history
            .iter()
            .map(|v| v.borrow().controller_type().name())
            .collect();
        f.debug_struct("FlowHandler")
            .field("state", &self.state)
            .field("current", &self.current_controller_type())
            .field("history", &history)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl FlowHandler {
    /// Bind `flow` to a new handler. Fails if the injection registry is invalid.
    pub fn new(mut flow: Flow) -> Result<Self> {
        let injection = flow.injection().build()?;
        let resources = flow.take_resources();

        let (tx, requests) = mpsc::unbounded_channel();
        let handle = FlowActionHandle::new(tx);
        let exception_handler = Rc::new(ExceptionHandler::new());
        flow.context_mut().register(handle.clone());
        flow.context_mut()
            .register_shared(Rc::clone(&exception_handler));

        debug!("Created flow handler starting at {}", flow.start_type());
        Ok(Self {
            flow,
            injection,
            resources,
            models: HashMap::new(),
            cache: HashMap::new(),
            current: None,
            history: VecDeque::new(),
            container: None,
            state: HandlerState::Uninitialized,
            before_action: None,
            vetoable_before_action: None,
            after_action: None,
            veto_handler: None,
            exception_handler,
            worker_pool: None,
            handle,
            requests,
            next_view_id: 1,
            next_navigation_id: 0,
        })
    }

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────

    /// Show the start view in `container` and return the container's root node
    pub fn start(&mut self, container: impl ViewContainer + 'static) -> Result<NodeRef> {
        match self.state {
            HandlerState::Uninitialized => {}
            HandlerState::Destroyed => return Err(Error::HandlerDestroyed),
            _ => return Err(Error::AlreadyStarted),
        }

        let root = container.root();
        self.container = Some(Box::new(container));
        self.state = HandlerState::Idle;

        let start = self.flow.start_type();
        if let Err(e) = self.switch_view(start, false) {
            self.container = None;
            self.state = HandlerState::Uninitialized;
            return Err(Error::flow(format!("can't start flow at {start}"), e));
        }

        info!("Flow started at {}", start);
        Ok(root)
    }

    /// Hide the current view and destroy every cached view
    ///
    /// All views are released even if some pre-destroy hooks fail; the first
    /// failure is returned afterwards.
    pub fn destroy(&mut self) -> Result<()> {
        if self.state == HandlerState::Destroyed {
            return Ok(());
        }

        if let Some(current) = self.current.take() {
            let hidden = current.borrow_mut().hide();
            if let Err(e) = hidden {
                warn!("Hiding {} during destroy failed: {}", current.borrow().controller_type(), e);
            }
        }
        self.history.clear();

        let mut views: Vec<ViewRef> = self.cache.drain().map(|(_, v)| v).collect();
        views.sort_by_key(|v| v.borrow().id());

        let mut first_failure = None;
        for view in views {
            if let Err(e) = view.borrow_mut().destroy(self.flow.destroyed_listeners()) {
                warn!("{}", e);
                first_failure.get_or_insert(e);
            }
        }

        self.container = None;
        self.state = HandlerState::Destroyed;
        info!("Flow handler destroyed");

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn ensure_started(&self) -> Result<()> {
        match self.state {
            HandlerState::Uninitialized => Err(Error::NotStarted),
            HandlerState::Destroyed => Err(Error::HandlerDestroyed),
            HandlerState::Idle | HandlerState::Navigating => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────

    /// Cached view for `controller_type`, constructed on first request
    pub fn view_for(&mut self, controller_type: ControllerType) -> Result<ViewRef> {
        if self.state == HandlerState::Destroyed {
            return Err(Error::HandlerDestroyed);
        }
        if let Some(view) = self.cache.get(&controller_type) {
            return Ok(Rc::clone(view));
        }

        let model = Rc::clone(
            self.models
                .entry(controller_type)
                .or_insert_with(|| Rc::new(controller_type.model())),
        );
        let id = ViewId(self.next_view_id);
        self.next_view_id += 1;

        let env = ViewEnvironment {
            flow: &self.flow,
            injection: &self.injection,
            resources: &*self.resources,
        };
        let view = Rc::new(RefCell::new(FlowView::build(
            controller_type,
            model,
            id,
            self.flow.view_layout(controller_type),
            &env,
        )?));
        self.cache.insert(controller_type, Rc::clone(&view));
        debug!("Cached {} for {}", id, controller_type);
        Ok(view)
    }

    /// Make the view of `controller_type` current
    ///
    /// The outgoing view is hidden, then the incoming one is shown. With
    /// `destroy` the outgoing view is destroyed and uncached afterwards,
    /// otherwise it becomes the most recent history entry. Switching to the
    /// current view does nothing.
    pub fn switch_view(&mut self, controller_type: ControllerType, destroy: bool) -> Result<ViewRef> {
        self.ensure_started()?;
        if let Some(current) = &self.current {
            if current.borrow().controller_type() == controller_type {
                trace!("{} is already current", controller_type);
                return Ok(Rc::clone(current));
            }
        }
        let incoming = self.view_for(controller_type)?;
        self.activate(incoming, destroy)
    }

    fn activate(&mut self, incoming: ViewRef, destroy: bool) -> Result<ViewRef> {
        let outgoing = self.current.clone();
        let history_pos = self.history.iter().position(|v| Rc::ptr_eq(v, &incoming));
        if let Some(pos) = history_pos {
            self.history.remove(pos);
        }

        self.state = HandlerState::Navigating;
        self.current = Some(Rc::clone(&incoming));

        if let Some(container) = self.container.as_mut() {
            if let Err(e) = container.switch_view(&incoming.borrow(), destroy) {
                self.rollback(outgoing.as_ref(), &incoming, history_pos, false);
                return Err(e);
            }
        }

        if let Some(old) = &outgoing {
            let hidden = old.borrow_mut().hide();
            if let Err(e) = hidden {
                self.rollback(outgoing.as_ref(), &incoming, history_pos, false);
                return Err(e);
            }
        }

        let shown = incoming.borrow_mut().show();
        if let Err(e) = shown {
            self.rollback(outgoing.as_ref(), &incoming, history_pos, true);
            return Err(e);
        }

        let mut result = Ok(());
        if let Some(old) = outgoing {
            if destroy {
                let old_type = old.borrow().controller_type();
                if self
                    .cache
                    .get(&old_type)
                    .is_some_and(|cached| Rc::ptr_eq(cached, &old))
                {
                    self.cache.remove(&old_type);
                }
                self.history.retain(|v| !Rc::ptr_eq(v, &old));
                result = old.borrow_mut().destroy(self.flow.destroyed_listeners());
            } else {
                self.history.push_front(old);
            }
        }

        self.state = HandlerState::Idle;
        debug!(
            "Switched to {} (history: {})",
            incoming.borrow().controller_type(),
            self.history.len()
        );
        result.map(|_| incoming)
    }

    /// Restore the state before a failed switch
    fn rollback(
        &mut self,
        outgoing: Option<&ViewRef>,
        incoming: &ViewRef,
        history_pos: Option<usize>,
        reshow: bool,
    ) {
        warn!(
            "Switch to {} failed, restoring previous view",
            incoming.borrow().controller_type()
        );
        self.current = outgoing.cloned();
        if let Some(pos) = history_pos {
            let pos = pos.min(self.history.len());
            self.history.insert(pos, Rc::clone(incoming));
        }
        if let (Some(container), Some(old)) = (self.container.as_mut(), outgoing) {
            if let Err(e) = container.switch_view(&old.borrow(), false) {
                warn!("Container could not restore the previous view: {}", e);
            }
        }
        if reshow {
            if let Some(old) = outgoing {
                if let Err(e) = old.borrow_mut().show() {
                    warn!("Re-showing the previous view failed: {}", e);
                }
            }
        }
        self.state = HandlerState::Idle;
    }

    /// Dispatch a link to `C` through the action pipeline
    pub fn navigate_to<C: ViewController>(&mut self) -> Result<()> {
        self.navigate_to_type(ControllerType::of::<C>())
    }

    pub fn navigate_to_type(&mut self, controller_type: ControllerType) -> Result<()> {
        let action_id = format!("{}{}", NAVIGATE_ACTION_PREFIX, self.next_navigation_id);
        self.next_navigation_id += 1;
        self.handle_action(Rc::new(LinkAction::new(controller_type)), &action_id)
    }

    /// Go to the most recent history entry, destroying the current view
    pub fn navigate_back(&mut self) -> Result<()> {
        self.navigate_back_with(true)
    }

    pub fn navigate_back_with(&mut self, destroy_current: bool) -> Result<()> {
        self.ensure_started()?;
        let target = self.history.front().cloned().ok_or(Error::HistoryEmpty)?;
        self.activate(target, destroy_current).map(|_| ())
    }

    // ─────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────

    /// Action registered for `action_id` on the current view, else globally
    pub fn resolve_action(&self, action_id: &str) -> Option<ActionRef> {
        let local = self
            .current
            .as_ref()
            .and_then(|view| view.borrow().action(action_id).ok().flatten());
        local.or_else(|| self.flow.global_action(action_id))
    }

    pub fn handle(&mut self, action_id: &str) -> Result<()> {
        self.ensure_started()?;
        let action = self
            .resolve_action(action_id)
            .ok_or_else(|| Error::action_not_found(action_id))?;
        self.handle_action(action, action_id)
    }

    /// Run `action` through the hook pipeline under `action_id`
    pub fn handle_action(&mut self, action: ActionRef, action_id: &str) -> Result<()> {
        self.ensure_started()?;
        let event = ActionEvent {
            action_id,
            action: action.as_ref(),
            current: self.current_controller_type(),
        };

        if let Some(hook) = self.before_action.clone() {
            hook(&event).map_err(|source| Error::ActionHook {
                action_id: action_id.to_string(),
                source,
            })?;
        }

        if let Some(hook) = self.vetoable_before_action.clone() {
            if let Err(veto) = hook(&event) {
                info!("Action '{}' vetoed: {}", action_id, veto.reason());
                if let Some(veto_handler) = self.veto_handler.clone() {
                    veto_handler(&veto);
                }
                return Err(veto.into());
            }
        }

        trace!("Handling action '{}': {:?}", action_id, action);
        action.handle(self, action_id)?;

        if let Some(hook) = self.after_action.clone() {
            let event = ActionEvent {
                action_id,
                action: action.as_ref(),
                current: self.current_controller_type(),
            };
            hook(&event).map_err(|source| Error::ActionHook {
                action_id: action_id.to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// [`handle`](Self::handle) for UI event wiring: failures go to the exception handler
    pub fn handle_with_exception_handler(&mut self, action_id: &str) {
        if let Err(e) = self.handle(action_id) {
            self.exception_handler.set_exception(e);
        }
    }

    /// [`navigate_back`](Self::navigate_back) for UI event wiring
    pub fn navigate_back_with_exception_handler(&mut self) {
        if let Err(e) = self.navigate_back() {
            self.exception_handler.set_exception(e);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Deferred requests
    // ─────────────────────────────────────────────────────────

    pub fn action_handle(&self) -> FlowActionHandle {
        self.handle.clone()
    }

    /// Execute the requests queued so far. Failures go to the exception handler.
    ///
    /// Requests queued while these run stay in the queue for the next call.
    /// Returns the number of requests taken from the queue.
    pub fn process_pending(&mut self) -> usize {
        let pending: Vec<FlowRequest> =
            std::iter::from_fn(|| self.requests.try_recv().ok()).collect();
        let processed = pending.len();
        for request in pending {
            if self.state == HandlerState::Destroyed {
                debug!("Dropping {:?} after destroy", request);
                continue;
            }
            trace!("Processing {:?}", request);
            let result = match request {
                FlowRequest::Handle(action_id) => self.handle(&action_id),
                FlowRequest::NavigateTo(target) => self.navigate_to_type(target),
                FlowRequest::NavigateBack => self.navigate_back(),
                FlowRequest::RunOnUiThread(callback) => callback(self),
                FlowRequest::ReportError(e) => Err(e),
            };
            if let Err(e) = result {
                self.exception_handler.set_exception(e);
            }
        }
        processed
    }

    /// Pool used by background tasks. Created on first use if none was set.
    pub fn worker_pool(&mut self) -> Result<WorkerPool> {
        match &self.worker_pool {
            Some(pool) => Ok(pool.clone()),
            None => {
                let pool = WorkerPool::current_or_owned()?;
                self.worker_pool = Some(pool.clone());
                Ok(pool)
            }
        }
    }

    pub fn set_worker_pool(&mut self, pool: WorkerPool) {
        self.worker_pool = Some(pool);
    }

    /// Advance container transitions. Returns whether one is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.container.as_mut() {
            Some(container) => container.tick(now),
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Hooks
    // ─────────────────────────────────────────────────────────

    pub fn set_before_action_hook(&mut self, hook: impl Fn(&ActionEvent<'_>) -> HookResult + 'static) {
        self.before_action = Some(Rc::new(hook));
    }

    /// Hook that may veto an action before it runs
    pub fn set_vetoable_before_action_hook(
        &mut self,
        hook: impl Fn(&ActionEvent<'_>) -> std::result::Result<(), Veto> + 'static,
    ) {
        self.vetoable_before_action = Some(Rc::new(hook));
    }

    pub fn set_after_action_hook(&mut self, hook: impl Fn(&ActionEvent<'_>) -> HookResult + 'static) {
        self.after_action = Some(Rc::new(hook));
    }

    /// Called once for every vetoed action
    pub fn set_veto_handler(&mut self, handler: impl Fn(&Veto) + 'static) {
        self.veto_handler = Some(Rc::new(handler));
    }

    // ─────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────

    pub fn state(&self) -> HandlerState {
        self.state
    }

    pub fn current_view(&self) -> Option<ViewRef> {
        self.current.clone()
    }

    pub fn current_controller_type(&self) -> Option<ControllerType> {
        self.current
            .as_ref()
            .map(|view| view.borrow().controller_type())
    }

    /// Previously active views, most recent first
    pub fn history(&self) -> &VecDeque<ViewRef> {
        &self.history
    }

    pub fn history_types(&self) -> Vec<ControllerType> {
        self.history
            .iter()
            .map(|view| view.borrow().controller_type())
            .collect()
    }

    pub fn cached_view(&self, controller_type: ControllerType) -> Option<ViewRef> {
        self.cache.get(&controller_type).cloned()
    }

    pub fn cached_view_count(&self) -> usize {
        self.cache.len()
    }

    pub fn container(&self) -> Option<&dyn ViewContainer> {
        self.container.as_deref()
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn context(&self) -> &FlowContext {
        self.flow.context()
    }

    pub fn context_mut(&mut self) -> &mut FlowContext {
        self.flow.context_mut()
    }

    pub fn exception_handler(&self) -> Rc<ExceptionHandler> {
        Rc::clone(&self.exception_handler)
    }
}
