//! Flow definitions
//!
//! A [`Flow`] declares where navigation starts and which actions exist,
//! globally and per controller type. It is consumed by
//! [`Flow::create_handler`], which binds it to exactly one [`FlowHandler`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use datafx_core::prelude::*;
use datafx_core::{NodeRef, Registry};

use crate::action::{ActionRef, BackAction, FlowAction, LinkAction, TaskAction};
use crate::config::ViewConfiguration;
use crate::container::ViewContainer;
use crate::controller::{ControllerType, ViewController};
use crate::handler::FlowHandler;
use crate::injection::{
    AnnotatedTypeProvider, InjectionRegistryBuilder, ResourceConsumer, ViewContext,
};
use crate::resources::{FsResourceLoader, ResourceLoader};
use crate::view::{PostConstructListener, ViewDestroyedListener, ViewId};

/// Shared objects available to actions, providers and consumers
pub type FlowContext = Registry;

pub struct Flow {
    start: ControllerType,
    global_actions: HashMap<String, ActionRef>,
    view_actions: HashMap<ControllerType, HashMap<String, ActionRef>>,
    view_layouts: HashMap<ControllerType, String>,
    context: FlowContext,
    configuration: ViewConfiguration,
    injection: InjectionRegistryBuilder,
    resources: Option<Rc<dyn ResourceLoader>>,
    post_construct_listeners: Vec<PostConstructListener>,
    destroyed_listeners: Vec<ViewDestroyedListener>,
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut global: Vec<&String> = self.global_actions.keys().collect();
        global.sort();
        f.debug_struct("Flow")
            .field("start", &self.start)
            .field("global_actions", &global)
            .field("view_actions", &self.view_actions.len())
            .field("context", &self.context)
            .finish()
    }
}

impl Flow {
    /// Flow starting at the view of `C`
    pub fn new<C: ViewController>() -> Self {
        Self::starting_at(ControllerType::of::<C>())
    }

    pub fn starting_at(start: ControllerType) -> Self {
        Self {
            start,
            global_actions: HashMap::new(),
            view_actions: HashMap::new(),
            view_layouts: HashMap::new(),
            context: FlowContext::new(),
            configuration: ViewConfiguration::default(),
            injection: InjectionRegistryBuilder::with_defaults(),
            resources: None,
            post_construct_listeners: Vec::new(),
            destroyed_listeners: Vec::new(),
        }
    }

    pub fn start_type(&self) -> ControllerType {
        self.start
    }

    // ─────────────────────────────────────────────────────────
    // Global actions
    // ─────────────────────────────────────────────────────────

    /// Register an action available from every view
    pub fn with_global_action(
        mut self,
        action_id: impl Into<String>,
        action: impl FlowAction + 'static,
    ) -> Self {
        self.global_actions.insert(action_id.into(), Rc::new(action));
        self
    }

    pub fn with_global_link<C: ViewController>(self, action_id: impl Into<String>) -> Self {
        self.with_global_action(action_id, LinkAction::to::<C>())
    }

    pub fn with_global_back_action(self, action_id: impl Into<String>) -> Self {
        self.with_global_action(action_id, BackAction)
    }

    pub fn with_global_task_action(self, action_id: impl Into<String>, task: TaskAction) -> Self {
        self.with_global_action(action_id, task)
    }

    // ─────────────────────────────────────────────────────────
    // Per-view actions
    // ─────────────────────────────────────────────────────────

    /// Register an action available only while a view of `C` is current
    pub fn with_view_action<C: ViewController>(
        mut self,
        action_id: impl Into<String>,
        action: impl FlowAction + 'static,
    ) -> Self {
        self.add_view_action(ControllerType::of::<C>(), action_id, Rc::new(action));
        self
    }

    pub fn add_view_action(
        &mut self,
        controller_type: ControllerType,
        action_id: impl Into<String>,
        action: ActionRef,
    ) {
        self.view_actions
            .entry(controller_type)
            .or_default()
            .insert(action_id.into(), action);
    }

    /// Link from views of `S` to the view of `T`
    pub fn with_link<S: ViewController, T: ViewController>(
        self,
        action_id: impl Into<String>,
    ) -> Self {
        self.with_view_action::<S>(action_id, LinkAction::to::<T>())
    }

    pub fn with_back_action<C: ViewController>(self, action_id: impl Into<String>) -> Self {
        self.with_view_action::<C>(action_id, BackAction)
    }

    pub fn with_task_action<C: ViewController>(
        self,
        action_id: impl Into<String>,
        task: TaskAction,
    ) -> Self {
        self.with_view_action::<C>(action_id, task)
    }

    pub fn global_action(&self, action_id: &str) -> Option<ActionRef> {
        self.global_actions.get(action_id).cloned()
    }

    pub fn view_action(&self, controller_type: ControllerType, action_id: &str) -> Option<ActionRef> {
        self.view_actions
            .get(&controller_type)
            .and_then(|actions| actions.get(action_id))
            .cloned()
    }

    pub(crate) fn view_actions(
        &self,
        controller_type: ControllerType,
    ) -> impl Iterator<Item = (&String, &ActionRef)> {
        self.view_actions
            .get(&controller_type)
            .into_iter()
            .flat_map(|actions| actions.iter())
    }

    // ─────────────────────────────────────────────────────────
    // Shared objects
    // ─────────────────────────────────────────────────────────

    pub fn register<T: 'static>(mut self, value: T) -> Self {
        self.context.register(value);
        self
    }

    pub fn register_named<T: 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.context.register_named(key, value);
        self
    }

    pub fn registered_object<T: 'static>(&self) -> Option<Rc<T>> {
        self.context.get::<T>()
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut FlowContext {
        &mut self.context
    }

    // ─────────────────────────────────────────────────────────
    // Views and injection
    // ─────────────────────────────────────────────────────────

    pub fn with_configuration(mut self, configuration: ViewConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn configuration(&self) -> &ViewConfiguration {
        &self.configuration
    }

    /// Resource loader for layouts and icons. Defaults to files under
    /// [`ViewConfiguration::resource_dir`].
    pub fn with_resources(mut self, resources: impl ResourceLoader + 'static) -> Self {
        self.resources = Some(Rc::new(resources));
        self
    }

    /// Build views of `C` from the layout resource `name`, ahead of the
    /// controller's root factory and declared layout
    pub fn with_view_layout<C: ViewController>(mut self, name: impl Into<String>) -> Self {
        self.view_layouts
            .insert(ControllerType::of::<C>(), name.into());
        self
    }

    pub fn view_layout(&self, controller_type: ControllerType) -> Option<&str> {
        self.view_layouts.get(&controller_type).map(String::as_str)
    }

    pub fn with_provider(mut self, provider: impl AnnotatedTypeProvider + 'static) -> Self {
        self.injection.register_provider(provider);
        self
    }

    pub fn with_consumer(mut self, consumer: impl ResourceConsumer + 'static) -> Self {
        self.injection.register_consumer(consumer);
        self
    }

    pub fn injection_mut(&mut self) -> &mut InjectionRegistryBuilder {
        &mut self.injection
    }

    /// Called for every constructed controller, before its post-construct hooks
    pub fn on_post_construct(
        mut self,
        listener: impl Fn(&mut dyn Any, &ViewContext<'_>) -> HookResult + 'static,
    ) -> Self {
        self.post_construct_listeners.push(Rc::new(listener));
        self
    }

    pub fn on_view_destroyed(mut self, listener: impl Fn(ControllerType, ViewId) + 'static) -> Self {
        self.destroyed_listeners.push(Rc::new(listener));
        self
    }

    pub(crate) fn post_construct_listeners(&self) -> &[PostConstructListener] {
        &self.post_construct_listeners
    }

    pub(crate) fn destroyed_listeners(&self) -> &[ViewDestroyedListener] {
        &self.destroyed_listeners
    }

    pub(crate) fn take_resources(&mut self) -> Rc<dyn ResourceLoader> {
        match self.resources.take() {
            Some(resources) => resources,
            None => Rc::new(FsResourceLoader::from_configuration(&self.configuration)),
        }
    }

    pub(crate) fn injection(&self) -> &InjectionRegistryBuilder {
        &self.injection
    }

    // ─────────────────────────────────────────────────────────
    // Runtime
    // ─────────────────────────────────────────────────────────

    /// Bind this flow to a new handler
    ///
    /// Validates the injection registry first, so conflicting providers fail
    /// here before any view is constructed.
    pub fn create_handler(self) -> Result<FlowHandler> {
        FlowHandler::new(self)
    }

    /// Create a handler and show the start view in `container`
    pub fn start(self, container: impl ViewContainer + 'static) -> Result<(FlowHandler, NodeRef)> {
        let mut handler = self.create_handler()?;
        let root = handler.start(container)?;
        Ok((handler, root))
    }
}
