//! Flow views: one controller instance, its root node and its actions

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use datafx_core::prelude::*;
use datafx_core::{HookKind, Node, NodeKind, NodeRef, Property};

use crate::action::{ActionRef, MethodAction};
use crate::controller::{ControllerModel, ControllerType, ViewController};
use crate::flow::Flow;
use crate::injection::{InjectionRegistry, ViewContext};
use crate::layout::parse_layout;
use crate::resources::ResourceLoader;

/// Shared view handle, as held by the cache, history and current slot
pub type ViewRef = Rc<RefCell<FlowView>>;

/// Per-handler view number, increasing with every constructed view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Called with every constructed controller before its own post-construct hooks
pub type PostConstructListener = Rc<dyn Fn(&mut dyn Any, &ViewContext<'_>) -> HookResult>;

/// Called after a view has been destroyed
pub type ViewDestroyedListener = Rc<dyn Fn(ControllerType, ViewId)>;

/// Everything view construction reads from the flow and handler
pub(crate) struct ViewEnvironment<'a> {
    pub flow: &'a Flow,
    pub injection: &'a InjectionRegistry,
    pub resources: &'a dyn ResourceLoader,
}

struct ViewState {
    controller: Box<dyn Any>,
    model: Rc<ControllerModel>,
    root: NodeRef,
    title: Property<String>,
    graphic: Property<Option<NodeRef>>,
    actions: HashMap<String, ActionRef>,
}

pub struct FlowView {
    controller_type: ControllerType,
    id: ViewId,
    state: Option<ViewState>,
}

impl fmt::Debug for FlowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FlowView");
        s.field("controller", &self.controller_type.name())
            .field("id", &self.id);
        match &self.state {
            Some(state) => {
                let mut actions: Vec<&String> = state.actions.keys().collect();
                actions.sort();
                s.field("title", &state.title.get()).field("actions", &actions)
            }
            None => s.field("destroyed", &true),
        };
        s.finish()
    }
}

impl FlowView {
    /// Construct the view for `controller_type`
    ///
    /// Any failure is reported as [`Error::ViewConstruction`]; nothing of the
    /// partially built view survives it.
    pub(crate) fn build(
        controller_type: ControllerType,
        model: Rc<ControllerModel>,
        id: ViewId,
        layout_override: Option<&str>,
        env: &ViewEnvironment<'_>,
    ) -> Result<Self> {
        debug!("Constructing {} for {}", id, controller_type);
        Self::construct(controller_type, model, id, layout_override, env)
            .map_err(|e| Error::view_construction(controller_type.name(), e))
    }

    fn construct(
        controller_type: ControllerType,
        model: Rc<ControllerModel>,
        id: ViewId,
        layout_override: Option<&str>,
        env: &ViewEnvironment<'_>,
    ) -> Result<Self> {
        let config = env.flow.configuration();
        let mut controller = model.instantiate()?;

        let title = Property::new(
            model
                .title()
                .map(|t| config.resolve_text(t))
                .unwrap_or_default(),
        );
        let graphic = Property::new(match model.icon() {
            Some(icon) => {
                if !env.resources.exists(icon) {
                    return Err(Error::layout(icon, "icon resource not found"));
                }
                Some(Node::with_text(NodeKind::Image, icon))
            }
            None => None,
        });

        let root = match model.root_factory() {
            Some(factory) if layout_override.is_none() => factory(),
            _ => {
                let resource = resolve_layout(controller_type, &model, layout_override, env)?;
                let content = env.resources.load(&resource)?;
                parse_layout(&resource, &content, config)?
            }
        };

        let context = ViewContext {
            controller_type,
            root: &root,
            flow_context: env.flow.context(),
            configuration: config,
        };
        env.injection
            .bind_nodes(controller.as_mut(), model.fields(), &context)?;
        env.injection
            .inject(controller.as_mut(), model.fields(), &context)?;

        for listener in env.flow.post_construct_listeners() {
            listener(controller.as_mut(), &context).map_err(|source| Error::LifecycleHook {
                controller: controller_type.name().to_string(),
                kind: HookKind::PostConstruct,
                source,
            })?;
        }
        run_hooks(controller_type, &model, controller.as_mut(), HookKind::PostConstruct)?;

        let mut actions: HashMap<String, ActionRef> = HashMap::new();
        for method in model.action_method_ids() {
            actions.insert(
                method.to_string(),
                Rc::new(MethodAction::new(controller_type, method)),
            );
        }
        for (action_id, action) in env.flow.view_actions(controller_type) {
            if actions.insert(action_id.clone(), Rc::clone(action)).is_some() {
                debug!(
                    "Flow action '{}' replaces the action method on {}",
                    action_id, controller_type
                );
            }
        }

        Ok(Self {
            controller_type,
            id,
            state: Some(ViewState {
                controller,
                model,
                root,
                title,
                graphic,
                actions,
            }),
        })
    }

    fn state(&self) -> Result<&ViewState> {
        self.state
            .as_ref()
            .ok_or_else(|| Error::use_after_destroy(self.controller_type.name()))
    }

    fn state_mut(&mut self) -> Result<&mut ViewState> {
        let name = self.controller_type.name();
        self.state
            .as_mut()
            .ok_or_else(|| Error::use_after_destroy(name))
    }

    pub fn controller_type(&self) -> ControllerType {
        self.controller_type
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.is_none()
    }

    pub fn root(&self) -> Result<NodeRef> {
        self.state().map(|s| Rc::clone(&s.root))
    }

    pub fn title(&self) -> Result<Property<String>> {
        self.state().map(|s| s.title.clone())
    }

    pub fn graphic(&self) -> Result<Property<Option<NodeRef>>> {
        self.state().map(|s| s.graphic.clone())
    }

    pub fn action(&self, action_id: &str) -> Result<Option<ActionRef>> {
        self.state().map(|s| s.actions.get(action_id).cloned())
    }

    /// Add or replace a view-local action
    pub fn add_action(&mut self, action_id: impl Into<String>, action: ActionRef) -> Result<()> {
        self.state_mut()?.actions.insert(action_id.into(), action);
        Ok(())
    }

    pub fn action_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.state()?.actions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Typed access to the controller
    pub fn controller<C: ViewController>(&self) -> Result<&C> {
        let state = self.state()?;
        state
            .controller
            .downcast_ref::<C>()
            .ok_or_else(|| self.mismatch::<C>())
    }

    pub fn controller_mut<C: ViewController>(&mut self) -> Result<&mut C> {
        let mismatch = self.mismatch::<C>();
        self.state_mut()?
            .controller
            .downcast_mut::<C>()
            .ok_or(mismatch)
    }

    fn mismatch<C: ViewController>(&self) -> Error {
        Error::ControllerMismatch {
            expected: ControllerType::of::<C>().name().to_string(),
            actual: self.controller_type.name().to_string(),
        }
    }

    /// Run the show hooks, stopping at the first failure
    pub fn show(&mut self) -> Result<()> {
        let controller_type = self.controller_type;
        let state = self.state_mut()?;
        run_hooks(
            controller_type,
            &state.model,
            state.controller.as_mut(),
            HookKind::Show,
        )
    }

    /// Run the hide hooks, stopping at the first failure
    pub fn hide(&mut self) -> Result<()> {
        let controller_type = self.controller_type;
        let state = self.state_mut()?;
        run_hooks(
            controller_type,
            &state.model,
            state.controller.as_mut(),
            HookKind::Hide,
        )
    }

    pub(crate) fn invoke_action_method(&mut self, method: &str) -> Result<()> {
        let controller_type = self.controller_type;
        let state = self.state_mut()?;
        let hook = state
            .model
            .action_method(method)
            .cloned()
            .ok_or_else(|| Error::action_not_found(method))?;
        hook(state.controller.as_mut()).map_err(|source| Error::ActionInvocation {
            action_id: method.to_string(),
            controller: controller_type.name().to_string(),
            source,
        })
    }

    /// Run every pre-destroy hook, notify `listeners` and release the view
    ///
    /// Cleanup always completes. The first hook failure is returned afterwards
    /// as [`Error::Destroy`].
    pub fn destroy(&mut self, listeners: &[ViewDestroyedListener]) -> Result<()> {
        let controller_type = self.controller_type;
        let mut state = self
            .state
            .take()
            .ok_or_else(|| Error::use_after_destroy(controller_type.name()))?;

        let mut first_failure = None;
        for hook in state.model.hooks(HookKind::PreDestroy) {
            if let Err(source) = hook(state.controller.as_mut()) {
                warn!("Pre-destroy hook of {} failed: {}", controller_type, source);
                if first_failure.is_none() {
                    first_failure = Some(source);
                }
            }
        }

        for listener in listeners {
            listener(controller_type, self.id);
        }

        state.title.unbind();
        state.graphic.unbind();
        drop(state);
        debug!("Destroyed {} of {}", self.id, controller_type);

        match first_failure {
            Some(source) => Err(Error::Destroy {
                controller: controller_type.name().to_string(),
                source: Box::new(Error::LifecycleHook {
                    controller: controller_type.name().to_string(),
                    kind: HookKind::PreDestroy,
                    source,
                }),
            }),
            None => Ok(()),
        }
    }
}

fn run_hooks(
    controller_type: ControllerType,
    model: &ControllerModel,
    controller: &mut dyn Any,
    kind: HookKind,
) -> Result<()> {
    for hook in model.hooks(kind) {
        trace!("Running {} hook of {}", kind, controller_type);
        hook(controller).map_err(|source| Error::LifecycleHook {
            controller: controller_type.name().to_string(),
            kind,
            source,
        })?;
    }
    Ok(())
}

/// Layout resource for a view: explicit override, then the declared layout,
/// then the name derived from the controller type if that resource exists
fn resolve_layout(
    controller_type: ControllerType,
    model: &ControllerModel,
    layout_override: Option<&str>,
    env: &ViewEnvironment<'_>,
) -> Result<String> {
    if let Some(layout) = layout_override.or(model.layout()) {
        return Ok(layout.to_string());
    }
    let conventional = env
        .flow
        .configuration()
        .conventional_layout_name(controller_type.name());
    if env.resources.exists(&conventional) {
        return Ok(conventional);
    }
    Err(Error::layout_resolution(
        controller_type.name(),
        format!("no root factory, no declared layout and no resource named {conventional}"),
    ))
}
