//! # datafx-flow - Flow Navigation Engine
//!
//! Declarative navigation between views. A [`Flow`] names a start controller
//! and the actions that move between views; a [`FlowHandler`] executes it,
//! caching one [`FlowView`] per controller type and keeping a back history.
//!
//! ## Public API
//!
//! ### Flows and Handlers (`flow`, `handler`)
//! - [`Flow`] - Start controller, global and per-view actions, shared context
//! - [`FlowHandler`] - Current view, cache, history and the action pipeline
//! - [`FlowActionHandle`] - `Send` handle for queuing navigation from hooks and workers
//!
//! ### Actions (`action`)
//! - [`LinkAction`], [`BackAction`], [`MethodAction`], [`TaskAction`], [`CompositeAction`]
//!
//! ### Views and Controllers (`controller`, `view`, `layout`)
//! - [`ViewController`] - Implemented by controllers, returns a [`ControllerDescriptor`]
//! - [`FlowView`] - Controller instance, root node, title and actions
//! - [`parse_layout`] - TOML layout resources into node trees
//!
//! ### Injection (`injection`)
//! - [`AnnotatedTypeProvider`] / [`ResourceConsumer`] - Field injection plugins
//! - Built-in [`ActionTrigger`], [`BackTrigger`] and [`ActionHandler`] annotations
//!
//! ### Containers (`container`)
//! - [`DefaultContainer`], [`AnimatedContainer`], [`TabContainer`]

pub mod action;
pub mod config;
pub mod container;
pub mod controller;
pub mod flow;
pub mod handler;
pub mod injection;
pub mod layout;
pub mod resources;
pub mod view;

pub use action::{
    ActionRef, BackAction, CompositeAction, FlowAction, LinkAction, MethodAction, Runnable,
    TaskAction,
};
pub use config::{load_view_configuration, ViewConfiguration};
pub use container::{
    AnimatedContainer, DefaultContainer, TabContainer, TransitionKind, ViewContainer,
    DEFAULT_TRANSITION_DURATION,
};
pub use controller::{
    ControllerDescriptor, ControllerModel, ControllerType, Field, FieldModel, ViewController,
};
pub use flow::{Flow, FlowContext};
pub use handler::{
    ActionEvent, FlowActionHandle, FlowHandler, HandlerState, Veto, NAVIGATE_ACTION_PREFIX,
};
pub use injection::{
    field_node, ActionHandler, ActionTrigger, AnnotatedTypeProvider, Annotation, AnnotationType,
    AnnotationValue, BackTrigger, InjectionRegistry, InjectionRegistryBuilder, ResourceConsumer,
    ViewContext,
};
pub use layout::parse_layout;
pub use resources::{FsResourceLoader, ResourceLoader, StaticResources};
pub use view::{FlowView, ViewDestroyedListener, PostConstructListener, ViewId, ViewRef};
