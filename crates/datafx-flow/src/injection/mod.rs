//! Resource injection
//!
//! Controller fields carry [`Annotation`]s. During view construction every
//! annotated field is offered to the registered handlers:
//!
//! - an [`AnnotatedTypeProvider`] produces the value written into the field
//! - a [`ResourceConsumer`] decorates the field's value after it is known
//!
//! Providers and consumers are registered explicitly on an
//! [`InjectionRegistryBuilder`]. At most one provider may claim an
//! annotation type; conflicts are rejected when the registry is built.

pub mod builtin;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use datafx_core::prelude::*;
use datafx_core::{NodeRef, Registry};

use crate::config::ViewConfiguration;
use crate::controller::{ControllerType, FieldModel};

pub use builtin::{
    ActionHandler, ActionHandlerProvider, ActionTrigger, ActionTriggerConsumer, BackTrigger,
    BackTriggerConsumer,
};

/// Marker for field-level declarations understood by providers and consumers
pub trait Annotation: Any + fmt::Debug {}

/// Runtime identity of an annotation type
#[derive(Debug, Clone, Copy)]
pub struct AnnotationType {
    id: TypeId,
    name: &'static str,
}

impl AnnotationType {
    pub fn of<A: Annotation>() -> Self {
        let full = type_name::<A>();
        Self {
            id: TypeId::of::<A>(),
            name: full.rsplit("::").next().unwrap_or(full),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for AnnotationType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnnotationType {}

impl std::hash::Hash for AnnotationType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One annotation attached to a field
#[derive(Clone)]
pub struct AnnotationValue {
    annotation_type: AnnotationType,
    value: Rc<dyn Any>,
    debug: String,
}

impl AnnotationValue {
    pub fn new<A: Annotation>(annotation: A) -> Self {
        Self {
            annotation_type: AnnotationType::of::<A>(),
            debug: format!("{:?}", annotation),
            value: Rc::new(annotation),
        }
    }

    pub fn annotation_type(&self) -> AnnotationType {
        self.annotation_type
    }

    pub fn downcast_ref<A: Annotation>(&self) -> Option<&A> {
        self.value.downcast_ref::<A>()
    }

    /// Typed access for handlers registered for `A`
    pub fn expect<A: Annotation>(&self) -> Result<&A> {
        self.downcast_ref::<A>().ok_or_else(|| {
            Error::config(format!(
                "handler for {} received a {} annotation",
                type_name::<A>(),
                self.annotation_type.name
            ))
        })
    }
}

impl fmt::Debug for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}

/// What providers and consumers can see of the view under construction
pub struct ViewContext<'a> {
    pub controller_type: ControllerType,
    pub root: &'a NodeRef,
    pub flow_context: &'a Registry,
    pub configuration: &'a ViewConfiguration,
}

/// Produces the value of fields carrying one annotation type
pub trait AnnotatedTypeProvider {
    fn annotation_type(&self) -> AnnotationType;

    /// The returned value must have the field's exact type
    fn provide(&self, annotation: &AnnotationValue, view: &ViewContext<'_>) -> Result<Box<dyn Any>>;
}

/// Decorates the value of fields carrying one annotation type
pub trait ResourceConsumer {
    fn annotation_type(&self) -> AnnotationType;

    fn consume(
        &self,
        annotation: &AnnotationValue,
        value: &dyn Any,
        view: &ViewContext<'_>,
    ) -> Result<()>;
}

/// Collects providers and consumers before validation
#[derive(Default)]
pub struct InjectionRegistryBuilder {
    providers: Vec<Rc<dyn AnnotatedTypeProvider>>,
    consumers: Vec<Rc<dyn ResourceConsumer>>,
}

impl fmt::Debug for InjectionRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionRegistryBuilder")
            .field("providers", &self.providers.len())
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

impl InjectionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the action trigger, back trigger and action
    /// handler registrations
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        builder.register_consumer(ActionTriggerConsumer);
        builder.register_consumer(BackTriggerConsumer);
        builder.register_provider(ActionHandlerProvider);
        builder
    }

    pub fn register_provider(&mut self, provider: impl AnnotatedTypeProvider + 'static) -> &mut Self {
        self.providers.push(Rc::new(provider));
        self
    }

    pub fn register_consumer(&mut self, consumer: impl ResourceConsumer + 'static) -> &mut Self {
        self.consumers.push(Rc::new(consumer));
        self
    }

    /// Validate the registrations. Fails if two providers claim one annotation type.
    pub fn build(&self) -> Result<InjectionRegistry> {
        let mut providers: HashMap<AnnotationType, Rc<dyn AnnotatedTypeProvider>> = HashMap::new();
        for provider in &self.providers {
            let annotation = provider.annotation_type();
            if providers.insert(annotation, Rc::clone(provider)).is_some() {
                return Err(Error::DuplicateProvider {
                    annotation: annotation.name().to_string(),
                });
            }
        }

        let mut consumers: HashMap<AnnotationType, Vec<Rc<dyn ResourceConsumer>>> = HashMap::new();
        for consumer in &self.consumers {
            consumers
                .entry(consumer.annotation_type())
                .or_default()
                .push(Rc::clone(consumer));
        }

        debug!(
            "Injection registry built: {} providers, {} consumers",
            providers.len(),
            self.consumers.len()
        );
        Ok(InjectionRegistry {
            providers,
            consumers,
        })
    }
}

/// Validated provider/consumer lookup
#[derive(Default)]
pub struct InjectionRegistry {
    providers: HashMap<AnnotationType, Rc<dyn AnnotatedTypeProvider>>,
    consumers: HashMap<AnnotationType, Vec<Rc<dyn ResourceConsumer>>>,
}

impl fmt::Debug for InjectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut provided: Vec<&str> = self.providers.keys().map(|a| a.name()).collect();
        provided.sort_unstable();
        f.debug_struct("InjectionRegistry")
            .field("providers", &provided)
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

impl InjectionRegistry {
    pub fn provider(&self, annotation: AnnotationType) -> Option<&Rc<dyn AnnotatedTypeProvider>> {
        self.providers.get(&annotation)
    }

    pub fn consumers(&self, annotation: AnnotationType) -> &[Rc<dyn ResourceConsumer>] {
        self.consumers
            .get(&annotation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bind node fields that are still empty to the root's nodes with matching ids
    pub(crate) fn bind_nodes(
        &self,
        controller: &mut dyn Any,
        fields: &[FieldModel],
        view: &ViewContext<'_>,
    ) -> Result<()> {
        for field in fields {
            let Some(id) = field.node_id() else {
                continue;
            };
            let is_empty = field
                .slot
                .value(controller)
                .and_then(|v| v.downcast_ref::<Option<NodeRef>>())
                .map(Option::is_none)
                .unwrap_or(false);
            if !is_empty {
                continue;
            }
            match view.root.lookup(id) {
                Some(node) => field
                    .slot
                    .assign(controller, Box::new(Some(node)))
                    .map_err(|expected| {
                        Error::injection(
                            view.controller_type.name(),
                            field.name(),
                            format!("expected {expected}"),
                        )
                    })?,
                None => debug!(
                    "No node '{}' in {} root for field '{}'",
                    id,
                    view.controller_type,
                    field.name()
                ),
            }
        }
        Ok(())
    }

    /// Run providers, then consumers, for every annotated field
    pub(crate) fn inject(
        &self,
        controller: &mut dyn Any,
        fields: &[FieldModel],
        view: &ViewContext<'_>,
    ) -> Result<()> {
        for field in fields {
            let mut claimed: Option<(&AnnotationValue, &Rc<dyn AnnotatedTypeProvider>)> = None;
            for annotation in field.annotations() {
                if let Some(provider) = self.provider(annotation.annotation_type()) {
                    if claimed.is_some() {
                        return Err(Error::DuplicateInjection {
                            controller: view.controller_type.name().to_string(),
                            field: field.name().to_string(),
                        });
                    }
                    claimed = Some((annotation, provider));
                }
            }

            if let Some((annotation, provider)) = claimed {
                trace!(
                    "Injecting {:?} into {}.{}",
                    annotation,
                    view.controller_type,
                    field.name()
                );
                let value = provider.provide(annotation, view)?;
                field.slot.assign(controller, value).map_err(|expected| {
                    Error::injection(
                        view.controller_type.name(),
                        field.name(),
                        format!(
                            "provider for {} returned a value that is not {}",
                            annotation.annotation_type().name(),
                            expected
                        ),
                    )
                })?;
            }

            for annotation in field.annotations() {
                let consumers = self.consumers(annotation.annotation_type());
                if consumers.is_empty() {
                    continue;
                }
                let value = field.slot.value(controller).ok_or_else(|| {
                    Error::injection(
                        view.controller_type.name(),
                        field.name(),
                        "field is not reachable on this controller",
                    )
                })?;
                for consumer in consumers {
                    consumer.consume(annotation, &*value, view)?;
                }
            }
        }
        Ok(())
    }
}

/// Node held by a field value, for consumers that decorate nodes
///
/// Accepts `NodeRef` and `Option<NodeRef>` fields.
pub fn field_node(value: &dyn Any) -> Option<NodeRef> {
    if let Some(node) = value.downcast_ref::<NodeRef>() {
        return Some(Rc::clone(node));
    }
    value
        .downcast_ref::<Option<NodeRef>>()
        .and_then(|node| node.clone())
}
