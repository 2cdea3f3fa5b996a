//! Controller declarations
//!
//! A view controller describes itself once through a [`ControllerDescriptor`]:
//! layout and title metadata, the fields the framework fills in, lifecycle
//! hooks and action methods. The descriptor is erased into a
//! [`ControllerModel`] that the flow handler caches per controller type.
//!
//! ```ignore
//! #[derive(Default)]
//! struct WizardController {
//!     next_button: Option<NodeRef>,
//!     visits: u32,
//! }
//!
//! impl ViewController for WizardController {
//!     fn descriptor() -> ControllerDescriptor<Self> {
//!         ControllerDescriptor::from_default()
//!             .title("Wizard")
//!             .field(Field::node("next", |c: &mut Self| &mut c.next_button)
//!                 .annotate(ActionTrigger::new("next")))
//!             .on_show(|c| {
//!                 c.visits += 1;
//!                 Ok(())
//!             })
//!     }
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use datafx_core::prelude::*;
use datafx_core::{HookKind, NodeRef};

use crate::injection::{Annotation, AnnotationValue};

/// A type that backs a flow view
pub trait ViewController: Any {
    fn descriptor() -> ControllerDescriptor<Self>
    where
        Self: Sized;
}

// ─────────────────────────────────────────────────────────────────
// Controller Type
// ─────────────────────────────────────────────────────────────────

/// Runtime identity of a controller type
#[derive(Clone, Copy)]
pub struct ControllerType {
    id: TypeId,
    name: &'static str,
    build_model: fn() -> ControllerModel,
}

fn build_model<C: ViewController>() -> ControllerModel {
    C::descriptor().into_model()
}

impl ControllerType {
    pub fn of<C: ViewController>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: short_type_name(type_name::<C>()),
            build_model: build_model::<C>,
        }
    }

    /// Type name without its module path
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn is<C: ViewController>(&self) -> bool {
        self.id == TypeId::of::<C>()
    }

    pub(crate) fn model(&self) -> ControllerModel {
        (self.build_model)()
    }
}

impl PartialEq for ControllerType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ControllerType {}

impl Hash for ControllerType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ControllerType({})", self.name)
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ─────────────────────────────────────────────────────────────────
// Field Slots
// ─────────────────────────────────────────────────────────────────

/// Type-erased access to one controller field
pub(crate) trait FieldSlot {
    fn value<'a>(&self, controller: &'a mut dyn Any) -> Option<&'a mut dyn Any>;

    fn value_type(&self) -> &'static str;

    /// Store `value` into the field. Fails with the expected type name on mismatch.
    fn assign(
        &self,
        controller: &mut dyn Any,
        value: Box<dyn Any>,
    ) -> std::result::Result<(), &'static str>;
}

struct TypedSlot<C, T> {
    accessor: fn(&mut C) -> &mut T,
}

impl<C: 'static, T: 'static> FieldSlot for TypedSlot<C, T> {
    fn value<'a>(&self, controller: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let controller = controller.downcast_mut::<C>()?;
        Some((self.accessor)(controller) as &mut dyn Any)
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn assign(
        &self,
        controller: &mut dyn Any,
        value: Box<dyn Any>,
    ) -> std::result::Result<(), &'static str> {
        let controller = controller
            .downcast_mut::<C>()
            .ok_or(type_name::<C>())?;
        let value = value.downcast::<T>().map_err(|_| type_name::<T>())?;
        *(self.accessor)(controller) = *value;
        Ok(())
    }
}

/// Field of an inherited descriptor, reached through a projection
struct ProjectedSlot<C, P> {
    project: fn(&mut C) -> &mut P,
    inner: Rc<dyn FieldSlot>,
}

impl<C: 'static, P: 'static> FieldSlot for ProjectedSlot<C, P> {
    fn value<'a>(&self, controller: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let controller = controller.downcast_mut::<C>()?;
        self.inner.value((self.project)(controller))
    }

    fn value_type(&self) -> &'static str {
        self.inner.value_type()
    }

    fn assign(
        &self,
        controller: &mut dyn Any,
        value: Box<dyn Any>,
    ) -> std::result::Result<(), &'static str> {
        let controller = controller
            .downcast_mut::<C>()
            .ok_or(type_name::<C>())?;
        self.inner.assign((self.project)(controller), value)
    }
}

/// Declaration of a framework-managed controller field
pub struct Field<C> {
    name: String,
    slot: Rc<dyn FieldSlot>,
    node_id: Option<String>,
    annotations: Vec<AnnotationValue>,
    _controller: PhantomData<fn(&mut C)>,
}

impl<C: 'static> Field<C> {
    /// A field bound to the node with the same id in the view's root, unless
    /// it already holds a node
    pub fn node(name: impl Into<String>, accessor: fn(&mut C) -> &mut Option<NodeRef>) -> Self {
        let name = name.into();
        Self {
            node_id: Some(name.clone()),
            name,
            slot: Rc::new(TypedSlot { accessor }),
            annotations: Vec::new(),
            _controller: PhantomData,
        }
    }

    /// A field filled in by a resource provider claiming one of its annotations
    pub fn resource<T: 'static>(name: impl Into<String>, accessor: fn(&mut C) -> &mut T) -> Self {
        Self {
            name: name.into(),
            slot: Rc::new(TypedSlot { accessor }),
            node_id: None,
            annotations: Vec::new(),
            _controller: PhantomData,
        }
    }

    /// Look the node up under `id` instead of the field name
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    pub fn annotate<A: Annotation>(mut self, annotation: A) -> Self {
        self.annotations.push(AnnotationValue::new(annotation));
        self
    }

    fn into_model(self) -> FieldModel {
        FieldModel {
            name: self.name,
            slot: self.slot,
            node_id: self.node_id,
            annotations: self.annotations,
        }
    }
}

/// Erased field declaration
#[derive(Clone)]
pub struct FieldModel {
    pub(crate) name: String,
    pub(crate) slot: Rc<dyn FieldSlot>,
    pub(crate) node_id: Option<String>,
    pub(crate) annotations: Vec<AnnotationValue>,
}

impl FieldModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn annotations(&self) -> &[AnnotationValue] {
        &self.annotations
    }

    pub fn value_type(&self) -> &'static str {
        self.slot.value_type()
    }
}

impl fmt::Debug for FieldModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldModel")
            .field("name", &self.name)
            .field("type", &self.slot.value_type())
            .field("node_id", &self.node_id)
            .field("annotations", &self.annotations)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────
// Descriptor
// ─────────────────────────────────────────────────────────────────

pub(crate) type ErasedHook = Rc<dyn Fn(&mut dyn Any) -> HookResult>;
type ErasedFactory = Box<dyn Fn() -> HookResult<Box<dyn Any>>>;
type RootFactory = Rc<dyn Fn() -> NodeRef>;

fn erase_hook<C: 'static>(hook: impl Fn(&mut C) -> HookResult + 'static) -> ErasedHook {
    Rc::new(move |controller: &mut dyn Any| match controller.downcast_mut::<C>() {
        Some(controller) => hook(controller),
        None => Err(format!("hook expects a {} controller", type_name::<C>()).into()),
    })
}

/// Typed builder describing a controller
pub struct ControllerDescriptor<C> {
    model: ControllerModel,
    _controller: PhantomData<fn() -> C>,
}

impl<C: ViewController> ControllerDescriptor<C> {
    /// Descriptor whose controllers are created by `factory`
    pub fn new(factory: impl Fn() -> HookResult<C> + 'static) -> Self {
        let factory: ErasedFactory =
            Box::new(move || factory().map(|c| Box::new(c) as Box<dyn Any>));
        Self {
            model: ControllerModel {
                name: short_type_name(type_name::<C>()),
                factory,
                layout: None,
                title: None,
                icon: None,
                root: None,
                fields: Vec::new(),
                hooks: HashMap::new(),
                action_methods: Vec::new(),
            },
            _controller: PhantomData,
        }
    }

    /// Explicit layout resource name
    pub fn layout(mut self, resource: impl Into<String>) -> Self {
        self.model.layout = Some(resource.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.model.title = Some(title.into());
        self
    }

    /// Icon resource name, shown as the view graphic
    pub fn icon(mut self, resource: impl Into<String>) -> Self {
        self.model.icon = Some(resource.into());
        self
    }

    /// Build the root node in code instead of loading a layout
    pub fn root(mut self, factory: impl Fn() -> NodeRef + 'static) -> Self {
        self.model.root = Some(Rc::new(factory));
        self
    }

    pub fn field(mut self, field: Field<C>) -> Self {
        self.model.fields.push(field.into_model());
        self
    }

    fn hook(mut self, kind: HookKind, hook: impl Fn(&mut C) -> HookResult + 'static) -> Self {
        self.model
            .hooks
            .entry(kind)
            .or_default()
            .push(erase_hook(hook));
        self
    }

    pub fn post_construct(self, hook: impl Fn(&mut C) -> HookResult + 'static) -> Self {
        self.hook(HookKind::PostConstruct, hook)
    }

    pub fn on_show(self, hook: impl Fn(&mut C) -> HookResult + 'static) -> Self {
        self.hook(HookKind::Show, hook)
    }

    pub fn on_hide(self, hook: impl Fn(&mut C) -> HookResult + 'static) -> Self {
        self.hook(HookKind::Hide, hook)
    }

    pub fn pre_destroy(self, hook: impl Fn(&mut C) -> HookResult + 'static) -> Self {
        self.hook(HookKind::PreDestroy, hook)
    }

    /// Register `method` as the handler of action `id` on views of this controller
    pub fn action_method(
        mut self,
        id: impl Into<String>,
        method: impl Fn(&mut C) -> HookResult + 'static,
    ) -> Self {
        self.model
            .action_methods
            .push((id.into(), erase_hook(method)));
        self
    }

    /// Pull in the fields, hooks and action methods of an embedded parent
    /// controller. Inherited hooks run at this position relative to the
    /// hooks declared on `self`.
    pub fn inherit<P: ViewController>(
        mut self,
        project: fn(&mut C) -> &mut P,
        parent: ControllerDescriptor<P>,
    ) -> Self {
        let parent = parent.model;

        for field in parent.fields {
            self.model.fields.push(FieldModel {
                slot: Rc::new(ProjectedSlot {
                    project,
                    inner: field.slot,
                }),
                ..field
            });
        }

        let lift = |hook: ErasedHook| -> ErasedHook {
            Rc::new(move |controller: &mut dyn Any| match controller.downcast_mut::<C>() {
                Some(controller) => hook(project(controller)),
                None => Err(format!("hook expects a {} controller", type_name::<C>()).into()),
            })
        };

        for (kind, hooks) in parent.hooks {
            let lifted = hooks.into_iter().map(lift);
            self.model.hooks.entry(kind).or_default().extend(lifted);
        }
        for (id, method) in parent.action_methods {
            self.model.action_methods.push((id, lift(method)));
        }
        self
    }

    pub fn into_model(self) -> ControllerModel {
        self.model
    }
}

impl<C: ViewController + Default> ControllerDescriptor<C> {
    /// Descriptor whose controllers are created with `C::default()`
    pub fn from_default() -> Self {
        Self::new(|| Ok(C::default()))
    }
}

/// Erased, flattened controller description
pub struct ControllerModel {
    name: &'static str,
    factory: ErasedFactory,
    layout: Option<String>,
    title: Option<String>,
    icon: Option<String>,
    root: Option<RootFactory>,
    fields: Vec<FieldModel>,
    hooks: HashMap<HookKind, Vec<ErasedHook>>,
    action_methods: Vec<(String, ErasedHook)>,
}

impl fmt::Debug for ControllerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.action_methods.iter().map(|(id, _)| id.as_str()).collect();
        f.debug_struct("ControllerModel")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("title", &self.title)
            .field("icon", &self.icon)
            .field("fields", &self.fields)
            .field("action_methods", &methods)
            .finish()
    }
}

impl ControllerModel {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn instantiate(&self) -> Result<Box<dyn Any>> {
        (self.factory)().map_err(|source| Error::ControllerInstantiation {
            controller: self.name.to_string(),
            source,
        })
    }

    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub(crate) fn root_factory(&self) -> Option<&RootFactory> {
        self.root.as_ref()
    }

    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    pub(crate) fn hooks(&self, kind: HookKind) -> &[ErasedHook] {
        self.hooks.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hook_count(&self, kind: HookKind) -> usize {
        self.hooks(kind).len()
    }

    pub(crate) fn action_method(&self, id: &str) -> Option<&ErasedHook> {
        self.action_methods
            .iter()
            .find(|(method_id, _)| method_id == id)
            .map(|(_, method)| method)
    }

    pub fn action_method_ids(&self) -> impl Iterator<Item = &str> {
        self.action_methods.iter().map(|(id, _)| id.as_str())
    }
}
