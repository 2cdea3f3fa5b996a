//! Observable single-threaded values
//!
//! [`Property`] is the change-notification primitive shared by nodes, view
//! titles and feature flags. Clones share the same value. A property can be
//! bound one-way to another property, after which it follows the source and
//! rejects direct writes until [`Property::unbind`] is called.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle returned by [`Property::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Rc<dyn Fn(&T, &T)>;

struct Binding {
    detach: Box<dyn FnOnce()>,
}

struct Inner<T> {
    value: T,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener: u64,
    binding: Option<Binding>,
}

/// Observable value with change listeners and one-way binding
pub struct Property<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Property")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .field("bound", &inner.binding.is_some())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                listeners: Vec::new(),
                next_listener: 0,
                binding: None,
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Apply `f` to the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Set the value. Ignored with a warning while the property is bound.
    pub fn set(&self, value: T) {
        if self.is_bound() {
            tracing::warn!("Ignoring write to a bound property");
            return;
        }
        self.store(value);
    }

    fn store(&self, value: T) {
        let (old, listeners) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            let old = std::mem::replace(&mut inner.value, value);
            let listeners: Vec<Listener<T>> =
                inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            (old, listeners)
        };
        // Listeners may read or write this property, so no borrow is held here
        let new = self.get();
        for listener in listeners {
            listener(&old, &new);
        }
    }

    /// Register a listener called with `(old, new)` on every change
    pub fn add_listener(&self, listener: impl Fn(&T, &T) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.borrow().binding.is_some()
    }

    /// Follow `source` until [`unbind`](Self::unbind). Replaces any previous binding.
    pub fn bind(&self, source: &Property<T>) {
        self.unbind();
        if Rc::ptr_eq(&self.inner, &source.inner) {
            return;
        }

        self.store(source.get());

        let target: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        let listener_id = source.add_listener(move |_, new| {
            if let Some(inner) = target.upgrade() {
                Property { inner }.store(new.clone());
            }
        });

        let source_ref = Rc::downgrade(&source.inner);
        self.inner.borrow_mut().binding = Some(Binding {
            detach: Box::new(move || {
                if let Some(inner) = source_ref.upgrade() {
                    Property { inner }.remove_listener(listener_id);
                }
            }),
        });
    }

    /// Stop following the bound source. The current value is kept.
    pub fn unbind(&self) {
        let binding = self.inner.borrow_mut().binding.take();
        if let Some(binding) = binding {
            (binding.detach)();
        }
    }
}
