//! Type- and key-indexed store for shared objects

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Holds one shared value per type plus any number of values under string keys
#[derive(Default)]
pub struct Registry {
    by_type: HashMap<TypeId, Rc<dyn Any>>,
    by_key: HashMap<String, Rc<dyn Any>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.by_key.keys().collect();
        keys.sort();
        f.debug_struct("Registry")
            .field("types", &self.by_type.len())
            .field("keys", &keys)
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` as the instance of its type, returning the previous one
    pub fn register<T: 'static>(&mut self, value: T) -> Option<Rc<T>> {
        self.register_shared(Rc::new(value))
    }

    pub fn register_shared<T: 'static>(&mut self, value: Rc<T>) -> Option<Rc<T>> {
        self.by_type
            .insert(TypeId::of::<T>(), value)
            .and_then(|old| old.downcast::<T>().ok())
    }

    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|v| Rc::clone(v).downcast::<T>().ok())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    pub fn register_named<T: 'static>(&mut self, key: impl Into<String>, value: T) {
        self.by_key.insert(key.into(), Rc::new(value));
    }

    /// Value under `key` if it exists and has type `T`
    pub fn get_named<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        self.by_key
            .get(key)
            .and_then(|v| Rc::clone(v).downcast::<T>().ok())
    }

    pub fn remove_named(&mut self, key: &str) -> bool {
        self.by_key.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Session(&'static str);

    #[test]
    fn test_register_and_get_by_type() {
        let mut registry = Registry::new();
        assert!(registry.register(Session("alice")).is_none());
        assert_eq!(registry.get::<Session>().unwrap().0, "alice");

        let previous = registry.register(Session("bob")).unwrap();
        assert_eq!(previous.0, "alice");
        assert!(registry.contains::<Session>());
        assert!(registry.get::<u32>().is_none());
    }

    #[test]
    fn test_named_values_are_type_checked() {
        let mut registry = Registry::new();
        registry.register_named("count", 3_u32);
        assert_eq!(*registry.get_named::<u32>("count").unwrap(), 3);
        assert!(registry.get_named::<String>("count").is_none());
        assert!(registry.remove_named("count"));
        assert!(registry.get_named::<u32>("count").is_none());
    }
}
