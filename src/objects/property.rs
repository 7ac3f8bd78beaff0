//! Encapsulated properties with get/set transforms
//!
//! Each property keeps one private value that is only reachable through its
//! getter and setter. A successful `set` emits `<name>:changed` carrying the
//! value that was passed in, not the transformed one.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::trace;

use super::Instance;
use crate::error::Result;

/// Maps the private value to what `get` returns
pub(crate) type Getter = Rc<dyn Fn(&Instance, &Value) -> Value>;

/// Maps `(input, previous private value)` to the new private value
pub(crate) type Setter = Rc<dyn Fn(&Instance, Value, &Value) -> Value>;

/// Name of the event emitted after `set` on `property`
pub fn changed_event(property: &str) -> String {
    format!("{}:changed", property)
}

/// Optional transforms for [`Instance::property_with`]
#[derive(Clone, Default)]
pub struct Accessors {
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Accessors {
    /// Identity getter and setter
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the getter
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Instance, &Value) -> Value + 'static,
    {
        self.getter = Some(Rc::new(getter));
        self
    }

    /// Replace the setter
    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&Instance, Value, &Value) -> Value + 'static,
    {
        self.setter = Some(Rc::new(setter));
        self
    }
}

/// Private value plus its transforms
#[derive(Clone)]
pub(crate) struct PropertyDescriptor {
    getter: Getter,
    setter: Setter,
    value: Value,
}

impl PropertyDescriptor {
    /// Create a descriptor; missing transforms default to identity
    pub(crate) fn new(accessors: Accessors) -> Self {
        Self {
            getter: accessors.getter.unwrap_or_else(identity_getter),
            setter: accessors.setter.unwrap_or_else(identity_setter),
            value: Value::Null,
        }
    }
}

fn identity_getter() -> Getter {
    Rc::new(|_: &Instance, value: &Value| value.clone())
}

fn identity_setter() -> Setter {
    Rc::new(|_: &Instance, value: Value, _: &Value| value)
}

/// Property name -> descriptor
pub(crate) type PropertyRegistry = HashMap<String, PropertyDescriptor>;

impl Instance {
    /// Register `name` with identity transforms
    pub fn property(&self, name: &str) -> &Self {
        self.property_with(name, Accessors::default())
    }

    /// Register `name` with the given transforms
    ///
    /// Registering an existing name replaces its descriptor and resets the
    /// private value to `null`.
    pub fn property_with(&self, name: &str, accessors: Accessors) -> &Self {
        self.properties()
            .borrow_mut()
            .insert(name.to_string(), PropertyDescriptor::new(accessors));
        self
    }

    /// Read `name` through its getter. Unknown names yield `null`.
    pub fn get(&self, name: &str) -> Value {
        let entry = self
            .properties()
            .borrow()
            .get(name)
            .map(|d| (d.getter.clone(), d.value.clone()));
        match entry {
            Some((getter, value)) => getter(self, &value),
            None => Value::Null,
        }
    }

    /// Write `name` through its setter, then emit `<name>:changed`
    ///
    /// Unknown names are registered with identity transforms first. Fails only
    /// when a change listener fails.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
        let input = value.into();
        if !self.has_property(name) {
            self.property(name);
        }

        let entry = self
            .properties()
            .borrow()
            .get(name)
            .map(|d| (d.setter.clone(), d.value.clone()));
        if let Some((setter, previous)) = entry {
            let next = setter(self, input.clone(), &previous);
            if let Some(descriptor) = self.properties().borrow_mut().get_mut(name) {
                descriptor.value = next;
            }
            trace!(instance = %self.id(), property = name, "property set");
        }

        self.emit(&changed_event(name), &[input])
    }

    /// Properties cannot be removed; this leaves `name` untouched
    pub fn remove(&self, _name: &str) -> &Self {
        self
    }

    /// Check if `name` has been registered as a property
    pub fn has_property(&self, name: &str) -> bool {
        self.properties().borrow().contains_key(name)
    }
}
