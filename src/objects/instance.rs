//! Instances and member dispatch

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::events::ListenerRegistry;
use super::member::{Frame, Member};
use super::property::PropertyRegistry;
use super::Class;
use crate::error::{ObjectError, Result};

/// Own fields are stored as JSON-compatible key-value pairs
pub type Fields = serde_json::Map<String, Value>;

struct InstanceInner {
    id: String,
    class: Class,
    fields: RefCell<Fields>,
    listeners: RefCell<ListenerRegistry>,
    properties: RefCell<PropertyRegistry>,
}

/// An object produced by a class constructor. Clones share the same object.
#[derive(Clone)]
pub struct Instance(Rc<InstanceInner>);

/// Non-owning handle to an instance
#[derive(Clone)]
pub(crate) struct WeakInstance(Weak<InstanceInner>);

impl WeakInstance {
    /// The instance, unless it has been dropped
    pub(crate) fn upgrade(&self) -> Option<Instance> {
        self.0.upgrade().map(Instance)
    }
}

impl Instance {
    pub(crate) fn new(class: Class) -> Self {
        Self(Rc::new(InstanceInner {
            id: uuid::Uuid::new_v4().to_string(),
            class,
            fields: RefCell::new(Fields::new()),
            listeners: RefCell::new(ListenerRegistry::default()),
            properties: RefCell::new(PropertyRegistry::default()),
        }))
    }

    /// Unique instance identifier
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// Call a method by name
    ///
    /// An own field of the same name shadows the class member and makes the
    /// call fail with [`ObjectError::NotCallable`].
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        if self.0.fields.borrow().contains_key(name) {
            return Err(ObjectError::NotCallable(name.to_string()));
        }

        let slot = self
            .class()
            .slot(name)
            .ok_or_else(|| ObjectError::UnknownMember(name.to_string()))?;
        match &slot.member {
            Member::Method(body) => {
                let frame = Frame::member(self, name, slot.super_class.as_ref());
                body.invoke(&frame, args)
            }
            Member::Data(_) => Err(ObjectError::NotCallable(name.to_string())),
        }
    }

    /// Check if `call(name)` would reach a method
    pub fn is_callable(&self, name: &str) -> bool {
        !self.0.fields.borrow().contains_key(name)
            && self.class().member(name).is_some_and(Member::is_method)
    }

    /// Read a data value: own field first, then class data member
    pub fn field(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.fields.borrow().get(name) {
            return Some(value.clone());
        }
        self.class().member(name).and_then(Member::as_data).cloned()
    }

    /// Assign an own field directly
    pub fn set_field(&self, name: &str, value: Value) -> &Self {
        self.0.fields.borrow_mut().insert(name.to_string(), value);
        self
    }

    /// Snapshot of own fields
    pub fn fields(&self) -> Fields {
        self.0.fields.borrow().clone()
    }

    /// Class data members overlaid with own fields
    pub fn resolved_fields(&self) -> Fields {
        let mut resolved = Fields::new();
        for name in self.class().member_names() {
            if let Some(value) = self.class().member(name).and_then(Member::as_data) {
                resolved.insert(name.to_string(), value.clone());
            }
        }
        for (name, value) in self.0.fields.borrow().iter() {
            resolved.insert(name.clone(), value.clone());
        }
        resolved
    }

    /// Get field as string
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.field(name).and_then(|v| v.as_str().map(str::to_string))
    }

    /// Get field as i64
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(|v| v.as_i64())
    }

    /// Check if both handles refer to the same object
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakInstance {
        WeakInstance(Rc::downgrade(&self.0))
    }

    pub(crate) fn listeners(&self) -> &RefCell<ListenerRegistry> {
        &self.0.listeners
    }

    pub(crate) fn properties(&self) -> &RefCell<PropertyRegistry> {
        &self.0.properties
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.0.id)
            .field("class", &self.0.class.name())
            .field("fields", &self.0.fields.borrow())
            .finish()
    }
}
