//! Class system with inheritance
//!
//! A class is an immutable member table plus a link to its parent. Deriving a
//! class copies the parent's table and merges the child's definitions over it,
//! so a child never alters its parent. Methods remember which class `extend`
//! was called on; that is where their `call_super` lands.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use super::member::{Frame, Member, Members, Method, INIT};
use super::Instance;
use crate::error::{ObjectError, Result};

/// Name of the root class
pub const BASE_CLASS_NAME: &str = "Object";

/// A resolved member table entry
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) member: Member,
    /// Class whose same-named member `call_super` dispatches to
    pub(crate) super_class: Option<Class>,
}

struct ClassInner {
    name: String,
    parent: Option<Class>,
    depth: usize,
    members: BTreeMap<String, Slot>,
    /// The class's own constructor, if it defined one
    init: Option<Method>,
}

/// A class handle. Clones share the same definition.
#[derive(Clone)]
pub struct Class(Rc<ClassInner>);

thread_local! {
    static BASE: Class = Class(Rc::new(ClassInner {
        name: BASE_CLASS_NAME.to_string(),
        parent: None,
        depth: 0,
        members: BTreeMap::new(),
        init: None,
    }));
}

impl Class {
    /// The root class every other class derives from
    pub fn base() -> Self {
        BASE.with(Class::clone)
    }

    /// Derive a new class from this one
    ///
    /// Passing `None` is rejected with [`ObjectError::InvalidArgument`].
    pub fn extend(&self, defs: impl Into<Option<Members>>) -> Result<Class> {
        let defs: Option<Members> = defs.into();
        let defs = defs.ok_or_else(|| {
            ObjectError::InvalidArgument("cannot extend from undefined member definitions".into())
        })?;
        let (name, entries) = defs.into_parts();
        let depth = self.depth() + 1;

        let mut members = self.0.members.clone();
        let mut init = None;
        for (key, member) in entries {
            if key == INIT {
                if let Member::Method(body) = &member {
                    init = Some(body.clone());
                }
            }

            let merged = match (members.remove(&key), member) {
                (
                    Some(Slot {
                        member: Member::Data(base),
                        ..
                    }),
                    Member::Data(overlay),
                ) => Member::Data(deep_merge(base, overlay)),
                (_, member) => member,
            };
            let super_class = merged.is_method().then(|| self.clone());
            members.insert(
                key,
                Slot {
                    member: merged,
                    super_class,
                },
            );
        }

        let name = name.unwrap_or_else(|| format!("{}#{}", self.name(), depth));
        debug!(
            class = %name,
            parent = %self.name(),
            members = members.len(),
            "extended class"
        );

        Ok(Class(Rc::new(ClassInner {
            name,
            parent: Some(self.clone()),
            depth,
            members,
            init,
        })))
    }

    /// Construct an instance, passing `args` to the constructor chain
    pub fn instantiate(&self, args: &[Value]) -> Result<Instance> {
        let instance = Instance::new(self.clone());
        self.construct(&instance, args)?;
        debug!(class = %self.name(), instance = %instance.id(), "constructed instance");
        Ok(instance)
    }

    /// Construct with no arguments, then assign `values` as own fields
    ///
    /// `values` must be a JSON object or `null`. Fields are assigned directly,
    /// without going through the property facet.
    pub fn create(&self, values: Value) -> Result<Instance> {
        let values = match values {
            Value::Object(map) => map,
            Value::Null => Default::default(),
            other => {
                return Err(ObjectError::InvalidArgument(format!(
                    "initial values must be an object, got {}",
                    other
                )))
            }
        };

        let instance = self.instantiate(&[])?;
        for (name, value) in values {
            instance.set_field(&name, value);
        }
        Ok(instance)
    }

    /// Derive a class from `mixins` and create an instance of it
    pub fn create_with_mixins(&self, values: Value, mixins: Option<Members>) -> Result<Instance> {
        self.extend(mixins.unwrap_or_default())?.create(values)
    }

    /// Run this class's constructor on `this`
    pub(crate) fn construct(&self, this: &Instance, args: &[Value]) -> Result<()> {
        let Some(parent) = &self.0.parent else {
            return Ok(());
        };
        match &self.0.init {
            Some(init) => {
                let frame = Frame::constructor(this, parent);
                init.invoke(&frame, args)?;
                Ok(())
            }
            None => parent.construct(this, args),
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&Slot> {
        self.0.members.get(name)
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Direct parent, `None` for the base class
    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// Number of `extend` steps from the base class
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// Get a member (own or inherited)
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.slot(name).map(|slot| &slot.member)
    }

    /// Check if the class defines or inherits `name`
    pub fn has_member(&self, name: &str) -> bool {
        self.0.members.contains_key(name)
    }

    /// Names of all members, sorted
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.0.members.keys().map(String::as_str)
    }

    /// Get the inheritance chain (child -> ... -> root)
    pub fn chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            chain.push(class.name().to_string());
            current = class.parent();
        }
        chain
    }

    /// Check if this class is `ancestor` or derives from it
    pub fn is_a(&self, ancestor: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.ptr_eq(ancestor) {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Check if both handles refer to the same class
    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.0.name)
            .field("depth", &self.0.depth)
            .field("members", &self.0.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Merge `overlay` into `base`, recursing where both sides are objects or arrays
///
/// Arrays merge index by index; entries past the overlay's length are kept.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (Value::Array(mut base), Value::Array(overlay)) => {
            for (index, value) in overlay.into_iter().enumerate() {
                match base.get_mut(index) {
                    Some(existing) => {
                        let merged = deep_merge(existing.take(), value);
                        *existing = merged;
                    }
                    None => base.push(value),
                }
            }
            Value::Array(base)
        }
        (_, overlay) => overlay,
    }
}
