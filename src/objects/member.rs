//! Members, methods and the per-call frame
//!
//! A class member is either a method or plain JSON data. Methods receive a
//! [`Frame`] that carries the receiving instance and the capability to call
//! the implementation they shadow. The capability lives exactly as long as
//! the call, so nothing is ever installed on (or removed from) the instance.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::{Class, Fields, Instance};
use crate::error::{ObjectError, Result};

/// Name of the constructor member
pub const INIT: &str = "init";

type MethodFn = dyn Fn(&Frame<'_>, &[Value]) -> Result<Value>;

/// A callable class member
#[derive(Clone)]
pub struct Method(Rc<MethodFn>);

impl Method {
    /// Wrap a closure as a method
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Frame<'_>, &[Value]) -> Result<Value> + 'static,
    {
        Self(Rc::new(body))
    }

    pub(crate) fn invoke(&self, frame: &Frame<'_>, args: &[Value]) -> Result<Value> {
        (self.0)(frame, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}

/// A single entry of a member table
#[derive(Debug, Clone)]
pub enum Member {
    Method(Method),
    Data(Value),
}

impl Member {
    /// Check if this member can be called
    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }

    /// Get the data value, if this member is data
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Member::Data(value) => Some(value),
            Member::Method(_) => None,
        }
    }
}

/// Member definitions handed to [`Class::extend`]
#[derive(Debug, Clone, Default)]
pub struct Members {
    name: Option<String>,
    entries: BTreeMap<String, Member>,
}

impl Members {
    /// Create an empty definition set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build data-only definitions from a JSON map
    pub fn from_data(data: Fields) -> Self {
        let mut members = Self::new();
        for (name, value) in data {
            members.entries.insert(name, Member::Data(value));
        }
        members
    }

    /// Name the class these definitions produce
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add or replace a method
    pub fn method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&Frame<'_>, &[Value]) -> Result<Value> + 'static,
    {
        self.member(name, Member::Method(Method::new(body)))
    }

    /// Add the constructor. `call_super` inside it runs the parent constructor.
    pub fn init<F>(self, body: F) -> Self
    where
        F: Fn(&Frame<'_>, &[Value]) -> Result<Value> + 'static,
    {
        self.method(INIT, body)
    }

    /// Add or replace a data member
    pub fn data(self, name: &str, value: impl Into<Value>) -> Self {
        self.member(name, Member::Data(value.into()))
    }

    /// Add or replace an arbitrary member
    pub fn member(mut self, name: &str, member: Member) -> Self {
        self.entries.insert(name.to_string(), member);
        self
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.entries.get(name)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no definitions
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, BTreeMap<String, Member>) {
        (self.name, self.entries)
    }
}

/// What `call_super` reaches from the current frame
#[derive(Clone, Copy)]
enum SuperTarget<'a> {
    /// Same-named member of this class (`None` when defined on the base)
    Member(Option<&'a Class>),
    /// Constructor of this class
    Constructor(&'a Class),
}

/// Call context passed to every method invocation
pub struct Frame<'a> {
    this: &'a Instance,
    name: &'a str,
    target: SuperTarget<'a>,
}

impl<'a> Frame<'a> {
    pub(crate) fn member(this: &'a Instance, name: &'a str, parent: Option<&'a Class>) -> Self {
        Self {
            this,
            name,
            target: SuperTarget::Member(parent),
        }
    }

    pub(crate) fn constructor(this: &'a Instance, parent: &'a Class) -> Self {
        Self {
            this,
            name: INIT,
            target: SuperTarget::Constructor(parent),
        }
    }

    /// The receiving instance
    pub fn this(&self) -> &'a Instance {
        self.this
    }

    /// Name of the member being executed
    pub fn name(&self) -> &str {
        self.name
    }

    /// Check if `call_super` has something to dispatch to
    pub fn has_super(&self) -> bool {
        match self.target {
            SuperTarget::Constructor(_) => true,
            SuperTarget::Member(Some(parent)) => parent
                .slot(self.name)
                .is_some_and(|slot| slot.member.is_method()),
            SuperTarget::Member(None) => false,
        }
    }

    /// Invoke the shadowed implementation on the same instance
    ///
    /// Inside a constructor this runs the parent constructor and yields `null`.
    pub fn call_super(&self, args: &[Value]) -> Result<Value> {
        match self.target {
            SuperTarget::Constructor(parent) => {
                parent.construct(self.this, args)?;
                Ok(Value::Null)
            }
            SuperTarget::Member(Some(parent)) => match parent.slot(self.name) {
                Some(slot) => match &slot.member {
                    Member::Method(body) => {
                        let frame = Frame::member(self.this, self.name, slot.super_class.as_ref());
                        body.invoke(&frame, args)
                    }
                    Member::Data(_) => Err(ObjectError::NoSuper(self.name.to_string())),
                },
                None => Err(ObjectError::NoSuper(self.name.to_string())),
            },
            SuperTarget::Member(None) => Err(ObjectError::NoSuper(self.name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_members_builder() {
        let members = Members::new()
            .named("sword")
            .data("weight", 3)
            .method("swing", |_, _| Ok(json!("whoosh")));

        assert_eq!(members.len(), 2);
        assert!(members.get("swing").is_some_and(Member::is_method));
        assert_eq!(members.get("weight").and_then(Member::as_data), Some(&json!(3)));

        let (name, entries) = members.into_parts();
        assert_eq!(name.as_deref(), Some("sword"));
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["swing", "weight"]);
    }

    #[test]
    fn test_from_data() {
        let data = json!({"hp": 10, "tags": ["a"]});
        let members = Members::from_data(data.as_object().cloned().unwrap_or_default());

        assert_eq!(members.len(), 2);
        assert!(!members.get("hp").is_some_and(Member::is_method));
    }

    #[test]
    fn test_super_on_root_member_fails() {
        let class = Class::base()
            .extend(Members::new().method("greet", |frame, args| {
                assert!(!frame.has_super());
                frame.call_super(args)
            }))
            .unwrap();
        let instance = class.instantiate(&[]).unwrap();

        let err = instance.call("greet", &[]).unwrap_err();
        assert!(matches!(err, ObjectError::NoSuper(name) if name == "greet"));
    }
}
