//! Shared helpers for integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use protoobj::{Class, Instance};
use serde_json::Value;

/// A shared counter that closures can bump
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<i64>>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: i64) {
        self.0.set(self.0.get() + n);
    }

    pub fn get(&self) -> i64 {
        self.0.get()
    }
}

/// A shared, ordered log of labels
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// A plain instance of the base class
pub fn base_object() -> Instance {
    Class::base()
        .instantiate(&[])
        .expect("base class constructs")
}

/// First argument as i64, 0 when absent
pub fn arg_i64(args: &[Value]) -> i64 {
    args.first().and_then(Value::as_i64).unwrap_or_default()
}
