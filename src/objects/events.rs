//! Per-instance publish/subscribe
//!
//! Listeners are kept per event name in registration order. Emission walks a
//! snapshot of the list taken when `emit` starts, so listeners may subscribe,
//! dismiss or clear during a pass:
//! - listeners added during a pass first fire on the next emission
//! - listeners removed during a pass are skipped if they have not fired yet
//! - every other listener fires exactly once
//!
//! No registry borrow is held while a listener runs.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::trace;

use super::instance::WeakInstance;
use super::Instance;
use crate::error::Result;

/// Event callback. Receives the owning instance and the emitted arguments.
pub type Listener = Rc<dyn Fn(&Instance, &[Value]) -> Result<()>>;

/// Identity of one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListenerId(u64);

#[derive(Clone)]
struct Registration {
    id: ListenerId,
    callback: Listener,
}

/// Event name -> ordered listeners
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    events: HashMap<String, Vec<Registration>>,
}

impl ListenerRegistry {
    fn add(&mut self, event: &str, callback: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.events
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, callback });
        id
    }

    fn remove(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(list) = self.events.get_mut(event) else {
            return false;
        };
        match list.iter().position(|r| r.id == id) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self, event: &str) {
        if let Some(list) = self.events.get_mut(event) {
            list.clear();
        }
    }

    fn contains(&self, event: &str, id: ListenerId) -> bool {
        self.events
            .get(event)
            .is_some_and(|list| list.iter().any(|r| r.id == id))
    }

    fn snapshot(&self, event: &str) -> Option<Vec<Registration>> {
        self.events.get(event).cloned()
    }

    fn count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }
}

impl Instance {
    /// Register a listener for `event`
    pub fn on<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&Instance, &[Value]) -> Result<()> + 'static,
    {
        let id = self.listeners().borrow_mut().add(event, Rc::new(callback));
        Subscription {
            owner: self.downgrade(),
            event: event.to_string(),
            id,
            dismissed: Cell::new(false),
        }
    }

    /// Invoke every listener of `event` in registration order
    ///
    /// The first listener error aborts the pass and is returned as is.
    pub fn emit(&self, event: &str, args: &[Value]) -> Result<&Self> {
        let pass = self.listeners().borrow().snapshot(event);
        let Some(pass) = pass else {
            return Ok(self);
        };
        trace!(instance = %self.id(), event, listeners = pass.len(), "emit");

        for registration in pass {
            let live = self.listeners().borrow().contains(event, registration.id);
            if live {
                (registration.callback)(self, args)?;
            }
        }
        Ok(self)
    }

    /// Drop every listener of `event`
    pub fn off(&self, event: &str) -> &Self {
        self.listeners().borrow_mut().clear(event);
        self
    }

    /// Number of listeners currently registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners().borrow().count(event)
    }
}

/// Handle to one registered listener
///
/// The handle does not keep the instance alive, so a listener may hold its own
/// subscription without leaking the instance.
pub struct Subscription {
    owner: WeakInstance,
    event: String,
    id: ListenerId,
    dismissed: Cell<bool>,
}

impl Subscription {
    /// Remove exactly this listener. Later calls, or calls after the instance
    /// is dropped, do nothing.
    pub fn dismiss(&self) {
        if self.dismissed.replace(true) {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner.listeners().borrow_mut().remove(&self.event, self.id);
        }
    }

    /// The instance the listener is registered on, `None` once it is dropped
    pub fn chain(&self) -> Option<Instance> {
        self.owner.upgrade()
    }

    /// Check if the listener is still registered
    pub fn is_active(&self) -> bool {
        if self.dismissed.get() {
            return false;
        }
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.listeners().borrow().contains(&self.event, self.id))
    }

    /// Name of the event the listener is registered for
    pub fn event(&self) -> &str {
        &self.event
    }
}
