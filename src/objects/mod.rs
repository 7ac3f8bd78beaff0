//! Object system - prototype-style classes with events and properties

mod class;
mod events;
mod instance;
mod member;
mod property;
mod registry;

pub use class::{Class, BASE_CLASS_NAME};
pub use events::{Listener, Subscription};
pub use instance::{Fields, Instance};
pub use member::{Frame, Member, Members, Method, INIT};
pub use property::{changed_event, Accessors};
pub use registry::{validate_class_name, ClassRegistry, RegistryError, MAX_CLASS_NAME_LEN};
