//! protoobj - prototype-style object runtime
//!
//! Classes are values derived at runtime by merging member tables. Overriding
//! methods reach the implementation they shadow through the call [`Frame`].
//! Every instance carries its own event listeners and encapsulated properties.
//!
//! ```
//! use protoobj::{Class, Members};
//! use serde_json::json;
//!
//! let animal = Class::base()
//!     .extend(Members::new().method("speak", |_, _| Ok(json!("..."))))
//!     .unwrap();
//! let dog = animal
//!     .extend(Members::new().method("speak", |frame, args| {
//!         let parent = frame.call_super(args)?;
//!         Ok(json!(format!("woof {}", parent.as_str().unwrap_or(""))))
//!     }))
//!     .unwrap();
//!
//! let rex = dog.create(json!({"name": "rex"})).unwrap();
//! assert_eq!(rex.call("speak", &[]).unwrap(), json!("woof ..."));
//! ```

pub mod config;
pub mod error;
pub mod objects;
pub mod scenario;

pub use config::Config;
pub use error::{ObjectError, Result};
pub use objects::{
    changed_event, Accessors, Class, ClassRegistry, Fields, Frame, Instance, Member, Members,
    Method, Subscription,
};
