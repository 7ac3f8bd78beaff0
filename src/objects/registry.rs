//! Registry of named classes
//!
//! Class names follow identifier rules:
//! - Start with an ASCII letter
//! - Then letters, digits, `_` or `-`
//! - Max 64 characters

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::class::BASE_CLASS_NAME;
use super::{Class, Members};
use crate::error::ObjectError;

/// Maximum length of a class name
pub const MAX_CLASS_NAME_LEN: usize = 64;

static CLASS_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("class name pattern"));

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid class name '{0}' (letters, digits, '_' and '-', starting with a letter)")]
    InvalidName(String),

    #[error("class name '{0}' is longer than 64 characters")]
    NameTooLong(String),

    #[error("class '{0}' is already registered")]
    Duplicate(String),

    #[error("unknown parent class '{0}'")]
    UnknownParent(String),

    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Validate a class name
pub fn validate_class_name(name: &str) -> Result<(), RegistryError> {
    if name.len() > MAX_CLASS_NAME_LEN {
        return Err(RegistryError::NameTooLong(name.to_string()));
    }
    if !CLASS_NAME_REGEX.is_match(name) {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Classes by name, seeded with the base class
#[derive(Debug)]
pub struct ClassRegistry {
    classes: HashMap<String, Class>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create a new registry holding only the base class
    pub fn new() -> Self {
        let mut classes = HashMap::new();
        classes.insert(BASE_CLASS_NAME.to_string(), Class::base());
        Self { classes }
    }

    /// Register a class under its own name
    pub fn register(&mut self, class: Class) -> Result<(), RegistryError> {
        validate_class_name(class.name())?;
        if self.classes.contains_key(class.name()) {
            return Err(RegistryError::Duplicate(class.name().to_string()));
        }
        self.classes.insert(class.name().to_string(), class);
        Ok(())
    }

    /// Derive `name` from `parent` (the base class when `None`) and register it
    pub fn define(
        &mut self,
        name: &str,
        parent: Option<&str>,
        members: Members,
    ) -> Result<Class, RegistryError> {
        validate_class_name(name)?;
        let parent_name = parent.unwrap_or(BASE_CLASS_NAME);
        let parent = self
            .classes
            .get(parent_name)
            .ok_or_else(|| RegistryError::UnknownParent(parent_name.to_string()))?;

        let class = parent.extend(members.named(name))?;
        self.register(class.clone())?;
        Ok(class)
    }

    /// Get a class by name
    pub fn get(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    /// Check if a class exists
    pub fn exists(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Get the inheritance chain for a class (empty when unknown)
    pub fn chain(&self, name: &str) -> Vec<String> {
        self.get(name).map(Class::chain).unwrap_or_default()
    }

    /// Check if a class is a descendant of another class
    pub fn is_a(&self, child: &str, ancestor: &str) -> bool {
        match (self.get(child), self.get(ancestor)) {
            (Some(child), Some(ancestor)) => child.is_a(ancestor),
            _ => false,
        }
    }

    /// Number of registered classes, the base class included
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no classes are registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
