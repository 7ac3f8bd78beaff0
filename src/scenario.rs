//! Scenario runner
//!
//! Derives the configured classes, creates the configured instances and writes
//! their properties, recording every change event observed along the way.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ObjectError;
use crate::objects::{changed_event, ClassRegistry, Fields, Members, RegistryError};

/// Scenario errors
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("instance refers to unknown class '{0}'")]
    UnknownClass(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// A change event seen on an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub property: String,
    pub value: Value,
}

/// Summary of a derived class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub name: String,
    pub chain: Vec<String>,
    pub members: Vec<String>,
}

/// Final state of a created instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceReport {
    pub id: String,
    pub class: String,
    pub chain: Vec<String>,
    /// Class data overlaid with own fields
    pub fields: Fields,
    /// Property values read back through `get`
    pub properties: Fields,
    pub changes: Vec<Change>,
}

/// Everything the scenario produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub classes: Vec<ClassReport>,
    pub instances: Vec<InstanceReport>,
}

/// Run the scenario described by `config`
pub fn run(config: &Config) -> Result<Report, ScenarioError> {
    let mut registry = ClassRegistry::new();
    let mut report = Report::default();

    for spec in &config.classes {
        let class = registry.define(
            &spec.name,
            spec.parent.as_deref(),
            Members::from_data(spec.members.clone()),
        )?;
        report.classes.push(ClassReport {
            name: class.name().to_string(),
            chain: class.chain(),
            members: class.member_names().map(str::to_string).collect(),
        });
    }

    for spec in &config.instances {
        let class = registry
            .get(&spec.class)
            .ok_or_else(|| ScenarioError::UnknownClass(spec.class.clone()))?;
        let instance = class.create(Value::Object(spec.fields.clone()))?;
        debug!(class = %class.name(), instance = %instance.id(), "created instance");

        let changes = Rc::new(RefCell::new(Vec::new()));
        for (name, value) in &spec.properties {
            let log = changes.clone();
            let property = name.clone();
            let subscription = instance.on(&changed_event(name), move |this, args| {
                let value = args.first().cloned().unwrap_or(Value::Null);
                info!(instance = %this.id(), property = %property, %value, "property changed");
                log.borrow_mut().push(Change {
                    property: property.clone(),
                    value,
                });
                Ok(())
            });
            instance.set(name, value.clone())?;
            subscription.dismiss();
        }

        let properties = spec
            .properties
            .keys()
            .map(|name| (name.clone(), instance.get(name)))
            .collect();
        let changes = changes.borrow().clone();

        report.instances.push(InstanceReport {
            id: instance.id().to_string(),
            class: class.name().to_string(),
            chain: class.chain(),
            fields: instance.resolved_fields(),
            properties,
            changes,
        });
    }

    Ok(report)
}
