//! Runtime configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `PROTOOBJ_`-prefixed environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::objects::Fields;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PROTOOBJ_";

/// A class to derive at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    /// Parent class name; the base class when absent
    #[serde(default)]
    pub parent: Option<String>,
    /// Data members
    #[serde(default)]
    pub members: Fields,
}

/// An instance to create at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub class: String,
    /// Own fields assigned by `create`
    #[serde(default)]
    pub fields: Fields,
    /// Properties written through `set`
    #[serde(default)]
    pub properties: Fields,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    pub classes: Vec<ClassSpec>,
    pub instances: Vec<InstanceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "protoobj=info".to_string(),
            json_logs: false,
            classes: Vec::new(),
            instances: Vec::new(),
        }
    }
}

impl Config {
    /// Build the provider stack without extracting
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration from defaults, `path` and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_filter, "protoobj=info");
        assert!(!config.json_logs);
        assert!(config.classes.is_empty());
        assert!(config.instances.is_empty());
    }

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
json_logs = true

[[classes]]
name = "item"
members = {{ weight = 1, tags = {{ kind = "gear" }} }}

[[classes]]
name = "weapon"
parent = "item"

[[instances]]
class = "weapon"
fields = {{ name = "sword" }}
properties = {{ sharpness = 3 }}
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.json_logs);
        assert_eq!(config.classes.len(), 2);
        assert_eq!(config.classes[0].members.get("weight"), Some(&json!(1)));
        assert_eq!(
            config.classes[0].members.get("tags"),
            Some(&json!({"kind": "gear"}))
        );
        assert_eq!(config.classes[1].parent.as_deref(), Some("item"));
        assert!(config.classes[1].members.is_empty());
        assert_eq!(config.instances[0].fields.get("name"), Some(&json!("sword")));
        assert_eq!(config.instances[0].properties.get("sharpness"), Some(&json!(3)));
    }
}
