//! Scenario runner and CLI tests against the bundled example scenario

mod common;

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use protoobj::config::Config;
use protoobj::scenario::{self, Change, Report};
use serde_json::json;

fn armory_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/armory.toml")
}

#[test]
fn test_armory_scenario() {
    let config = Config::load(Some(armory_path().as_path())).unwrap();
    assert_eq!(config.log_filter, "protoobj=debug");

    let report = scenario::run(&config).unwrap();
    assert_eq!(report.classes.len(), 3);
    assert_eq!(report.classes[2].chain, vec!["sword", "weapon", "item", "Object"]);

    let sword = &report.instances[0];
    assert_eq!(sword.class, "sword");
    assert_eq!(sword.fields.get("name"), Some(&json!("longsword")));
    assert_eq!(sword.fields.get("weight"), Some(&json!(3)));
    assert_eq!(sword.fields.get("value"), Some(&json!(0)));
    assert_eq!(sword.fields.get("damage"), Some(&json!("1d8")));
    assert_eq!(
        sword.fields.get("stats"),
        Some(&json!({"durability": 10, "reach": 1}))
    );
    assert_eq!(sword.properties.get("sharpness"), Some(&json!(7)));
    assert_eq!(
        sword.changes,
        vec![
            Change {
                property: "owner".into(),
                value: json!("ada"),
            },
            Change {
                property: "sharpness".into(),
                value: json!(7),
            },
        ]
    );

    let rope = &report.instances[1];
    assert_eq!(rope.chain, vec!["item", "Object"]);
    assert!(rope.properties.is_empty());
    assert!(rope.changes.is_empty());
    assert_ne!(rope.id, sword.id);
}

#[test]
fn test_cli_prints_report() {
    let output = Command::new(env!("CARGO_BIN_EXE_protoobj"))
        .arg("--config")
        .arg(armory_path())
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Report = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report.instances.len(), 2);
    assert_eq!(report.instances[0].class, "sword");
}

#[test]
fn test_cli_missing_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_protoobj"))
        .arg("--config")
        .arg("/definitely/not/here.toml")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Config file not found"));
}

#[test]
fn test_cli_reports_bad_scenario() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[[instances]]\nclass = \"ghost\"").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_protoobj"))
        .arg("--config")
        .arg(file.path())
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown class 'ghost'"));
}
