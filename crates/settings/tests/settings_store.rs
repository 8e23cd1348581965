//! Integration tests for the SettingsStore:
//! - Defaults when the file or the section is missing
//! - Partial sections merged over defaults (flat and nested)
//! - Reloading after external file modification

use std::fs;

use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsError, SettingsStore};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct Nested {
    enabled: bool,
    level: u8,
}

impl Default for Nested {
    fn default() -> Self {
        Self {
            enabled: false,
            level: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct Network {
    port: u16,
    label: String,
    nested: Nested,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            port: 100,
            label: "main".into(),
            nested: Nested::default(),
        }
    }
}

impl Settings for Network {
    const SECTION: &'static str = "network";
}

#[test]
fn missing_file_resolves_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");

    let mut store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .expect("build store");

    assert_eq!(store.load::<Network>().expect("load"), Network::default());
    assert!(!path.exists(), "building the store must not create the file");
}

#[test]
fn partial_section_is_merged_over_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("client.toml");
    fs::write(&path, "[network]\nport = 7777\n\n[network.nested]\nlevel = 5\n").unwrap();

    let mut store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .expect("build store");
    store.register::<Network>().expect("register network");

    let net = store.get::<Network>().expect("get");
    assert_eq!(net.port, 7777);
    assert_eq!(net.label, "main");
    assert!(!net.nested.enabled);
    assert_eq!(net.nested.level, 5);
}

#[test]
fn register_twice_is_rejected() {
    let mut store = SettingsStore::from_toml_str("").expect("store");
    store.register::<Network>().expect("first register");

    let err = store.register::<Network>().unwrap_err();
    assert!(matches!(err, SettingsError::AlreadyRegistered("network")));
}

#[test]
fn get_before_register_is_an_error() {
    let store = SettingsStore::from_toml_str("[network]\nport = 1").expect("store");
    assert!(matches!(
        store.get::<Network>(),
        Err(SettingsError::NotRegistered("network"))
    ));
}

#[test]
fn wrong_value_type_reports_the_section() {
    let mut store = SettingsStore::from_toml_str("[network]\nport = \"high\"").expect("store");
    let err = store.register::<Network>().unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Section {
            section: "network",
            ..
        }
    ));
}

#[test]
fn section_that_is_not_a_table_is_rejected() {
    let mut store = SettingsStore::from_toml_str("network = 3").expect("store");
    assert!(matches!(
        store.register::<Network>(),
        Err(SettingsError::NotATable("network"))
    ));
}

#[test]
fn malformed_document_fails_to_parse() {
    assert!(matches!(
        SettingsStore::from_toml_str("[network\nport ="),
        Err(SettingsError::Parse { path: None, .. })
    ));
}

#[test]
fn reload_picks_up_external_changes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("client.toml");
    fs::write(&path, "[network]\nport = 1000\n").unwrap();

    let mut store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .expect("build store");
    assert_eq!(store.load::<Network>().unwrap().port, 1000);

    fs::write(&path, "[network]\nport = 2000\nlabel = \"edited\"\n").unwrap();
    store.reload().expect("reload");

    let net = store.get::<Network>().unwrap();
    assert_eq!(net.port, 2000);
    assert_eq!(net.label, "edited");

    fs::remove_file(&path).unwrap();
    store.reload().expect("reload without file");
    assert_eq!(store.get::<Network>().unwrap(), Network::default());
}
