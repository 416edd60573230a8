//! Integration tests for struct deserialization functionality

use inisettings::{Complex, SettingValue, SettingsError, SettingsManager, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct DatabaseConfig {
    host: String,
    port: u16,
    #[serde(default)]
    ssl: bool,
    #[serde(default = "default_timeout")]
    timeout: u32,
    password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct AppConfig {
    name: String,
    version: String,
    #[serde(default)]
    debug: bool,
    database: DatabaseConfig,
    servers: Vec<String>,
    #[serde(default)]
    features: HashMap<String, bool>,
}

fn default_timeout() -> u32 {
    30
}

fn manager_from(text: &'static str) -> SettingsManager {
    SettingsManager::new(move |m: &mut SettingsManager| -> SettingsResult<()> {
        m.update_settings_from_config_str(text, true, true)
    })
    .expect("Failed to load settings")
}

#[test]
fn test_complete_struct_deserialization() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("app.ini");
    fs::write(
        &config_path,
        r#"
[globals]
name = test-app
version = 1.0.0
debug = true
servers = python:['web1', 'web2']

[database]
host = localhost
port = 5432
ssl = true
password = none

[features]
auth = true
metrics = false
"#,
    )
    .expect("Failed to write config file");

    let manager = SettingsManager::new(|m: &mut SettingsManager| -> SettingsResult<()> {
        m.update_settings_from_config_file(&config_path, true, true)
    })
    .unwrap();

    let config: AppConfig = manager.unmarshal().unwrap();

    assert_eq!(config.name, "test-app");
    assert_eq!(config.version, "1.0.0");
    assert!(config.debug);
    assert_eq!(config.servers, vec!["web1".to_string(), "web2".to_string()]);
    assert_eq!(
        config.database,
        DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            ssl: true,
            timeout: 30,
            password: None,
        }
    );
    assert_eq!(config.features.get("auth"), Some(&true));
    assert_eq!(config.features.get("metrics"), Some(&false));
}

#[test]
fn test_unmarshal_key_with_defaults() {
    let manager = manager_from("[database]\nhost = db.internal\nport = 6543\n");

    let database: DatabaseConfig = manager.unmarshal_key("database").unwrap();
    assert_eq!(database.host, "db.internal");
    assert_eq!(database.port, 6543);
    assert!(!database.ssl);
    assert_eq!(database.timeout, 30);
    assert_eq!(database.password, None);
}

#[test]
fn test_unmarshal_scalar_key() {
    let manager = manager_from("retries = 5\nratio = 0.75\n");

    let retries: u8 = manager.unmarshal_key("retries").unwrap();
    let ratio: f64 = manager.unmarshal_key("ratio").unwrap();
    assert_eq!(retries, 5);
    assert_eq!(ratio, 0.75);
}

#[test]
fn test_unmarshal_complex_value() {
    let manager = manager_from("impedance = 50+10j\n");

    assert_eq!(
        manager.setting("impedance").unwrap(),
        &SettingValue::Complex(Complex::new(50.0, 10.0))
    );
    let value: Complex = manager.unmarshal_key("impedance").unwrap();
    assert_eq!(value, Complex::new(50.0, 10.0));
}

#[test]
fn test_unmarshal_after_merge() {
    let mut manager = manager_from("[database]\nhost = localhost\nport = 5432\n");
    manager
        .update_settings_from_config_str("[database]\nssl = true\ntimeout = 5\n", true, true)
        .unwrap();

    let database: DatabaseConfig = manager.unmarshal_key("database").unwrap();
    assert_eq!(database.host, "localhost");
    assert!(database.ssl);
    assert_eq!(database.timeout, 5);
}

#[test]
fn test_unmarshal_missing_required_field() {
    let manager = manager_from("[database]\nhost = localhost\n");

    match manager.unmarshal_key::<DatabaseConfig>("database") {
        Err(SettingsError::Deserialization(message)) => {
            assert!(message.contains("database"), "unexpected message: {message}");
        }
        other => panic!("Expected Deserialization error, got {other:?}"),
    }
}

#[test]
fn test_unmarshal_wrong_type() {
    let manager = manager_from("[database]\nhost = localhost\nport = 70000\n");

    let err = manager.unmarshal_key::<DatabaseConfig>("database").unwrap_err();
    assert!(matches!(err, SettingsError::Deserialization(_)));
}

#[test]
fn test_unmarshal_missing_key() {
    let manager = manager_from("name = app\n");

    let err = manager.unmarshal_key::<DatabaseConfig>("database").unwrap_err();
    assert!(err.is_key_not_found());
}

#[test]
fn test_unconverted_values_stay_strings() {
    let manager = SettingsManager::new(|m: &mut SettingsManager| -> SettingsResult<()> {
        m.update_settings_from_config_str("[database]\nhost = h\nport = 1\n", false, true)
    })
    .unwrap();

    let err = manager.unmarshal_key::<DatabaseConfig>("database").unwrap_err();
    assert!(matches!(err, SettingsError::Deserialization(_)));

    let raw: HashMap<String, String> = manager.unmarshal_key("database").unwrap();
    assert_eq!(raw.get("port"), Some(&"1".to_string()));
}
