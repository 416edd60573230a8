//! # inisettings
//!
//! A hierarchical settings store fed from INI-style config text.
//!
//! Config text is parsed into nested mappings, raw strings are coerced into
//! typed values, and successive updates are deep-merged into a live store.
//! It supports:
//!
//! - `[section]` / `key = value` config text with comments, continuation
//!   lines, `[DEFAULT]` inheritance and `%(name)s` interpolation
//! - Coercion of `none`/`true`/`false`, numeric literals (integers, floats,
//!   hex/octal/binary, complex) and `python:` expression literals
//! - A `globals` section whose keys land at the top level
//! - Recursive merging of nested sections
//! - Deserialization of the store into Rust structs
//!
//! ## Architecture Overview
//!
//! Raw config text flows through three stages before it reaches the store:
//!
//! 1. **Parsing** - [`parser`] reads sections and options as raw strings
//! 2. **Coercion** - [`coerce`] turns each raw string into a [`SettingValue`]
//! 3. **Merging** - [`merge`] folds the result into the live map
//!
//! [`SettingsManager`] owns the live map and runs the stages on each update.
//!
//! ## Quick Start
//!
//! ```rust
//! use inisettings::{SettingValue, SettingsManager, SettingsResult};
//!
//! let mut manager = SettingsManager::new(|m: &mut SettingsManager| -> SettingsResult<()> {
//!     m.set_setting("app_name", "demo");
//!     m.update_settings_from_config_str(
//!         "workers = 4\n[database]\nhost = localhost\nport = 5432\n",
//!         true,
//!         true,
//!     )
//! })
//! .unwrap();
//!
//! // Later text merges into the nested section instead of replacing it
//! manager
//!     .update_settings_from_config_str("[database]\nport = 6543\n", true, true)
//!     .unwrap();
//!
//! let database = manager.get_object("database").unwrap().unwrap();
//! assert_eq!(database["host"], SettingValue::from("localhost"));
//! assert_eq!(database["port"], SettingValue::Integer(6543));
//! assert_eq!(manager.get_i64("workers").unwrap(), Some(4));
//! ```
//!
//! ## Config Text
//!
//! ```ini
//! [globals]
//! debug = true
//! mergeSettings = false
//!
//! [server]
//! host = localhost
//! port = 0x1F90
//! tags = python:['a', 'b']
//! ```
//!
//! Options in `globals` become top-level settings. A `mergeSettings` key
//! overrides the merge mode chosen by the caller for that update.
//!
//! ## Struct Deserialization
//!
//! ```rust
//! use inisettings::{SettingsManager, SettingsResult};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug)]
//! struct ServerSettings {
//!     host: String,
//!     port: u16,
//! }
//!
//! let manager = SettingsManager::new(|m: &mut SettingsManager| -> SettingsResult<()> {
//!     m.update_settings_from_config_str("[server]\nhost = localhost\nport = 0x1F90\n", true, true)
//! })
//! .unwrap();
//!
//! let server: ServerSettings = manager.unmarshal_key("server").unwrap();
//! assert_eq!(server.port, 8080);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `SettingsResult<T>` which is an alias for
//! `Result<T, SettingsError>`:
//!
//! ```rust
//! use inisettings::{SettingsError, SettingsManager, SettingsResult};
//!
//! let manager = SettingsManager::new(|_: &mut SettingsManager| -> SettingsResult<()> { Ok(()) })
//!     .unwrap();
//! match manager.setting("nonexistent") {
//!     Ok(value) => println!("Value: {:?}", value),
//!     Err(SettingsError::KeyNotFound { key }) => println!("Key '{}' not found", key),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

pub mod coerce;
pub mod error;
pub mod expr;
pub mod literal;
pub mod manager;
pub mod merge;
pub mod parser;
pub mod value;

// Re-export main types for convenience
pub use coerce::{coerce_value, convert_string_to_number};
pub use error::{SettingsError, SettingsResult, SettingsResultExt};
pub use literal::string_is_number;
pub use manager::{SettingsInitializer, SettingsManager};
pub use merge::merge_nested_settings;
pub use parser::{
    parse_config, parse_config_str, read_settings_from_file, read_settings_from_reader,
    ConfigDocument, ParseOptions,
};
pub use value::{Complex, SettingValue, SettingsMap};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
