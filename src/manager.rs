//! The settings store and its initialization hook.

use crate::error::{SettingsError, SettingsResult};
use crate::merge::merge_nested_settings;
use crate::parser::{
    parse_config_str, read_settings_from_file, read_settings_from_reader, ParseOptions,
};
use crate::value::{SettingValue, SettingsMap};
use std::io::Read;
use std::path::Path;

/// Key inside ingested config text that overrides the caller's merge mode.
pub const MERGE_SETTINGS_KEY: &str = "mergeSettings";

const READER_SOURCE: &str = "<reader>";

/// Seeds a freshly constructed [`SettingsManager`].
///
/// Every manager is built through an initializer, so a store can never be
/// used before its owner has populated it. Closures taking
/// `&mut SettingsManager` implement this trait.
///
/// # Example
/// ```
/// use inisettings::{SettingsInitializer, SettingsManager, SettingsResult};
///
/// struct AppDefaults;
///
/// impl SettingsInitializer for AppDefaults {
///     fn initialize_settings(&self, manager: &mut SettingsManager) -> SettingsResult<()> {
///         manager.set_setting("workers", 4i64);
///         manager.update_settings_from_config_str("[db]\nhost = localhost\n", true, true)
///     }
/// }
///
/// let manager = SettingsManager::new(AppDefaults).unwrap();
/// assert_eq!(manager.get_i64("workers").unwrap(), Some(4));
/// assert!(manager.contains("db"));
/// ```
pub trait SettingsInitializer {
    /// Populates `manager`. An error aborts construction.
    fn initialize_settings(&self, manager: &mut SettingsManager) -> SettingsResult<()>;
}

impl<F> SettingsInitializer for F
where
    F: Fn(&mut SettingsManager) -> SettingsResult<()>,
{
    fn initialize_settings(&self, manager: &mut SettingsManager) -> SettingsResult<()> {
        self(manager)
    }
}

/// A mapping of named settings, updatable from config text.
///
/// Values are read and written at the top level; nested sections are
/// [`SettingValue::Object`] values. Ingestion parses completely before it
/// touches the live map, so a failed update leaves the store unchanged.
///
/// # Example
/// ```
/// use inisettings::{SettingValue, SettingsManager, SettingsResult};
///
/// let mut manager = SettingsManager::new(|m: &mut SettingsManager| -> SettingsResult<()> {
///     m.update_settings_from_config_str("debug = false\n[server]\nport = 80\n", true, true)
/// })
/// .unwrap();
///
/// manager
///     .update_settings_from_config_str("debug = true\n[server]\nhost = example.com\n", true, true)
///     .unwrap();
///
/// assert_eq!(manager.setting("debug").unwrap(), &SettingValue::Boolean(true));
/// let server = manager.get_object("server").unwrap().unwrap();
/// assert_eq!(server.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsManager {
    settings: SettingsMap,
    options: ParseOptions,
}

impl SettingsManager {
    /// Creates a store with default parse options and runs `initializer`.
    ///
    /// # Errors
    /// Whatever the initializer returns.
    pub fn new<I: SettingsInitializer>(initializer: I) -> SettingsResult<Self> {
        Self::with_options(ParseOptions::default(), initializer)
    }

    /// Creates a store that parses config text with `options`, then runs
    /// `initializer`.
    ///
    /// The `convert` flag passed to each ingestion call replaces
    /// `options.convert`; the other options apply as given.
    pub fn with_options<I: SettingsInitializer>(
        options: ParseOptions,
        initializer: I,
    ) -> SettingsResult<Self> {
        let mut manager = Self {
            settings: SettingsMap::new(),
            options,
        };
        initializer.initialize_settings(&mut manager)?;
        log::trace!("initialized settings store with {} keys", manager.settings.len());
        Ok(manager)
    }

    /// Returns the parse options used for ingestion.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Returns the value stored under `name`.
    ///
    /// # Errors
    /// * `SettingsError::KeyNotFound` - nothing is stored under `name`
    pub fn setting(&self, name: &str) -> SettingsResult<&SettingValue> {
        self.settings
            .get(name)
            .ok_or_else(|| SettingsError::key_not_found(name))
    }

    /// Returns the value stored under `name`, or `default` when absent.
    pub fn setting_or(&self, name: &str, default: impl Into<SettingValue>) -> SettingValue {
        self.settings
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Stores `value` under the top-level key `name`.
    pub fn set_setting(&mut self, name: impl Into<String>, value: impl Into<SettingValue>) {
        self.settings.insert(name.into(), value.into());
    }

    /// Returns true if something is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.settings.contains_key(name)
    }

    /// Returns the live settings map.
    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    /// Returns the live settings map for in-place edits.
    pub fn settings_mut(&mut self) -> &mut SettingsMap {
        &mut self.settings
    }

    /// Applies `new` to the store.
    ///
    /// With `merge`, nested objects are merged recursively; otherwise each
    /// key in `new` replaces the stored top-level value.
    pub fn update_settings(&mut self, new: SettingsMap, merge: bool) {
        log::debug!(
            "updating {} settings ({})",
            new.len(),
            if merge { "nested merge" } else { "replace" }
        );
        if merge {
            merge_nested_settings(&mut self.settings, new);
        } else {
            self.settings.extend(new);
        }
    }

    /// Parses a flat `key = value` block and applies it.
    ///
    /// A `mergeSettings` key in the text overrides `merge`. The key itself is
    /// stored like any other setting.
    pub fn update_settings_from_config_str(
        &mut self,
        text: &str,
        convert: bool,
        merge: bool,
    ) -> SettingsResult<()> {
        let new = parse_config_str(text, &self.ingest_options(convert))?;
        self.apply_ingested(new, merge);
        Ok(())
    }

    /// Reads a config file and applies it. Flat keys need a `[globals]`
    /// section.
    pub fn update_settings_from_config_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        convert: bool,
        merge: bool,
    ) -> SettingsResult<()> {
        let new = read_settings_from_file(path, &self.ingest_options(convert))?;
        self.apply_ingested(new, merge);
        Ok(())
    }

    /// Reads a config document from `reader` and applies it.
    pub fn update_settings_from_reader<R: Read>(
        &mut self,
        reader: R,
        convert: bool,
        merge: bool,
    ) -> SettingsResult<()> {
        let new = read_settings_from_reader(reader, READER_SOURCE, &self.ingest_options(convert))?;
        self.apply_ingested(new, merge);
        Ok(())
    }

    fn ingest_options(&self, convert: bool) -> ParseOptions {
        self.options.with_convert(convert)
    }

    fn apply_ingested(&mut self, new: SettingsMap, merge: bool) {
        let merge = merge_mode(&new, merge);
        self.update_settings(new, merge);
    }

    /// Gets a setting as a string.
    pub fn get_string(&self, name: &str) -> SettingsResult<Option<String>> {
        Ok(self.settings.get(name).map(SettingValue::coerce_to_string))
    }

    /// Gets a setting as an integer.
    pub fn get_i64(&self, name: &str) -> SettingsResult<Option<i64>> {
        self.typed(name, "integer", SettingValue::as_i64)
    }

    /// Gets a setting as a float. Integers widen.
    pub fn get_f64(&self, name: &str) -> SettingsResult<Option<f64>> {
        self.typed(name, "float", SettingValue::as_f64)
    }

    /// Gets a setting as a boolean, reading boolean words in strings.
    pub fn get_bool(&self, name: &str) -> SettingsResult<Option<bool>> {
        self.typed(name, "boolean", SettingValue::coerce_to_bool)
    }

    /// Gets a nested section.
    pub fn get_object(&self, name: &str) -> SettingsResult<Option<SettingsMap>> {
        self.typed(name, "object", |value| value.as_object().cloned())
    }

    fn typed<T, F>(&self, name: &str, expected: &str, convert: F) -> SettingsResult<Option<T>>
    where
        F: Fn(&SettingValue) -> Option<T>,
    {
        match self.settings.get(name) {
            Some(value) => match convert(value) {
                Some(converted) => Ok(Some(converted)),
                None => Err(SettingsError::type_conversion(
                    name,
                    expected,
                    value.type_name(),
                )),
            },
            None => Ok(None),
        }
    }

    /// Deserializes the whole store into `T`.
    ///
    /// # Example
    /// ```
    /// use inisettings::{SettingsManager, SettingsResult};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Server {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// #[derive(Deserialize)]
    /// struct AppSettings {
    ///     debug: bool,
    ///     server: Server,
    /// }
    ///
    /// let manager = SettingsManager::new(|m: &mut SettingsManager| -> SettingsResult<()> {
    ///     m.update_settings_from_config_str(
    ///         "debug = true\n[server]\nhost = localhost\nport = 8080\n",
    ///         true,
    ///         true,
    ///     )
    /// })
    /// .unwrap();
    ///
    /// let settings: AppSettings = manager.unmarshal().unwrap();
    /// assert!(settings.debug);
    /// assert_eq!(settings.server.port, 8080);
    /// ```
    pub fn unmarshal<T>(&self) -> SettingsResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = serde_json::to_value(&self.settings)?;
        serde_json::from_value(value).map_err(|e| {
            SettingsError::deserialization(format!("Failed to unmarshal settings: {e}"))
        })
    }

    /// Deserializes the setting stored under `name` into `T`.
    ///
    /// # Errors
    /// * `SettingsError::KeyNotFound` - nothing is stored under `name`
    /// * `SettingsError::Deserialization` - the value does not fit `T`
    pub fn unmarshal_key<T>(&self, name: &str) -> SettingsResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = serde_json::to_value(self.setting(name)?)?;
        serde_json::from_value(value).map_err(|e| {
            SettingsError::deserialization(format!("Failed to unmarshal key '{name}': {e}"))
        })
    }
}

/// Merge mode for an ingested mapping: the truthiness of its
/// `mergeSettings` value when present, the caller's choice otherwise.
///
/// Any non-empty string is truthy, so an unconverted `False` still merges.
fn merge_mode(new: &SettingsMap, merge: bool) -> bool {
    match new.get(MERGE_SETTINGS_KEY) {
        Some(flag) => {
            let flag = flag.is_truthy();
            log::debug!("{} = {} overrides merge mode", MERGE_SETTINGS_KEY, flag);
            flag
        }
        None => merge,
    }
}
