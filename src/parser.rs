//! INI-style config text parsing.
//!
//! The dialect:
//!
//! ```ini
//! ; comment
//! # comment
//! [DEFAULT]
//! root = /srv/app
//!
//! [server]
//! host = localhost
//! port : 8080
//! data = %(root)s/data
//! banner = first line
//!     continued line
//!
//! [globals]
//! debug = true
//! ```
//!
//! Section and option names keep their case. Options in `[DEFAULT]` are
//! inherited by every other section, and `%(name)s` references are
//! substituted from the same section or `[DEFAULT]`. Sections named
//! `globals` (in any case) are hoisted to the top level of the result.
//!
//! ## Parsing into settings
//!
//! ```rust
//! use inisettings::parser::{parse_config, ParseOptions};
//! use inisettings::SettingValue;
//!
//! let text = "[globals]\nfoo = 1\nbar = true\nbaz = none\n";
//! let settings = parse_config(text, &ParseOptions::default()).unwrap();
//!
//! assert_eq!(settings.get("foo"), Some(&SettingValue::Integer(1)));
//! assert_eq!(settings.get("bar"), Some(&SettingValue::Boolean(true)));
//! assert_eq!(settings.get("baz"), Some(&SettingValue::Null));
//! assert!(!settings.contains_key("globals"));
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use inisettings::parser::{parse_config, ParseOptions};
//! use inisettings::SettingsError;
//!
//! match parse_config("key = value", &ParseOptions::default()) {
//!     Err(SettingsError::Parse { line, message, .. }) => {
//!         println!("line {}: {}", line, message);
//!     }
//!     other => panic!("expected a parse error, got {:?}", other),
//! }
//! ```

use crate::coerce::coerce_value;
use crate::error::{SettingsError, SettingsResult, SettingsResultExt};
use crate::value::{SettingValue, SettingsMap};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Section whose options are hoisted to the top level, matched ignoring case.
pub const GLOBALS_SECTION: &str = "globals";

/// Section whose options every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Interpolation name that resolves to the current section's name. Never
/// reported as an option.
pub const NAME_OPTION: &str = "__name__";

/// Maximum nesting of `%(name)s` references.
pub const MAX_INTERPOLATION_DEPTH: usize = 10;

const STRING_SOURCE: &str = "<string>";

/// Options controlling how config text becomes settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Coerce raw strings into typed values
    pub convert: bool,
    /// Substitute `%(name)s` references
    pub interpolate: bool,
    /// Allow operators in `python:` expression literals. Only enable this for
    /// trusted config text.
    pub allow_expressions: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            convert: true,
            interpolate: true,
            allow_expressions: false,
        }
    }
}

impl ParseOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether raw values are coerced.
    pub fn with_convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    /// Sets whether `%(name)s` references are substituted.
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Sets whether expression literals may use operators.
    pub fn with_expressions(mut self, allow_expressions: bool) -> Self {
        self.allow_expressions = allow_expressions;
        self
    }
}

/// A named section and its raw options, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Returns the section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw options in document order.
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Returns the raw value of an option declared in this section.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == option)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if this section's options are hoisted to the top level.
    pub fn is_globals(&self) -> bool {
        self.name.eq_ignore_ascii_case(GLOBALS_SECTION)
    }
}

/// A parsed config document: the `DEFAULT` options plus the named sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    defaults: Section,
    sections: Vec<Section>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }
}

impl ConfigDocument {
    /// Parses config text.
    ///
    /// # Errors
    /// * `SettingsError::Parse` - missing section header, malformed line,
    ///   duplicate section or duplicate option
    pub fn parse(text: &str) -> SettingsResult<Self> {
        DocumentReader::new(STRING_SOURCE).read(text)
    }

    /// Parses config text, reporting errors against `source_name`.
    pub fn parse_named(text: &str, source_name: &str) -> SettingsResult<Self> {
        DocumentReader::new(source_name).read(text)
    }

    /// Parses a flat `key = value` block as if it were preceded by a
    /// `[globals]` header.
    pub fn parse_globals(text: &str) -> SettingsResult<Self> {
        let mut reader = DocumentReader::new(STRING_SOURCE);
        reader.open_section(GLOBALS_SECTION, 0)?;
        reader.read(text)
    }

    /// Returns the named sections in document order. `DEFAULT` is not
    /// included.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the `DEFAULT` options.
    pub fn defaults(&self) -> &[(String, String)] {
        self.defaults.options()
    }

    /// Looks up a section by exact name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Returns a section's effective options: its own followed by inherited
    /// `DEFAULT` options it does not override, with `%(name)s` references
    /// substituted when `interpolate` is set.
    ///
    /// # Errors
    /// * `SettingsError::Interpolation` - unresolved reference, bad `%`
    ///   syntax, or references nested deeper than
    ///   [`MAX_INTERPOLATION_DEPTH`]
    pub fn resolved_options(
        &self,
        section: &Section,
        interpolate: bool,
    ) -> SettingsResult<Vec<(String, String)>> {
        let own = section.options.iter();
        let inherited = self
            .defaults
            .options
            .iter()
            .filter(|(key, _)| section.get(key).is_none());

        own.chain(inherited)
            .filter(|(key, _)| key != NAME_OPTION)
            .map(|(key, raw)| -> SettingsResult<(String, String)> {
                let value = if interpolate {
                    self.interpolate(section, key, raw)?
                } else {
                    raw.clone()
                };
                Ok((key.clone(), value))
            })
            .collect()
    }

    /// Converts the document into a settings mapping.
    ///
    /// Every section becomes a nested mapping; `globals` sections are then
    /// hoisted to the top level in document order, so later ones win and
    /// hoisted keys replace sections of the same name.
    pub fn into_settings(self, options: &ParseOptions) -> SettingsResult<SettingsMap> {
        let mut settings = SettingsMap::new();
        let mut globals = Vec::new();

        for section in &self.sections {
            let mut values = SettingsMap::new();
            for (key, raw) in self.resolved_options(section, options.interpolate)? {
                let value = if options.convert {
                    coerce_value(&raw, options)?
                } else {
                    SettingValue::String(raw)
                };
                values.insert(key, value);
            }

            if section.is_globals() {
                globals.push(values);
            } else {
                settings.insert(section.name.clone(), SettingValue::Object(values));
            }
        }

        for values in globals {
            settings.extend(values);
        }

        log::trace!(
            "converted {} sections into {} top-level settings",
            self.sections.len(),
            settings.len()
        );
        Ok(settings)
    }

    fn lookup<'a>(&'a self, section: &'a Section, name: &str) -> Option<&'a str> {
        section
            .get(name)
            .or_else(|| (name == NAME_OPTION).then_some(section.name.as_str()))
            .or_else(|| self.defaults.get(name))
    }

    fn interpolate(&self, section: &Section, option: &str, raw: &str) -> SettingsResult<String> {
        let mut value = raw.to_string();
        for _ in 0..MAX_INTERPOLATION_DEPTH {
            if !value.contains("%(") {
                return Ok(value);
            }
            value = self.substitute(section, option, &value)?;
        }
        if value.contains("%(") {
            return Err(SettingsError::interpolation(
                &section.name,
                option,
                format!(
                    "references nested deeper than {MAX_INTERPOLATION_DEPTH} levels in {raw:?}"
                ),
            ));
        }
        Ok(value)
    }

    /// One formatting pass: `%%` becomes `%`, `%(name)s` is looked up.
    fn substitute(&self, section: &Section, option: &str, value: &str) -> SettingsResult<String> {
        let error = |message: String| SettingsError::interpolation(&section.name, option, message);
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            if let Some(after) = tail.strip_prefix('%') {
                out.push('%');
                rest = after;
            } else if let Some(reference) = tail.strip_prefix('(') {
                let close = reference
                    .find(')')
                    .ok_or_else(|| error(format!("unterminated reference in {value:?}")))?;
                let name = &reference[..close];
                let after = reference[close + 1..]
                    .strip_prefix('s')
                    .ok_or_else(|| error(format!("'%({name})' must be followed by 's'")))?;
                let replacement = self.lookup(section, name).ok_or_else(|| {
                    error(format!("bad interpolation variable reference '{name}'"))
                })?;
                out.push_str(replacement);
                rest = after;
            } else {
                return Err(error(format!(
                    "'%' must be followed by '%' or '(' in {value:?}"
                )));
            }
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Which section lines are currently written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Defaults,
    Section(usize),
}

struct DocumentReader<'a> {
    source_name: &'a str,
    document: ConfigDocument,
    seen: HashSet<String>,
    cursor: Option<Cursor>,
    /// Index of the last option written, for continuation lines
    last_option: Option<usize>,
}

impl<'a> DocumentReader<'a> {
    fn new(source_name: &'a str) -> Self {
        Self {
            source_name,
            document: ConfigDocument::default(),
            seen: HashSet::new(),
            cursor: None,
            last_option: None,
        }
    }

    fn error(&self, line: usize, message: impl Into<String>) -> SettingsError {
        SettingsError::parse_error(self.source_name, line, message)
    }

    fn current(&mut self) -> Option<&mut Section> {
        match self.cursor? {
            Cursor::Defaults => Some(&mut self.document.defaults),
            Cursor::Section(index) => self.document.sections.get_mut(index),
        }
    }

    fn open_section(&mut self, name: &str, line: usize) -> SettingsResult<()> {
        if !self.seen.insert(name.to_string()) {
            return Err(self.error(line, format!("section '{name}' already exists")));
        }
        self.cursor = if name == DEFAULT_SECTION {
            Some(Cursor::Defaults)
        } else {
            self.document.sections.push(Section::new(name));
            Some(Cursor::Section(self.document.sections.len() - 1))
        };
        self.last_option = None;
        Ok(())
    }

    fn read(mut self, text: &str) -> SettingsResult<ConfigDocument> {
        for (index, line) in text.lines().enumerate() {
            self.read_line(line, index + 1)?;
        }
        log::trace!(
            "parsed {} sections from {}",
            self.document.sections.len(),
            self.source_name
        );
        Ok(self.document)
    }

    fn read_line(&mut self, line: &str, line_no: usize) -> SettingsResult<()> {
        if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
            return Ok(());
        }
        if is_rem_comment(line) {
            return Ok(());
        }

        if line.starts_with(char::is_whitespace) {
            if let Some(index) = self.last_option {
                let continued = line.trim();
                if let Some(entry) = self.current().and_then(|s| s.options.get_mut(index)) {
                    if !continued.is_empty() {
                        entry.1.push('\n');
                        entry.1.push_str(continued);
                    }
                    return Ok(());
                }
            }
        }

        if let Some(name) = section_header(line) {
            return self.open_section(name, line_no);
        }

        if self.cursor.is_none() {
            return Err(self.error(
                line_no,
                format!("file contains no section headers; first line: {line:?}"),
            ));
        }

        let (key, value) = option_line(line)
            .ok_or_else(|| self.error(line_no, format!("malformed line: {line:?}")))?;

        let duplicate = self
            .current()
            .is_some_and(|section| section.get(key).is_some());
        if duplicate {
            return Err(self.error(line_no, format!("option '{key}' already exists in section")));
        }

        if let Some(section) = self.current() {
            section.options.push((key.to_string(), value));
            self.last_option = Some(section.options.len() - 1);
        }
        Ok(())
    }
}

/// `rem` lines (no leading whitespace) are comments.
fn is_rem_comment(line: &str) -> bool {
    line.starts_with(['r', 'R'])
        && line
            .split_whitespace()
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("rem"))
}

/// `[name]` at the start of the line; the rest of the line is ignored.
fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    (end > 0).then(|| &rest[..end])
}

/// `key = value` or `key : value`, split at the first separator.
fn option_line(line: &str) -> Option<(&str, String)> {
    if line.starts_with(|c: char| c.is_whitespace() || c == ':' || c == '=') {
        return None;
    }
    let sep = line.find([':', '='])?;
    let key = line[..sep].trim_end();
    let mut value = line[sep + 1..].trim_start();

    // Inline `;` comments need whitespace in front of them. A leading `;`
    // wraps around to the last character of the value.
    if let Some(pos) = value.find(';') {
        let before = match pos {
            0 => value.chars().next_back(),
            _ => value[..pos].chars().next_back(),
        };
        if before.is_some_and(char::is_whitespace) {
            value = &value[..pos];
        }
    }

    let value = value.trim();
    let value = if value == "\"\"" { "" } else { value };
    Some((key, value.to_string()))
}

/// Parses config text into settings.
pub fn parse_config(text: &str, options: &ParseOptions) -> SettingsResult<SettingsMap> {
    ConfigDocument::parse(text)?.into_settings(options)
}

/// Parses a flat `key = value` block into top-level settings.
///
/// The text is read as if it started with a `[globals]` header, so a block
/// without any section header becomes top-level settings.
pub fn parse_config_str(text: &str, options: &ParseOptions) -> SettingsResult<SettingsMap> {
    ConfigDocument::parse_globals(text)?.into_settings(options)
}

/// Reads and parses a complete config document from a reader.
pub fn read_settings_from_reader<R: Read>(
    mut reader: R,
    source_name: &str,
    options: &ParseOptions,
) -> SettingsResult<SettingsMap> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    ConfigDocument::parse_named(&text, source_name)?.into_settings(options)
}

/// Reads and parses a config file.
///
/// The file is closed before this returns, whether or not parsing succeeds.
pub fn read_settings_from_file<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> SettingsResult<SettingsMap> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path)?;
    log::debug!("reading settings from {}", source_name);
    read_settings_from_reader(file, &source_name, options).with_source_name(|| source_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Complex;

    fn parse(text: &str) -> SettingsMap {
        parse_config(text, &ParseOptions::default()).unwrap()
    }

    fn section<'a>(settings: &'a SettingsMap, name: &str) -> &'a SettingsMap {
        settings
            .get(name)
            .and_then(SettingValue::as_object)
            .unwrap_or_else(|| panic!("Expected {name} to be a section"))
    }

    #[test]
    fn test_globals_round_trip() {
        let settings = parse("[globals]\nfoo = 1\nbar = true\nbaz = none\n");

        let mut expected = SettingsMap::new();
        expected.insert("foo".to_string(), SettingValue::Integer(1));
        expected.insert("bar".to_string(), SettingValue::Boolean(true));
        expected.insert("baz".to_string(), SettingValue::Null);
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_sections() {
        let settings = parse(
            r#"
[database]
host = localhost
port = 5432
ssl_enabled = true

[logging]
level = info
file = /var/log/app.log
"#,
        );

        let database = section(&settings, "database");
        assert_eq!(database.get("host"), Some(&SettingValue::from("localhost")));
        assert_eq!(database.get("port"), Some(&SettingValue::Integer(5432)));
        assert_eq!(database.get("ssl_enabled"), Some(&SettingValue::Boolean(true)));

        let logging = section(&settings, "logging");
        assert_eq!(logging.get("file"), Some(&SettingValue::from("/var/log/app.log")));
    }

    #[test]
    fn test_names_keep_case() {
        let settings = parse("[Server]\nHostName = a\nhostname = b\n");
        let server = section(&settings, "Server");
        assert_eq!(server.get("HostName"), Some(&SettingValue::from("a")));
        assert_eq!(server.get("hostname"), Some(&SettingValue::from("b")));
        assert!(!settings.contains_key("server"));
    }

    #[test]
    fn test_colon_separator_and_split_at_first_separator() {
        let settings = parse("[s]\nurl : http://example.com\nexpr = a=b\n");
        let s = section(&settings, "s");
        assert_eq!(s.get("url"), Some(&SettingValue::from("http://example.com")));
        assert_eq!(s.get("expr"), Some(&SettingValue::from("a=b")));
    }

    #[test]
    fn test_comments() {
        let settings = parse(
            r#"
# hash comment
; semicolon comment
[section1]
rem old-style comment
key1 = value1 ; inline comment
key2 = value2;not a comment
key3 = value3 # hash is kept
"#,
        );
        let s = section(&settings, "section1");
        assert_eq!(s.len(), 3);
        assert_eq!(s.get("key1"), Some(&SettingValue::from("value1")));
        assert_eq!(s.get("key2"), Some(&SettingValue::from("value2;not a comment")));
        assert_eq!(s.get("key3"), Some(&SettingValue::from("value3 # hash is kept")));
    }

    #[test]
    fn test_leading_semicolon_in_value() {
        let settings = parse("[s]\na = ;x\nb = ;x \nc = ;\n");
        let s = section(&settings, "s");
        assert_eq!(s.get("a"), Some(&SettingValue::from(";x")));
        assert_eq!(s.get("b"), Some(&SettingValue::from("")));
        assert_eq!(s.get("c"), Some(&SettingValue::from(";")));
    }

    #[test]
    fn test_continuation_lines() {
        let settings = parse("[s]\nbanner = first\n    second\n\n\tthird\nnext = x\n");
        let s = section(&settings, "s");
        assert_eq!(
            s.get("banner"),
            Some(&SettingValue::from("first\nsecond\nthird"))
        );
        assert_eq!(s.get("next"), Some(&SettingValue::from("x")));
    }

    #[test]
    fn test_empty_values() {
        let settings = parse("[s]\nempty =\nquoted = \"\"\n");
        let s = section(&settings, "s");
        assert_eq!(s.get("empty"), Some(&SettingValue::from("")));
        assert_eq!(s.get("quoted"), Some(&SettingValue::from("")));
    }

    #[test]
    fn test_coercion_in_sections() {
        let settings = parse("[s]\nratio = 0.5\nz = 1+2j\nlist = python:[1, 'two']\nname = app\n");
        let s = section(&settings, "s");
        assert_eq!(s.get("ratio"), Some(&SettingValue::Float(0.5)));
        assert_eq!(s.get("z"), Some(&SettingValue::Complex(Complex::new(1.0, 2.0))));
        assert_eq!(
            s.get("list"),
            Some(&SettingValue::Array(vec![1i64.into(), "two".into()]))
        );
        assert_eq!(s.get("name"), Some(&SettingValue::from("app")));
    }

    #[test]
    fn test_no_conversion() {
        let options = ParseOptions::default().with_convert(false);
        let settings = parse_config("[s]\nport = 80\nflag = true\n", &options).unwrap();
        let s = section(&settings, "s");
        assert_eq!(s.get("port"), Some(&SettingValue::from("80")));
        assert_eq!(s.get("flag"), Some(&SettingValue::from("true")));
    }

    #[test]
    fn test_globals_are_hoisted_in_document_order() {
        let settings = parse("[globals]\na = 1\nb = 1\n[Globals]\nb = 2\n[other]\nc = 3\n");
        assert_eq!(settings.get("a"), Some(&SettingValue::Integer(1)));
        assert_eq!(settings.get("b"), Some(&SettingValue::Integer(2)));
        assert!(!settings.contains_key("globals"));
        assert!(!settings.contains_key("Globals"));
        assert!(settings.contains_key("other"));
    }

    #[test]
    fn test_globals_replace_section_of_same_name() {
        let settings = parse("[db]\nhost = x\n[globals]\ndb = off\n");
        assert_eq!(settings.get("db"), Some(&SettingValue::from("off")));
    }

    #[test]
    fn test_name_option_is_never_reported() {
        let settings = parse("[s]\n__name__ = custom\nkey = %(__name__)s\n");
        let s = section(&settings, "s");
        assert!(!s.contains_key(NAME_OPTION));
        assert_eq!(s.get("key"), Some(&SettingValue::from("custom")));

        let settings = parse("[s]\nkey = %(__name__)s\n");
        assert_eq!(section(&settings, "s").get("key"), Some(&SettingValue::from("s")));
    }

    #[test]
    fn test_default_section_is_inherited() {
        let settings = parse("[DEFAULT]\nretries = 3\nmode = safe\n[a]\nmode = fast\n[b]\n");
        assert!(!settings.contains_key(DEFAULT_SECTION));
        let a = section(&settings, "a");
        assert_eq!(a.get("retries"), Some(&SettingValue::Integer(3)));
        assert_eq!(a.get("mode"), Some(&SettingValue::from("fast")));
        let b = section(&settings, "b");
        assert_eq!(b.get("mode"), Some(&SettingValue::from("safe")));
    }

    #[test]
    fn test_interpolation() {
        let settings = parse(concat!(
            "[DEFAULT]\nroot = /srv\n",
            "[paths]\ndata = %(root)s/data\nlogs = %(data)s/logs\n",
            "pct = 100%%\nplain = 50%\n",
        ));
        let paths = section(&settings, "paths");
        assert_eq!(paths.get("data"), Some(&SettingValue::from("/srv/data")));
        assert_eq!(paths.get("logs"), Some(&SettingValue::from("/srv/data/logs")));
        assert_eq!(paths.get("pct"), Some(&SettingValue::from("100%%")));
        assert_eq!(paths.get("plain"), Some(&SettingValue::from("50%")));
    }

    #[test]
    fn test_interpolation_errors() {
        let err = parse_config("[s]\na = %(missing)s\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Interpolation { .. }));

        let err = parse_config("[s]\na = %(a)s\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Interpolation { .. }));

        let err = parse_config("[s]\na = %(b)d\nb = 1\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Interpolation { .. }));
    }

    #[test]
    fn test_interpolation_can_be_disabled() {
        let options = ParseOptions::default().with_interpolation(false);
        let settings = parse_config("[s]\na = %(missing)s\n", &options).unwrap();
        assert_eq!(
            section(&settings, "s").get("a"),
            Some(&SettingValue::from("%(missing)s"))
        );
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("key = value\n", 1),
            ("[unclosed\nkey = value\n", 1),
            ("[s]\njust a line\n", 2),
            ("[s]\na = 1\n[s]\n", 3),
            ("[s]\na = 1\na = 2\n", 3),
            ("[s]\n= value\n", 2),
            ("[]\n", 1),
            ("  [s]\n", 1),
        ];
        for (text, expected_line) in cases {
            match parse_config(text, &ParseOptions::default()) {
                Err(SettingsError::Parse {
                    source_name, line, ..
                }) => {
                    assert_eq!(source_name, "<string>");
                    assert_eq!(line, expected_line, "wrong line for {text:?}");
                }
                other => panic!("Expected Parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_section_header_ignores_trailing_text() {
        let settings = parse("[s] ; trailing\na = 1\n");
        assert_eq!(section(&settings, "s").get("a"), Some(&SettingValue::Integer(1)));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("").is_empty());
        assert!(parse("; only a comment\n\n").is_empty());
    }

    #[test]
    fn test_parse_config_str() {
        let options = ParseOptions::default();
        let settings = parse_config_str("foo = 1\nbar = text\n", &options).unwrap();
        assert_eq!(settings.get("foo"), Some(&SettingValue::Integer(1)));
        assert_eq!(settings.get("bar"), Some(&SettingValue::from("text")));

        let settings = parse_config_str("top = 1\n[nested]\ninner = 2\n", &options).unwrap();
        assert_eq!(settings.get("top"), Some(&SettingValue::Integer(1)));
        assert_eq!(
            section(&settings, "nested").get("inner"),
            Some(&SettingValue::Integer(2))
        );
    }

    #[test]
    fn test_parse_config_str_reports_user_line_numbers() {
        let err = parse_config_str("a = 1\nbroken\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { line: 2, .. }));

        let err = parse_config_str("[globals]\n", &ParseOptions::default()).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_coercion_errors_abort_parsing() {
        let err = parse_config("[s]\nz = ((1+2j)\n", &ParseOptions::default()).unwrap_err();
        assert!(err.is_malformed_literal());
    }

    #[test]
    fn test_document_accessors() {
        let doc =
            ConfigDocument::parse("[DEFAULT]\nx = 1\n[a]\ny = 2\n[globals]\nz = 3\n").unwrap();
        assert_eq!(doc.sections().len(), 2);
        assert_eq!(doc.defaults(), &[("x".to_string(), "1".to_string())]);
        let a = doc.section("a").unwrap();
        assert_eq!(a.get("y"), Some("2"));
        assert!(!a.is_globals());
        assert!(doc.section("globals").unwrap().is_globals());
        assert_eq!(
            doc.resolved_options(a, true).unwrap(),
            vec![
                ("y".to_string(), "2".to_string()),
                ("x".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn test_read_from_reader() {
        let text = "[globals]\nname = demo\n";
        let settings =
            read_settings_from_reader(text.as_bytes(), "memory", &ParseOptions::default()).unwrap();
        assert_eq!(settings.get("name"), Some(&SettingValue::from("demo")));

        let err = read_settings_from_reader("oops".as_bytes(), "memory", &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Parse { ref source_name, .. } if source_name == "memory"
        ));
    }
}
