//! Error types and utilities for settings management.

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Error types for parsing, coercing and looking up settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The INI grammar was violated
    #[error("Parse error in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// A `%(name)s` reference could not be resolved
    #[error("Interpolation error in [{section}] {option}: {message}")]
    Interpolation {
        section: String,
        option: String,
        message: String,
    },

    /// Text that had to be numeric was not
    #[error("{literal} cannot be converted to a number")]
    MalformedLiteral { literal: String },

    /// An expression literal could not be parsed or evaluated
    #[error("Invalid expression '{expression}': {message}")]
    Expression { expression: String, message: String },

    /// An expression literal used operators while expressions are disabled
    #[error("Expression '{expression}' requires expression evaluation, which is disabled")]
    ExpressionsDisabled { expression: String },

    /// Requested setting was not found
    #[error("Setting not found: {key}")]
    KeyNotFound { key: String },

    /// Setting exists but holds a different type
    #[error("Type conversion error for {key}: expected {expected}, found {found}")]
    TypeConversion {
        key: String,
        expected: String,
        found: String,
    },

    /// Deserialization into a user type failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The settings initializer refused to populate the store
    #[error("Settings initialization failed: {0}")]
    Initialization(String),
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Deserialization(err.to_string())
    }
}

impl SettingsError {
    /// Creates a new parse error with context.
    pub fn parse_error(
        source_name: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a new interpolation error.
    pub fn interpolation(
        section: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Interpolation {
            section: section.into(),
            option: option.into(),
            message: message.into(),
        }
    }

    /// Creates a new malformed literal error.
    pub fn malformed_literal(literal: impl Into<String>) -> Self {
        Self::MalformedLiteral {
            literal: literal.into(),
        }
    }

    /// Creates a new expression error.
    pub fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Creates a new type conversion error.
    pub fn type_conversion(
        key: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeConversion {
            key: key.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a new key not found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Creates a new deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Creates a new initialization error.
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization(message.into())
    }

    /// Returns true if this error is related to a missing key.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, SettingsError::KeyNotFound { .. })
    }

    /// Returns true if this error is related to parsing.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, SettingsError::Parse { .. })
    }

    /// Returns true if this error came from a non-numeric literal.
    pub fn is_malformed_literal(&self) -> bool {
        matches!(self, SettingsError::MalformedLiteral { .. })
    }

    /// Returns true if this error is related to IO operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, SettingsError::Io(_))
    }
}

/// Extension trait for adding context to Results.
pub trait SettingsResultExt<T> {
    /// Replaces the source name of a parse error. Other errors pass through.
    fn with_source_name<F>(self, f: F) -> SettingsResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> SettingsResultExt<T> for SettingsResult<T> {
    fn with_source_name<F>(self, f: F) -> SettingsResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| match err {
            SettingsError::Parse { line, message, .. } => SettingsError::Parse {
                source_name: f(),
                line,
                message,
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error = SettingsError::key_not_found("database");
        assert_eq!(error.to_string(), "Setting not found: database");

        let error = SettingsError::malformed_literal("abc");
        assert_eq!(error.to_string(), "abc cannot be converted to a number");

        let error = SettingsError::parse_error("<string>", 3, "missing section header");
        assert_eq!(
            error.to_string(),
            "Parse error in <string> at line 3: missing section header"
        );

        let error = SettingsError::type_conversion("port", "Integer", "String");
        assert_eq!(
            error.to_string(),
            "Type conversion error for port: expected Integer, found String"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_error: SettingsError = io_error.into();
        assert!(settings_error.is_io_error());
    }

    #[test]
    fn test_error_type_checking() {
        let key_error = SettingsError::key_not_found("test");
        assert!(key_error.is_key_not_found());
        assert!(!key_error.is_parse_error());
        assert!(!key_error.is_malformed_literal());

        let literal_error = SettingsError::malformed_literal("x1");
        assert!(literal_error.is_malformed_literal());
        assert!(!literal_error.is_io_error());

        let parse_error = SettingsError::parse_error("settings.ini", 1, "bad line");
        assert!(parse_error.is_parse_error());
    }

    #[test]
    fn test_with_source_name() {
        let result: SettingsResult<()> = Err(SettingsError::parse_error("<string>", 4, "bad"));
        match result.with_source_name(|| "app.ini".to_string()) {
            Err(SettingsError::Parse {
                source_name,
                line,
                message,
            }) => {
                assert_eq!(source_name, "app.ini");
                assert_eq!(line, 4);
                assert_eq!(message, "bad");
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }

        let result: SettingsResult<()> = Err(SettingsError::key_not_found("a"));
        assert!(result
            .with_source_name(|| "ignored".to_string())
            .unwrap_err()
            .is_key_not_found());
    }
}
