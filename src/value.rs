//! Setting value types and conversion utilities.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A nested settings mapping. Keys are case-sensitive.
pub type SettingsMap = HashMap<String, SettingValue>;

/// A complex number with `f64` parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    /// Real part
    pub re: f64,
    /// Imaginary part
    pub im: f64,
}

impl Complex {
    /// Creates a complex number from its parts.
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.re == 0.0 && self.re.is_sign_positive() {
            write!(f, "{}j", self.im)
        } else if self.im < 0.0 {
            write!(f, "({}-{}j)", self.re, -self.im)
        } else {
            write!(f, "({}+{}j)", self.re, self.im)
        }
    }
}

/// Represents a setting value that can be of various types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Sequence of values (list and tuple literals)
    Array(Vec<SettingValue>),
    /// Nested settings mapping
    Object(SettingsMap),
    /// Complex number value. Serializes as `{"re": .., "im": ..}`, which
    /// deserializes back into [`SettingValue::Object`]; deserialize into
    /// [`Complex`] directly to recover it.
    Complex(Complex),
    /// `None`
    Null,
}

impl SettingValue {
    /// Returns the value as a string reference if it's a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64 if it's an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an f64 if it's a float or an integer.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the value as a complex number if it's numeric.
    pub fn as_complex(&self) -> Option<Complex> {
        match self {
            SettingValue::Complex(c) => Some(*c),
            SettingValue::Float(f) => Some(Complex::new(*f, 0.0)),
            SettingValue::Integer(i) => Some(Complex::new(*i as f64, 0.0)),
            _ => None,
        }
    }

    /// Returns the value as a bool if it's a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an array reference if it's an array.
    pub fn as_array(&self) -> Option<&Vec<SettingValue>> {
        match self {
            SettingValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the value as a mapping reference if it's an object.
    pub fn as_object(&self) -> Option<&SettingsMap> {
        match self {
            SettingValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the value as a mutable mapping if it's an object.
    pub fn as_object_mut(&mut self) -> Option<&mut SettingsMap> {
        match self {
            SettingValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Checks if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }

    /// Checks if the value is a nested mapping.
    pub fn is_object(&self) -> bool {
        matches!(self, SettingValue::Object(_))
    }

    /// Truthiness: empty strings, containers, zero and `None` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            SettingValue::String(s) => !s.is_empty(),
            SettingValue::Integer(i) => *i != 0,
            SettingValue::Float(f) => *f != 0.0,
            SettingValue::Complex(c) => c.re != 0.0 || c.im != 0.0,
            SettingValue::Boolean(b) => *b,
            SettingValue::Array(arr) => !arr.is_empty(),
            SettingValue::Object(obj) => !obj.is_empty(),
            SettingValue::Null => false,
        }
    }

    /// Coerces the value to a boolean representation.
    ///
    /// Strings are read as boolean words (`true`, `no`, `off`, ...) and
    /// return `None` when they are not one; other variants use
    /// [`SettingValue::is_truthy`].
    pub fn coerce_to_bool(&self) -> Option<bool> {
        match self {
            SettingValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
                "false" | "0" | "no" | "off" | "f" | "n" | "none" | "" => Some(false),
                _ => None,
            },
            other => Some(other.is_truthy()),
        }
    }

    /// Coerces the value to a string representation.
    pub fn coerce_to_string(&self) -> String {
        match self {
            SettingValue::String(s) => s.clone(),
            SettingValue::Integer(i) => i.to_string(),
            SettingValue::Float(f) => f.to_string(),
            SettingValue::Complex(c) => c.to_string(),
            SettingValue::Boolean(true) => "True".to_string(),
            SettingValue::Boolean(false) => "False".to_string(),
            SettingValue::Array(_) => "[array]".to_string(),
            SettingValue::Object(_) => "[object]".to_string(),
            SettingValue::Null => "None".to_string(),
        }
    }

    /// Returns the type name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::String(_) => "String",
            SettingValue::Integer(_) => "Integer",
            SettingValue::Float(_) => "Float",
            SettingValue::Complex(_) => "Complex",
            SettingValue::Boolean(_) => "Boolean",
            SettingValue::Array(_) => "Array",
            SettingValue::Object(_) => "Object",
            SettingValue::Null => "Null",
        }
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        SettingValue::Integer(i)
    }
}

impl From<i32> for SettingValue {
    fn from(i: i32) -> Self {
        SettingValue::Integer(i as i64)
    }
}

impl From<f64> for SettingValue {
    fn from(f: f64) -> Self {
        SettingValue::Float(f)
    }
}

impl From<Complex> for SettingValue {
    fn from(c: Complex) -> Self {
        SettingValue::Complex(c)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Boolean(b)
    }
}

impl From<Vec<SettingValue>> for SettingValue {
    fn from(arr: Vec<SettingValue>) -> Self {
        SettingValue::Array(arr)
    }
}

impl From<SettingsMap> for SettingValue {
    fn from(obj: SettingsMap) -> Self {
        SettingValue::Object(obj)
    }
}

/// Error type for SettingValue conversion failures
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    pub from_type: String,
    pub to_type: String,
    pub value: String,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot convert {} value '{}' to {}",
            self.from_type, self.value, self.to_type
        )
    }
}

impl std::error::Error for ConversionError {}

impl ConversionError {
    fn new(value: &SettingValue, to_type: &str) -> Self {
        Self {
            from_type: value.type_name().to_string(),
            to_type: to_type.to_string(),
            value: value.coerce_to_string(),
        }
    }
}

impl TryFrom<SettingValue> for String {
    type Error = ConversionError;

    fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
        match value {
            SettingValue::String(s) => Ok(s),
            _ => Err(ConversionError::new(&value, "String")),
        }
    }
}

impl TryFrom<SettingValue> for i64 {
    type Error = ConversionError;

    fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
        match value {
            SettingValue::Integer(i) => Ok(i),
            _ => Err(ConversionError::new(&value, "i64")),
        }
    }
}

impl TryFrom<SettingValue> for f64 {
    type Error = ConversionError;

    fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
        value
            .as_f64()
            .ok_or_else(|| ConversionError::new(&value, "f64"))
    }
}

impl TryFrom<SettingValue> for bool {
    type Error = ConversionError;

    fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
        match value {
            SettingValue::Boolean(b) => Ok(b),
            _ => Err(ConversionError::new(&value, "bool")),
        }
    }
}

impl TryFrom<SettingValue> for SettingsMap {
    type Error = ConversionError;

    fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
        match value {
            SettingValue::Object(obj) => Ok(obj),
            _ => Err(ConversionError::new(&value, "SettingsMap")),
        }
    }
}
