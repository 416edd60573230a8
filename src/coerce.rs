//! Conversion of raw option strings into typed setting values.

use crate::error::SettingsResult;
use crate::expr::evaluate_expression;
use crate::literal::{evaluate_number, string_is_number};
use crate::parser::ParseOptions;
use crate::value::SettingValue;

/// Prefix marking an expression literal, matched case-insensitively.
pub const EXPRESSION_PREFIX: &str = "python:";

/// Converts numeric literal text into a number.
///
/// Fails with [`crate::SettingsError::MalformedLiteral`] when `raw` is not a
/// numeric literal.
pub fn convert_string_to_number(raw: &str) -> SettingsResult<SettingValue> {
    evaluate_number(raw)
}

/// Coerces a raw option value.
///
/// The rules run in order and each one that matches overwrites the result:
///
/// 1. `python:` prefix: the remainder is an expression literal
/// 2. `none` becomes [`SettingValue::Null`]
/// 3. `true` becomes `Boolean(true)`
/// 4. `false` becomes `Boolean(false)`
/// 5. numeric literal text becomes a number
///
/// Anything else stays a string. Keyword checks ignore case.
pub fn coerce_value(raw: &str, options: &ParseOptions) -> SettingsResult<SettingValue> {
    let mut value = SettingValue::String(raw.to_string());

    if let Some(expression) = strip_expression_prefix(raw) {
        value = evaluate_expression(expression, options.allow_expressions)?;
    }
    if raw.eq_ignore_ascii_case("none") {
        value = SettingValue::Null;
    }
    if raw.eq_ignore_ascii_case("true") {
        value = SettingValue::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        value = SettingValue::Boolean(false);
    }
    if string_is_number(raw) {
        value = convert_string_to_number(raw)?;
    }

    Ok(value)
}

fn strip_expression_prefix(raw: &str) -> Option<&str> {
    let prefix = raw.get(..EXPRESSION_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(EXPRESSION_PREFIX) {
        raw.get(EXPRESSION_PREFIX.len()..)
    } else {
        None
    }
}
