//! Numeric literal detection and evaluation.
//!
//! The accepted grammar is the classic numeric token grammar:
//!
//! - integers: decimal (`42`), hex (`0x2A`), binary (`0b101`), octal (`0o52`)
//!   and leading-zero octal (`052`), with an optional `L` long suffix on all
//!   but the `0o` form
//! - floats: `1.5`, `1.`, `.5`, `1e10`, `1.5E-3`
//! - imaginary numbers: any of the above decimal forms followed by `j`/`J`
//!
//! plus a composite complex form `(re + im)` where the parentheses are
//! optional and the `+` is mandatory. A single leading sign is allowed in
//! front of either form.
//!
//! Alternatives are tried in a fixed order (imaginary, float, then the
//! integer forms) and the first one that matches is used, so `09` is not a
//! number: the octal form claims the leading `0` and the rest is left over.

use crate::error::{SettingsError, SettingsResult};
use crate::value::{Complex, SettingValue};

/// An evaluated numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
    Complex(Complex),
}

impl Number {
    fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
            Number::Complex(c) => c.re,
        }
    }

    fn to_complex(self) -> Complex {
        match self {
            Number::Complex(c) => c,
            other => Complex::new(other.to_f64(), 0.0),
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
            Number::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    fn is_complex(self) -> bool {
        matches!(self, Number::Complex(_))
    }

    pub(crate) fn neg(self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map_or(Number::Float(-(i as f64)), Number::Int),
            Number::Float(f) => Number::Float(-f),
            Number::Complex(c) => Number::Complex(Complex::new(-c.re, -c.im)),
        }
    }

    pub(crate) fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map_or(Number::Float(a as f64 + b as f64), Number::Int),
            (a, b) if a.is_complex() || b.is_complex() => {
                let (x, y) = (a.to_complex(), b.to_complex());
                Number::Complex(Complex::new(x.re + y.re, x.im + y.im))
            }
            (a, b) => Number::Float(a.to_f64() + b.to_f64()),
        }
    }

    pub(crate) fn sub(self, other: Number) -> Number {
        self.add(other.neg())
    }

    pub(crate) fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map_or(Number::Float(a as f64 * b as f64), Number::Int),
            (a, b) if a.is_complex() || b.is_complex() => {
                Number::Complex(complex_mul(a.to_complex(), b.to_complex()))
            }
            (a, b) => Number::Float(a.to_f64() * b.to_f64()),
        }
    }

    /// True division; integers divide to a float.
    pub(crate) fn div(self, other: Number) -> Result<Number, &'static str> {
        if other.is_zero() {
            return Err("division by zero");
        }
        if self.is_complex() || other.is_complex() {
            let (x, y) = (self.to_complex(), other.to_complex());
            let denom = y.re * y.re + y.im * y.im;
            return Ok(Number::Complex(Complex::new(
                (x.re * y.re + x.im * y.im) / denom,
                (x.im * y.re - x.re * y.im) / denom,
            )));
        }
        Ok(Number::Float(self.to_f64() / other.to_f64()))
    }

    /// Division rounding toward negative infinity.
    pub(crate) fn floor_div(self, other: Number) -> Result<Number, &'static str> {
        if self.is_complex() || other.is_complex() {
            return Err("can't take floor of complex number");
        }
        if other.is_zero() {
            return Err("integer division or modulo by zero");
        }
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_div(b) {
                Some(q) if a % b != 0 && ((a < 0) != (b < 0)) => Ok(Number::Int(q - 1)),
                Some(q) => Ok(Number::Int(q)),
                None => Ok(Number::Float((a as f64 / b as f64).floor())),
            },
            (a, b) => Ok(Number::Float((a.to_f64() / b.to_f64()).floor())),
        }
    }

    /// Remainder taking the sign of the divisor.
    pub(crate) fn rem(self, other: Number) -> Result<Number, &'static str> {
        if self.is_complex() || other.is_complex() {
            return Err("can't mod complex numbers");
        }
        if other.is_zero() {
            return Err("integer division or modulo by zero");
        }
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => {
                let r = a.checked_rem(b).unwrap_or(0);
                if r != 0 && ((r < 0) != (b < 0)) {
                    Ok(Number::Int(r + b))
                } else {
                    Ok(Number::Int(r))
                }
            }
            (a, b) => {
                let (x, y) = (a.to_f64(), b.to_f64());
                let r = x % y;
                if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
                    Ok(Number::Float(r + y))
                } else {
                    Ok(Number::Float(r))
                }
            }
        }
    }

    pub(crate) fn pow(self, other: Number) -> Result<Number, &'static str> {
        if self.is_zero() && !other.is_complex() && other.to_f64() < 0.0 {
            return Err("zero cannot be raised to a negative power");
        }
        match (self, other) {
            (Number::Int(a), Number::Int(b)) if b >= 0 => {
                let exact = u32::try_from(b).ok().and_then(|e| a.checked_pow(e));
                Ok(exact.map_or(Number::Float((a as f64).powf(b as f64)), Number::Int))
            }
            (a, b) if a.is_complex() || b.is_complex() => {
                Ok(Number::Complex(complex_pow(a.to_complex(), b.to_complex())))
            }
            (a, b) => {
                let (x, y) = (a.to_f64(), b.to_f64());
                if x < 0.0 && y.fract() != 0.0 {
                    Ok(Number::Complex(complex_pow(
                        Complex::new(x, 0.0),
                        Complex::new(y, 0.0),
                    )))
                } else {
                    Ok(Number::Float(x.powf(y)))
                }
            }
        }
    }

    pub(crate) fn into_value(self) -> SettingValue {
        match self {
            Number::Int(i) => SettingValue::Integer(i),
            Number::Float(f) => SettingValue::Float(f),
            Number::Complex(c) => SettingValue::Complex(c),
        }
    }

    /// Converts a numeric setting value back into a number.
    /// Booleans count as `0`/`1`.
    pub(crate) fn from_value(value: &SettingValue) -> Option<Number> {
        match value {
            SettingValue::Integer(i) => Some(Number::Int(*i)),
            SettingValue::Float(f) => Some(Number::Float(*f)),
            SettingValue::Complex(c) => Some(Number::Complex(*c)),
            SettingValue::Boolean(b) => Some(Number::Int(i64::from(*b))),
            _ => None,
        }
    }
}

fn complex_mul(x: Complex, y: Complex) -> Complex {
    Complex::new(x.re * y.re - x.im * y.im, x.re * y.im + x.im * y.re)
}

fn complex_pow(base: Complex, exponent: Complex) -> Complex {
    if base.re == 0.0 && base.im == 0.0 {
        return Complex::new(0.0, 0.0);
    }
    let modulus = base.re.hypot(base.im);
    let arg = base.im.atan2(base.re);
    let ln_re = modulus.ln();
    // exp(exponent * ln(base))
    let re = exponent.re * ln_re - exponent.im * arg;
    let im = exponent.re * arg + exponent.im * ln_re;
    let scale = re.exp();
    Complex::new(scale * im.cos(), scale * im.sin())
}

fn scan_while(bytes: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut end = start;
    while end < bytes.len() && pred(bytes[end]) {
        end += 1;
    }
    end
}

fn byte_in(bytes: &[u8], index: usize, set: &[u8]) -> bool {
    bytes.get(index).is_some_and(|b| set.contains(b))
}

fn scan_exponent(bytes: &[u8], start: usize) -> Option<usize> {
    if !byte_in(bytes, start, b"eE") {
        return None;
    }
    let mut pos = start + 1;
    if byte_in(bytes, pos, b"+-") {
        pos += 1;
    }
    let end = scan_while(bytes, pos, |b| b.is_ascii_digit());
    (end > pos).then_some(end)
}

/// Point floats (`1.`, `1.5`, `.5`, each with an optional exponent) and
/// exponent floats (`1e5`).
fn scan_float(bytes: &[u8], start: usize) -> Option<usize> {
    let int_end = scan_while(bytes, start, |b| b.is_ascii_digit());
    if byte_in(bytes, int_end, b".") {
        let frac_end = scan_while(bytes, int_end + 1, |b| b.is_ascii_digit());
        if int_end > start || frac_end > int_end + 1 {
            return Some(scan_exponent(bytes, frac_end).unwrap_or(frac_end));
        }
        return None;
    }
    if int_end > start {
        return scan_exponent(bytes, int_end);
    }
    None
}

fn scan_imaginary(bytes: &[u8], start: usize) -> Option<usize> {
    let int_end = scan_while(bytes, start, |b| b.is_ascii_digit());
    if int_end > start && byte_in(bytes, int_end, b"jJ") {
        return Some(int_end + 1);
    }
    let float_end = scan_float(bytes, start)?;
    byte_in(bytes, float_end, b"jJ").then_some(float_end + 1)
}

fn long_suffix(bytes: &[u8], end: usize) -> usize {
    if byte_in(bytes, end, b"lL") {
        end + 1
    } else {
        end
    }
}

/// Returns the end of the integer token and the span holding its digits.
fn scan_integer(bytes: &[u8], start: usize) -> Option<(usize, u32, usize, usize)> {
    let first = *bytes.get(start)?;
    if first == b'0' {
        let radix_digits: [(&[u8], u32, fn(u8) -> bool); 2] = [
            (b"xX", 16, |b: u8| b.is_ascii_hexdigit()),
            (b"bB", 2, |b: u8| b == b'0' || b == b'1'),
        ];
        for (markers, radix, pred) in radix_digits {
            if byte_in(bytes, start + 1, markers) {
                let end = scan_while(bytes, start + 2, pred);
                if end > start + 2 {
                    return Some((long_suffix(bytes, end), radix, start + 2, end));
                }
            }
        }
        let is_octal = |b: u8| (b'0'..=b'7').contains(&b);
        if byte_in(bytes, start + 1, b"oO") {
            let end = scan_while(bytes, start + 2, is_octal);
            if end > start + 2 {
                return Some((end, 8, start + 2, end));
            }
        }
        let end = scan_while(bytes, start + 1, is_octal);
        return Some((long_suffix(bytes, end), 8, start + 1, end));
    }
    if first.is_ascii_digit() {
        let end = scan_while(bytes, start, |b| b.is_ascii_digit());
        return Some((long_suffix(bytes, end), 10, start, end));
    }
    None
}

fn integer_value(digits: &str, radix: u32) -> Number {
    if digits.is_empty() {
        return Number::Int(0);
    }
    match i64::from_str_radix(digits, radix) {
        Ok(i) => Number::Int(i),
        // Too wide for i64: keep the magnitude as a float.
        Err(_) if radix == 10 => Number::Float(digits.parse().unwrap_or(f64::INFINITY)),
        Err(_) => Number::Float(digits.chars().fold(0.0, |acc, c| {
            acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
        })),
    }
}

fn float_value(text: &str) -> Number {
    Number::Float(text.parse().unwrap_or(f64::NAN))
}

/// Scans one numeric token starting at `start`.
///
/// Returns the end offset and the token's value. Only the first matching
/// alternative is considered, mirroring the priority order of the grammar.
pub(crate) fn scan_number(text: &str, start: usize) -> Option<(usize, Number)> {
    let bytes = text.as_bytes();
    if let Some(end) = scan_imaginary(bytes, start) {
        let im = text[start..end - 1].parse().unwrap_or(f64::NAN);
        return Some((end, Number::Complex(Complex::new(0.0, im))));
    }
    if let Some(end) = scan_float(bytes, start) {
        return Some((end, float_value(&text[start..end])));
    }
    let (end, radix, digits_start, digits_end) = scan_integer(bytes, start)?;
    Some((end, integer_value(&text[digits_start..digits_end], radix)))
}

/// A match of the composite complex form.
struct ComplexMatch {
    end: usize,
    open_parens: usize,
    close_parens: usize,
    real: Number,
    imaginary: Number,
}

fn match_complex(text: &str) -> Option<ComplexMatch> {
    let bytes = text.as_bytes();
    let is_blank = |b: u8| b == b' ' || b == b'\t';

    let open_end = scan_while(bytes, 0, |b| b == b'(');
    let (real_end, real) = scan_number(text, open_end)?;
    let plus = scan_while(bytes, real_end, is_blank);
    if !byte_in(bytes, plus, b"+") {
        return None;
    }
    let imag_start = scan_while(bytes, plus + 1, is_blank);
    let (imag_end, imaginary) = scan_number(text, imag_start)?;
    let end = scan_while(bytes, imag_end, |b| b == b')');

    Some(ComplexMatch {
        end,
        open_parens: open_end,
        close_parens: end - imag_end,
        real,
        imaginary,
    })
}

/// Splits off a single leading sign, returning whether it was a minus.
fn split_sign(text: &str) -> (bool, &str) {
    let trimmed = text.trim();
    if trimmed.len() > 1 {
        if let Some(rest) = trimmed.strip_prefix('-') {
            return (true, rest.trim());
        }
        if let Some(rest) = trimmed.strip_prefix('+') {
            return (false, rest.trim());
        }
    }
    (false, trimmed)
}

/// Returns true if `text` denotes a numeric literal.
///
/// Surrounding whitespace and one leading `+`/`-` are ignored. The complex
/// form is tried first; the plain numeric form is only tried when the
/// complex form does not match at all. Either way the match has to consume
/// the whole remaining text.
///
/// ```
/// use inisettings::literal::string_is_number;
///
/// assert!(string_is_number("42"));
/// assert!(string_is_number(" -1.5e3 "));
/// assert!(string_is_number("(1 + 2j)"));
/// assert!(!string_is_number("42abc"));
/// assert!(!string_is_number(""));
/// ```
pub fn string_is_number(text: &str) -> bool {
    let (_, body) = split_sign(text);
    if body.is_empty() {
        return false;
    }
    match match_complex(body) {
        Some(m) => m.end == body.len(),
        None => scan_number(body, 0).is_some_and(|(end, _)| end == body.len()),
    }
}

/// Evaluates numeric literal text into a setting value.
///
/// Fails with [`SettingsError::MalformedLiteral`] when the text is not a
/// numeric literal, or when the parentheses of a complex literal do not
/// balance.
pub fn evaluate_number(text: &str) -> SettingsResult<SettingValue> {
    let malformed = || SettingsError::malformed_literal(text);
    let (negative, body) = split_sign(text);
    if body.is_empty() {
        return Err(malformed());
    }

    if let Some(m) = match_complex(body) {
        if m.end != body.len() || m.open_parens != m.close_parens {
            return Err(malformed());
        }
        let value = if m.open_parens > 0 {
            let sum = m.real.add(m.imaginary);
            if negative {
                sum.neg()
            } else {
                sum
            }
        } else {
            let real = if negative { m.real.neg() } else { m.real };
            real.add(m.imaginary)
        };
        return Ok(value.into_value());
    }

    match scan_number(body, 0) {
        Some((end, number)) if end == body.len() => {
            let number = if negative { number.neg() } else { number };
            Ok(number.into_value())
        }
        _ => Err(malformed()),
    }
}
