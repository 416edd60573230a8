//! Expression literals: the text after a `python:` prefix.
//!
//! Supports: numbers (same grammar as [`crate::literal`]), quoted strings,
//! `True`/`False`/`None`, lists `[..]`, tuples `(..)`, dicts `{k: v}`.
//! With expressions enabled also: `+ - * / // % **` and grouping parens.
//!
//! Expression literals come straight from config text. Only load config
//! from trusted sources when expressions are enabled.

use crate::error::{SettingsError, SettingsResult};
use crate::literal::{scan_number, Number};
use crate::value::{SettingValue, SettingsMap};

/// Deepest nesting of brackets and unary operators accepted.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Longest string or list a repetition may produce.
pub const MAX_REPEAT_LEN: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Str(String),
    Name(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// Evaluates an expression literal.
///
/// When `allow_expressions` is false only literals are accepted; any binary
/// operator other than the `re + imj` complex form fails with
/// [`SettingsError::ExpressionsDisabled`].
///
/// ```
/// use inisettings::expr::evaluate_expression;
/// use inisettings::SettingValue;
///
/// let value = evaluate_expression("[1, 2, 3]", false).unwrap();
/// assert_eq!(
///     value,
///     SettingValue::Array(vec![1i64.into(), 2i64.into(), 3i64.into()])
/// );
///
/// assert!(evaluate_expression("2 * 3", false).is_err());
/// assert_eq!(evaluate_expression("2 * 3", true).unwrap(), SettingValue::Integer(6));
/// ```
pub fn evaluate_expression(text: &str, allow_expressions: bool) -> SettingsResult<SettingValue> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(SettingsError::expression(text, "empty expression"));
    }
    let mut parser = ExprParser {
        text,
        tokens: &tokens,
        pos: 0,
        depth: 0,
        allow_expressions,
    };
    let value = parser.parse_tuple_or_expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(parser.error(format!("unexpected token {token:?}"))),
    }
}

fn tokenize(input: &str) -> SettingsResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'(' => push(&mut tokens, &mut pos, Token::LParen, 1),
            b')' => push(&mut tokens, &mut pos, Token::RParen, 1),
            b'[' => push(&mut tokens, &mut pos, Token::LBracket, 1),
            b']' => push(&mut tokens, &mut pos, Token::RBracket, 1),
            b'{' => push(&mut tokens, &mut pos, Token::LBrace, 1),
            b'}' => push(&mut tokens, &mut pos, Token::RBrace, 1),
            b',' => push(&mut tokens, &mut pos, Token::Comma, 1),
            b':' => push(&mut tokens, &mut pos, Token::Colon, 1),
            b'+' => push(&mut tokens, &mut pos, Token::Plus, 1),
            b'-' => push(&mut tokens, &mut pos, Token::Minus, 1),
            b'%' => push(&mut tokens, &mut pos, Token::Percent, 1),
            b'*' if bytes.get(pos + 1) == Some(&b'*') => {
                push(&mut tokens, &mut pos, Token::DoubleStar, 2)
            }
            b'*' => push(&mut tokens, &mut pos, Token::Star, 1),
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                push(&mut tokens, &mut pos, Token::DoubleSlash, 2)
            }
            b'/' => push(&mut tokens, &mut pos, Token::Slash, 1),
            b'\'' | b'"' => {
                let (end, s) = scan_string(input, pos, false)?;
                tokens.push(Token::Str(s));
                pos = end;
            }
            b'0'..=b'9' | b'.' => {
                let (end, number) = scan_number(input, pos).ok_or_else(|| {
                    SettingsError::expression(input, format!("invalid number at offset {pos}"))
                })?;
                tokens.push(Token::Number(number));
                pos = end;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let end = pos
                    + bytes[pos..]
                        .iter()
                        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                        .count();
                let word = &input[pos..end];
                // String prefixes: u'..', r'..', b'..'
                if matches!(bytes.get(end), Some(b'\'' | b'"'))
                    && matches!(word.to_ascii_lowercase().as_str(), "u" | "r" | "b" | "ur" | "br")
                {
                    let raw = word.to_ascii_lowercase().contains('r');
                    let (str_end, s) = scan_string(input, end, raw)?;
                    tokens.push(Token::Str(s));
                    pos = str_end;
                } else {
                    tokens.push(Token::Name(word.to_string()));
                    pos = end;
                }
            }
            _ => {
                let ch = input[pos..].chars().next().unwrap_or('?');
                return Err(SettingsError::expression(
                    input,
                    format!("unexpected character '{ch}' at offset {pos}"),
                ));
            }
        }
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<Token>, pos: &mut usize, token: Token, width: usize) {
    tokens.push(token);
    *pos += width;
}

/// Scans a quoted string starting at the opening quote.
fn scan_string(input: &str, start: usize, raw: bool) -> SettingsResult<(usize, String)> {
    let mut chars = input[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(SettingsError::expression(input, "unterminated string")),
    };
    let mut out = String::new();

    while let Some((offset, c)) = chars.next() {
        if c == quote {
            return Ok((start + offset + c.len_utf8(), out));
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            break;
        };
        if raw {
            out.push('\\');
            out.push(escaped);
            continue;
        }
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '\n' => {}
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Err(SettingsError::expression(input, "unterminated string"))
}

struct ExprParser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    allow_expressions: bool,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> SettingsResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> SettingsError {
        SettingsError::expression(self.text, message)
    }

    /// `a, b, c` at top level evaluates to a tuple.
    fn parse_tuple_or_expr(&mut self) -> SettingsResult<SettingValue> {
        let first = self.parse_expr()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.peek().is_none() {
                break;
            }
            items.push(self.parse_expr()?);
        }
        Ok(SettingValue::Array(items))
    }

    fn parse_expr(&mut self) -> SettingsResult<SettingValue> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = self.apply(op, left, right)?;
        }
    }

    fn parse_term(&mut self) -> SettingsResult<SettingValue> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_factor()?;
            left = self.apply(op, left, right)?;
        }
    }

    /// Every nested bracket, unary operator and exponent passes through
    /// here, so this is where depth is bounded.
    fn parse_factor(&mut self) -> SettingsResult<SettingValue> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = self.parse_unary();
        self.depth -= 1;
        result
    }

    fn parse_unary(&mut self) -> SettingsResult<SettingValue> {
        let negate = match self.peek() {
            Some(Token::Minus) => true,
            Some(Token::Plus) => false,
            _ => return self.parse_power(),
        };
        self.pos += 1;
        let operand = self.parse_factor()?;
        let number = Number::from_value(&operand).ok_or_else(|| {
            self.error(format!(
                "bad operand type for unary {}: {}",
                if negate { "-" } else { "+" },
                operand.type_name()
            ))
        })?;
        Ok(if negate { number.neg() } else { number }.into_value())
    }

    fn parse_power(&mut self) -> SettingsResult<SettingValue> {
        let base = self.parse_primary()?;
        if self.eat(&Token::DoubleStar) {
            // Right-associative and binds tighter than a unary minus on its left.
            let exponent = self.parse_factor()?;
            return self.apply(BinOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> SettingsResult<SettingValue> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n.into_value()),
            Some(Token::Str(s)) => {
                let mut joined = s.clone();
                // Adjacent string literals concatenate.
                while let Some(Token::Str(more)) = self.peek() {
                    joined.push_str(more);
                    self.pos += 1;
                }
                Ok(SettingValue::String(joined))
            }
            Some(Token::Name(name)) => match name.as_str() {
                "True" => Ok(SettingValue::Boolean(true)),
                "False" => Ok(SettingValue::Boolean(false)),
                "None" => Ok(SettingValue::Null),
                other => Err(self.error(format!("name '{other}' is not defined"))),
            },
            Some(Token::LParen) => self.parse_paren(),
            Some(Token::LBracket) => {
                let items = self.parse_items(&Token::RBracket)?;
                Ok(SettingValue::Array(items))
            }
            Some(Token::LBrace) => self.parse_dict(),
            Some(token) => Err(self.error(format!("unexpected token {token:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    /// `()` and `(a,)` are tuples, `(a)` is grouping.
    fn parse_paren(&mut self) -> SettingsResult<SettingValue> {
        if self.eat(&Token::RParen) {
            return Ok(SettingValue::Array(Vec::new()));
        }
        let first = self.parse_expr()?;
        if self.eat(&Token::RParen) {
            return Ok(first);
        }
        self.expect(&Token::Comma)?;
        let mut items = vec![first];
        if !self.eat(&Token::RParen) {
            items.extend(self.parse_items(&Token::RParen)?);
        }
        Ok(SettingValue::Array(items))
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn parse_items(&mut self, close: &Token) -> SettingsResult<Vec<SettingValue>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn parse_dict(&mut self) -> SettingsResult<SettingValue> {
        let mut map = SettingsMap::new();
        loop {
            if self.eat(&Token::RBrace) {
                return Ok(SettingValue::Object(map));
            }
            let key = self.parse_expr()?;
            let key = match key {
                SettingValue::String(s) => s,
                SettingValue::Array(_) | SettingValue::Object(_) => {
                    let message = format!("unhashable dict key type: {}", key.type_name());
                    return Err(self.error(message));
                }
                other => other.coerce_to_string(),
            };
            self.expect(&Token::Colon)?;
            let value = self.parse_expr()?;
            map.insert(key, value);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RBrace)?;
                return Ok(SettingValue::Object(map));
            }
        }
    }

    fn apply(
        &self,
        op: BinOp,
        left: SettingValue,
        right: SettingValue,
    ) -> SettingsResult<SettingValue> {
        if !self.allow_expressions && !is_complex_literal(op, &left, &right) {
            return Err(SettingsError::ExpressionsDisabled {
                expression: self.text.to_string(),
            });
        }

        if let (Some(a), Some(b)) = (Number::from_value(&left), Number::from_value(&right)) {
            let result = match op {
                BinOp::Add => Ok(a.add(b)),
                BinOp::Sub => Ok(a.sub(b)),
                BinOp::Mul => Ok(a.mul(b)),
                BinOp::Div => a.div(b),
                BinOp::FloorDiv => a.floor_div(b),
                BinOp::Mod => a.rem(b),
                BinOp::Pow => a.pow(b),
            };
            return result.map(Number::into_value).map_err(|msg| self.error(msg));
        }

        match (op, left, right) {
            (BinOp::Add, SettingValue::String(mut a), SettingValue::String(b)) => {
                a.push_str(&b);
                Ok(SettingValue::String(a))
            }
            (BinOp::Add, SettingValue::Array(mut a), SettingValue::Array(b)) => {
                a.extend(b);
                Ok(SettingValue::Array(a))
            }
            (BinOp::Mul, SettingValue::String(s), SettingValue::Integer(n))
            | (BinOp::Mul, SettingValue::Integer(n), SettingValue::String(s)) => {
                let count = self.repeat_count(s.len(), n)?;
                Ok(SettingValue::String(s.repeat(count)))
            }
            (BinOp::Mul, SettingValue::Array(items), SettingValue::Integer(n))
            | (BinOp::Mul, SettingValue::Integer(n), SettingValue::Array(items)) => {
                let count = self.repeat_count(items.len(), n)?;
                let mut out = Vec::with_capacity(items.len() * count);
                for _ in 0..count {
                    out.extend(items.iter().cloned());
                }
                Ok(SettingValue::Array(out))
            }
            (op, left, right) => Err(self.error(format!(
                "unsupported operand types for {op:?}: {} and {}",
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    /// Negative counts repeat zero times. The result may not exceed
    /// [`MAX_REPEAT_LEN`].
    fn repeat_count(&self, len: usize, n: i64) -> SettingsResult<usize> {
        let count = usize::try_from(n).unwrap_or(0);
        match len.checked_mul(count) {
            Some(0) => Ok(0),
            Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
            _ => Err(self.error(format!("repetition longer than {MAX_REPEAT_LEN}"))),
        }
    }
}

/// `1+2j` and `1-2j` are literals, not arithmetic.
fn is_complex_literal(op: BinOp, left: &SettingValue, right: &SettingValue) -> bool {
    matches!(op, BinOp::Add | BinOp::Sub)
        && matches!(left, SettingValue::Integer(_) | SettingValue::Float(_))
        && matches!(right, SettingValue::Complex(c) if c.re == 0.0)
}
