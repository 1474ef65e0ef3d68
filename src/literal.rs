//! Reader for the Python-literal bodies served by Jenkins' `*/api/python`
//! endpoints.
//!
//! The text is parsed with a small recursive-descent grammar into
//! [`serde_json::Value`]; nothing in it is ever evaluated. Supported forms:
//!
//! * dicts `{'k': v}`, lists `[..]` and tuples `(..)` (tuples become arrays),
//! * strings in single or double quotes, with `u`/`b`/`r` prefixes, the usual
//!   backslash escapes and implicit concatenation of adjacent literals,
//! * integers (a Python 2 `L` suffix is accepted), floats, `True`, `False`,
//!   `None`.

use serde_json::{Map, Number, Value};
use thiserror::Error;

const MAX_DEPTH: usize = 256;

/// Malformed or unexpected literal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid python literal at byte {offset}: {reason}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: Box<str>,
}

/// Parse one complete literal; trailing non-whitespace is an error.
pub fn parse(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        src: text,
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(parser.error("trailing characters after literal"));
    }
    Ok(value)
}

/// Parse bytes as UTF-8 literal text.
pub fn parse_slice(bytes: &[u8]) -> Result<Value, LiteralError> {
    let text = std::str::from_utf8(bytes).map_err(|err| LiteralError {
        offset: err.valid_up_to(),
        reason: "body is not valid UTF-8".into(),
    })?;
    parse(text)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

struct Prefix {
    raw: bool,
    len: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            reason: reason.into().into_boxed_str(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(ch) if ch == want => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{want}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{want}', found end of input"))),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.nested(Self::dict),
            Some('[') => self.nested(|p| {
                p.sequence('[', ']').map(|(items, _)| Value::Array(items))
            }),
            Some('(') => self.nested(Self::tuple),
            Some('\'' | '"') => self.strings(),
            Some(ch) if ch == '-' || ch == '+' || ch == '.' || ch.is_ascii_digit() => {
                self.number()
            }
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                if self.string_prefix().is_some() {
                    self.strings()
                } else {
                    self.keyword()
                }
            }
            Some(ch) => Err(self.error(format!("unexpected character '{ch}'"))),
        }
    }

    fn nested(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = inner(self);
        self.depth -= 1;
        value
    }

    fn dict(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key_at = self.pos;
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "True".to_owned(),
                Value::Bool(false) => "False".to_owned(),
                Value::Null => "None".to_owned(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(LiteralError {
                        offset: key_at,
                        reason: "dict keys must be scalars".into(),
                    });
                }
            };

            self.skip_ws();
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                _ => return Err(self.error("expected ',' or '}' in dict")),
            }
        }
    }

    /// Comma separated values up to `close`; also reports whether a trailing
    /// comma was present.
    fn sequence(&mut self, open: char, close: char) -> Result<(Vec<Value>, bool), LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += close.len_utf8();
                return Ok((items, trailing_comma));
            }

            items.push(self.value()?);
            trailing_comma = false;

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    trailing_comma = true;
                }
                Some(ch) if ch == close => {}
                _ => return Err(self.error(format!("expected ',' or '{close}'"))),
            }
        }
    }

    /// `(x)` is just `x`; `(x,)` and `(x, y)` are tuples.
    fn tuple(&mut self) -> Result<Value, LiteralError> {
        let (mut items, trailing_comma) = self.sequence('(', ')')?;
        if items.len() == 1 && !trailing_comma {
            return Ok(items.remove(0));
        }
        Ok(Value::Array(items))
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            other => Err(LiteralError {
                offset: start,
                reason: format!("unknown name '{other}'").into_boxed_str(),
            }),
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }

        let mut is_float = false;
        let mut digits = 0usize;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' => digits += 1,
                '.' => is_float = true,
                'e' | 'E' if digits > 0 => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some('-' | '+')) {
                        self.pos += 1;
                    }
                    continue;
                }
                _ => break,
            }
            self.pos += 1;
        }

        let text = &self.src[start..self.pos];
        if digits == 0 {
            return Err(LiteralError {
                offset: start,
                reason: format!("invalid number '{text}'").into_boxed_str(),
            });
        }

        if !is_float && matches!(self.peek(), Some('L' | 'l')) {
            self.pos += 1;
        }

        let invalid = || LiteralError {
            offset: start,
            reason: format!("invalid number '{text}'").into_boxed_str(),
        };
        let text = text.strip_prefix('+').unwrap_or(text);

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            if let Ok(n) = text.parse::<u64>() {
                return Ok(Value::Number(n.into()));
            }
        }

        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid)
    }

    /// Recognizes `u'`, `b"`, `r'`, `ur'`, `br'`, `rb'` (any case).
    fn string_prefix(&self) -> Option<Prefix> {
        let rest = self.rest().as_bytes();
        let mut raw = false;
        for (len, byte) in rest.iter().take(3).enumerate() {
            match byte {
                b'\'' | b'"' => return Some(Prefix { raw, len }),
                b'r' | b'R' => raw = true,
                b'u' | b'U' | b'b' | b'B' => {}
                _ => return None,
            }
        }
        None
    }

    /// One string literal plus any adjacent ones, concatenated.
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut out = String::new();
        loop {
            let Some(prefix) = self.string_prefix() else {
                break;
            };
            self.pos += prefix.len;
            self.string(prefix.raw, &mut out)?;

            let after = self.pos;
            self.skip_ws();
            if self.string_prefix().is_none() {
                self.pos = after;
                break;
            }
        }
        Ok(Value::String(out))
    }

    fn string(&mut self, raw: bool, out: &mut String) -> Result<(), LiteralError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string"));
        };

        loop {
            match self.bump() {
                None => {
                    return Err(LiteralError {
                        offset: start,
                        reason: "unterminated string".into(),
                    });
                }
                Some(ch) if ch == quote => return Ok(()),
                Some('\\') if raw => {
                    out.push('\\');
                    match self.bump() {
                        Some(ch) => out.push(ch),
                        None => continue,
                    }
                }
                Some('\\') => self.escape(out)?,
                Some(ch) => out.push(ch),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let at = self.pos - 1;
        let Some(ch) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match ch {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(ch),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut code = ch.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'x' => {
                let code = self.hex(2, at)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'u' => {
                let code = self.hex(4, at)?;
                out.push(self.unicode(code, at)?);
            }
            'U' => {
                let code = self.hex(8, at)?;
                let ch = char::from_u32(code).ok_or_else(|| LiteralError {
                    offset: at,
                    reason: "escape is not a unicode scalar value".into(),
                })?;
                out.push(ch);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    /// `\uXXXX`, joining a UTF-16 surrogate pair when one follows.
    fn unicode(&mut self, code: u32, at: usize) -> Result<char, LiteralError> {
        if (0xD800..0xDC00).contains(&code) && self.rest().starts_with("\\u") {
            let save = self.pos;
            self.pos += 2;
            let low = self.hex(4, at)?;
            if (0xDC00..0xE000).contains(&low) {
                let joined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(joined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            self.pos = save;
        }
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn hex(&mut self, len: usize, at: usize) -> Result<u32, LiteralError> {
        let digits = self.rest().get(..len).filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()));
        let Some(digits) = digits else {
            return Err(LiteralError {
                offset: at,
                reason: format!("escape needs {len} hex digits").into_boxed_str(),
            });
        };
        self.pos += len;
        u32::from_str_radix(digits, 16).map_err(|_| LiteralError {
            offset: at,
            reason: "invalid hex escape".into(),
        })
    }
}
