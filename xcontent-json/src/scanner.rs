//! Finds JSON token boundaries in a complete buffer.
//!
//! Strings and numbers come back as index ranges. The reader decides whether
//! a string can be borrowed as is or has to be unescaped.

use std::borrow::Cow;

use xcontent_core::{ContentFormat, Error};

/// Token kinds; strings and numbers are ranges into the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Lexeme {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Colon,
    Comma,
    Null,
    True,
    False,
    /// Content between the quotes.
    String {
        start: usize,
        end: usize,
        has_escapes: bool,
    },
    Number {
        start: usize,
        end: usize,
        hint: NumberHint,
    },
    Eof,
}

/// Shape of a number literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumberHint {
    /// No fraction, no exponent
    Integer,
    /// Has `.` or `e`/`E`
    Float,
}

/// A lexeme and the offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Spanned {
    pub lexeme: Lexeme,
    pub offset: usize,
}

pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Error {
    Error::malformed(ContentFormat::Json, message).at(offset)
}

pub(crate) struct Scanner {
    pos: usize,
}

impl Scanner {
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    pub fn next(&mut self, buf: &[u8]) -> Result<Spanned, Error> {
        self.skip_whitespace(buf);
        let start = self.pos;
        let Some(&byte) = buf.get(start) else {
            return Ok(Spanned {
                lexeme: Lexeme::Eof,
                offset: start,
            });
        };

        let punct = match byte {
            b'{' => Some(Lexeme::ObjectStart),
            b'}' => Some(Lexeme::ObjectEnd),
            b'[' => Some(Lexeme::ArrayStart),
            b']' => Some(Lexeme::ArrayEnd),
            b':' => Some(Lexeme::Colon),
            b',' => Some(Lexeme::Comma),
            _ => None,
        };
        let lexeme = match punct {
            Some(lexeme) => {
                self.pos += 1;
                lexeme
            }
            None => match byte {
                b'"' => self.scan_string(buf)?,
                b'-' | b'0'..=b'9' => self.scan_number(buf)?,
                b't' => self.scan_literal(buf, b"true", Lexeme::True)?,
                b'f' => self.scan_literal(buf, b"false", Lexeme::False)?,
                b'n' => self.scan_literal(buf, b"null", Lexeme::Null)?,
                other => {
                    return Err(malformed(
                        start,
                        format!("unexpected character {:?}", char::from(other)),
                    ));
                }
            },
        };
        Ok(Spanned {
            lexeme,
            offset: start,
        })
    }

    fn skip_whitespace(&mut self, buf: &[u8]) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = buf.get(self.pos) {
            self.pos += 1;
        }
    }

    fn scan_string(&mut self, buf: &[u8]) -> Result<Lexeme, Error> {
        let open = self.pos;
        self.pos += 1;
        let start = self.pos;
        let mut has_escapes = false;
        while let Some(&byte) = buf.get(self.pos) {
            match byte {
                b'"' => {
                    let end = self.pos;
                    self.pos += 1;
                    return Ok(Lexeme::String {
                        start,
                        end,
                        has_escapes,
                    });
                }
                b'\\' => {
                    has_escapes = true;
                    // the escaped byte is validated when the string is decoded
                    self.pos += 2;
                }
                0x00..=0x1f => {
                    return Err(malformed(self.pos, "unescaped control character in string"));
                }
                _ => self.pos += 1,
            }
        }
        Err(malformed(open, "unterminated string"))
    }

    fn scan_number(&mut self, buf: &[u8]) -> Result<Lexeme, Error> {
        let start = self.pos;
        let mut hint = NumberHint::Integer;
        if buf.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        match buf.get(self.pos) {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(buf),
            _ => return Err(malformed(start, "expected digit")),
        }
        if buf.get(self.pos) == Some(&b'.') {
            hint = NumberHint::Float;
            self.pos += 1;
            if !buf.get(self.pos).is_some_and(u8::is_ascii_digit) {
                return Err(malformed(self.pos, "expected digit after decimal point"));
            }
            self.skip_digits(buf);
        }
        if let Some(b'e' | b'E') = buf.get(self.pos) {
            hint = NumberHint::Float;
            self.pos += 1;
            if let Some(b'+' | b'-') = buf.get(self.pos) {
                self.pos += 1;
            }
            if !buf.get(self.pos).is_some_and(u8::is_ascii_digit) {
                return Err(malformed(self.pos, "expected digit in exponent"));
            }
            self.skip_digits(buf);
        }
        Ok(Lexeme::Number {
            start,
            end: self.pos,
            hint,
        })
    }

    fn skip_digits(&mut self, buf: &[u8]) {
        while buf.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
    }

    fn scan_literal(
        &mut self,
        buf: &[u8],
        expected: &'static [u8],
        lexeme: Lexeme,
    ) -> Result<Lexeme, Error> {
        let start = self.pos;
        match buf.get(start..start + expected.len()) {
            Some(found) if found == expected => {
                self.pos += expected.len();
                Ok(lexeme)
            }
            _ => Err(malformed(
                start,
                format!("expected `{}`", String::from_utf8_lossy(expected)),
            )),
        }
    }
}

/// Borrow the string content when it has no escapes, decode it otherwise.
pub(crate) fn decode_string(
    buf: &[u8],
    start: usize,
    end: usize,
    has_escapes: bool,
) -> Result<Cow<'_, str>, Error> {
    let slice = &buf[start..end];
    if !has_escapes {
        return std::str::from_utf8(slice)
            .map(Cow::Borrowed)
            .map_err(|err| Error::from(err).at(start + err.valid_up_to()));
    }

    let mut out = String::with_capacity(slice.len());
    let mut plain = 0;
    let mut i = 0;
    while i < slice.len() {
        if slice[i] != b'\\' {
            i += 1;
            continue;
        }
        out.push_str(
            std::str::from_utf8(&slice[plain..i])
                .map_err(|err| Error::from(err).at(start + plain + err.valid_up_to()))?,
        );
        let escape_at = start + i;
        let Some(&kind) = slice.get(i + 1) else {
            return Err(malformed(escape_at, "unterminated escape sequence"));
        };
        i += 2;
        match kind {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let high = hex4(slice, i, escape_at)?;
                i += 4;
                let code = if (0xD800..=0xDBFF).contains(&high) {
                    if slice.get(i..i + 2) != Some(b"\\u") {
                        return Err(malformed(escape_at, "unpaired surrogate in \\u escape"));
                    }
                    let low = hex4(slice, i + 2, escape_at)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(malformed(escape_at, "unpaired surrogate in \\u escape"));
                    }
                    i += 6;
                    0x10000 + ((u32::from(high) & 0x3FF) << 10) + (u32::from(low) & 0x3FF)
                } else {
                    u32::from(high)
                };
                let c = char::from_u32(code)
                    .ok_or_else(|| malformed(escape_at, "unpaired surrogate in \\u escape"))?;
                out.push(c);
            }
            other => {
                return Err(malformed(
                    escape_at,
                    format!("invalid escape `\\{}`", char::from(other)),
                ));
            }
        }
        plain = i;
    }
    out.push_str(
        std::str::from_utf8(&slice[plain..])
            .map_err(|err| Error::from(err).at(start + plain + err.valid_up_to()))?,
    );
    Ok(Cow::Owned(out))
}

fn hex4(slice: &[u8], at: usize, escape_at: usize) -> Result<u16, Error> {
    slice
        .get(at..at + 4)
        .and_then(|hex| std::str::from_utf8(hex).ok())
        .and_then(|hex| u16::from_str_radix(hex, 16).ok())
        .ok_or_else(|| malformed(escape_at, "expected four hex digits in \\u escape"))
}
