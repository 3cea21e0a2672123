use std::borrow::Cow;

use tracing::trace;
use xcontent_core::{ContentFormat, Error, Scalar, StructuralReader, Text, Token};

use crate::scanner::{Lexeme, NumberHint, Scanner, Spanned, decode_string, malformed};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Object,
    Array,
}

/// What the grammar expects next.
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    /// The top-level value
    Start,
    /// Right after `{`: a key or `}`
    ObjectOpen,
    /// After a member: `,` or `}`
    ObjectNext,
    /// After a key: `:` and the member value
    AfterKey,
    /// Right after `[`: a value or `]`
    ArrayOpen,
    /// After an element: `,` or `]`
    ArrayNext,
    /// The top-level value is complete
    Done,
    /// Trailing input has been checked
    Finished,
}

/// Pull parser over a complete JSON document.
///
/// Strings without escapes are handed out as [`Text::Utf8`] slices of the
/// input. Integers are `Int` when they fit 32 bits and `Long` when they fit
/// 64; anything wider, and every number with a fraction or exponent, is a
/// `Double`.
pub struct JsonReader<'de> {
    input: &'de [u8],
    scanner: Scanner,
    stack: Vec<Container>,
    state: State,
}

impl<'de> JsonReader<'de> {
    /// Read `input`, which must hold exactly one JSON value.
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            scanner: Scanner::new(),
            stack: Vec::new(),
            state: State::Start,
        }
    }

    fn lex(&mut self) -> Result<Spanned, Error> {
        self.scanner.next(self.input)
    }

    fn after_value(&mut self) {
        self.state = match self.stack.last() {
            Some(Container::Object) => State::ObjectNext,
            Some(Container::Array) => State::ArrayNext,
            None => State::Done,
        };
    }

    fn close(&mut self, container: Container) -> Token<'de> {
        self.stack.pop();
        self.after_value();
        match container {
            Container::Object => Token::EndObject,
            Container::Array => Token::EndArray,
        }
    }

    fn key(&mut self, spanned: Spanned) -> Result<Token<'de>, Error> {
        let Lexeme::String {
            start,
            end,
            has_escapes,
        } = spanned.lexeme
        else {
            return Err(malformed(spanned.offset, "expected a field name"));
        };
        self.state = State::AfterKey;
        let name = decode_string(self.input, start, end, has_escapes)?;
        Ok(Token::FieldName(name))
    }

    fn value(&mut self, spanned: Spanned) -> Result<Token<'de>, Error> {
        let scalar = match spanned.lexeme {
            Lexeme::ObjectStart => {
                self.stack.push(Container::Object);
                self.state = State::ObjectOpen;
                return Ok(Token::StartObject);
            }
            Lexeme::ArrayStart => {
                self.stack.push(Container::Array);
                self.state = State::ArrayOpen;
                return Ok(Token::StartArray);
            }
            Lexeme::Null => Scalar::Null,
            Lexeme::True => Scalar::Bool(true),
            Lexeme::False => Scalar::Bool(false),
            Lexeme::String {
                start,
                end,
                has_escapes,
            } => {
                let text = match decode_string(self.input, start, end, has_escapes)? {
                    Cow::Borrowed(s) => Text::Utf8(Cow::Borrowed(s.as_bytes())),
                    Cow::Owned(s) => Text::Chars(Cow::Owned(s)),
                };
                Scalar::String(text)
            }
            Lexeme::Number { start, end, hint } => self.number(start, end, hint)?,
            Lexeme::Eof => return Err(malformed(spanned.offset, "unexpected end of input")),
            Lexeme::ObjectEnd | Lexeme::ArrayEnd | Lexeme::Colon | Lexeme::Comma => {
                return Err(malformed(spanned.offset, "expected a value"));
            }
        };
        self.after_value();
        Ok(Token::Scalar(scalar))
    }

    fn number(&self, start: usize, end: usize, hint: NumberHint) -> Result<Scalar<'de>, Error> {
        let text = std::str::from_utf8(&self.input[start..end])?;
        let as_double = || {
            text.parse::<f64>()
                .map(Scalar::Double)
                .map_err(|err| malformed(start, err.to_string()))
        };
        match hint {
            NumberHint::Float => as_double(),
            NumberHint::Integer => match text.parse::<i64>() {
                Ok(n) => Ok(i32::try_from(n).map_or(Scalar::Long(n), Scalar::Int)),
                Err(_) => as_double(),
            },
        }
    }

    fn step(&mut self) -> Result<Option<Token<'de>>, Error> {
        let token = match self.state {
            State::Start => {
                let spanned = self.lex()?;
                if spanned.lexeme == Lexeme::Eof {
                    self.state = State::Finished;
                    return Ok(None);
                }
                self.value(spanned)?
            }
            State::ObjectOpen => {
                let spanned = self.lex()?;
                match spanned.lexeme {
                    Lexeme::ObjectEnd => self.close(Container::Object),
                    _ => self.key(spanned)?,
                }
            }
            State::ObjectNext => {
                let spanned = self.lex()?;
                match spanned.lexeme {
                    Lexeme::Comma => {
                        let key = self.lex()?;
                        self.key(key)?
                    }
                    Lexeme::ObjectEnd => self.close(Container::Object),
                    _ => return Err(malformed(spanned.offset, "expected `,` or `}`")),
                }
            }
            State::AfterKey => {
                let colon = self.lex()?;
                if colon.lexeme != Lexeme::Colon {
                    return Err(malformed(colon.offset, "expected `:`"));
                }
                let spanned = self.lex()?;
                self.value(spanned)?
            }
            State::ArrayOpen => {
                let spanned = self.lex()?;
                match spanned.lexeme {
                    Lexeme::ArrayEnd => self.close(Container::Array),
                    _ => self.value(spanned)?,
                }
            }
            State::ArrayNext => {
                let spanned = self.lex()?;
                match spanned.lexeme {
                    Lexeme::Comma => {
                        let element = self.lex()?;
                        self.value(element)?
                    }
                    Lexeme::ArrayEnd => self.close(Container::Array),
                    _ => return Err(malformed(spanned.offset, "expected `,` or `]`")),
                }
            }
            State::Done => {
                let spanned = self.lex()?;
                if spanned.lexeme != Lexeme::Eof {
                    return Err(malformed(spanned.offset, "trailing characters after value"));
                }
                self.state = State::Finished;
                return Ok(None);
            }
            State::Finished => return Ok(None),
        };
        Ok(Some(token))
    }
}

impl<'de> StructuralReader<'de> for JsonReader<'de> {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error> {
        let token = self.step()?;
        trace!(?token, depth = self.stack.len(), "json");
        Ok(token)
    }

    fn format(&self) -> Option<ContentFormat> {
        Some(ContentFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Result<Vec<Token<'_>>, Error> {
        let mut reader = JsonReader::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(token) = reader.next_token()? {
            out.push(token);
        }
        Ok(out)
    }

    #[test]
    fn numbers_take_the_narrowest_width() {
        let found = tokens("[1, 3000000000, 99999999999999999999, 1.5, 2e2]").unwrap();
        assert_eq!(
            found,
            vec![
                Token::StartArray,
                Token::Scalar(Scalar::Int(1)),
                Token::Scalar(Scalar::Long(3_000_000_000)),
                Token::Scalar(Scalar::Double(1e20)),
                Token::Scalar(Scalar::Double(1.5)),
                Token::Scalar(Scalar::Double(200.0)),
                Token::EndArray,
            ]
        );
    }

    #[test]
    fn plain_strings_borrow_the_input() {
        let found = tokens(r#"{"k":"v","e":"a\tb"}"#).unwrap();
        assert!(matches!(
            &found[2],
            Token::Scalar(Scalar::String(Text::Utf8(Cow::Borrowed(b"v"))))
        ));
        assert_eq!(
            found[4],
            Token::Scalar(Scalar::String(Text::Chars(Cow::Owned("a\tb".to_owned()))))
        );
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokens("  ").unwrap().is_empty());
    }

    #[test]
    fn grammar_errors_carry_offsets() {
        let err = tokens(r#"{"a" 1}"#).unwrap_err();
        assert_eq!(err.offset, Some(5));
        assert!(tokens("[1,]").is_err());
        assert!(tokens(r#"{"a":1,}"#).is_err());
        assert!(tokens("[1 2]").is_err());
        assert!(tokens("{} x").is_err());
        assert!(tokens("[").is_err());
    }
}
