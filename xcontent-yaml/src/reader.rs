use std::borrow::Cow;

use saphyr_parser::{Event, Parser, ScalarStyle, ScanError, StrInput};
use tracing::trace;
use xcontent_core::{ContentFormat, Error, Scalar, StructuralReader, Text, Token};

use crate::typing::plain_scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Inside a mapping, expecting a key or its end
    MappingKey,
    /// Inside a mapping, expecting the value of the last key
    MappingValue,
    /// Inside a sequence
    Sequence,
}

/// Pull reader over the first document of a YAML stream.
///
/// Mappings become objects and sequences arrays. Plain scalars are typed
/// (null, bool, int/long, double); quoted and block scalars are strings.
/// Aliases read as null. Mapping keys must be scalars.
pub struct YamlReader<'de> {
    parser: Parser<'de, StrInput<'de>>,
    stack: Vec<Context>,
    done: bool,
}

impl<'de> YamlReader<'de> {
    /// Read the first document of `input`.
    pub fn new(input: &'de str) -> Self {
        Self {
            parser: Parser::new_from_str(input),
            stack: Vec::new(),
            done: false,
        }
    }

    /// Record that a value (scalar or container end) just completed.
    fn value_done(&mut self) {
        match self.stack.last_mut() {
            Some(ctx @ Context::MappingValue) => *ctx = Context::MappingKey,
            Some(_) => {}
            None => self.done = true,
        }
    }

    fn expecting_key(&self) -> bool {
        self.stack.last() == Some(&Context::MappingKey)
    }

    fn complex_key(&self) -> Error {
        Error::malformed(ContentFormat::Yaml, "mapping keys must be scalars")
    }

    fn step(&mut self) -> Result<Option<Token<'de>>, Error> {
        loop {
            if self.done {
                return Ok(None);
            }
            let Some(next) = self.parser.next_event() else {
                self.done = true;
                return Ok(None);
            };
            let (event, _span) = next.map_err(scan_error)?;
            let token = match event {
                Event::StreamStart | Event::DocumentStart(..) | Event::Nothing => continue,
                Event::StreamEnd | Event::DocumentEnd => {
                    self.done = true;
                    return Ok(None);
                }
                Event::MappingStart(..) => {
                    if self.expecting_key() {
                        return Err(self.complex_key());
                    }
                    self.stack.push(Context::MappingKey);
                    Token::StartObject
                }
                Event::SequenceStart(..) => {
                    if self.expecting_key() {
                        return Err(self.complex_key());
                    }
                    self.stack.push(Context::Sequence);
                    Token::StartArray
                }
                Event::MappingEnd => {
                    self.stack.pop();
                    self.value_done();
                    Token::EndObject
                }
                Event::SequenceEnd => {
                    self.stack.pop();
                    self.value_done();
                    Token::EndArray
                }
                Event::Scalar(value, style, ..) => {
                    if let Some(ctx @ Context::MappingKey) = self.stack.last_mut() {
                        *ctx = Context::MappingValue;
                        Token::FieldName(value)
                    } else {
                        self.value_done();
                        Token::Scalar(typed_scalar(value, style))
                    }
                }
                Event::Alias(..) => {
                    if self.expecting_key() {
                        return Err(self.complex_key());
                    }
                    self.value_done();
                    Token::Scalar(Scalar::Null)
                }
            };
            return Ok(Some(token));
        }
    }
}

fn typed_scalar(value: Cow<'_, str>, style: ScalarStyle) -> Scalar<'_> {
    match style {
        ScalarStyle::Plain => plain_scalar(value),
        _ => Scalar::String(Text::Chars(value)),
    }
}

fn scan_error(err: ScanError) -> Error {
    Error::malformed(ContentFormat::Yaml, err.info()).at(err.marker().index())
}

impl<'de> StructuralReader<'de> for YamlReader<'de> {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error> {
        let token = self.step()?;
        trace!(?token, depth = self.stack.len(), "yaml");
        Ok(token)
    }

    fn format(&self) -> Option<ContentFormat> {
        Some(ContentFormat::Yaml)
    }
}
