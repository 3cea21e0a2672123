//! Event types shared by readers and writers.

use std::borrow::Cow;
use std::str::Utf8Error;

/// One structural event.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'de> {
    /// Beginning of an object/map.
    StartObject,
    /// End of an object/map.
    EndObject,
    /// Beginning of an array/sequence.
    StartArray,
    /// End of an array/sequence.
    EndArray,
    /// Name of the next field of the enclosing object.
    FieldName(Cow<'de, str>),
    /// A leaf value.
    Scalar(Scalar<'de>),
}

impl Token<'_> {
    /// Detach the token from the input buffer.
    pub fn into_owned(self) -> Token<'static> {
        match self {
            Token::StartObject => Token::StartObject,
            Token::EndObject => Token::EndObject,
            Token::StartArray => Token::StartArray,
            Token::EndArray => Token::EndArray,
            Token::FieldName(name) => Token::FieldName(Cow::Owned(name.into_owned())),
            Token::Scalar(scalar) => Token::Scalar(scalar.into_owned()),
        }
    }
}

/// Leaf values, keeping the source's declared numeric width.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'de> {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// String value.
    String(Text<'de>),
    /// Raw bytes.
    Binary(Cow<'de, [u8]>),
}

impl Scalar<'_> {
    /// Detach the scalar from the input buffer.
    pub fn into_owned(self) -> Scalar<'static> {
        match self {
            Scalar::Null => Scalar::Null,
            Scalar::Bool(b) => Scalar::Bool(b),
            Scalar::Int(n) => Scalar::Int(n),
            Scalar::Long(n) => Scalar::Long(n),
            Scalar::Float(n) => Scalar::Float(n),
            Scalar::Double(n) => Scalar::Double(n),
            Scalar::String(text) => Scalar::String(text.into_owned()),
            Scalar::Binary(bytes) => Scalar::Binary(Cow::Owned(bytes.into_owned())),
        }
    }
}

/// String content, either already decoded or as the raw UTF-8 slice the
/// reader found in its input.
///
/// Readers only hand out `Utf8` for bytes they have validated. Writers that
/// emit UTF-8 themselves can copy the bytes straight through.
#[derive(Debug, Clone, PartialEq)]
pub enum Text<'de> {
    /// Decoded characters.
    Chars(Cow<'de, str>),
    /// Raw UTF-8 bytes.
    Utf8(Cow<'de, [u8]>),
}

impl<'de> Text<'de> {
    /// View the text as a string slice.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        match self {
            Text::Chars(s) => Ok(s),
            Text::Utf8(bytes) => std::str::from_utf8(bytes),
        }
    }

    /// View the text as UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Text::Chars(s) => s.as_bytes(),
            Text::Utf8(bytes) => bytes,
        }
    }

    /// Detach the text from the input buffer.
    pub fn into_owned(self) -> Text<'static> {
        match self {
            Text::Chars(s) => Text::Chars(Cow::Owned(s.into_owned())),
            Text::Utf8(bytes) => Text::Utf8(Cow::Owned(bytes.into_owned())),
        }
    }
}

impl<'de> From<&'de str> for Text<'de> {
    fn from(s: &'de str) -> Self {
        Text::Chars(Cow::Borrowed(s))
    }
}

impl From<String> for Text<'static> {
    fn from(s: String) -> Self {
        Text::Chars(Cow::Owned(s))
    }
}
