use std::borrow::Cow;

use tracing::{debug, trace};
use xcontent_core::{ContentFormat, Error, Scalar, StructuralReader, Text, Token};

use crate::codec::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Object,
    Array,
}

/// Pull parser over one Smile document.
///
/// String values and key names are borrowed from the input once their UTF-8
/// has been checked. Raw binary is borrowed as well; 7-bit encoded binary is
/// decoded into an owned buffer.
pub struct SmileReader<'de> {
    input: &'de [u8],
    pos: usize,
    flags: Option<u8>,
    stack: Vec<Container>,
    after_key: bool,
    shared_names: Vec<&'de str>,
    shared_values: Vec<&'de str>,
    done: bool,
}

impl<'de> SmileReader<'de> {
    /// Read `input`, which must start with the Smile header.
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            pos: 0,
            flags: None,
            stack: Vec::new(),
            after_key: false,
            shared_names: Vec::new(),
            shared_values: Vec::new(),
            done: false,
        }
    }

    fn flag(&self, flag: u8) -> bool {
        self.flags.is_some_and(|flags| flags & flag != 0)
    }

    fn read_header(&mut self) -> Result<u8, Error> {
        let header = self
            .input
            .get(..4)
            .ok_or_else(|| malformed(0, "missing Smile header"))?;
        if header[..3] != MAGIC {
            return Err(malformed(0, "missing Smile header"));
        }
        let flags = header[3];
        if flags >> 4 != 0 {
            return Err(malformed(3, format!("unsupported Smile version {}", flags >> 4)));
        }
        self.pos = 4;
        debug!(
            shared_names = flags & FLAG_SHARED_NAMES != 0,
            shared_values = flags & FLAG_SHARED_VALUES != 0,
            raw_binary = flags & FLAG_RAW_BINARY != 0,
            "smile header"
        );
        Ok(flags)
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or_else(|| malformed(self.pos, "unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'de [u8], Error> {
        let input = self.input;
        let bytes = self
            .pos
            .checked_add(len)
            .and_then(|end| input.get(self.pos..end))
            .ok_or_else(|| malformed(self.pos, "unexpected end of input"))?;
        self.pos += len;
        Ok(bytes)
    }

    fn read_vint(&mut self) -> Result<u64, Error> {
        let start = self.pos;
        let mut value: u64 = 0;
        for _ in 0..10 {
            let byte = self.read_byte()?;
            if byte & 0x80 != 0 {
                return Ok((value << 6) | u64::from(byte & 0x3F));
            }
            if value > u64::MAX >> 7 {
                break;
            }
            value = (value << 7) | u64::from(byte);
        }
        Err(malformed(start, "variable-length integer overflow"))
    }

    fn read_length(&mut self) -> Result<usize, Error> {
        let start = self.pos;
        let len = self.read_vint()?;
        usize::try_from(len).map_err(|_| malformed(start, "length out of range"))
    }

    fn read_7bit_number(&mut self, count: usize) -> Result<u64, Error> {
        let bytes = self.read_bytes(count)?;
        Ok(bytes
            .iter()
            .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F)))
    }

    fn utf8(&self, bytes: &'de [u8], start: usize) -> Result<&'de str, Error> {
        std::str::from_utf8(bytes).map_err(|err| Error::from(err).at(start + err.valid_up_to()))
    }

    /// Bytes up to the end-of-string marker, which is consumed.
    fn read_terminated(&mut self) -> Result<&'de [u8], Error> {
        let input = self.input;
        let start = self.pos;
        let len = input[start..]
            .iter()
            .position(|&b| b == END_OF_STRING)
            .ok_or_else(|| malformed(start, "unterminated long string"))?;
        let bytes = &input[start..start + len];
        self.pos = start + len + 1;
        Ok(bytes)
    }

    fn remember(table: &mut Vec<&'de str>, s: &'de str) {
        if table.len() >= MAX_SHARED {
            table.clear();
        }
        table.push(s);
    }

    fn shared(table: &[&'de str], index: usize, at: usize) -> Result<&'de str, Error> {
        table
            .get(index)
            .copied()
            .ok_or_else(|| malformed(at, format!("invalid shared reference {index}")))
    }

    fn key(&mut self) -> Result<Token<'de>, Error> {
        let at = self.pos;
        let byte = self.read_byte()?;
        let name = match byte {
            END_OBJECT => {
                self.stack.pop();
                self.value_done();
                return Ok(Token::EndObject);
            }
            KEY_EMPTY => "",
            KEY_LONG_SHARED..=0x33 => {
                if !self.flag(FLAG_SHARED_NAMES) {
                    return Err(malformed(at, "shared key name without header flag"));
                }
                let high = usize::from(byte - KEY_LONG_SHARED) << 8;
                let index = high | usize::from(self.read_byte()?);
                Self::shared(&self.shared_names, index, at)?
            }
            KEY_LONG_NAME => {
                let start = self.pos;
                let bytes = self.read_terminated()?;
                let name = self.utf8(bytes, start)?;
                self.remember_name(name);
                name
            }
            KEY_SHORT_SHARED..=0x7F => {
                if !self.flag(FLAG_SHARED_NAMES) {
                    return Err(malformed(at, "shared key name without header flag"));
                }
                Self::shared(&self.shared_names, usize::from(byte - KEY_SHORT_SHARED), at)?
            }
            KEY_SHORT_ASCII..=0xF7 => {
                let len = if byte < KEY_SHORT_UNICODE {
                    usize::from(byte - KEY_SHORT_ASCII) + 1
                } else {
                    usize::from(byte - KEY_SHORT_UNICODE) + 2
                };
                let start = self.pos;
                let bytes = self.read_bytes(len)?;
                let name = self.utf8(bytes, start)?;
                self.remember_name(name);
                name
            }
            other => return Err(malformed(at, format!("invalid key token 0x{other:02x}"))),
        };
        self.after_key = true;
        Ok(Token::FieldName(Cow::Borrowed(name)))
    }

    fn remember_name(&mut self, name: &'de str) {
        if self.flag(FLAG_SHARED_NAMES) {
            Self::remember(&mut self.shared_names, name);
        }
    }

    fn string_value(&mut self, len: usize) -> Result<Scalar<'de>, Error> {
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        let s = self.utf8(bytes, start)?;
        if self.flag(FLAG_SHARED_VALUES) && len <= MAX_SHARED_VALUE_LEN {
            Self::remember(&mut self.shared_values, s);
        }
        Ok(Scalar::String(Text::Utf8(Cow::Borrowed(bytes))))
    }

    fn shared_value(&mut self, index: usize, at: usize) -> Result<Scalar<'de>, Error> {
        if !self.flag(FLAG_SHARED_VALUES) {
            return Err(malformed(at, "shared string value without header flag"));
        }
        let s = Self::shared(&self.shared_values, index, at)?;
        Ok(Scalar::String(Text::Utf8(Cow::Borrowed(s.as_bytes()))))
    }

    fn value(&mut self) -> Result<Option<Token<'de>>, Error> {
        let at = self.pos;
        let byte = self.read_byte()?;
        self.after_key = false;
        let scalar = match byte {
            START_OBJECT => {
                self.stack.push(Container::Object);
                return Ok(Some(Token::StartObject));
            }
            START_ARRAY => {
                self.stack.push(Container::Array);
                return Ok(Some(Token::StartArray));
            }
            END_ARRAY if self.stack.last() == Some(&Container::Array) => {
                self.stack.pop();
                self.value_done();
                return Ok(Some(Token::EndArray));
            }
            END_OF_CONTENT if self.stack.is_empty() => {
                self.done = true;
                return Ok(None);
            }
            0x01..=0x1F => self.shared_value(usize::from(byte - 1), at)?,
            0xEC..=0xEF => {
                let index = (usize::from(byte & 0x03) << 8) | usize::from(self.read_byte()?);
                self.shared_value(index, at)?
            }
            EMPTY_STRING => Scalar::String(Text::Utf8(Cow::Borrowed(&[]))),
            NULL => Scalar::Null,
            FALSE => Scalar::Bool(false),
            TRUE => Scalar::Bool(true),
            INT32 => {
                let raw = self.read_vint()?;
                let raw = u32::try_from(raw).map_err(|_| malformed(at, "32-bit integer overflow"))?;
                Scalar::Int(zigzag_decode(u64::from(raw)) as i32)
            }
            INT64 => Scalar::Long(zigzag_decode(self.read_vint()?)),
            FLOAT32 => {
                let bits = self.read_7bit_number(5)?;
                Scalar::Float(f32::from_bits(bits as u32))
            }
            FLOAT64 => Scalar::Double(f64::from_bits(self.read_7bit_number(10)?)),
            BIG_INTEGER | BIG_DECIMAL => {
                return Err(malformed(at, "big numbers are not supported"));
            }
            TINY_ASCII..=0x5F => self.string_value(usize::from(byte - TINY_ASCII) + 1)?,
            SHORT_ASCII..=0x7F => self.string_value(usize::from(byte - SHORT_ASCII) + 33)?,
            TINY_UNICODE..=0x9F => self.string_value(usize::from(byte - TINY_UNICODE) + 2)?,
            SHORT_UNICODE..=0xBF => self.string_value(usize::from(byte - SHORT_UNICODE) + 34)?,
            SMALL_INT..=0xDF => Scalar::Int(zigzag_decode(u64::from(byte - SMALL_INT)) as i32),
            LONG_ASCII | LONG_UNICODE => {
                let start = self.pos;
                let bytes = self.read_terminated()?;
                self.utf8(bytes, start)?;
                Scalar::String(Text::Utf8(Cow::Borrowed(bytes)))
            }
            BINARY_7BIT => {
                let len = self.read_length()?;
                let encoded = self.read_bytes(encoded_7bit_len(len))?;
                Scalar::Binary(Cow::Owned(decode_7bit_binary(encoded, len)))
            }
            BINARY_RAW => {
                let len = self.read_length()?;
                Scalar::Binary(Cow::Borrowed(self.read_bytes(len)?))
            }
            other => return Err(malformed(at, format!("invalid value token 0x{other:02x}"))),
        };
        self.value_done();
        Ok(Some(Token::Scalar(scalar)))
    }

    fn value_done(&mut self) {
        if self.stack.is_empty() {
            self.done = true;
        }
    }

    fn step(&mut self) -> Result<Option<Token<'de>>, Error> {
        if self.done {
            return Ok(None);
        }
        if self.flags.is_none() {
            if self.input.is_empty() {
                self.done = true;
                return Ok(None);
            }
            self.flags = Some(self.read_header()?);
        }
        if self.pos >= self.input.len() && self.stack.is_empty() {
            self.done = true;
            return Ok(None);
        }
        match self.stack.last() {
            Some(Container::Object) if !self.after_key => self.key().map(Some),
            _ => self.value(),
        }
    }
}

impl<'de> StructuralReader<'de> for SmileReader<'de> {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error> {
        let token = self.step()?;
        trace!(?token, depth = self.stack.len(), "smile");
        Ok(token)
    }

    fn format(&self) -> Option<ContentFormat> {
        Some(ContentFormat::Smile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> Result<Vec<Token<'_>>, Error> {
        let mut reader = SmileReader::new(input);
        let mut out = Vec::new();
        while let Some(token) = reader.next_token()? {
            out.push(token.into_owned());
        }
        Ok(out)
    }

    fn string(s: &str) -> Token<'static> {
        Token::Scalar(Scalar::String(Text::Utf8(Cow::Owned(s.as_bytes().to_vec()))))
    }

    #[test]
    fn small_object() {
        let found = tokens(b":)\n\x01\xfa\x80a\xc2\xfb").unwrap();
        assert_eq!(
            found,
            vec![
                Token::StartObject,
                Token::FieldName(Cow::Borrowed("a")),
                Token::Scalar(Scalar::Int(1)),
                Token::EndObject,
            ]
        );
    }

    #[test]
    fn shared_names_resolve() {
        let found = tokens(b":)\n\x01\xfa\x80x\xfa\x40\xc2\xfb\xfb").unwrap();
        assert_eq!(found[3], Token::FieldName(Cow::Borrowed("x")));
    }

    #[test]
    fn long_shared_name_references_resolve() {
        let found = tokens(b":)\n\x01\xfa\x80x\xfa\x30\x00\xc2\xfb\xfb").unwrap();
        assert_eq!(found[3], Token::FieldName(Cow::Borrowed("x")));
        assert!(tokens(b":)\n\x01\xfa\x80x\xfa\x30\x01\xc2\xfb\xfb").is_err());
    }

    #[test]
    fn shared_values_resolve() {
        let found = tokens(b":)\n\x02\xf8\x42abc\x01\xf9").unwrap();
        assert_eq!(found, vec![Token::StartArray, string("abc"), string("abc"), Token::EndArray]);
    }

    #[test]
    fn shared_reference_needs_the_flag() {
        assert!(tokens(b":)\n\x00\xf8\x42abc\x01\xf9").is_err());
        assert!(tokens(b":)\n\x00\xfa\x40").is_err());
    }

    #[test]
    fn numbers_keep_their_width() {
        let found = tokens(b":)\n\x00\xf8\x24\x03\x88\x25\x80\xdf\x28\x03\x7c\x00\x00\x00\xf9").unwrap();
        assert_eq!(
            found,
            vec![
                Token::StartArray,
                Token::Scalar(Scalar::Int(100)),
                Token::Scalar(Scalar::Long(0)),
                Token::Scalar(Scalar::Int(-16)),
                Token::Scalar(Scalar::Float(1.0)),
                Token::EndArray,
            ]
        );
    }

    #[test]
    fn long_strings_and_binary() {
        let found = tokens(b":)\n\x04\xf8\xe4h\xc3\xa9\xfc\xfd\x82\x00\xff\xe8\x82\x34\x1a\x01\xf9").unwrap();
        assert_eq!(found[1], string("hé"));
        assert_eq!(found[2], Token::Scalar(Scalar::Binary(Cow::Owned(vec![0x00, 0xff]))));
        assert_eq!(found[3], Token::Scalar(Scalar::Binary(Cow::Owned(b"hi".to_vec()))));
    }

    #[test]
    fn big_numbers_are_unsupported() {
        let err = tokens(b":)\n\x00\x26\x81\x80").unwrap_err();
        assert_eq!(err.offset, Some(4));
    }

    #[test]
    fn header_is_required() {
        assert!(tokens(b"{\"a\":1}").is_err());
        assert!(tokens(b":)\n\x10\x21").is_err());
        assert!(tokens(b"").unwrap().is_empty());
    }

    #[test]
    fn truncated_input_is_malformed() {
        assert!(tokens(b":)\n\x00\xfa\x80a").is_err());
        assert!(tokens(b":)\n\x00\x45ab").is_err());
    }
}
