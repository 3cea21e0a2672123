use std::io::Write;

use xcontent_core::{Error, StructuralWriter};

use crate::codec::*;

#[derive(Debug, Clone, Copy)]
enum Ctx {
    Object { has_key: bool },
    Array,
}

/// Writes structural events as Smile.
///
/// The header carries flags `0x00`: names and values are never shared and
/// binary values use the 7-bit safe encoding, so the output never contains
/// the `0xFF` end marker inside a value.
pub struct SmileWriter<W: Write> {
    out: W,
    scratch: Vec<u8>,
    stack: Vec<Ctx>,
    wrote_header: bool,
    wrote_root: bool,
}

impl<W: Write> SmileWriter<W> {
    /// Write to `out`; the header goes out with the first event.
    pub fn new(out: W) -> Self {
        Self {
            out,
            scratch: Vec::new(),
            stack: Vec::new(),
            wrote_header: false,
            wrote_root: false,
        }
    }

    /// Flush and return the sink. Fails if a container is still open.
    pub fn finish(mut self) -> Result<W, Error> {
        if !self.stack.is_empty() {
            return Err(Error::invalid_structure(format!(
                "{} container(s) still open",
                self.stack.len()
            )));
        }
        self.out.flush()?;
        Ok(self.out)
    }

    /// Check that a value may go here and start a fresh scratch buffer.
    fn begin_value(&mut self) -> Result<(), Error> {
        self.scratch.clear();
        if !self.wrote_header {
            self.scratch.extend_from_slice(&MAGIC);
            self.scratch.push(0x00);
            self.wrote_header = true;
        }
        match self.stack.last_mut() {
            Some(Ctx::Object { has_key }) => {
                if !*has_key {
                    return Err(Error::invalid_structure("object value without a field name"));
                }
                *has_key = false;
            }
            Some(Ctx::Array) => {}
            None => {
                if self.wrote_root {
                    return Err(Error::invalid_structure("document already complete"));
                }
                self.wrote_root = true;
            }
        }
        Ok(())
    }

    fn emit(&mut self) -> Result<(), Error> {
        self.out.write_all(&self.scratch)?;
        Ok(())
    }

    fn write_value(&mut self, encode: impl FnOnce(&mut Vec<u8>)) -> Result<(), Error> {
        self.begin_value()?;
        encode(&mut self.scratch);
        self.emit()
    }

    fn text_value(out: &mut Vec<u8>, bytes: &[u8]) {
        let len = bytes.len();
        let ascii = bytes.is_ascii();
        match (ascii, len) {
            (_, 0) => out.push(EMPTY_STRING),
            (true, 1..=32) => out.push(TINY_ASCII + (len - 1) as u8),
            (true, 33..=64) => out.push(SHORT_ASCII + (len - 33) as u8),
            (false, 2..=33) => out.push(TINY_UNICODE + (len - 2) as u8),
            (false, 34..=65) => out.push(SHORT_UNICODE + (len - 34) as u8),
            _ => {
                out.push(if ascii { LONG_ASCII } else { LONG_UNICODE });
                out.extend_from_slice(bytes);
                out.push(END_OF_STRING);
                return;
            }
        }
        out.extend_from_slice(bytes);
    }

    fn key(out: &mut Vec<u8>, name: &str) {
        let bytes = name.as_bytes();
        let len = bytes.len();
        match (name.is_ascii(), len) {
            (_, 0) => {
                out.push(KEY_EMPTY);
                return;
            }
            (true, 1..=64) => out.push(KEY_SHORT_ASCII + (len - 1) as u8),
            (false, 2..=57) => out.push(KEY_SHORT_UNICODE + (len - 2) as u8),
            _ => {
                out.push(KEY_LONG_NAME);
                out.extend_from_slice(bytes);
                out.push(END_OF_STRING);
                return;
            }
        }
        out.extend_from_slice(bytes);
    }

    fn int_value(out: &mut Vec<u8>, value: i32) {
        if (-16..=15).contains(&value) {
            out.push(SMALL_INT + zigzag_encode(i64::from(value)) as u8);
        } else {
            out.push(INT32);
            let zigzag = ((value << 1) ^ (value >> 31)) as u32;
            write_vint(out, u64::from(zigzag));
        }
    }
}

impl<W: Write> StructuralWriter for SmileWriter<W> {
    fn start_object(&mut self) -> Result<(), Error> {
        self.write_value(|out| out.push(START_OBJECT))?;
        self.stack.push(Ctx::Object { has_key: false });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Ctx::Object { has_key: false }) => {
                self.out.write_all(&[END_OBJECT])?;
                Ok(())
            }
            Some(Ctx::Object { has_key: true }) => {
                Err(Error::invalid_structure("field name without a value"))
            }
            _ => Err(Error::invalid_structure("end_object without start_object")),
        }
    }

    fn start_array(&mut self) -> Result<(), Error> {
        self.write_value(|out| out.push(START_ARRAY))?;
        self.stack.push(Ctx::Array);
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Ctx::Array) => {
                self.out.write_all(&[END_ARRAY])?;
                Ok(())
            }
            _ => Err(Error::invalid_structure("end_array without start_array")),
        }
    }

    fn field_name(&mut self, name: &str) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(Ctx::Object { has_key }) => {
                if *has_key {
                    return Err(Error::invalid_structure(format!(
                        "field `{name}` follows a field without a value"
                    )));
                }
                *has_key = true;
            }
            _ => {
                return Err(Error::invalid_structure(format!(
                    "field `{name}` outside of an object"
                )));
            }
        }
        self.scratch.clear();
        Self::key(&mut self.scratch, name);
        self.emit()
    }

    fn string(&mut self, value: &str) -> Result<(), Error> {
        self.write_value(|out| Self::text_value(out, value.as_bytes()))
    }

    fn utf8_string(&mut self, value: &[u8]) -> Result<(), Error> {
        self.write_value(|out| Self::text_value(out, value))
    }

    fn int(&mut self, value: i32) -> Result<(), Error> {
        self.write_value(|out| Self::int_value(out, value))
    }

    fn long(&mut self, value: i64) -> Result<(), Error> {
        self.write_value(|out| {
            out.push(INT64);
            write_vint(out, zigzag_encode(value));
        })
    }

    fn float(&mut self, value: f32) -> Result<(), Error> {
        self.write_value(|out| {
            out.push(FLOAT32);
            write_7bit_number(out, u64::from(value.to_bits()), 5);
        })
    }

    fn double(&mut self, value: f64) -> Result<(), Error> {
        self.write_value(|out| {
            out.push(FLOAT64);
            write_7bit_number(out, value.to_bits(), 10);
        })
    }

    fn bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_value(|out| out.push(if value { TRUE } else { FALSE }))
    }

    fn null(&mut self) -> Result<(), Error> {
        self.write_value(|out| out.push(NULL))
    }

    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        self.write_value(|out| {
            out.push(BINARY_7BIT);
            write_vint(out, value.len() as u64);
            write_7bit_binary(out, value);
        })
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }
}
