use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use xcontent_core::{Error, StructuralWriter, WriteOptions};

#[derive(Debug, Clone, Copy)]
enum Ctx {
    Object { first: bool, has_key: bool },
    Array { first: bool },
}

/// Writes structural events as JSON text.
///
/// Binary values are written as base64 strings. Non-finite floats have no
/// JSON literal and are written as the strings `"NaN"`, `"Infinity"` and
/// `"-Infinity"`.
pub struct JsonWriter<W: Write> {
    out: W,
    stack: Vec<Ctx>,
    options: WriteOptions,
    wrote_root: bool,
}

impl<W: Write> JsonWriter<W> {
    /// Compact output.
    pub fn new(out: W) -> Self {
        Self::with_options(out, WriteOptions::default())
    }

    /// Output with the given formatting options.
    pub fn with_options(out: W, options: WriteOptions) -> Self {
        Self {
            out,
            stack: Vec::new(),
            options,
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

    /// Return the sink without any checks.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_indent(&mut self) -> Result<(), Error> {
        if self.options.pretty {
            self.out.write_all(b"\n")?;
            for _ in 0..self.stack.len() {
                self.out.write_all(self.options.indent.as_bytes())?;
            }
        }
        Ok(())
    }

    fn before_value(&mut self) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(Ctx::Array { first }) => {
                let separate = !*first;
                *first = false;
                if separate {
                    self.out.write_all(b",")?;
                }
                self.write_indent()?;
            }
            Some(Ctx::Object { has_key, .. }) => {
                if !*has_key {
                    return Err(Error::invalid_structure("object value without a field name"));
                }
                *has_key = false;
            }
            None => {
                if self.wrote_root {
                    return Err(Error::invalid_structure("document already complete"));
                }
                self.wrote_root = true;
            }
        }
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<(), Error> {
        self.out.write_all(b"\"")?;
        let bytes = s.as_bytes();
        let mut plain = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let escape: Option<&[u8]> = match b {
                b'"' => Some(b"\\\""),
                b'\\' => Some(b"\\\\"),
                b'\n' => Some(b"\\n"),
                b'\r' => Some(b"\\r"),
                b'\t' => Some(b"\\t"),
                0x08 => Some(b"\\b"),
                0x0c => Some(b"\\f"),
                0x00..=0x1f | 0x7f => None,
                _ => continue,
            };
            self.out.write_all(&bytes[plain..i])?;
            match escape {
                Some(escape) => self.out.write_all(escape)?,
                None => write!(self.out, "\\u{:04x}", b)?,
            }
            plain = i + 1;
        }
        self.out.write_all(&bytes[plain..])?;
        self.out.write_all(b"\"")?;
        Ok(())
    }

    fn write_raw(&mut self, text: &str) -> Result<(), Error> {
        self.before_value()?;
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_float(&mut self, repr: String, value: f64) -> Result<(), Error> {
        if value.is_nan() {
            self.string("NaN")
        } else if value.is_infinite() {
            self.string(if value > 0.0 { "Infinity" } else { "-Infinity" })
        } else if repr.contains(['.', 'e', 'E']) {
            self.write_raw(&repr)
        } else {
            self.write_raw(&(repr + ".0"))
        }
    }
}

impl<W: Write> StructuralWriter for JsonWriter<W> {
    fn start_object(&mut self) -> Result<(), Error> {
        self.before_value()?;
        self.out.write_all(b"{")?;
        self.stack.push(Ctx::Object {
            first: true,
            has_key: false,
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Ctx::Object {
                first,
                has_key: false,
            }) => {
                if !first {
                    self.write_indent()?;
                }
                self.out.write_all(b"}")?;
                Ok(())
            }
            Some(Ctx::Object { has_key: true, .. }) => {
                Err(Error::invalid_structure("field name without a value"))
            }
            _ => Err(Error::invalid_structure("end_object without start_object")),
        }
    }

    fn start_array(&mut self) -> Result<(), Error> {
        self.before_value()?;
        self.out.write_all(b"[")?;
        self.stack.push(Ctx::Array { first: true });
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Ctx::Array { first }) => {
                if !first {
                    self.write_indent()?;
                }
                self.out.write_all(b"]")?;
                Ok(())
            }
            _ => Err(Error::invalid_structure("end_array without start_array")),
        }
    }

    fn field_name(&mut self, name: &str) -> Result<(), Error> {
        let separate = match self.stack.last_mut() {
            Some(Ctx::Object { first, has_key }) => {
                if *has_key {
                    return Err(Error::invalid_structure(format!(
                        "field `{name}` follows a field without a value"
                    )));
                }
                let separate = !*first;
                *first = false;
                *has_key = true;
                separate
            }
            _ => {
                return Err(Error::invalid_structure(format!(
                    "field `{name}` outside of an object"
                )));
            }
        };
        if separate {
            self.out.write_all(b",")?;
        }
        self.write_indent()?;
        self.write_string(name)?;
        self.out
            .write_all(if self.options.pretty { &b": "[..] } else { &b":"[..] })?;
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<(), Error> {
        self.before_value()?;
        self.write_string(value)
    }

    fn int(&mut self, value: i32) -> Result<(), Error> {
        self.write_raw(&value.to_string())
    }

    fn long(&mut self, value: i64) -> Result<(), Error> {
        self.write_raw(&value.to_string())
    }

    fn float(&mut self, value: f32) -> Result<(), Error> {
        self.write_float(value.to_string(), f64::from(value))
    }

    fn double(&mut self, value: f64) -> Result<(), Error> {
        self.write_float(value.to_string(), value)
    }

    fn bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_raw(if value { "true" } else { "false" })
    }

    fn null(&mut self) -> Result<(), Error> {
        self.write_raw("null")
    }

    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        let encoded = STANDARD.encode(value);
        self.string(&encoded)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }
}
