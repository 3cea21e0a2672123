use std::borrow::Cow;

use crate::{Error, Scalar, Text};

/// Options shared by the text writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Whether to pretty-print with indentation (default: false)
    pub pretty: bool,
    /// Indentation string for pretty-printing (default: "  ")
    pub indent: Cow<'static, str>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: Cow::Borrowed("  "),
        }
    }
}

impl WriteOptions {
    /// Create new default options (compact output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing with default indentation.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Set a custom indentation string (implies pretty-printing).
    pub fn indent(mut self, indent: impl Into<Cow<'static, str>>) -> Self {
        self.indent = indent.into();
        self.pretty = true;
        self
    }
}

/// A push sink for structural events.
///
/// Callers are expected to send a well-formed sequence: every `start_*` has a
/// matching `end_*` and every object member is a `field_name` followed by
/// exactly one value. Writers report violations as
/// [`ErrorKind::InvalidStructure`](crate::ErrorKind::InvalidStructure).
pub trait StructuralWriter {
    /// Begin an object.
    fn start_object(&mut self) -> Result<(), Error>;
    /// End the current object.
    fn end_object(&mut self) -> Result<(), Error>;
    /// Begin an array.
    fn start_array(&mut self) -> Result<(), Error>;
    /// End the current array.
    fn end_array(&mut self) -> Result<(), Error>;
    /// Name the next member of the current object.
    fn field_name(&mut self, name: &str) -> Result<(), Error>;

    /// Write a string value.
    fn string(&mut self, value: &str) -> Result<(), Error>;
    /// Write a 32-bit integer.
    fn int(&mut self, value: i32) -> Result<(), Error>;
    /// Write a 64-bit integer.
    fn long(&mut self, value: i64) -> Result<(), Error>;
    /// Write a 32-bit float.
    fn float(&mut self, value: f32) -> Result<(), Error>;
    /// Write a 64-bit float.
    fn double(&mut self, value: f64) -> Result<(), Error>;
    /// Write a boolean.
    fn bool(&mut self, value: bool) -> Result<(), Error>;
    /// Write a null.
    fn null(&mut self) -> Result<(), Error>;
    /// Write raw bytes.
    fn binary(&mut self, value: &[u8]) -> Result<(), Error>;

    /// Write a string handed over as raw UTF-8.
    ///
    /// Writers that emit UTF-8 override this to skip the decode step.
    fn utf8_string(&mut self, value: &[u8]) -> Result<(), Error> {
        let s = std::str::from_utf8(value)?;
        self.string(s)
    }

    /// Write any scalar, dispatching on its variant.
    fn scalar(&mut self, scalar: &Scalar<'_>) -> Result<(), Error> {
        match scalar {
            Scalar::Null => self.null(),
            Scalar::Bool(b) => self.bool(*b),
            Scalar::Int(n) => self.int(*n),
            Scalar::Long(n) => self.long(*n),
            Scalar::Float(n) => self.float(*n),
            Scalar::Double(n) => self.double(*n),
            Scalar::String(Text::Chars(s)) => self.string(s),
            Scalar::String(Text::Utf8(bytes)) => self.utf8_string(bytes),
            Scalar::Binary(bytes) => self.binary(bytes),
        }
    }

    /// Flush buffered output to the underlying sink.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<W: StructuralWriter + ?Sized> StructuralWriter for &mut W {
    fn start_object(&mut self) -> Result<(), Error> {
        (**self).start_object()
    }
    fn end_object(&mut self) -> Result<(), Error> {
        (**self).end_object()
    }
    fn start_array(&mut self) -> Result<(), Error> {
        (**self).start_array()
    }
    fn end_array(&mut self) -> Result<(), Error> {
        (**self).end_array()
    }
    fn field_name(&mut self, name: &str) -> Result<(), Error> {
        (**self).field_name(name)
    }
    fn string(&mut self, value: &str) -> Result<(), Error> {
        (**self).string(value)
    }
    fn int(&mut self, value: i32) -> Result<(), Error> {
        (**self).int(value)
    }
    fn long(&mut self, value: i64) -> Result<(), Error> {
        (**self).long(value)
    }
    fn float(&mut self, value: f32) -> Result<(), Error> {
        (**self).float(value)
    }
    fn double(&mut self, value: f64) -> Result<(), Error> {
        (**self).double(value)
    }
    fn bool(&mut self, value: bool) -> Result<(), Error> {
        (**self).bool(value)
    }
    fn null(&mut self) -> Result<(), Error> {
        (**self).null()
    }
    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        (**self).binary(value)
    }
    fn utf8_string(&mut self, value: &[u8]) -> Result<(), Error> {
        (**self).utf8_string(value)
    }
    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}

impl<W: StructuralWriter + ?Sized> StructuralWriter for Box<W> {
    fn start_object(&mut self) -> Result<(), Error> {
        (**self).start_object()
    }
    fn end_object(&mut self) -> Result<(), Error> {
        (**self).end_object()
    }
    fn start_array(&mut self) -> Result<(), Error> {
        (**self).start_array()
    }
    fn end_array(&mut self) -> Result<(), Error> {
        (**self).end_array()
    }
    fn field_name(&mut self, name: &str) -> Result<(), Error> {
        (**self).field_name(name)
    }
    fn string(&mut self, value: &str) -> Result<(), Error> {
        (**self).string(value)
    }
    fn int(&mut self, value: i32) -> Result<(), Error> {
        (**self).int(value)
    }
    fn long(&mut self, value: i64) -> Result<(), Error> {
        (**self).long(value)
    }
    fn float(&mut self, value: f32) -> Result<(), Error> {
        (**self).float(value)
    }
    fn double(&mut self, value: f64) -> Result<(), Error> {
        (**self).double(value)
    }
    fn bool(&mut self, value: bool) -> Result<(), Error> {
        (**self).bool(value)
    }
    fn null(&mut self) -> Result<(), Error> {
        (**self).null()
    }
    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        (**self).binary(value)
    }
    fn utf8_string(&mut self, value: &[u8]) -> Result<(), Error> {
        (**self).utf8_string(value)
    }
    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}
