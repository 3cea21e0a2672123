use crate::{Error, StructuralWriter, Value, write_value};

/// Fluent document construction on top of any [`StructuralWriter`].
///
/// ```
/// use xcontent_core::{ContentBuilder, Value, ValueBuilder};
///
/// let mut builder = ContentBuilder::new(ValueBuilder::new());
/// builder
///     .start_object()?
///     .field("Hello", "World")?
///     .array("author", ["John Doe", "Joe Smith"])?
///     .end_object()?;
/// let value = builder.finish()?.into_value()?;
/// assert_eq!(value.get("Hello"), Some(&Value::from("World")));
/// # Ok::<(), xcontent_core::Error>(())
/// ```
#[derive(Debug)]
pub struct ContentBuilder<W> {
    writer: W,
}

impl<W: StructuralWriter> ContentBuilder<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Open an anonymous object (the document root or an array element).
    pub fn start_object(&mut self) -> Result<&mut Self, Error> {
        self.writer.start_object()?;
        Ok(self)
    }

    /// Open an object under `name`.
    pub fn start_object_field(&mut self, name: &str) -> Result<&mut Self, Error> {
        self.writer.field_name(name)?;
        self.writer.start_object()?;
        Ok(self)
    }

    /// Close the current object.
    pub fn end_object(&mut self) -> Result<&mut Self, Error> {
        self.writer.end_object()?;
        Ok(self)
    }

    /// Open an anonymous array.
    pub fn start_array(&mut self) -> Result<&mut Self, Error> {
        self.writer.start_array()?;
        Ok(self)
    }

    /// Open an array under `name`.
    pub fn start_array_field(&mut self, name: &str) -> Result<&mut Self, Error> {
        self.writer.field_name(name)?;
        self.writer.start_array()?;
        Ok(self)
    }

    /// Close the current array.
    pub fn end_array(&mut self) -> Result<&mut Self, Error> {
        self.writer.end_array()?;
        Ok(self)
    }

    /// Write a member.
    pub fn field(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, Error> {
        self.writer.field_name(name)?;
        write_value(&value.into(), &mut self.writer)?;
        Ok(self)
    }

    /// Write a member whose value is null.
    pub fn null_field(&mut self, name: &str) -> Result<&mut Self, Error> {
        self.writer.field_name(name)?;
        self.writer.null()?;
        Ok(self)
    }

    /// Write an array member.
    pub fn array<V: Into<Value>>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<&mut Self, Error> {
        self.writer.field_name(name)?;
        self.writer.start_array()?;
        for value in values {
            write_value(&value.into(), &mut self.writer)?;
        }
        self.writer.end_array()?;
        Ok(self)
    }

    /// Write a bare value (an array element or the whole document).
    pub fn value(&mut self, value: impl Into<Value>) -> Result<&mut Self, Error> {
        write_value(&value.into(), &mut self.writer)?;
        Ok(self)
    }

    /// Borrow the underlying writer.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W, Error> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
