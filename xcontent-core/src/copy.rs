//! Format-agnostic tree copier.

use tracing::trace;

use crate::{Error, StructuralReader, StructuralWriter, Token};

/// Copy one document from `reader` to `writer`, then flush the writer.
///
/// An empty source copies nothing. Only the first top-level value is copied.
pub fn copy<'de, R, W>(reader: &mut R, writer: &mut W) -> Result<(), Error>
where
    R: StructuralReader<'de> + ?Sized,
    W: StructuralWriter + ?Sized,
{
    if let Some(token) = reader.next_token()? {
        copy_current_structure(reader, writer, token)?;
    }
    writer.flush()
}

/// Replay the structure that starts with `token`, which the caller has
/// already pulled from `reader`.
///
/// A field name is copied together with its value; an object or array is
/// copied through its matching end event.
pub fn copy_current_structure<'de, R, W>(
    reader: &mut R,
    writer: &mut W,
    token: Token<'de>,
) -> Result<(), Error>
where
    R: StructuralReader<'de> + ?Sized,
    W: StructuralWriter + ?Sized,
{
    trace!(?token, "copy");
    match token {
        Token::FieldName(name) => {
            writer.field_name(&name)?;
            let value = expect_token(reader, "a field value")?;
            copy_current_structure(reader, writer, value)
        }
        Token::StartObject => {
            writer.start_object()?;
            loop {
                match expect_token(reader, "a field name or end of object")? {
                    Token::EndObject => break,
                    token @ Token::FieldName(_) => copy_current_structure(reader, writer, token)?,
                    other => {
                        return Err(Error::invalid_structure(format!(
                            "expected a field name inside an object, got {other:?}"
                        )));
                    }
                }
            }
            writer.end_object()
        }
        Token::StartArray => {
            writer.start_array()?;
            loop {
                match expect_token(reader, "an array element or end of array")? {
                    Token::EndArray => break,
                    token => copy_current_structure(reader, writer, token)?,
                }
            }
            writer.end_array()
        }
        Token::Scalar(scalar) => writer.scalar(&scalar),
        Token::EndObject | Token::EndArray => Err(Error::invalid_structure(format!(
            "unbalanced {token:?} without a matching start"
        ))),
    }
}

fn expect_token<'de, R: StructuralReader<'de> + ?Sized>(
    reader: &mut R,
    expected: &str,
) -> Result<Token<'de>, Error> {
    reader.next_token()?.ok_or_else(|| {
        Error::invalid_structure(format!("unexpected end of input, expected {expected}"))
    })
}
