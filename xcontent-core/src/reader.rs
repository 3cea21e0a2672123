use crate::{ContentFormat, Error, Token};

/// A pull source of structural events.
///
/// Readers yield `Ok(None)` once the document is exhausted. Tokens may borrow
/// from the reader's input for `'de`.
pub trait StructuralReader<'de> {
    /// Pull the next event.
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error>;

    /// The format this reader decodes, if it decodes one.
    fn format(&self) -> Option<ContentFormat> {
        None
    }
}

impl<'de, R: StructuralReader<'de> + ?Sized> StructuralReader<'de> for &mut R {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error> {
        (**self).next_token()
    }

    fn format(&self) -> Option<ContentFormat> {
        (**self).format()
    }
}

impl<'de, R: StructuralReader<'de> + ?Sized> StructuralReader<'de> for Box<R> {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error> {
        (**self).next_token()
    }

    fn format(&self) -> Option<ContentFormat> {
        (**self).format()
    }
}
