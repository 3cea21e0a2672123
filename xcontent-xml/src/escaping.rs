//! XML escaping utilities.

use std::io::{self, Write};

use crate::chars;

/// Writes text into a `Write`, escaping XML special characters.
///
/// Restricted control characters become character references. Code points
/// that XML cannot carry at all (NUL, U+FFFE, U+FFFF) are replaced by
/// U+FFFD.
pub struct EscapingWriter<'a> {
    inner: &'a mut dyn Write,
    attribute: bool,
}

impl<'a> EscapingWriter<'a> {
    /// Create an escaping writer for text content.
    /// Escapes: `&` `<` `>`
    pub fn text(inner: &'a mut dyn Write) -> Self {
        Self {
            inner,
            attribute: false,
        }
    }

    /// Create an escaping writer for attribute values.
    /// Escapes: `&` `<` `>` `"` and literal tabs and line breaks
    pub fn attribute(inner: &'a mut dyn Write) -> Self {
        Self {
            inner,
            attribute: true,
        }
    }

    /// Write `s`, escaped.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        let mut plain = 0;
        for (i, c) in s.char_indices() {
            let replacement: Option<&[u8]> = match c {
                '&' => Some(b"&amp;"),
                '<' => Some(b"&lt;"),
                '>' => Some(b"&gt;"),
                '"' if self.attribute => Some(b"&quot;"),
                '\t' if self.attribute => Some(b"&#x9;"),
                '\n' if self.attribute => Some(b"&#xa;"),
                '\r' => Some(b"&#xd;"),
                _ => None,
            };
            let code = c as u32;
            let needs_reference = replacement.is_none() && chars::is_control(code);
            let invalid = replacement.is_none() && !needs_reference && !chars::is_valid(code);
            if replacement.is_none() && !needs_reference && !invalid {
                continue;
            }
            self.inner.write_all(&s.as_bytes()[plain..i])?;
            plain = i + c.len_utf8();
            if let Some(bytes) = replacement {
                self.inner.write_all(bytes)?;
            } else if needs_reference {
                write!(self.inner, "&#x{code:x};")?;
            } else {
                self.inner.write_all("\u{FFFD}".as_bytes())?;
            }
        }
        self.inner.write_all(&s.as_bytes()[plain..])
    }
}
