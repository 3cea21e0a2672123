//! Error type shared by every reader, writer and conversion.

use std::fmt::{self, Display};
use std::io;
use std::str::Utf8Error;

use crate::ContentFormat;

/// Error raised while sniffing, reading or writing structured content.
#[derive(Debug)]
pub struct Error {
    /// The specific kind of error
    pub kind: ErrorKind,
    /// Byte offset into the source, when the reader knows it
    pub offset: Option<usize>,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {offset}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::InvalidUtf8(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    /// Create an error without offset information
    pub const fn new(kind: ErrorKind) -> Self {
        Error { kind, offset: None }
    }

    /// Attach a byte offset
    pub const fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// A qualified name used a prefix nobody bound.
    pub fn unknown_prefix(prefix: impl Into<String>) -> Self {
        Error::new(ErrorKind::UnknownNamespacePrefix {
            prefix: prefix.into(),
        })
    }

    /// The source tokenizer rejected its input.
    pub fn malformed(format: ContentFormat, message: impl Into<String>) -> Self {
        Error::new(ErrorKind::MalformedSource {
            format,
            message: message.into(),
        })
    }

    /// Events arrived in an order the writer cannot honor.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidStructure(message.into()))
    }

    /// The underlying kind
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::new(ErrorKind::Io(err))
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::new(ErrorKind::InvalidUtf8(err))
    }
}

/// Specific error kinds
#[derive(Debug)]
pub enum ErrorKind {
    /// A `prefix:local` name referenced a prefix absent from the namespace context
    UnknownNamespacePrefix {
        /// The unbound prefix
        prefix: String,
    },
    /// Sniffing found no known format within its lookahead window
    UndeterminedFormat,
    /// The per-format tokenizer reported a structural or lexical error
    MalformedSource {
        /// Format whose tokenizer failed
        format: ContentFormat,
        /// Tokenizer message
        message: String,
    },
    /// Raw text claimed to be UTF-8 but was not
    InvalidUtf8(Utf8Error),
    /// Writer received an event sequence it cannot render
    InvalidStructure(String),
    /// The underlying byte stream failed
    Io(io::Error),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownNamespacePrefix { prefix } => {
                write!(f, "unknown namespace prefix: {prefix}")
            }
            ErrorKind::UndeterminedFormat => write!(f, "cannot derive content type"),
            ErrorKind::MalformedSource { format, message } => {
                write!(f, "malformed {format} content: {message}")
            }
            ErrorKind::InvalidUtf8(err) => write!(f, "invalid UTF-8 sequence: {err}"),
            ErrorKind::InvalidStructure(message) => write!(f, "invalid structure: {message}"),
            ErrorKind::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl ErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownNamespacePrefix { .. } => "xcontent::unknown_namespace_prefix",
            ErrorKind::UndeterminedFormat => "xcontent::undetermined_format",
            ErrorKind::MalformedSource { .. } => "xcontent::malformed_source",
            ErrorKind::InvalidUtf8(_) => "xcontent::invalid_utf8",
            ErrorKind::InvalidStructure(_) => "xcontent::invalid_structure",
            ErrorKind::Io(_) => "xcontent::io",
        }
    }
}
