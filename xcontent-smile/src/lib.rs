#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Smile, the binary JSON encoding, for xcontent.
//!
//! A Smile document starts with the magic `:)\n` followed by a flags byte.
//! [`SmileWriter`] writes flags `0x00`: no shared names or values, binary
//! data in the 7-bit safe encoding. [`SmileReader`] accepts every flag
//! combination and resolves shared name and value back references.
//!
//! ```
//! use xcontent_core::{ContentBuilder, ValueBuilder, copy};
//! use xcontent_smile::{SmileReader, SmileWriter};
//!
//! let mut builder = ContentBuilder::new(SmileWriter::new(Vec::new()));
//! builder.start_object()?.field("a", 1)?.end_object()?;
//! let bytes = builder.finish()?.finish()?;
//! assert_eq!(bytes, b":)\n\x00\xfa\x80a\xc2\xfb");
//!
//! let mut reader = SmileReader::new(&bytes);
//! let mut value = ValueBuilder::new();
//! copy(&mut reader, &mut value)?;
//! # Ok::<(), xcontent_core::Error>(())
//! ```

mod codec;
mod reader;
mod writer;

pub use reader::SmileReader;
pub use writer::SmileWriter;
