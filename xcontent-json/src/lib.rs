#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! JSON for xcontent.
//!
//! [`JsonReader`] pulls structural events out of a JSON byte slice and
//! [`JsonWriter`] renders them, compact or pretty.
//!
//! ```
//! use xcontent_core::copy;
//! use xcontent_json::{JsonReader, JsonWriter};
//!
//! let mut reader = JsonReader::new(br#"{ "a" : [1, 2.5, "x"] }"#);
//! let mut writer = JsonWriter::new(Vec::new());
//! copy(&mut reader, &mut writer)?;
//! assert_eq!(writer.into_inner(), br#"{"a":[1,2.5,"x"]}"#);
//! # Ok::<(), xcontent_core::Error>(())
//! ```

mod reader;
mod scanner;
mod writer;

pub use reader::JsonReader;
pub use writer::JsonWriter;
