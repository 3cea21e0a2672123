#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Format-agnostic core of xcontent.
//!
//! Every format crate speaks the same vocabulary:
//!
//! - a [`StructuralReader`] pulls [`Token`]s out of some source (JSON, Smile,
//!   YAML, XML, or an in-memory [`Value`]),
//! - a [`StructuralWriter`] accepts the same events and renders them,
//! - [`copy`] moves one document from a reader to a writer without building
//!   an intermediate tree.
//!
//! [`sniff`] guesses which format a byte prefix is in, and [`ContentBuilder`]
//! offers a fluent API on top of any writer.

mod builder;
mod copy;
mod error;
mod event;
mod format;
mod reader;
pub mod sniff;
mod value;
mod writer;

pub use builder::ContentBuilder;
pub use copy::{copy, copy_current_structure};
pub use error::{Error, ErrorKind};
pub use event::{Scalar, Text, Token};
pub use format::ContentFormat;
pub use reader::StructuralReader;
pub use value::{Value, ValueBuilder, ValueReader, write_value};
pub use writer::{StructuralWriter, WriteOptions};
