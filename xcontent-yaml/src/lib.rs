#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! YAML for xcontent.
//!
//! [`YamlReader`] translates `saphyr-parser` events into structural tokens;
//! [`YamlWriter`] renders tokens as block-style YAML.
//!
//! ```
//! use xcontent_core::copy;
//! use xcontent_yaml::{YamlReader, YamlWriter};
//!
//! let mut reader = YamlReader::new("{name: x, tags: [a, b]}");
//! let mut writer = YamlWriter::new(Vec::new());
//! copy(&mut reader, &mut writer)?;
//! assert_eq!(writer.finish()?, b"---\nname: x\ntags:\n  - a\n  - b\n");
//! # Ok::<(), xcontent_core::Error>(())
//! ```
//!
//! Plain scalars are typed the way the writer expects to read them back:
//! `null`/`~`, booleans (`true`, `yes`, `on`, ...), integers, floats and
//! `.inf`/`.nan`. Quoted and block scalars are always strings.

mod reader;
mod typing;
mod writer;

pub use reader::YamlReader;
pub use writer::YamlWriter;
