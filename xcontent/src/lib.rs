#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Structured content in, structured content out.
//!
//! xcontent reads JSON, Smile, YAML and XML into one stream of structural
//! events and writes that stream back out in any of those formats. The XML
//! side is namespace-aware: field names such as `dc:title` are resolved
//! against a namespace context, names that are not legal XML are escaped
//! ISO 9075 style (`_xHHHH_`), and `@context` objects declare namespaces
//! while the document is being written.
//!
//! ```
//! use xcontent::{Params, convert_to_xml};
//!
//! let xml = convert_to_xml(Params::default(), br#"{"Hello":"World"}"#, false)?;
//! assert_eq!(
//!     xml,
//!     r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><Hello>World</Hello></root>"#
//! );
//! # Ok::<(), xcontent::Error>(())
//! ```
//!
//! The per-format crates are re-exported as [`json`], [`smile`], [`xml`] and
//! [`yaml`]; everything from `xcontent-core` is available at the top level.

mod config;
mod convert;

pub use config::WriterConfig;
pub use convert::{
    convert_to_json, convert_to_map, convert_to_xml, copy_stream, create_reader, json_builder,
    make_reader, make_writer, xml_builder,
};

pub use xcontent_core::*;
pub use xcontent_json as json;
pub use xcontent_json::{JsonReader, JsonWriter};
pub use xcontent_smile as smile;
pub use xcontent_smile::{SmileReader, SmileWriter};
pub use xcontent_xml as xml;
pub use xcontent_xml::{NamespaceContext, Params, QName, XmlReader, XmlWriter};
pub use xcontent_yaml as yaml;
pub use xcontent_yaml::{YamlReader, YamlWriter};
