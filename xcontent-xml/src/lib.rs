#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! XML for xcontent.
//!
//! [`XmlWriter`] renders structural events as namespace-qualified XML,
//! [`XmlReader`] reads an XML document back as a tree of fields. Field names
//! that are not legal XML names are escaped with [`name_codec`], and
//! `prefix:local` names are resolved through the [`Params`] of the document.
//!
//! ```
//! use xcontent_core::ContentBuilder;
//! use xcontent_xml::XmlWriter;
//!
//! let mut builder = ContentBuilder::new(XmlWriter::new(Vec::new()));
//! builder.start_object()?.field("Hello", "World")?.end_object()?;
//! let xml = builder.finish()?.finish()?;
//! assert_eq!(
//!     String::from_utf8(xml).unwrap(),
//!     r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><Hello>World</Hello></root>"#
//! );
//! # Ok::<(), xcontent_core::Error>(())
//! ```

pub mod chars;
mod escaping;
pub mod name_codec;
mod namespace;
mod reader;
mod writer;

pub use escaping::EscapingWriter;
pub use namespace::{
    ES_NAMESPACE, NamespaceContext, Params, QName, WELL_KNOWN_NAMESPACES, resolve_field_name,
};
pub use reader::XmlReader;
pub use writer::{CONTEXT_FIELD, TEXT_FIELD, XmlWriter};
