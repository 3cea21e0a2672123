//! XML to structural events.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::BufRead;

use quick_xml::NsReader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use tracing::trace;
use xcontent_core::{ContentFormat, Error, Scalar, StructuralReader, Text, Token};

use crate::name_codec;
use crate::writer::TEXT_FIELD;

/// Reads an XML document as a tree.
///
/// The root element is the top-level object; its own name is dropped.
///
/// - Attributes become `@name` fields (`@prefix:name` when the attribute is
///   outside the root element's namespace). Namespace declarations are not
///   reported.
/// - A child holding only text becomes a string field, `<a/>` becomes null
///   and `<a></a>` the empty string.
/// - A child with attributes or child elements becomes an object. Text mixed
///   with child elements is reported, trimmed, as a `#text` field;
///   whitespace between elements is dropped.
/// - Repeated children become repeated field names.
///
/// Names are decoded with [`name_codec::decode`].
pub struct XmlReader<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    queue: VecDeque<Token<'static>>,
    root_namespace: Option<String>,
    started: bool,
    done: bool,
    depth: usize,
    pending: Option<String>,
    text: String,
}

struct ElementStart {
    name: String,
    attributes: Vec<(String, String)>,
}

impl<R: BufRead> XmlReader<R> {
    /// Read from a buffered source.
    pub fn new(input: R) -> Self {
        Self {
            reader: NsReader::from_reader(input),
            buf: Vec::new(),
            queue: VecDeque::new(),
            root_namespace: None,
            started: false,
            done: false,
            depth: 0,
            pending: None,
            text: String::new(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::malformed(ContentFormat::Xml, message).at(self.reader.buffer_position() as usize)
    }

    fn name_in_document(&self, namespace: Option<&str>, qualified: &[u8], local: &[u8]) -> Result<String, Error> {
        let in_root = namespace.is_some() && namespace == self.root_namespace.as_deref();
        let raw = if in_root || namespace.is_none() { local } else { qualified };
        let raw = std::str::from_utf8(raw)?;
        Ok(match raw.split_once(':') {
            Some((prefix, local)) => format!("{prefix}:{}", name_codec::decode(local)),
            None => name_codec::decode(raw).into_owned(),
        })
    }

    fn element_start(&self, namespace: Option<&str>, e: &BytesStart<'_>) -> Result<ElementStart, Error> {
        let name = self.name_in_document(namespace, e.name().as_ref(), e.local_name().as_ref())?;
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.malformed(err.to_string()))?;
            let key = attr.key;
            if key.as_ref() == b"xmlns" {
                continue;
            }
            if let Some(prefix) = key.prefix()
                && prefix.as_ref() == b"xmlns"
            {
                continue;
            }
            let (resolve, _) = self.reader.resolver().resolve_attribute(key);
            let attr_namespace = bound_namespace(resolve);
            let attr_name = self.name_in_document(
                attr_namespace.as_deref(),
                key.as_ref(),
                key.local_name().as_ref(),
            )?;
            let value = attr
                .unescape_value()
                .map_err(|err| self.malformed(err.to_string()))?;
            attributes.push((format!("@{attr_name}"), value.into_owned()));
        }
        Ok(ElementStart { name, attributes })
    }

    fn push_field(&mut self, name: String, value: Scalar<'static>) {
        self.queue.push_back(Token::FieldName(Cow::Owned(name)));
        self.queue.push_back(Token::Scalar(value));
    }

    fn push_attributes(&mut self, attributes: Vec<(String, String)>) {
        for (name, value) in attributes {
            self.push_field(name, Scalar::String(Text::from(value)));
        }
    }

    /// The pending child turned out to have children: report it as an object.
    fn promote_pending(&mut self) {
        if let Some(name) = self.pending.take() {
            self.queue.push_back(Token::FieldName(Cow::Owned(name)));
            self.queue.push_back(Token::StartObject);
            self.depth += 1;
        }
    }

    fn flush_mixed_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.push_field(TEXT_FIELD.to_owned(), Scalar::String(Text::from(trimmed.to_owned())));
        }
    }

    fn on_start(&mut self, start: ElementStart, empty: bool) {
        if !self.started {
            self.started = true;
            self.queue.push_back(Token::StartObject);
            self.push_attributes(start.attributes);
            if empty {
                self.queue.push_back(Token::EndObject);
                self.done = true;
            } else {
                self.depth = 1;
            }
            return;
        }

        self.promote_pending();
        self.flush_mixed_text();

        match (start.attributes.is_empty(), empty) {
            (true, true) => self.push_field(start.name, Scalar::Null),
            (true, false) => self.pending = Some(start.name),
            (false, _) => {
                self.queue.push_back(Token::FieldName(Cow::Owned(start.name)));
                self.queue.push_back(Token::StartObject);
                self.push_attributes(start.attributes);
                if empty {
                    self.queue.push_back(Token::EndObject);
                } else {
                    self.depth += 1;
                }
            }
        }
    }

    fn on_end(&mut self) {
        if let Some(name) = self.pending.take() {
            let text = std::mem::take(&mut self.text);
            self.push_field(name, Scalar::String(Text::from(text)));
            return;
        }
        self.flush_mixed_text();
        self.queue.push_back(Token::EndObject);
        self.depth -= 1;
        if self.depth == 0 {
            self.done = true;
        }
    }

    fn on_text(&mut self, text: &str) {
        if self.started && !self.done {
            self.text.push_str(text);
        }
    }

    fn read_event(&mut self) -> Result<(), Error> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        let (resolve, event) = self
            .reader
            .read_resolved_event_into(&mut buf)
            .map_err(|err| Error::malformed(ContentFormat::Xml, err.to_string()))?;
        let namespace = bound_namespace(resolve);

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let empty = matches!(event, Event::Empty(_));
                if !self.started {
                    self.root_namespace = namespace.clone();
                }
                let start = self.element_start(namespace.as_deref(), e)?;
                trace!(name = %start.name, attributes = start.attributes.len(), empty, "element");
                self.on_start(start, empty);
            }
            Event::End(_) => self.on_end(),
            Event::Text(e) => {
                let text = e.decode().map_err(|err| self.malformed(err.to_string()))?;
                self.on_text(&text);
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?.to_owned();
                self.on_text(&text);
            }
            Event::GeneralRef(e) => {
                let raw = e.decode().map_err(|err| self.malformed(err.to_string()))?;
                let resolved = self.resolve_entity(&raw)?;
                self.on_text(&resolved);
            }
            Event::Eof => {
                if !self.done {
                    if self.started {
                        return Err(self.malformed("unexpected end of document"));
                    }
                    self.done = true;
                }
            }
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
        self.buf = buf;
        Ok(())
    }

    fn resolve_entity(&self, raw: &str) -> Result<String, Error> {
        if let Some(resolved) = resolve_xml_entity(raw) {
            return Ok(resolved.into());
        }
        if let Some(rest) = raw.strip_prefix('#') {
            let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => rest.parse::<u32>().ok(),
            };
            return code
                .and_then(char::from_u32)
                .map(String::from)
                .ok_or_else(|| self.malformed(format!("invalid character reference &{raw};")));
        }
        Err(self.malformed(format!("unknown entity &{raw};")))
    }
}

fn bound_namespace(resolve: ResolveResult<'_>) -> Option<String> {
    match resolve {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

impl<'de, R: BufRead> StructuralReader<'de> for XmlReader<R> {
    fn next_token(&mut self) -> Result<Option<Token<'de>>, Error> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Ok(Some(token));
            }
            if self.done {
                return Ok(None);
            }
            self.read_event()?;
        }
    }

    fn format(&self) -> Option<ContentFormat> {
        Some(ContentFormat::Xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcontent_core::{Value, ValueBuilder, copy};

    fn read(xml: &str) -> Value {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut builder = ValueBuilder::new();
        copy(&mut reader, &mut builder).unwrap();
        builder.into_value().unwrap()
    }

    #[test]
    fn text_children_become_strings() {
        let value = read(r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><Hello>World</Hello></root>"#);
        assert_eq!(value, Value::object([("Hello", "World")]));
    }

    #[test]
    fn empty_and_null_children() {
        let value = read("<root><a/><b></b></root>");
        assert_eq!(
            value,
            Value::object([("a", Value::Null), ("b", Value::from(""))])
        );
    }

    #[test]
    fn entities_and_cdata_are_text() {
        let value = read("<root><a>x &amp; y</a><b><![CDATA[<raw>]]></b><c>&#x41;</c></root>");
        assert_eq!(
            value,
            Value::object([("a", "x & y"), ("b", "<raw>"), ("c", "A")])
        );
    }

    #[test]
    fn mixed_content_is_reported_as_text_field() {
        let value = read("<root><p>before <b>bold</b></p></root>");
        assert_eq!(
            value,
            Value::object([(
                "p",
                Value::object([("#text", "before"), ("b", "bold")])
            )])
        );
    }

    #[test]
    fn truncated_document_is_malformed() {
        let mut reader = XmlReader::new("<root><a>".as_bytes());
        let mut builder = ValueBuilder::new();
        assert!(copy(&mut reader, &mut builder).is_err());
    }
}
