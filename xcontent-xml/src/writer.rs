//! Structural events to namespace-qualified XML.

use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, trace};
use xcontent_core::{Error, StructuralWriter, WriteOptions};

use crate::chars;
use crate::escaping::EscapingWriter;
use crate::namespace::{Params, QName, resolve_field_name};

/// Field name that starts a block of namespace declarations.
pub const CONTEXT_FIELD: &str = "@context";

/// Field name whose value becomes the text content of the current element.
pub const TEXT_FIELD: &str = "#text";

#[derive(Debug, Clone)]
enum FieldKind {
    Element(QName),
    Attribute(QName),
    Text,
    /// A member of an `@context` block; the name is a prefix to declare.
    Declaration(String),
}

#[derive(Debug)]
enum Frame {
    Object,
    Array(FieldKind),
}

#[derive(Debug)]
struct OpenElement {
    tag: String,
    namespaces: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    start_written: bool,
    has_children: bool,
}

impl OpenElement {
    fn new(tag: String) -> Self {
        Self {
            tag,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            start_written: false,
            has_children: false,
        }
    }

    fn declares(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Writes structural events as XML.
///
/// The first object becomes the root element named by [`Params::root`],
/// carrying a default namespace declaration and one `xmlns:prefix` per
/// binding of the namespace context. Every later object or scalar is an
/// element named by the preceding field name. `@name` fields with scalar
/// values become attributes, arrays repeat the element they are named by,
/// and `@context` blocks declare namespaces while the document is written.
#[derive(Debug)]
pub struct XmlWriter<W: Write> {
    out: W,
    params: Params,
    options: WriteOptions,
    xml_declaration: bool,
    started: bool,
    finished: bool,
    stack: Vec<Frame>,
    open: Vec<OpenElement>,
    field: Option<FieldKind>,
    in_context: bool,
}

impl<W: Write> XmlWriter<W> {
    /// Compact output with default [`Params`].
    pub fn new(out: W) -> Self {
        Self::with_params(out, Params::default())
    }

    /// Compact output with the given root and namespaces.
    pub fn with_params(out: W, params: Params) -> Self {
        Self {
            out,
            params,
            options: WriteOptions::default(),
            xml_declaration: false,
            started: false,
            finished: false,
            stack: Vec::new(),
            open: Vec::new(),
            field: None,
            in_context: false,
        }
    }

    /// Set formatting options.
    pub fn options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` before the root.
    pub fn xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    /// Root and bindings, including any added by `@context` blocks so far.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Flush and return the sink. Fails if the root element is still open.
    pub fn finish(mut self) -> Result<W, Error> {
        if self.started && !self.finished {
            return Err(Error::invalid_structure(format!(
                "{} element(s) still open",
                self.open.len()
            )));
        }
        self.out.flush()?;
        Ok(self.out)
    }

    /// Return the sink without any checks.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn newline(&mut self, depth: usize) -> Result<(), Error> {
        self.out.write_all(b"\n")?;
        for _ in 0..depth {
            self.out.write_all(self.options.indent.as_bytes())?;
        }
        Ok(())
    }

    fn write_start_tag(out: &mut W, element: &OpenElement, self_closing: bool) -> Result<(), Error> {
        write!(out, "<{}", element.tag)?;
        for (prefix, uri) in &element.namespaces {
            if prefix.is_empty() {
                out.write_all(b" xmlns=\"")?;
            } else {
                write!(out, " xmlns:{prefix}=\"")?;
            }
            EscapingWriter::attribute(&mut *out).write_str(uri)?;
            out.write_all(b"\"")?;
        }
        for (name, value) in &element.attributes {
            write!(out, " {name}=\"")?;
            EscapingWriter::attribute(&mut *out).write_str(value)?;
            out.write_all(b"\"")?;
        }
        out.write_all(if self_closing { &b"/>"[..] } else { &b">"[..] })?;
        Ok(())
    }

    /// Write the innermost element's start tag if it is still deferred.
    fn flush_start(&mut self) -> Result<(), Error> {
        if let Some(element) = self.open.last_mut() {
            if !element.start_written {
                Self::write_start_tag(&mut self.out, element, false)?;
                element.start_written = true;
            }
        }
        Ok(())
    }

    fn before_child(&mut self) -> Result<(), Error> {
        self.flush_start()?;
        if let Some(parent) = self.open.last_mut() {
            parent.has_children = true;
        }
        if self.options.pretty && !self.open.is_empty() {
            self.newline(self.open.len())?;
        }
        Ok(())
    }

    fn in_scope(&self, prefix: &str, uri: &str) -> bool {
        for element in self.open.iter().rev() {
            if let Some(bound) = element.declares(prefix) {
                return bound == uri;
            }
        }
        prefix.is_empty() && uri.is_empty()
    }

    /// Qualified element name, plus the declaration it needs if its prefix is
    /// not bound to its URI in scope.
    fn element_name(&self, qname: &QName) -> (String, Option<(String, String)>) {
        if qname.namespace_uri == self.params.root().namespace_uri || qname.prefix.is_empty() {
            return (qname.local_name.clone(), None);
        }
        let tag = format!("{}:{}", qname.prefix, qname.local_name);
        if self.in_scope(&qname.prefix, &qname.namespace_uri) {
            (tag, None)
        } else {
            (tag, Some((qname.prefix.clone(), qname.namespace_uri.clone())))
        }
    }

    fn open_root(&mut self) -> Result<(), Error> {
        if self.xml_declaration {
            self.out
                .write_all(br#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        }
        let root = self.params.root();
        let mut element = OpenElement::new(root.local_name.clone());
        if !root.namespace_uri.is_empty() {
            element
                .namespaces
                .push((String::new(), root.namespace_uri.clone()));
        }
        for (prefix, uri) in self.params.namespaces().iter() {
            if !prefix.is_empty() {
                element.namespaces.push((prefix.to_owned(), uri.to_owned()));
            }
        }
        debug!(root = %root, declarations = element.namespaces.len(), "open root");
        if self.options.pretty && self.xml_declaration {
            self.newline(0)?;
        }
        self.open.push(element);
        self.started = true;
        Ok(())
    }

    fn open_element(&mut self, qname: &QName) -> Result<(), Error> {
        let (tag, declaration) = self.element_name(qname);
        self.before_child()?;
        let mut element = OpenElement::new(tag);
        element.namespaces.extend(declaration);
        self.open.push(element);
        Ok(())
    }

    fn close_element(&mut self) -> Result<(), Error> {
        let Some(element) = self.open.pop() else {
            return Err(Error::invalid_structure("no open element to close"));
        };
        if !element.start_written {
            Self::write_start_tag(&mut self.out, &element, true)?;
        } else {
            if self.options.pretty && element.has_children {
                self.newline(self.open.len())?;
            }
            write!(self.out, "</{}>", element.tag)?;
        }
        Ok(())
    }

    fn leaf_element(&mut self, qname: &QName, text: Option<&str>) -> Result<(), Error> {
        self.open_element(qname)?;
        if let Some(text) = text {
            self.flush_start()?;
            EscapingWriter::text(&mut self.out).write_str(text)?;
        }
        self.close_element()
    }

    fn attribute(&mut self, qname: &QName, value: Option<&str>) -> Result<(), Error> {
        let Some(value) = value else {
            return Ok(());
        };
        let name = if qname.prefix.is_empty() {
            qname.local_name.clone()
        } else {
            format!("{}:{}", qname.prefix, qname.local_name)
        };
        let needs_declaration =
            !qname.prefix.is_empty() && !self.in_scope(&qname.prefix, &qname.namespace_uri);
        let Some(element) = self.open.last_mut() else {
            return Err(Error::invalid_structure("attribute outside of an element"));
        };
        // the start tag is gone or already carries this name
        if element.start_written || element.attributes.iter().any(|(n, _)| *n == name) {
            trace!(name, "attribute written as an element");
            return self.leaf_element(qname, Some(value));
        }
        if needs_declaration {
            element
                .namespaces
                .push((qname.prefix.clone(), qname.namespace_uri.clone()));
        }
        element.attributes.push((name, value.to_owned()));
        Ok(())
    }

    fn text(&mut self, value: Option<&str>) -> Result<(), Error> {
        let Some(value) = value else {
            return Ok(());
        };
        self.flush_start()?;
        EscapingWriter::text(&mut self.out).write_str(value)?;
        Ok(())
    }

    /// Bind `prefix` for the rest of the document and declare it on the
    /// innermost element whose start tag is still open.
    fn declare(&mut self, prefix: &str, uri: &str) {
        debug!(prefix, uri, "namespace declared by @context");
        self.params.namespaces_mut().add_namespace(prefix, uri);
        if prefix.is_empty() || !chars::is_valid_ncname(prefix) {
            return;
        }
        match self.open.last_mut() {
            Some(element) if !element.start_written && element.declares(prefix).is_none() => {
                element.namespaces.push((prefix.to_owned(), uri.to_owned()));
            }
            _ => trace!(prefix, "declaration not emitted, start tag already written"),
        }
    }

    fn resolve(&self, name: &str) -> Result<QName, Error> {
        resolve_field_name(name, &self.params)
    }

    /// The field a value is written under: the pending field name, or the
    /// name of the array being written.
    fn take_target(&mut self) -> Result<FieldKind, Error> {
        if self.finished {
            return Err(Error::invalid_structure("document already complete"));
        }
        if !self.started {
            return Err(Error::invalid_structure(
                "the document root must be an object",
            ));
        }
        match self.stack.last() {
            Some(Frame::Array(kind)) => Ok(kind.clone()),
            Some(Frame::Object) => self
                .field
                .take()
                .ok_or_else(|| Error::invalid_structure("object value without a field name")),
            None => Err(Error::invalid_structure("value outside of the root object")),
        }
    }

    fn scalar_value(&mut self, value: Option<&str>, is_string: bool) -> Result<(), Error> {
        match self.take_target()? {
            FieldKind::Element(qname) => self.leaf_element(&qname, value),
            FieldKind::Attribute(qname) => self.attribute(&qname, value),
            FieldKind::Text => self.text(value),
            FieldKind::Declaration(prefix) => match value {
                Some(uri) if is_string => {
                    let qname = self.resolve(&prefix)?;
                    self.attribute(&qname, Some(uri))?;
                    self.declare(&prefix, uri);
                    Ok(())
                }
                _ => {
                    let qname = self.resolve(&prefix)?;
                    self.leaf_element(&qname, value)
                }
            },
        }
    }

    fn container_element(&mut self, kind: FieldKind) -> Result<(), Error> {
        let qname = match kind {
            FieldKind::Element(qname) | FieldKind::Attribute(qname) => qname,
            FieldKind::Declaration(name) => self.resolve(&name)?,
            FieldKind::Text => {
                return Err(Error::invalid_structure(format!(
                    "`{TEXT_FIELD}` must hold a scalar"
                )));
            }
        };
        self.open_element(&qname)
    }
}

fn format_float(repr: String, value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        (if value > 0.0 { "INF" } else { "-INF" }).to_owned()
    } else if repr.contains(['.', 'e', 'E']) {
        repr
    } else {
        repr + ".0"
    }
}

impl<W: Write> StructuralWriter for XmlWriter<W> {
    fn start_object(&mut self) -> Result<(), Error> {
        if !self.started {
            self.open_root()?;
        } else {
            let kind = self.take_target()?;
            self.container_element(kind)?;
        }
        self.stack.push(Frame::Object);
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Frame::Object) => {}
            _ => return Err(Error::invalid_structure("end_object without start_object")),
        }
        if self.field.take().is_some() {
            return Err(Error::invalid_structure("field name without a value"));
        }
        self.in_context = false;
        self.close_element()?;
        if self.stack.is_empty() {
            self.finished = true;
        }
        Ok(())
    }

    fn start_array(&mut self) -> Result<(), Error> {
        let kind = match self.take_target()? {
            FieldKind::Attribute(qname) => FieldKind::Element(qname),
            kind => kind,
        };
        self.stack.push(Frame::Array(kind));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Frame::Array(_)) => Ok(()),
            _ => Err(Error::invalid_structure("end_array without start_array")),
        }
    }

    fn field_name(&mut self, name: &str) -> Result<(), Error> {
        if !matches!(self.stack.last(), Some(Frame::Object)) {
            return Err(Error::invalid_structure(format!(
                "field `{name}` outside of an object"
            )));
        }
        if self.field.is_some() {
            return Err(Error::invalid_structure(format!(
                "field `{name}` follows a field without a value"
            )));
        }
        if !self.in_context {
            self.in_context = name == CONTEXT_FIELD;
        }
        let kind = if name == TEXT_FIELD {
            FieldKind::Text
        } else if name.starts_with('@') {
            FieldKind::Attribute(self.resolve(name)?)
        } else if self.in_context {
            FieldKind::Declaration(name.to_owned())
        } else {
            FieldKind::Element(self.resolve(name)?)
        };
        trace!(name, ?kind, "field");
        self.field = Some(kind);
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<(), Error> {
        self.scalar_value(Some(value), true)
    }

    fn int(&mut self, value: i32) -> Result<(), Error> {
        self.scalar_value(Some(&value.to_string()), false)
    }

    fn long(&mut self, value: i64) -> Result<(), Error> {
        self.scalar_value(Some(&value.to_string()), false)
    }

    fn float(&mut self, value: f32) -> Result<(), Error> {
        let text = format_float(value.to_string(), f64::from(value));
        self.scalar_value(Some(&text), false)
    }

    fn double(&mut self, value: f64) -> Result<(), Error> {
        let text = format_float(value.to_string(), value);
        self.scalar_value(Some(&text), false)
    }

    fn bool(&mut self, value: bool) -> Result<(), Error> {
        self.scalar_value(Some(if value { "true" } else { "false" }), false)
    }

    fn null(&mut self) -> Result<(), Error> {
        self.scalar_value(None, false)
    }

    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        let encoded = STANDARD.encode(value);
        self.scalar_value(Some(&encoded), false)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(events: impl FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<(), Error>) -> String {
        let mut writer = XmlWriter::new(Vec::new());
        events(&mut writer).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn empty_root_self_closes() {
        let xml = render(|w| {
            w.start_object()?;
            w.end_object()
        });
        assert_eq!(xml, r#"<root xmlns="http://elasticsearch.org/ns/1.0/"/>"#);
    }

    #[test]
    fn floats_keep_a_fraction() {
        let xml = render(|w| {
            w.start_object()?;
            w.field_name("a")?;
            w.double(1.0)?;
            w.field_name("b")?;
            w.float(2.5)?;
            w.field_name("c")?;
            w.double(f64::NEG_INFINITY)?;
            w.field_name("d")?;
            w.float(f32::NAN)?;
            w.end_object()
        });
        assert!(xml.contains("<a>1.0</a><b>2.5</b><c>-INF</c><d>NaN</d>"), "{xml}");
    }

    #[test]
    fn null_and_empty_string_differ() {
        let xml = render(|w| {
            w.start_object()?;
            w.field_name("a")?;
            w.null()?;
            w.field_name("b")?;
            w.string("")?;
            w.end_object()
        });
        assert!(xml.ends_with("><a/><b></b></root>"), "{xml}");
    }

    #[test]
    fn top_level_scalar_is_rejected() {
        let mut writer = XmlWriter::new(Vec::new());
        assert!(writer.string("x").is_err());
        assert!(writer.start_array().is_err());
    }

    #[test]
    fn late_and_repeated_attributes_become_elements() {
        let xml = render(|w| {
            w.start_object()?;
            w.field_name("@id")?;
            w.int(1)?;
            w.field_name("child")?;
            w.string("x")?;
            w.field_name("@late")?;
            w.string("y")?;
            w.field_name("@tags")?;
            w.start_array()?;
            w.string("a")?;
            w.string("b")?;
            w.end_array()?;
            w.end_object()
        });
        assert_eq!(
            xml,
            concat!(
                r#"<root xmlns="http://elasticsearch.org/ns/1.0/" xmlns:es="http://elasticsearch.org/ns/1.0/" es:id="1">"#,
                "<child>x</child><late>y</late><tags>a</tags><tags>b</tags></root>"
            )
        );
    }

    #[test]
    fn illegal_names_never_reach_the_output() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start_object().unwrap();
        assert!(writer.field_name("").is_err());
        assert!(writer.field_name("@").is_err());
        writer.field_name(":x").unwrap();
        writer.int(1).unwrap();
        writer.field_name("es:a:b").unwrap();
        writer.int(2).unwrap();
        writer.end_object().unwrap();
        let xml = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(xml.ends_with("><_x003a_x>1</_x003a_x><a_x003a_b>2</a_x003a_b></root>"), "{xml}");
    }

    #[test]
    fn unfinished_document_cannot_finish() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.start_object().unwrap();
        assert!(writer.finish().is_err());
    }
}
