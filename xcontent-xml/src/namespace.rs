//! Qualified names, namespace bindings and field name resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use xcontent_core::Error;

use crate::name_codec;

/// Namespace of the default root element.
pub const ES_NAMESPACE: &str = "http://elasticsearch.org/ns/1.0/";

/// Prefixes every [`NamespaceContext::well_known`] context starts with.
pub const WELL_KNOWN_NAMESPACES: &[(&str, &str)] = &[
    ("atom", "http://www.w3.org/2005/Atom"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("es", ES_NAMESPACE),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xalan", "http://xml.apache.org/xslt"),
    ("xsl", "http://www.w3.org/1999/XSL/Transform"),
];

/// A namespace-qualified XML name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI; empty for no namespace
    pub namespace_uri: String,
    /// Local part
    pub local_name: String,
    /// Preferred prefix; empty for the default namespace
    pub prefix: String,
}

impl QName {
    /// Create a name.
    pub fn new(
        namespace_uri: impl Into<String>,
        local_name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
            prefix: prefix.into(),
        }
    }

    /// `root` in the [`ES_NAMESPACE`] namespace, preferred prefix `es`.
    pub fn default_root() -> Self {
        QName::new(ES_NAMESPACE, "root", "es")
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{}:{}", self.prefix, self.local_name)
        }
    }
}

/// Prefix to URI bindings, kept in sync with the reverse URI to prefixes map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    namespaces: BTreeMap<String, String>,
    prefixes: BTreeMap<String, BTreeSet<String>>,
}

impl NamespaceContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh context seeded with [`WELL_KNOWN_NAMESPACES`].
    pub fn well_known() -> Self {
        let mut context = Self::new();
        for (prefix, uri) in WELL_KNOWN_NAMESPACES {
            context.add_namespace(*prefix, *uri);
        }
        context
    }

    /// Bind `prefix` to `uri`.
    ///
    /// A prefix that was already bound is moved to the new URI; a URI can
    /// collect any number of prefixes.
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();
        if let Some(old) = self.namespaces.insert(prefix.clone(), uri.clone()) {
            if let Some(set) = self.prefixes.get_mut(&old) {
                set.remove(&prefix);
                if set.is_empty() {
                    self.prefixes.remove(&old);
                }
            }
        }
        self.prefixes.entry(uri).or_default().insert(prefix);
    }

    /// URI bound to `prefix`.
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Alphabetically first prefix bound to `uri`.
    pub fn prefix(&self, uri: &str) -> Option<&str> {
        self.prefixes
            .get(uri)
            .and_then(|set| set.iter().next())
            .map(String::as_str)
    }

    /// Every prefix bound to `uri`, alphabetically.
    pub fn prefixes<'a>(&'a self, uri: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.prefixes
            .get(uri)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// All bindings, ordered by prefix.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    /// Number of bound prefixes.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether no prefix is bound.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Root element and namespace bindings for one XML document.
///
/// A writer takes its `Params` by value and owns them for the whole
/// document, including bindings added through `@context` blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    root: QName,
    namespaces: NamespaceContext,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            root: QName::default_root(),
            namespaces: NamespaceContext::new(),
        }
    }
}

impl Params {
    /// Use `root` for the document element and `namespaces` for resolution.
    ///
    /// A prefixed root also binds its own prefix.
    pub fn new(root: QName, mut namespaces: NamespaceContext) -> Self {
        if !root.prefix.is_empty() && namespaces.namespace_uri(&root.prefix).is_none() {
            namespaces.add_namespace(root.prefix.clone(), root.namespace_uri.clone());
        }
        Self { root, namespaces }
    }

    /// Default root with the given bindings.
    pub fn with_namespaces(namespaces: NamespaceContext) -> Self {
        Self::new(QName::default_root(), namespaces)
    }

    /// Root element name.
    pub fn root(&self) -> &QName {
        &self.root
    }

    /// Current bindings.
    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    /// Mutable access to the bindings.
    pub fn namespaces_mut(&mut self) -> &mut NamespaceContext {
        &mut self.namespaces
    }

    /// URI for `prefix`; the root prefix always maps to the root namespace.
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        if prefix == self.root.prefix {
            return Some(&self.root.namespace_uri);
        }
        self.namespaces.namespace_uri(prefix)
    }
}

/// Map an object field name to the XML name it is written under.
///
/// One leading `_` or `@` is dropped, the rest goes through
/// [`name_codec::encode`], and a `prefix:` part (colon after the first
/// character) is resolved against `params`. Colons left in the local part
/// are escaped so the result is always a namespace-well-formed name. A name
/// with nothing left for the local part is rejected.
pub fn resolve_field_name(name: &str, params: &Params) -> Result<QName, Error> {
    let stripped = name
        .strip_prefix('_')
        .or_else(|| name.strip_prefix('@'))
        .unwrap_or(name);
    let encoded = name_codec::encode(stripped);
    let (uri, local, prefix) = match encoded.find(':') {
        Some(pos) if pos > 0 => {
            let prefix = &encoded[..pos];
            let uri = params
                .lookup(prefix)
                .ok_or_else(|| Error::unknown_prefix(prefix))?;
            (uri, &encoded[pos + 1..], prefix)
        }
        _ => (
            params.root.namespace_uri.as_str(),
            &encoded[..],
            params.root.prefix.as_str(),
        ),
    };
    if local.is_empty() {
        return Err(Error::invalid_structure(format!(
            "field `{name}` has no local name"
        )));
    }
    Ok(QName::new(uri, name_codec::escape_ncname(local), prefix))
}
