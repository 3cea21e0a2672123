use xcontent_core::WriteOptions;
use xcontent_xml::Params;

/// Everything [`make_writer`](crate::make_writer) needs besides the sink.
///
/// `options` applies to the JSON and XML writers; `params` and
/// `xml_declaration` only to XML.
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    /// Formatting options (default: compact)
    pub options: WriteOptions,
    /// Root element and namespace bindings for XML output
    pub params: Params,
    /// Whether XML output starts with `<?xml ...?>` (default: false)
    pub xml_declaration: bool,
}

impl WriterConfig {
    /// Compact output, default XML root, no declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing.
    pub fn pretty(mut self) -> Self {
        self.options = self.options.pretty();
        self
    }

    /// Set the formatting options.
    pub fn options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the XML root and namespace bindings.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Toggle the XML declaration.
    pub fn xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }
}
