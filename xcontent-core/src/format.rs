use std::fmt::{self, Display};

/// The serialization formats xcontent can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFormat {
    /// JSON text
    Json,
    /// Smile, the binary JSON encoding (`:)\n` header)
    Smile,
    /// YAML text
    Yaml,
    /// Namespace-qualified XML
    Xml,
}

impl ContentFormat {
    /// All formats, in sniffing priority order.
    pub const ALL: [ContentFormat; 4] = [
        ContentFormat::Json,
        ContentFormat::Smile,
        ContentFormat::Yaml,
        ContentFormat::Xml,
    ];

    /// MIME type used when this format travels over HTTP.
    pub const fn mime_type(self) -> &'static str {
        match self {
            ContentFormat::Json => "application/json; charset=UTF-8",
            ContentFormat::Smile => "application/smile",
            ContentFormat::Yaml => "application/yaml",
            ContentFormat::Xml => "application/xml",
        }
    }

    /// Short name, as used in `format=` style parameters.
    pub const fn short_name(self) -> &'static str {
        match self {
            ContentFormat::Json => "json",
            ContentFormat::Smile => "smile",
            ContentFormat::Yaml => "yaml",
            ContentFormat::Xml => "xml",
        }
    }

    /// Whether the format is binary rather than text.
    pub const fn is_binary(self) -> bool {
        matches!(self, ContentFormat::Smile)
    }

    /// Look a format up by MIME type or by its short name.
    ///
    /// The bare MIME type (`application/json`) and the full one including the
    /// charset parameter are both accepted; short names are matched ignoring
    /// ASCII case.
    pub fn from_mime_type(value: &str) -> Option<ContentFormat> {
        let value = value.trim();
        ContentFormat::ALL.into_iter().find(|format| {
            let mime = format.mime_type();
            let bare = mime.split(';').next().unwrap_or(mime);
            value == mime
                || value.eq_ignore_ascii_case(bare)
                || value.eq_ignore_ascii_case(format.short_name())
        })
    }
}

impl Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_mime_type() {
        assert_eq!(
            ContentFormat::from_mime_type("application/json"),
            Some(ContentFormat::Json)
        );
        assert_eq!(
            ContentFormat::from_mime_type("application/json; charset=UTF-8"),
            Some(ContentFormat::Json)
        );
        assert_eq!(
            ContentFormat::from_mime_type("application/xml"),
            Some(ContentFormat::Xml)
        );
        assert_eq!(ContentFormat::from_mime_type("text/plain"), None);
    }

    #[test]
    fn lookup_by_short_name_ignores_case() {
        assert_eq!(ContentFormat::from_mime_type("YAML"), Some(ContentFormat::Yaml));
        assert_eq!(ContentFormat::from_mime_type("smile"), Some(ContentFormat::Smile));
        assert_eq!(ContentFormat::from_mime_type("Xml"), Some(ContentFormat::Xml));
    }

    #[test]
    fn only_smile_is_binary() {
        let binary: Vec<_> = ContentFormat::ALL
            .into_iter()
            .filter(|f| f.is_binary())
            .collect();
        assert_eq!(binary, [ContentFormat::Smile]);
    }
}
