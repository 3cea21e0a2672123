use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use xcontent_core::{Error, StructuralWriter};

use crate::typing::needs_quotes;

/// Where we are in the output structure.
#[derive(Debug, Clone, Copy)]
enum Ctx {
    /// In a mapping
    Mapping {
        indent: usize,
        has_fields: bool,
        has_key: bool,
    },
    /// In a sequence
    Sequence { indent: usize, has_items: bool },
}

/// Where we are on the current line
#[derive(Debug, Clone, Copy, PartialEq)]
enum LinePos {
    /// At the start of a new line (or document start)
    Start,
    /// Right after "- " (the item can continue on this line)
    AfterSeqMarker,
    /// Right after "key:"
    AfterKey,
    /// Somewhere else on the line
    Inline,
}

/// Writes structural events as a block-style YAML document starting with
/// `---`.
///
/// Strings that would read back as another type are double-quoted;
/// multi-line strings use literal block scalars. Binary values are written
/// as quoted `!!binary` base64 scalars, which read back as strings.
pub struct YamlWriter<W: Write> {
    out: W,
    stack: Vec<Ctx>,
    doc_started: bool,
    wrote_root: bool,
    line_pos: LinePos,
}

impl<W: Write> YamlWriter<W> {
    /// Write to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
            doc_started: false,
            wrote_root: false,
            line_pos: LinePos::Start,
        }
    }

    /// Flush and return the sink. Fails if a container is still open.
    pub fn finish(mut self) -> Result<W, Error> {
        if !self.stack.is_empty() {
            return Err(Error::invalid_structure(format!(
                "{} container(s) still open",
                self.stack.len()
            )));
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_indent(&mut self, depth: usize) -> Result<(), Error> {
        for _ in 0..depth {
            self.out.write_all(b"  ")?;
        }
        Ok(())
    }

    fn newline(&mut self) -> Result<(), Error> {
        if self.line_pos != LinePos::Start {
            self.out.write_all(b"\n")?;
            self.line_pos = LinePos::Start;
        }
        Ok(())
    }

    fn current_indent(&self) -> usize {
        match self.stack.last() {
            Some(Ctx::Mapping { indent, .. } | Ctx::Sequence { indent, .. }) => *indent,
            None => 0,
        }
    }

    /// Position the output for the next value and update the parent context.
    fn begin_value(&mut self) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(Ctx::Mapping { has_key, .. }) => {
                if !*has_key {
                    return Err(Error::invalid_structure("mapping value without a key"));
                }
                *has_key = false;
            }
            Some(Ctx::Sequence { indent, has_items }) => {
                let indent = *indent;
                let first = !*has_items;
                *has_items = true;
                // a nested sequence's first item continues its parent's "- " line
                if !(first && self.line_pos == LinePos::AfterSeqMarker) {
                    self.newline()?;
                    self.write_indent(indent)?;
                }
                self.out.write_all(b"- ")?;
                self.line_pos = LinePos::AfterSeqMarker;
            }
            None => {
                if self.wrote_root {
                    return Err(Error::invalid_structure("document already complete"));
                }
                self.wrote_root = true;
                if !self.doc_started {
                    self.out.write_all(b"---\n")?;
                    self.doc_started = true;
                    self.line_pos = LinePos::Start;
                }
            }
        }
        Ok(())
    }

    /// A completed top-level value terminates its line.
    fn end_value(&mut self) -> Result<(), Error> {
        if self.stack.is_empty() && self.line_pos != LinePos::Start {
            self.out.write_all(b"\n")?;
            self.line_pos = LinePos::Start;
        }
        Ok(())
    }

    /// Start an inline scalar: separate it from a preceding key.
    fn write_inline(&mut self, text: &[u8]) -> Result<(), Error> {
        if self.line_pos == LinePos::AfterKey {
            self.out.write_all(b" ")?;
        }
        self.out.write_all(text)?;
        self.line_pos = LinePos::Inline;
        Ok(())
    }

    fn write_scalar(&mut self, text: &str) -> Result<(), Error> {
        self.begin_value()?;
        self.write_inline(text.as_bytes())?;
        self.end_value()
    }

    fn write_quoted(&mut self, s: &str) -> Result<(), Error> {
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('"');
        for c in s.chars() {
            match c {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\r' => quoted.push_str("\\r"),
                '\t' => quoted.push_str("\\t"),
                c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
                c => quoted.push(c),
            }
        }
        quoted.push('"');
        self.write_inline(quoted.as_bytes())
    }

    fn write_key(&mut self, key: &str) -> Result<(), Error> {
        if needs_quotes(key) {
            self.write_quoted(key)
        } else {
            self.write_inline(key.as_bytes())
        }
    }

    /// Multi-line strings whose lines can be reproduced by a literal block.
    fn use_block_scalar(s: &str) -> bool {
        s.contains('\n')
            && !s.trim().is_empty()
            && !s.starts_with([' ', '\n'])
            && !s.chars().any(|c| c.is_control() && c != '\n' && c != '\t')
    }

    fn write_block_scalar(&mut self, s: &str) -> Result<(), Error> {
        let indent = self.current_indent() + 1;
        let content = s.trim_end_matches('\n');
        let trailing = s.len() - content.len();
        let chomping = match trailing {
            0 => "|-",
            1 => "|",
            _ => "|+",
        };
        self.write_inline(chomping.as_bytes())?;
        for line in content.split('\n') {
            self.out.write_all(b"\n")?;
            if !line.is_empty() {
                self.write_indent(indent)?;
                self.out.write_all(line.as_bytes())?;
            }
        }
        for _ in 1..trailing {
            self.out.write_all(b"\n")?;
        }
        self.line_pos = LinePos::Inline;
        Ok(())
    }

    fn write_float(&mut self, repr: String, value: f64) -> Result<(), Error> {
        if value.is_nan() {
            self.write_scalar(".nan")
        } else if value.is_infinite() {
            self.write_scalar(if value > 0.0 { ".inf" } else { "-.inf" })
        } else if repr.contains(['.', 'e', 'E']) {
            self.write_scalar(&repr)
        } else {
            self.write_scalar(&(repr + ".0"))
        }
    }
}

impl<W: Write> StructuralWriter for YamlWriter<W> {
    fn start_object(&mut self) -> Result<(), Error> {
        self.begin_value()?;
        let indent = match self.stack.last() {
            Some(Ctx::Mapping { indent, .. } | Ctx::Sequence { indent, .. }) => indent + 1,
            None => 0,
        };
        self.stack.push(Ctx::Mapping {
            indent,
            has_fields: false,
            has_key: false,
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Ctx::Mapping {
                has_fields,
                has_key: false,
                ..
            }) => {
                if !has_fields {
                    self.write_inline(b"{}")?;
                }
                self.end_value()
            }
            Some(Ctx::Mapping { has_key: true, .. }) => {
                Err(Error::invalid_structure("mapping key without a value"))
            }
            _ => Err(Error::invalid_structure("end_object without start_object")),
        }
    }

    fn start_array(&mut self) -> Result<(), Error> {
        self.begin_value()?;
        let indent = match self.stack.last() {
            Some(Ctx::Mapping { indent, .. } | Ctx::Sequence { indent, .. }) => indent + 1,
            None => 0,
        };
        self.stack.push(Ctx::Sequence {
            indent,
            has_items: false,
        });
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Ctx::Sequence { has_items, .. }) => {
                if !has_items {
                    self.write_inline(b"[]")?;
                }
                self.end_value()
            }
            _ => Err(Error::invalid_structure("end_array without start_array")),
        }
    }

    fn field_name(&mut self, name: &str) -> Result<(), Error> {
        let (indent, first) = match self.stack.last_mut() {
            Some(Ctx::Mapping {
                indent,
                has_fields,
                has_key,
            }) => {
                if *has_key {
                    return Err(Error::invalid_structure(format!(
                        "key `{name}` follows a key without a value"
                    )));
                }
                let first = !*has_fields;
                *has_fields = true;
                *has_key = true;
                (*indent, first)
            }
            _ => {
                return Err(Error::invalid_structure(format!(
                    "key `{name}` outside of a mapping"
                )));
            }
        };
        // the first key of a sequence item shares the "- " line
        if !(first && self.line_pos == LinePos::AfterSeqMarker) {
            self.newline()?;
            self.write_indent(indent)?;
        }
        self.write_key(name)?;
        self.out.write_all(b":")?;
        self.line_pos = LinePos::AfterKey;
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<(), Error> {
        self.begin_value()?;
        if Self::use_block_scalar(value) {
            self.write_block_scalar(value)?;
        } else if needs_quotes(value) {
            self.write_quoted(value)?;
        } else {
            self.write_inline(value.as_bytes())?;
        }
        self.end_value()
    }

    fn int(&mut self, value: i32) -> Result<(), Error> {
        self.write_scalar(&value.to_string())
    }

    fn long(&mut self, value: i64) -> Result<(), Error> {
        self.write_scalar(&value.to_string())
    }

    fn float(&mut self, value: f32) -> Result<(), Error> {
        self.write_float(value.to_string(), f64::from(value))
    }

    fn double(&mut self, value: f64) -> Result<(), Error> {
        self.write_float(value.to_string(), value)
    }

    fn bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_scalar(if value { "true" } else { "false" })
    }

    fn null(&mut self) -> Result<(), Error> {
        self.write_scalar("null")
    }

    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        let encoded = STANDARD.encode(value);
        self.write_scalar(&format!("!!binary \"{encoded}\""))
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(events: impl FnOnce(&mut YamlWriter<Vec<u8>>) -> Result<(), Error>) -> String {
        let mut writer = YamlWriter::new(Vec::new());
        events(&mut writer).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn top_level_scalar() {
        assert_eq!(render(|w| w.int(3)), "---\n3\n");
    }

    #[test]
    fn empty_containers_are_flow_style() {
        let yaml = render(|w| {
            w.start_object()?;
            w.field_name("o")?;
            w.start_object()?;
            w.end_object()?;
            w.field_name("a")?;
            w.start_array()?;
            w.end_array()?;
            w.end_object()
        });
        assert_eq!(yaml, "---\no: {}\na: []\n");
    }

    #[test]
    fn nested_sequences_share_the_marker_line() {
        let yaml = render(|w| {
            w.start_array()?;
            w.start_array()?;
            w.int(1)?;
            w.int(2)?;
            w.end_array()?;
            w.start_object()?;
            w.field_name("k")?;
            w.bool(false)?;
            w.end_object()?;
            w.end_array()
        });
        assert_eq!(yaml, "---\n- - 1\n  - 2\n- k: false\n");
    }

    #[test]
    fn block_scalars_keep_their_line_breaks() {
        let yaml = render(|w| {
            w.start_object()?;
            w.field_name("strip")?;
            w.string("a\nb")?;
            w.field_name("clip")?;
            w.string("a\n\nb\n")?;
            w.end_object()
        });
        assert_eq!(yaml, "---\nstrip: |-\n  a\n  b\nclip: |\n  a\n\n  b\n");
    }

    #[test]
    fn scalars_that_need_care() {
        let yaml = render(|w| {
            w.start_array()?;
            w.string("yes")?;
            w.string("")?;
            w.string(" lead\nx")?;
            w.double(2.0)?;
            w.double(f64::NEG_INFINITY)?;
            w.binary(b"hi")?;
            w.null()?;
            w.end_array()
        });
        assert_eq!(
            yaml,
            "---\n- \"yes\"\n- \"\"\n- \" lead\\nx\"\n- 2.0\n- -.inf\n- !!binary \"aGk=\"\n- null\n"
        );
    }

    #[test]
    fn misuse_is_reported() {
        let mut writer = YamlWriter::new(Vec::new());
        writer.start_object().unwrap();
        assert!(writer.string("x").is_err());
        writer.field_name("a").unwrap();
        assert!(writer.field_name("b").is_err());
        assert!(writer.end_array().is_err());
    }
}
