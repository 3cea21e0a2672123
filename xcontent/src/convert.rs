//! Format selection and whole-document conversions.

use std::io::{BufReader, Read, Write};

use tracing::debug;
use xcontent_core::sniff::{self, RewindableInput};
use xcontent_core::{
    ContentBuilder, ContentFormat, Error, ErrorKind, StructuralReader, StructuralWriter, Value,
    ValueBuilder, WriteOptions, copy,
};
use xcontent_json::{JsonReader, JsonWriter};
use xcontent_smile::{SmileReader, SmileWriter};
use xcontent_xml::{Params, XmlReader, XmlWriter};
use xcontent_yaml::{YamlReader, YamlWriter};

use crate::WriterConfig;

/// A reader for `data`, which is in `format`.
///
/// YAML input must be valid UTF-8.
pub fn make_reader<'de>(
    format: ContentFormat,
    data: &'de [u8],
) -> Result<Box<dyn StructuralReader<'de> + 'de>, Error> {
    Ok(match format {
        ContentFormat::Json => Box::new(JsonReader::new(data)),
        ContentFormat::Smile => Box::new(SmileReader::new(data)),
        ContentFormat::Yaml => Box::new(YamlReader::new(std::str::from_utf8(data)?)),
        ContentFormat::Xml => Box::new(XmlReader::new(data)),
    })
}

/// A writer producing `format` into `out`.
///
/// Every writer has finished its output once [`copy`] returns: the
/// top-level value is complete and the writer has been flushed.
pub fn make_writer<'a, W: Write + 'a>(
    format: ContentFormat,
    out: W,
    config: &WriterConfig,
) -> Box<dyn StructuralWriter + 'a> {
    match format {
        ContentFormat::Json => Box::new(JsonWriter::with_options(out, config.options.clone())),
        ContentFormat::Smile => Box::new(SmileWriter::new(out)),
        ContentFormat::Yaml => Box::new(YamlWriter::new(out)),
        ContentFormat::Xml => Box::new(
            XmlWriter::with_params(out, config.params.clone())
                .options(config.options.clone())
                .xml_declaration(config.xml_declaration),
        ),
    }
}

fn detect(data: &[u8]) -> Result<ContentFormat, Error> {
    let format = sniff::detect(data).ok_or(Error::new(ErrorKind::UndeterminedFormat))?;
    debug!(%format, len = data.len(), "detected content format");
    Ok(format)
}

/// Sniff the format of `data` and return a reader for it.
pub fn create_reader(data: &[u8]) -> Result<Box<dyn StructuralReader<'_> + '_>, Error> {
    make_reader(detect(data)?, data)
}

/// Convert a stream of unknown format into `target`, returning the source
/// format.
///
/// The format is sniffed from a prefix that is replayed to the reader. XML
/// is read incrementally; the other formats are read into memory first.
pub fn copy_stream<R: Read, W: Write>(
    input: R,
    target: ContentFormat,
    out: W,
    config: &WriterConfig,
) -> Result<ContentFormat, Error> {
    let mut input = RewindableInput::new(input);
    let format = input
        .sniff()?
        .ok_or(Error::new(ErrorKind::UndeterminedFormat))?;
    debug!(%format, %target, "copying stream");
    let mut writer = make_writer(target, out, config);
    if format == ContentFormat::Xml {
        let mut reader = XmlReader::new(BufReader::new(input));
        copy(&mut reader, &mut writer)?;
    } else {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;
        let mut reader = make_reader(format, &data)?;
        copy(&mut reader, &mut writer)?;
    }
    Ok(format)
}

fn into_string(bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes).map_err(|err| Error::from(err.utf8_error()))
}

/// Convert `data` of any readable format into XML rooted at `params`.
pub fn convert_to_xml(params: Params, data: &[u8], pretty: bool) -> Result<String, Error> {
    let mut reader = create_reader(data)?;
    let options = if pretty {
        WriteOptions::new().pretty()
    } else {
        WriteOptions::new()
    };
    let mut writer = XmlWriter::with_params(Vec::new(), params).options(options);
    copy(&mut reader, &mut writer)?;
    into_string(writer.finish()?)
}

/// Convert `data` of any readable format into JSON.
///
/// JSON input is returned unchanged unless `reformat` is set.
pub fn convert_to_json(data: &[u8], reformat: bool, pretty: bool) -> Result<String, Error> {
    let format = detect(data)?;
    if format == ContentFormat::Json && !reformat {
        return into_string(data.to_vec());
    }
    let mut reader = make_reader(format, data)?;
    let options = if pretty {
        WriteOptions::new().pretty()
    } else {
        WriteOptions::new()
    };
    let mut writer = JsonWriter::with_options(Vec::new(), options);
    copy(&mut reader, &mut writer)?;
    into_string(writer.finish()?)
}

/// Read `data` of any readable format into a [`Value`].
pub fn convert_to_map(data: &[u8]) -> Result<(ContentFormat, Value), Error> {
    let format = detect(data)?;
    let mut reader = make_reader(format, data)?;
    let mut builder = ValueBuilder::new();
    copy(&mut reader, &mut builder)?;
    Ok((format, builder.into_value()?))
}

/// A content builder producing XML rooted at `params`.
pub fn xml_builder(params: Params) -> ContentBuilder<XmlWriter<Vec<u8>>> {
    ContentBuilder::new(XmlWriter::with_params(Vec::new(), params))
}

/// A content builder producing compact JSON.
pub fn json_builder() -> ContentBuilder<JsonWriter<Vec<u8>>> {
    ContentBuilder::new(JsonWriter::new(Vec::new()))
}
