use indoc::indoc;
use xcontent::{
    ContentFormat, ErrorKind, NamespaceContext, Params, Value, ValueReader, WriterConfig,
    convert_to_json, convert_to_map, convert_to_xml, copy, copy_stream, create_reader,
    json_builder, make_reader, make_writer, xml_builder,
};

const WELL_KNOWN_DECLARATIONS: &str = concat!(
    r#" xmlns:atom="http://www.w3.org/2005/Atom""#,
    r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
    r#" xmlns:dcterms="http://purl.org/dc/terms/""#,
    r#" xmlns:es="http://elasticsearch.org/ns/1.0/""#,
    r#" xmlns:foaf="http://xmlns.com/foaf/0.1/""#,
    r#" xmlns:owl="http://www.w3.org/2002/07/owl#""#,
    r#" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#""#,
    r#" xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#""#,
    r#" xmlns:xalan="http://xml.apache.org/xslt""#,
    r#" xmlns:xsl="http://www.w3.org/1999/XSL/Transform""#,
);

fn encode(format: ContentFormat, value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = make_writer(format, &mut out, &WriterConfig::new());
        copy(&mut ValueReader::new(value), &mut writer).unwrap();
    }
    out
}

fn sample() -> Value {
    Value::object([
        ("title", Value::from("Fish & Chips")),
        ("year", Value::from(2014)),
        ("big", Value::from(5_000_000_000_i64)),
        ("rating", Value::from(4.5)),
        ("open", Value::from(true)),
        ("closed", Value::Null),
        (
            "authors",
            Value::Array(vec![
                Value::object([("name", "John Doe")]),
                Value::object([("name", "Joe Smith")]),
            ]),
        ),
    ])
}

#[xcontent_testhelpers::test]
fn every_format_converts_to_the_same_xml() {
    let expected = concat!(
        r#"<root xmlns="http://elasticsearch.org/ns/1.0/">"#,
        "<title>Fish &amp; Chips</title><year>2014</year><big>5000000000</big>",
        "<rating>4.5</rating><open>true</open><closed/>",
        "<authors><name>John Doe</name></authors><authors><name>Joe Smith</name></authors>",
        "</root>"
    );
    for format in [ContentFormat::Json, ContentFormat::Smile, ContentFormat::Yaml] {
        let data = encode(format, &sample());
        let xml = convert_to_xml(Params::default(), &data, false).unwrap();
        assert_eq!(xml, expected, "{format}");
    }
}

#[xcontent_testhelpers::test]
fn text_and_binary_formats_round_trip() {
    for format in [ContentFormat::Json, ContentFormat::Smile, ContentFormat::Yaml] {
        let data = encode(format, &sample());
        let (detected, value) = convert_to_map(&data).unwrap();
        assert_eq!(detected, format);
        assert_eq!(value, sample(), "{format}");
    }
}

#[xcontent_testhelpers::test]
fn dynamic_namespaces_are_declared_where_used() {
    let params = Params::with_namespaces(NamespaceContext::well_known());
    let json = br#"{"@context":{"ns":"http://example.org/"},"ns:foo":"bar"}"#;
    let xml = convert_to_xml(params, json, false).unwrap();
    assert_eq!(
        xml,
        format!(
            concat!(
                r#"<root xmlns="http://elasticsearch.org/ns/1.0/"{}>"#,
                r#"<context xmlns:ns="http://example.org/" es:ns="http://example.org/"/>"#,
                r#"<ns:foo xmlns:ns="http://example.org/">bar</ns:foo>"#,
                "</root>"
            ),
            WELL_KNOWN_DECLARATIONS
        )
    );
}

#[xcontent_testhelpers::test]
fn context_bindings_survive_a_trip_through_xml() {
    let json = br#"{"@context":{"ns":"http://example.org/"},"ns:foo":"bar"}"#;
    let config = WriterConfig::new().xml_declaration(true);
    let mut xml = Vec::new();
    copy_stream(&json[..], ContentFormat::Xml, &mut xml, &config).unwrap();
    let (format, value) = convert_to_map(&xml).unwrap();
    assert_eq!(format, ContentFormat::Xml);
    assert_eq!(
        value,
        Value::object([
            ("context", Value::object([("@ns", "http://example.org/")])),
            ("ns:foo", Value::from("bar")),
        ])
    );
}

#[xcontent_testhelpers::test]
fn json_is_returned_verbatim_unless_reformatted() {
    let json = br#"{ "a" : [1, 2] }"#;
    assert_eq!(convert_to_json(json, false, false).unwrap(), r#"{ "a" : [1, 2] }"#);
    assert_eq!(convert_to_json(json, true, false).unwrap(), r#"{"a":[1,2]}"#);
}

#[xcontent_testhelpers::test]
fn yaml_converts_to_pretty_json() {
    let yaml = indoc! {"
        ---
        a: 1
        b: [red, blue]
    "};
    assert_eq!(
        convert_to_json(yaml.as_bytes(), false, true).unwrap(),
        "{\n  \"a\": 1,\n  \"b\": [\n    \"red\",\n    \"blue\"\n  ]\n}"
    );
}

#[xcontent_testhelpers::test]
fn xml_with_declaration_is_sniffed() {
    let xml = br#"<?xml version="1.0"?><doc id="7"><title>T</title><n>1</n></doc>"#;
    assert_eq!(
        convert_to_json(xml, false, false).unwrap(),
        r#"{"@id":"7","title":"T","n":"1"}"#
    );
}

#[xcontent_testhelpers::test]
fn unknown_content_is_undetermined() {
    for data in [&b"plain text"[..], b"", b"<doc/>"] {
        let err = create_reader(data).err().unwrap();
        assert!(matches!(err.kind, ErrorKind::UndeterminedFormat), "{data:?}");
    }
    assert!(convert_to_map(b"hello").is_err());
}

#[xcontent_testhelpers::test]
fn streams_are_sniffed_then_replayed() {
    let xml = r#"<?xml version="1.0"?><doc><title>T</title></doc>"#;
    let mut out = Vec::new();
    let format = copy_stream(xml.as_bytes(), ContentFormat::Json, &mut out, &WriterConfig::new())
        .unwrap();
    assert_eq!(format, ContentFormat::Xml);
    assert_eq!(out, br#"{"title":"T"}"#);

    let json = r#"   {"a": "b"}"#;
    let mut out = Vec::new();
    let format = copy_stream(json.as_bytes(), ContentFormat::Yaml, &mut out, &WriterConfig::new())
        .unwrap();
    assert_eq!(format, ContentFormat::Json);
    assert_eq!(out, b"---\na: b\n");
}

#[xcontent_testhelpers::test]
fn stream_conversion_honors_the_xml_config() {
    let config = WriterConfig::new().pretty().xml_declaration(true);
    let mut out = Vec::new();
    copy_stream(&br#"{"a":"b"}"#[..], ContentFormat::Xml, &mut out, &config).unwrap();
    let xml = String::from_utf8(out).unwrap();
    assert!(xml.starts_with("<?xml"), "{xml}");
    assert!(xml.contains("\n  <a>b</a>"), "{xml}");
}

#[xcontent_testhelpers::test]
fn field_names_always_give_well_formed_xml() {
    let xml = convert_to_xml(Params::default(), br#"{":x":1,"es:a:b":2}"#, false).unwrap();
    assert_eq!(
        xml,
        r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><_x003a_x>1</_x003a_x><a_x003a_b>2</a_x003a_b></root>"#
    );
    let mut declared = br#"<?xml version="1.0"?>"#.to_vec();
    declared.extend_from_slice(xml.as_bytes());
    let (_, value) = convert_to_map(&declared).unwrap();
    assert_eq!(value, Value::object([(":x", "1"), ("a:b", "2")]));

    for json in [&br#"{"":1}"#[..], br#"{"@":1}"#, br#"{"_":1}"#] {
        let err = convert_to_xml(Params::default(), json, false).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidStructure(_)), "{err}");
    }
}

#[xcontent_testhelpers::test]
fn builders() {
    let mut json = json_builder();
    json.start_object()
        .unwrap()
        .field("Hello", "World")
        .unwrap()
        .end_object()
        .unwrap();
    assert_eq!(json.finish().unwrap().finish().unwrap(), br#"{"Hello":"World"}"#);

    let mut xml = xml_builder(Params::default());
    xml.start_object()
        .unwrap()
        .field("Hello", "World")
        .unwrap()
        .end_object()
        .unwrap();
    assert_eq!(
        String::from_utf8(xml.finish().unwrap().finish().unwrap()).unwrap(),
        r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><Hello>World</Hello></root>"#
    );
}

#[xcontent_testhelpers::test]
fn readers_report_their_format() {
    for format in [ContentFormat::Json, ContentFormat::Smile, ContentFormat::Yaml] {
        let data = encode(format, &Value::object([("a", 1)]));
        assert_eq!(make_reader(format, &data).unwrap().format(), Some(format));
    }
}
