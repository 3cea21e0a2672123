use indoc::indoc;
use xcontent_core::{ContentBuilder, Error, ErrorKind, WriteOptions};
use xcontent_xml::{ES_NAMESPACE, NamespaceContext, Params, QName, XmlWriter};

type Builder = ContentBuilder<XmlWriter<Vec<u8>>>;

fn render(params: Params, build: impl FnOnce(&mut Builder) -> Result<(), Error>) -> String {
    let mut builder = ContentBuilder::new(XmlWriter::with_params(Vec::new(), params));
    build(&mut builder).unwrap();
    let xml = builder.finish().unwrap().finish().unwrap();
    String::from_utf8(xml).unwrap()
}

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

#[xcontent_testhelpers::test]
fn single_field() {
    let xml = render(Params::default(), |b| {
        b.start_object()?.field("Hello", "World")?.end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><Hello>World</Hello></root>"#
    );
}

#[xcontent_testhelpers::test]
fn well_known_namespaces_are_declared_on_the_root() {
    let params = Params::with_namespaces(NamespaceContext::well_known());
    let xml = render(params, |b| {
        b.start_object()?.field("dc:creator", "John Doe")?.end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        format!(
            r#"<root xmlns="http://elasticsearch.org/ns/1.0/"{WELL_KNOWN_DECLARATIONS}><dc:creator>John Doe</dc:creator></root>"#
        )
    );
}

#[xcontent_testhelpers::test]
fn custom_root_and_namespace() {
    let mut context = NamespaceContext::well_known();
    context.add_namespace("abc", "http://localhost");
    let params = Params::new(QName::new(ES_NAMESPACE, "result", ""), context);
    let xml = render(params, |b| {
        b.start_object()?.field("abc:creator", "John Doe")?.end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        format!(
            r#"<result xmlns="http://elasticsearch.org/ns/1.0/" xmlns:abc="http://localhost"{WELL_KNOWN_DECLARATIONS}><abc:creator>John Doe</abc:creator></result>"#
        )
    );
}

#[xcontent_testhelpers::test]
fn repeated_objects() {
    let xml = render(Params::default(), |b| {
        b.start_object()?
            .start_object_field("author")?
            .field("creator", "John Doe")?
            .field("role", "writer")?
            .end_object()?
            .start_object_field("author")?
            .field("creator", "Joe Smith")?
            .field("role", "illustrator")?
            .end_object()?
            .end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        concat!(
            r#"<root xmlns="http://elasticsearch.org/ns/1.0/">"#,
            "<author><creator>John Doe</creator><role>writer</role></author>",
            "<author><creator>Joe Smith</creator><role>illustrator</role></author>",
            "</root>"
        )
    );
}

#[xcontent_testhelpers::test]
fn attributes_use_the_bound_root_prefix() {
    let mut context = NamespaceContext::new();
    context.add_namespace("es", ES_NAMESPACE);
    let xml = render(Params::with_namespaces(context), |b| {
        b.start_object()?
            .start_object_field("author")?
            .field("@name", "John Doe")?
            .field("@id", 1)?
            .end_object()?
            .end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        concat!(
            r#"<root xmlns="http://elasticsearch.org/ns/1.0/" xmlns:es="http://elasticsearch.org/ns/1.0/">"#,
            r#"<author es:name="John Doe" es:id="1"/>"#,
            "</root>"
        )
    );
}

#[xcontent_testhelpers::test]
fn array_of_values_repeats_the_element() {
    let xml = render(Params::default(), |b| {
        b.start_object()?
            .array("author", ["John Doe", "Joe Smith"])?
            .end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        r#"<root xmlns="http://elasticsearch.org/ns/1.0/"><author>John Doe</author><author>Joe Smith</author></root>"#
    );
}

#[xcontent_testhelpers::test]
fn array_of_objects_repeats_the_element() {
    let xml = render(Params::default(), |b| {
        b.start_object()?
            .start_array_field("author")?
            .start_object()?
            .field("creator", "John Doe")?
            .field("role", "writer")?
            .end_object()?
            .start_object()?
            .field("creator", "Joe Smith")?
            .field("role", "illustrator")?
            .end_object()?
            .end_array()?
            .end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        concat!(
            r#"<root xmlns="http://elasticsearch.org/ns/1.0/">"#,
            "<author><creator>John Doe</creator><role>writer</role></author>",
            "<author><creator>Joe Smith</creator><role>illustrator</role></author>",
            "</root>"
        )
    );
}

#[xcontent_testhelpers::test]
fn unknown_prefix_writes_nothing_for_the_field() {
    let mut builder = ContentBuilder::new(XmlWriter::new(Vec::new()));
    builder.start_object().unwrap().field("a", "1").unwrap();
    let err = builder.field("zz:foo", "bar").unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::UnknownNamespacePrefix { prefix } if prefix == "zz"
    ));
    let partial = builder.finish().unwrap().into_inner();
    let partial = String::from_utf8(partial).unwrap();
    assert!(!partial.contains("foo"), "{partial}");
    assert!(!partial.contains("bar"), "{partial}");
}

#[xcontent_testhelpers::test]
fn context_block_declares_namespaces_mid_document() {
    let xml = render(Params::default(), |b| {
        b.start_object()?
            .start_object_field("@context")?
            .field("ns", "http://example.org/")?
            .end_object()?
            .field("ns:foo", "bar")?
            .end_object()?;
        Ok(())
    });
    assert_eq!(
        xml,
        concat!(
            r#"<root xmlns="http://elasticsearch.org/ns/1.0/">"#,
            r#"<context xmlns:es="http://elasticsearch.org/ns/1.0/" xmlns:ns="http://example.org/" es:ns="http://example.org/"/>"#,
            r#"<ns:foo xmlns:ns="http://example.org/">bar</ns:foo>"#,
            "</root>"
        )
    );
}

#[xcontent_testhelpers::test]
fn context_bindings_outlive_the_block() {
    let mut writer = XmlWriter::new(Vec::new());
    {
        let mut builder = ContentBuilder::new(&mut writer);
        builder
            .start_object()
            .unwrap()
            .start_object_field("@context")
            .unwrap()
            .field("ex", "http://example.org/")
            .unwrap()
            .end_object()
            .unwrap()
            .end_object()
            .unwrap();
    }
    assert_eq!(
        writer.params().namespaces().namespace_uri("ex"),
        Some("http://example.org/")
    );
}

#[xcontent_testhelpers::test]
fn names_are_escaped() {
    let xml = render(Params::default(), |b| {
        b.start_object()?
            .field("John Doe", "x")?
            .field("1st", "y")?
            .end_object()?;
        Ok(())
    });
    assert!(xml.contains("<John_x0020_Doe>x</John_x0020_Doe>"), "{xml}");
    assert!(xml.contains("<_x0031_st>y</_x0031_st>"), "{xml}");
}

#[xcontent_testhelpers::test]
fn text_field_becomes_element_content() {
    let xml = render(Params::default(), |b| {
        b.start_object()?
            .start_object_field("title")?
            .field("@lang", "en")?
            .field("#text", "Fish & Chips")?
            .end_object()?
            .end_object()?;
        Ok(())
    });
    assert!(
        xml.contains(
            r#"<title xmlns:es="http://elasticsearch.org/ns/1.0/" es:lang="en">Fish &amp; Chips</title>"#
        ),
        "{xml}"
    );
}

#[xcontent_testhelpers::test]
fn pretty_output_indents_children() {
    let params = Params::default();
    let mut builder = ContentBuilder::new(
        XmlWriter::with_params(Vec::new(), params).options(WriteOptions::new().pretty()),
    );
    builder
        .start_object()
        .unwrap()
        .start_object_field("a")
        .unwrap()
        .field("b", "c")
        .unwrap()
        .end_object()
        .unwrap()
        .field("d", "e")
        .unwrap()
        .end_object()
        .unwrap();
    let xml = String::from_utf8(builder.finish().unwrap().finish().unwrap()).unwrap();
    assert_eq!(
        xml,
        indoc! {r#"
            <root xmlns="http://elasticsearch.org/ns/1.0/">
              <a>
                <b>c</b>
              </a>
              <d>e</d>
            </root>"#}
    );
}

#[xcontent_testhelpers::test]
fn declaration_precedes_the_root() {
    let mut builder = ContentBuilder::new(XmlWriter::new(Vec::new()).xml_declaration(true));
    builder.start_object().unwrap().end_object().unwrap();
    let xml = String::from_utf8(builder.finish().unwrap().finish().unwrap()).unwrap();
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?><root xmlns="http://elasticsearch.org/ns/1.0/"/>"#
    );
}
