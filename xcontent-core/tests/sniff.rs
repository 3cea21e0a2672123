use xcontent_core::ContentFormat;
use xcontent_core::sniff::{RewindableInput, detect, detect_chars, detect_stream};

#[xcontent_testhelpers::test]
fn leading_brace_is_json() {
    assert_eq!(detect(b"{\"a\":1}"), Some(ContentFormat::Json));
    assert_eq!(detect_chars("{\"a\":1}"), Some(ContentFormat::Json));
}

#[xcontent_testhelpers::test]
fn smile_magic_is_binary() {
    let data = [0x3a, 0x29, 0x0a, 0x00, 0xfa, 0xfb];
    assert_eq!(detect(&data), Some(ContentFormat::Smile));
    assert_eq!(detect_chars(":)\n\u{0}"), Some(ContentFormat::Smile));
}

#[xcontent_testhelpers::test]
fn dashes_are_yaml() {
    assert_eq!(detect(b"---\nhello: world\n"), Some(ContentFormat::Yaml));
    assert_eq!(detect_chars("---\n"), Some(ContentFormat::Yaml));
}

#[xcontent_testhelpers::test]
fn declaration_is_xml() {
    assert_eq!(detect(b"<?xml version=\"1.0\"?><root/>"), Some(ContentFormat::Xml));
    assert_eq!(detect_chars("<?xml version=\"1.0\"?>"), Some(ContentFormat::Xml));
}

#[xcontent_testhelpers::test]
fn brace_inside_window_is_json() {
    let input = format!("{}{{}}", " ".repeat(19));
    assert_eq!(detect(input.as_bytes()), Some(ContentFormat::Json));
    assert_eq!(detect_chars(&input), Some(ContentFormat::Json));
    assert_eq!(
        detect_stream(&mut input.as_bytes()).unwrap(),
        Some(ContentFormat::Json)
    );
}

#[xcontent_testhelpers::test]
fn brace_past_window_is_undetected() {
    let input = format!("{}{{}}", " ".repeat(21));
    assert_eq!(detect(input.as_bytes()), None);
    assert_eq!(detect_chars(&input), None);
    assert_eq!(detect_stream(&mut input.as_bytes()).unwrap(), None);
}

#[xcontent_testhelpers::test]
fn only_the_char_variant_finds_a_bare_angle_bracket() {
    let input = "  <root/>";
    assert_eq!(detect_chars(input), Some(ContentFormat::Xml));
    assert_eq!(detect(input.as_bytes()), None);
    assert_eq!(detect_stream(&mut input.as_bytes()).unwrap(), None);
}

#[xcontent_testhelpers::test]
fn empty_input_is_undetected() {
    assert_eq!(detect(b""), None);
    assert_eq!(detect_chars(""), None);
    assert_eq!(detect_stream(&mut &b""[..]).unwrap(), None);
}

#[xcontent_testhelpers::test]
fn rewindable_input_hands_full_stream_to_parser() {
    use std::io::Read;

    let source = b"<?xml version=\"1.0\"?><root><a>1</a></root>";
    let mut input = RewindableInput::new(&source[..]);
    assert_eq!(input.sniff().unwrap(), Some(ContentFormat::Xml));
    let mut replayed = Vec::new();
    input.read_to_end(&mut replayed).unwrap();
    assert_eq!(replayed, source);
}
