use xcontent_xml::chars;
use xcontent_xml::name_codec::{decode, encode};

const SAMPLES: &[&str] = &[
    "",
    "Hello",
    "dc:creator",
    "John Doe",
    "1st",
    "_xFFFF_",
    "a_xFFFF_b",
    "_x0041 ",
    "__x0020_",
    "tab\there",
    "bell\u{7}",
    "nul\u{0}",
    ":leading",
    "trailing:",
    "-dash",
    "weiß",
    "emoji 😀",
    "\u{FFFE}",
    "x_x",
    "_x",
    "price in €",
];

#[xcontent_testhelpers::test]
fn decode_restores_every_sample() {
    for &sample in SAMPLES {
        assert_eq!(decode(&encode(sample)), sample, "sample {sample:?}");
    }
}

#[xcontent_testhelpers::test]
fn encoded_names_are_legal() {
    for &sample in SAMPLES.iter().filter(|s| !s.is_empty()) {
        let encoded = encode(sample);
        assert!(
            chars::is_valid_name(&encoded),
            "{sample:?} encoded to illegal name {encoded:?}"
        );
    }
}

#[xcontent_testhelpers::test]
fn encoding_twice_escapes_again() {
    let once = encode("John Doe");
    let twice = encode(&once);
    assert_ne!(once, twice);
    assert_eq!(decode(&twice), once);
}

#[xcontent_testhelpers::test]
fn every_ascii_character_round_trips() {
    for c in (0u8..0x80).map(char::from) {
        for name in [c.to_string(), format!("a{c}"), format!("{c}_x0041_")] {
            let encoded = encode(&name);
            assert_eq!(decode(&encoded), name.as_str());
            assert!(chars::is_valid_name(&encoded), "{name:?} -> {encoded:?}");
        }
    }
}
