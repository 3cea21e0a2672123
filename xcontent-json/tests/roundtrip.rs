use indoc::indoc;
use xcontent_core::{Value, ValueBuilder, ValueReader, WriteOptions, copy};
use xcontent_json::{JsonReader, JsonWriter};

fn to_value(json: &str) -> Value {
    let mut reader = JsonReader::new(json.as_bytes());
    let mut builder = ValueBuilder::new();
    copy(&mut reader, &mut builder).unwrap();
    builder.into_value().unwrap()
}

fn reformat(json: &str, options: WriteOptions) -> String {
    let mut reader = JsonReader::new(json.as_bytes());
    let mut writer = JsonWriter::with_options(Vec::new(), options);
    copy(&mut reader, &mut writer).unwrap();
    String::from_utf8(writer.finish().unwrap()).unwrap()
}

#[xcontent_testhelpers::test]
fn document_becomes_value() {
    let value = to_value(indoc! {r#"
        {
          "title": "Tübingen \"old town\"",
          "year": 2014,
          "rating": 4.5,
          "tags": ["a", null, true],
          "nested": { "empty": {} }
        }
    "#});
    assert_eq!(
        value,
        Value::object([
            ("title", Value::from("Tübingen \"old town\"")),
            ("year", Value::from(2014)),
            ("rating", Value::from(4.5)),
            (
                "tags",
                Value::Array(vec![Value::from("a"), Value::Null, Value::from(true)])
            ),
            (
                "nested",
                Value::object([("empty", Value::Object(Vec::new()))])
            ),
        ])
    );
}

#[xcontent_testhelpers::test]
fn compact_reformat_strips_whitespace() {
    let json = reformat(
        "{ \"a\" : [ 1 , 2 ] ,\n \"b\" : { \"c\" : null } }",
        WriteOptions::new(),
    );
    assert_eq!(json, r#"{"a":[1,2],"b":{"c":null}}"#);
}

#[xcontent_testhelpers::test]
fn pretty_reformat() {
    let json = reformat(r#"{"a":[1,2],"b":"x"}"#, WriteOptions::new().pretty());
    assert_eq!(
        json,
        indoc! {r#"
            {
              "a": [
                1,
                2
              ],
              "b": "x"
            }"#}
    );
}

#[xcontent_testhelpers::test]
fn values_replay_into_json() {
    let value = Value::object([
        ("long", Value::from(5_000_000_000_i64)),
        ("float", Value::from(1.25_f32)),
        ("bytes", Value::from(vec![0_u8, 1, 2])),
    ]);
    let mut writer = JsonWriter::new(Vec::new());
    copy(&mut ValueReader::new(&value), &mut writer).unwrap();
    assert_eq!(
        String::from_utf8(writer.finish().unwrap()).unwrap(),
        r#"{"long":5000000000,"float":1.25,"bytes":"AAEC"}"#
    );
}

#[xcontent_testhelpers::test]
fn malformed_input_reports_json() {
    let mut reader = JsonReader::new(br#"{"a": tru}"#);
    let mut builder = ValueBuilder::new();
    let err = copy(&mut reader, &mut builder).unwrap_err();
    assert!(err.to_string().starts_with("malformed json content"), "{err}");
    assert_eq!(err.offset, Some(6));
}
