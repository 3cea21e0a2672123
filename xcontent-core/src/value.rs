//! In-memory document tree.

use std::borrow::Cow;

use crate::{Error, Scalar, StructuralReader, StructuralWriter, Text, Token};

/// A document tree node.
///
/// Object members keep their insertion order and names may repeat, which is
/// how a repeated XML element reads back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String value
    String(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// Ordered list of values
    Array(Vec<Value>),
    /// Ordered list of members
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Build an object from `(name, value)` pairs.
    pub fn object<K, V>(members: impl IntoIterator<Item = (K, V)>) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            members
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// First member named `key`, if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// All members named `key`, in document order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        let members: &[(String, Value)] = match self {
            Value::Object(members) => members,
            _ => &[],
        };
        members.iter().filter(move |(k, _)| k == key).map(|(_, v)| v)
    }

    /// The string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Apply `changes` on top of this value.
    ///
    /// Two objects are merged member by member, recursing where both sides
    /// hold an object. Any other pair is replaced by `changes`.
    pub fn update(&mut self, changes: Value) {
        match (self, changes) {
            (Value::Object(members), Value::Object(changes)) => {
                for (key, change) in changes {
                    match members.iter().position(|(k, _)| *k == key) {
                        Some(i) => members[i].1.update(change),
                        None => members.push((key, change)),
                    }
                }
            }
            (this, changes) => *this = changes,
        }
    }

    /// Fill in the members this object lacks from `defaults`.
    ///
    /// Where both sides hold objects the merge recurses. Where both hold
    /// arrays of single-member objects, items are matched by that member's
    /// name and merged; other arrays are combined, defaults first, skipping
    /// content items already present. Every other member keeps its value.
    /// Nothing happens unless both values are objects.
    pub fn merge_defaults(&mut self, defaults: &Value) {
        let (Value::Object(members), Value::Object(defaults)) = (self, defaults) else {
            return;
        };
        for (key, default) in defaults {
            let Some(i) = members.iter().position(|(k, _)| k == key) else {
                members.push((key.clone(), default.clone()));
                continue;
            };
            let existing = &mut members[i].1;
            if matches!(existing, Value::Object(_)) && matches!(default, Value::Object(_)) {
                existing.merge_defaults(default);
            } else if let (Value::Array(items), Value::Array(default_items)) = (existing, default) {
                let content = std::mem::take(items);
                *items = merge_arrays(content, default_items);
            }
        }
    }
}

/// The member name of an object with exactly one member.
fn single_key(value: &Value) -> Option<&str> {
    match value {
        Value::Object(members) if members.len() == 1 => Some(&members[0].0),
        _ => None,
    }
}

fn merge_arrays(content: Vec<Value>, defaults: &[Value]) -> Vec<Value> {
    let keyed = |items: &[Value]| items.iter().all(|item| single_key(item).is_some());
    if !(keyed(&content) && keyed(defaults)) {
        let mut merged = defaults.to_vec();
        for item in content {
            if !merged.contains(&item) {
                merged.push(item);
            }
        }
        return merged;
    }

    // a later content item replaces an earlier one with the same key in place
    let mut by_key: Vec<(String, Value)> = Vec::with_capacity(content.len());
    for item in content {
        let key = single_key(&item).unwrap_or_default().to_owned();
        match by_key.iter().position(|(k, _)| *k == key) {
            Some(i) => by_key[i].1 = item,
            None => by_key.push((key, item)),
        }
    }
    for default in defaults {
        let key = single_key(default);
        if let Some((_, item)) = by_key.iter_mut().find(|(k, _)| Some(k.as_str()) == key) {
            item.merge_defaults(default);
        }
    }
    by_key.into_iter().map(|(_, item)| item).collect()
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Push `value` into `writer` as one structure.
pub fn write_value<W: StructuralWriter + ?Sized>(value: &Value, writer: &mut W) -> Result<(), Error> {
    match value {
        Value::Null => writer.null(),
        Value::Bool(b) => writer.bool(*b),
        Value::Int(n) => writer.int(*n),
        Value::Long(n) => writer.long(*n),
        Value::Float(n) => writer.float(*n),
        Value::Double(n) => writer.double(*n),
        Value::String(s) => writer.string(s),
        Value::Binary(bytes) => writer.binary(bytes),
        Value::Array(items) => {
            writer.start_array()?;
            for item in items {
                write_value(item, writer)?;
            }
            writer.end_array()
        }
        Value::Object(members) => {
            writer.start_object()?;
            for (name, item) in members {
                writer.field_name(name)?;
                write_value(item, writer)?;
            }
            writer.end_object()
        }
    }
}

enum Frame<'v> {
    Object {
        members: std::slice::Iter<'v, (String, Value)>,
        pending: Option<&'v Value>,
    },
    Array(std::slice::Iter<'v, Value>),
}

/// Replays a [`Value`] as structural events, borrowing from it.
pub struct ValueReader<'v> {
    start: Option<&'v Value>,
    stack: Vec<Frame<'v>>,
}

impl<'v> ValueReader<'v> {
    /// Create a reader positioned before `value`.
    pub fn new(value: &'v Value) -> Self {
        Self {
            start: Some(value),
            stack: Vec::new(),
        }
    }

    fn open(&mut self, value: &'v Value) -> Token<'v> {
        match value {
            Value::Object(members) => {
                self.stack.push(Frame::Object {
                    members: members.iter(),
                    pending: None,
                });
                Token::StartObject
            }
            Value::Array(items) => {
                self.stack.push(Frame::Array(items.iter()));
                Token::StartArray
            }
            Value::Null => Token::Scalar(Scalar::Null),
            Value::Bool(b) => Token::Scalar(Scalar::Bool(*b)),
            Value::Int(n) => Token::Scalar(Scalar::Int(*n)),
            Value::Long(n) => Token::Scalar(Scalar::Long(*n)),
            Value::Float(n) => Token::Scalar(Scalar::Float(*n)),
            Value::Double(n) => Token::Scalar(Scalar::Double(*n)),
            Value::String(s) => Token::Scalar(Scalar::String(Text::Chars(Cow::Borrowed(s)))),
            Value::Binary(bytes) => Token::Scalar(Scalar::Binary(Cow::Borrowed(bytes))),
        }
    }
}

enum Step<'v> {
    Open(&'v Value),
    Field(&'v str),
    Close(Token<'v>),
}

impl<'v> StructuralReader<'v> for ValueReader<'v> {
    fn next_token(&mut self) -> Result<Option<Token<'v>>, Error> {
        if let Some(value) = self.start.take() {
            return Ok(Some(self.open(value)));
        }
        let Some(frame) = self.stack.last_mut() else {
            return Ok(None);
        };
        let step = match frame {
            Frame::Object { members, pending } => match pending.take() {
                Some(value) => Step::Open(value),
                None => match members.next() {
                    Some((name, value)) => {
                        *pending = Some(value);
                        Step::Field(name)
                    }
                    None => Step::Close(Token::EndObject),
                },
            },
            Frame::Array(items) => match items.next() {
                Some(value) => Step::Open(value),
                None => Step::Close(Token::EndArray),
            },
        };
        let token = match step {
            Step::Open(value) => self.open(value),
            Step::Field(name) => Token::FieldName(Cow::Borrowed(name)),
            Step::Close(token) => {
                self.stack.pop();
                token
            }
        };
        Ok(Some(token))
    }
}

enum Building {
    Object {
        members: Vec<(String, Value)>,
        name: Option<String>,
    },
    Array(Vec<Value>),
}

/// A writer that materializes the events it receives as a [`Value`].
#[derive(Default)]
pub struct ValueBuilder {
    stack: Vec<Building>,
    result: Option<Value>,
}

impl ValueBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished tree.
    pub fn into_value(self) -> Result<Value, Error> {
        if !self.stack.is_empty() {
            return Err(Error::invalid_structure(format!(
                "{} unclosed container(s)",
                self.stack.len()
            )));
        }
        self.result
            .ok_or_else(|| Error::invalid_structure("no value was written"))
    }

    fn push(&mut self, value: Value) -> Result<(), Error> {
        match self.stack.last_mut() {
            None if self.result.is_none() => {
                self.result = Some(value);
                Ok(())
            }
            None => Err(Error::invalid_structure("more than one top-level value")),
            Some(Building::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Building::Object { members, name }) => {
                let name = name
                    .take()
                    .ok_or_else(|| Error::invalid_structure("object value without a field name"))?;
                members.push((name, value));
                Ok(())
            }
        }
    }
}

impl StructuralWriter for ValueBuilder {
    fn start_object(&mut self) -> Result<(), Error> {
        self.stack.push(Building::Object {
            members: Vec::new(),
            name: None,
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Building::Object { members, name: None }) => self.push(Value::Object(members)),
            Some(Building::Object { name: Some(name), .. }) => Err(Error::invalid_structure(
                format!("field `{name}` has no value"),
            )),
            _ => Err(Error::invalid_structure("end_object without start_object")),
        }
    }

    fn start_array(&mut self) -> Result<(), Error> {
        self.stack.push(Building::Array(Vec::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Building::Array(items)) => self.push(Value::Array(items)),
            _ => Err(Error::invalid_structure("end_array without start_array")),
        }
    }

    fn field_name(&mut self, field: &str) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(Building::Object { name, .. }) => {
                *name = Some(field.to_owned());
                Ok(())
            }
            _ => Err(Error::invalid_structure("field name outside of an object")),
        }
    }

    fn string(&mut self, value: &str) -> Result<(), Error> {
        self.push(Value::String(value.to_owned()))
    }

    fn int(&mut self, value: i32) -> Result<(), Error> {
        self.push(Value::Int(value))
    }

    fn long(&mut self, value: i64) -> Result<(), Error> {
        self.push(Value::Long(value))
    }

    fn float(&mut self, value: f32) -> Result<(), Error> {
        self.push(Value::Float(value))
    }

    fn double(&mut self, value: f64) -> Result<(), Error> {
        self.push(Value::Double(value))
    }

    fn bool(&mut self, value: bool) -> Result<(), Error> {
        self.push(Value::Bool(value))
    }

    fn null(&mut self) -> Result<(), Error> {
        self.push(Value::Null)
    }

    fn binary(&mut self, value: &[u8]) -> Result<(), Error> {
        self.push(Value::Binary(value.to_vec()))
    }
}
