// Top-level payload resolution.
//
// The feed has answered with several shapes over its lifetime. Rules are
// checked in order and the first match wins; anything unmatched is a
// notice (a status message, a scalar, or null) and yields no records.

use std::fmt;

use serde_json::{Map, Value};

/// Which rule matched a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Bare JSON array of records.
    Array,
    /// Object whose `data` field is an array of records.
    Wrapped,
    /// Single record object.
    Single,
    /// Status message, scalar, or null.
    Notice,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Array => "array",
            Self::Wrapped => "wrapped",
            Self::Single => "single",
            Self::Notice => "notice",
        })
    }
}

type ShapeRule = (PayloadShape, fn(&Value) -> bool);

const SHAPE_RULES: [ShapeRule; 3] = [
    (PayloadShape::Array, Value::is_array),
    (PayloadShape::Wrapped, has_data_array),
    (PayloadShape::Single, is_bare_record),
];

fn has_data_array(value: &Value) -> bool {
    value.get("data").is_some_and(Value::is_array)
}

/// An object counts as a record unless it carries a truthy `message` or
/// `status` field.
fn is_bare_record(value: &Value) -> bool {
    value.is_object() && !is_present(value.get("message")) && !is_present(value.get("status"))
}

/// Loose presence test for optional JSON fields.
///
/// Missing, `null`, `false`, `0`, `NaN`, and `""` are absent; everything
/// else (including empty arrays and objects) is present.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Classify a response body without consuming it.
pub fn shape_of(value: &Value) -> PayloadShape {
    SHAPE_RULES
        .iter()
        .find(|(_, matches)| matches(value))
        .map_or(PayloadShape::Notice, |(shape, _)| *shape)
}

/// A response body after top-level shape resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Array(Vec<Value>),
    Wrapped(Vec<Value>),
    Single(Map<String, Value>),
    Notice(Value),
}

impl Payload {
    /// Resolve a parsed body against the shape rules.
    pub fn resolve(value: Value) -> Self {
        match (shape_of(&value), value) {
            (PayloadShape::Array, Value::Array(items)) => Self::Array(items),
            (PayloadShape::Wrapped, Value::Object(mut map)) => match map.remove("data") {
                Some(Value::Array(items)) => Self::Wrapped(items),
                other => {
                    if let Some(v) = other {
                        map.insert("data".into(), v);
                    }
                    Self::Notice(Value::Object(map))
                }
            },
            (PayloadShape::Single, Value::Object(map)) => Self::Single(map),
            (_, other) => Self::Notice(other),
        }
    }

    pub fn shape(&self) -> PayloadShape {
        match self {
            Self::Array(_) => PayloadShape::Array,
            Self::Wrapped(_) => PayloadShape::Wrapped,
            Self::Single(_) => PayloadShape::Single,
            Self::Notice(_) => PayloadShape::Notice,
        }
    }

    /// Raw record candidates, in feed order. Notices yield nothing.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Array(items) | Self::Wrapped(items) => items,
            Self::Single(map) => vec![Value::Object(map)],
            Self::Notice(_) => Vec::new(),
        }
    }
}
