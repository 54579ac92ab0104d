//! Typed value extraction from untyped request text.
//!
//! Every reader returns "absent" rather than an error: a missing key, a `null` literal and a
//! value of the wrong shape all collapse to `None`, except for object and array fields where
//! an explicit `null` is kept apart from a missing key (see [`RawField`]).

use crate::scanner::{
    balanced_span, decode_string, find_value, integer_prefix, number_prefix, prefix_within,
};

/// A raw nested value: missing, an explicit `null`, or the (possibly truncated) source text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawField {
    #[default]
    Absent,
    Null,
    Value(String),
}

impl RawField {
    /// The text as passed through on the wire: `null` for an explicit null.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Null => Some("null"),
            Self::Value(text) => Some(text),
        }
    }

    /// The nested text, only when a real value was present.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

fn is_null_at(json: &str, start: usize) -> bool {
    json[start..].starts_with("null")
}

/// Reads a string value, keeping at most `capacity` bytes of the decoded text.
pub fn read_string(json: &str, key: &str, capacity: usize) -> Option<String> {
    let start = find_value(json, key)?;
    decode_string(json, start, capacity)
}

/// Reads a numeric value. A `null` literal is absent, not zero.
pub fn read_number(json: &str, key: &str) -> Option<f64> {
    let start = find_value(json, key)?;
    if is_null_at(json, start) {
        return None;
    }
    number_prefix(json, start).parse().ok()
}

/// Reads an integer value, also accepting a quoted numeric string such as `"42"`.
pub fn read_integer(json: &str, key: &str) -> Option<i64> {
    let mut start = find_value(json, key)?;
    if is_null_at(json, start) {
        return None;
    }
    if json.as_bytes().get(start) == Some(&b'"') {
        start += 1;
    }
    integer_prefix(json, start).parse().ok()
}

/// Reads a boolean: `true`/`false` literals, or a number where non-zero means true.
pub fn read_bool(json: &str, key: &str) -> Option<bool> {
    let start = find_value(json, key)?;
    let rest = &json[start..];
    if rest.starts_with("true") {
        Some(true)
    } else if rest.starts_with("false") {
        Some(false)
    } else if rest.starts_with("null") {
        None
    } else {
        number_prefix(json, start)
            .parse::<f64>()
            .ok()
            .map(|n| n != 0.0)
    }
}

/// Reads the raw text of a nested object, truncated to `capacity` bytes.
pub fn read_object(json: &str, key: &str, capacity: usize) -> RawField {
    read_balanced(json, key, b'{', capacity)
}

/// Reads the raw text of a nested array, truncated to `capacity` bytes.
pub fn read_array(json: &str, key: &str, capacity: usize) -> RawField {
    read_balanced(json, key, b'[', capacity)
}

fn read_balanced(json: &str, key: &str, open: u8, capacity: usize) -> RawField {
    let Some(start) = find_value(json, key) else {
        return RawField::Absent;
    };
    if is_null_at(json, start) {
        return RawField::Null;
    }
    if json.as_bytes().get(start) != Some(&open) {
        return RawField::Absent;
    }
    match balanced_span(json, start) {
        Some(span) => RawField::Value(prefix_within(span, capacity).to_string()),
        None => RawField::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_string_values() {
        let json = r#"{"method":"tools/call","name":"Paris"}"#;
        assert_eq!(read_string(json, "method", 63).as_deref(), Some("tools/call"));
        assert_eq!(read_string(json, "name", 63).as_deref(), Some("Paris"));
        assert_eq!(read_string(json, "missing", 63), None);
    }

    #[test]
    fn string_truncates_to_longest_prefix() {
        let json = r#"{"location":"statue of liberty"}"#;
        assert_eq!(read_string(json, "location", 6).as_deref(), Some("statue"));
        assert_eq!(read_string(json, "location", 0).as_deref(), Some(""));
    }

    #[test]
    fn non_string_value_is_not_a_string() {
        assert_eq!(read_string(r#"{"name":5}"#, "name", 63), None);
    }

    #[test]
    fn reads_numbers() {
        let json = r#"{"longitude":-74.0445,"latitude": 40.6892,"height":1e3}"#;
        assert_eq!(read_number(json, "longitude"), Some(-74.0445));
        assert_eq!(read_number(json, "latitude"), Some(40.6892));
        assert_eq!(read_number(json, "height"), Some(1000.0));
    }

    #[test]
    fn null_number_is_absent_not_zero() {
        assert_eq!(read_number(r#"{"radius":null}"#, "radius"), None);
    }

    #[test]
    fn quoted_number_is_not_a_number() {
        assert_eq!(read_number(r#"{"radius":"50"}"#, "radius"), None);
    }

    #[test]
    fn integer_accepts_bare_and_quoted() {
        assert_eq!(read_integer(r#"{"id":7}"#, "id"), Some(7));
        assert_eq!(read_integer(r#"{"id":"42"}"#, "id"), Some(42));
        assert_eq!(read_integer(r#"{"id":"abc"}"#, "id"), None);
        assert_eq!(read_integer(r#"{"id":null}"#, "id"), None);
    }

    #[test]
    fn reads_booleans() {
        let json = r#"{"a":true,"b":false,"c":0,"d":2,"e":null}"#;
        assert_eq!(read_bool(json, "a"), Some(true));
        assert_eq!(read_bool(json, "b"), Some(false));
        assert_eq!(read_bool(json, "c"), Some(false));
        assert_eq!(read_bool(json, "d"), Some(true));
        assert_eq!(read_bool(json, "e"), None);
    }

    #[test]
    fn object_distinguishes_absent_null_and_value() {
        let json = r#"{"params":null,"arguments":{"x":{"y":"}"}}}"#;
        assert_eq!(read_object(json, "params", 100), RawField::Null);
        assert_eq!(read_object(json, "params", 100).raw(), Some("null"));
        assert_eq!(read_object(json, "missing", 100), RawField::Absent);
        assert_eq!(
            read_object(json, "arguments", 100),
            RawField::Value(r#"{"x":{"y":"}"}}"#.to_string())
        );
    }

    #[test]
    fn object_type_mismatch_is_absent() {
        assert!(read_object(r#"{"dimensions":[1,2]}"#, "dimensions", 100).is_absent());
    }

    #[test]
    fn object_truncates_to_capacity() {
        let json = r#"{"arguments":{"name":"abcdef"}}"#;
        assert_eq!(
            read_object(json, "arguments", 10),
            RawField::Value(r#"{"name":"a"#.to_string())
        );
    }

    #[test]
    fn reads_arrays() {
        let json = r#"{"positions":[{"longitude":1,"latitude":2}],"color":"red"}"#;
        assert_eq!(
            read_array(json, "positions", 1000).value(),
            Some(r#"[{"longitude":1,"latitude":2}]"#)
        );
    }
}
