use serde_json::Value as JsonValue;
use sqlparser::ast::Value as SqlValue;

use crate::Value;

/// Brings a value into the canonical form used for matching.
///
/// Byte strings that carry UTF-8 text are read the way a driver would read
/// them off the wire: numbers become numbers, anything else becomes text.
/// Every other shape is already canonical and passes through.
pub fn unify(value: Value) -> Value {
    match value {
        Value::Blob(bytes) => match String::from_utf8(bytes) {
            Ok(text) => unify_text_bytes(text),
            Err(error) => Value::Blob(error.into_bytes()),
        },
        other => other,
    }
}

pub fn unify_many<I>(values: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    values
        .into_iter()
        .map(|value| unify(value.into()))
        .collect()
}

fn unify_text_bytes(text: String) -> Value {
    if let Ok(integer) = text.parse::<i64>() {
        return Value::Integer(integer);
    }
    if let Some(real) = parse_real(&text) {
        return Value::Real(real);
    }
    Value::Text(text)
}

/// Parses decimal notation only. `f64::from_str` also accepts words such as
/// `nan` and `inf`, which must stay text.
pub(crate) fn parse_real(text: &str) -> Option<f64> {
    let decimal = text.bytes().any(|byte| byte.is_ascii_digit())
        && text
            .bytes()
            .all(|byte| byte.is_ascii_digit() || matches!(byte, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal {
        return None;
    }
    text.parse::<f64>().ok().filter(|real| real.is_finite())
}

/// Canonical form of a literal as it appears in parsed SQL text.
pub(crate) fn unify_literal(value: &SqlValue) -> Value {
    let unified = match value {
        SqlValue::Number(raw, _) => {
            if let Ok(integer) = raw.parse::<i64>() {
                Value::Integer(integer)
            } else if let Some(real) = parse_real(raw) {
                Value::Real(real)
            } else {
                Value::Text(raw.clone())
            }
        }
        SqlValue::SingleQuotedString(text)
        | SqlValue::DoubleQuotedString(text)
        | SqlValue::TripleSingleQuotedString(text)
        | SqlValue::TripleDoubleQuotedString(text)
        | SqlValue::EscapedStringLiteral(text)
        | SqlValue::UnicodeStringLiteral(text)
        | SqlValue::NationalStringLiteral(text)
        | SqlValue::SingleQuotedRawStringLiteral(text)
        | SqlValue::DoubleQuotedRawStringLiteral(text)
        | SqlValue::TripleSingleQuotedRawStringLiteral(text)
        | SqlValue::TripleDoubleQuotedRawStringLiteral(text)
        | SqlValue::SingleQuotedByteStringLiteral(text)
        | SqlValue::DoubleQuotedByteStringLiteral(text)
        | SqlValue::TripleSingleQuotedByteStringLiteral(text)
        | SqlValue::TripleDoubleQuotedByteStringLiteral(text) => Value::Text(text.clone()),
        SqlValue::DollarQuotedString(text) => Value::Text(text.value.clone()),
        SqlValue::HexStringLiteral(text) => match decode_hex(text) {
            Some(bytes) => Value::Blob(bytes),
            None => Value::Text(text.clone()),
        },
        SqlValue::Boolean(value) => Value::Integer(i64::from(*value)),
        SqlValue::Null => Value::Null,
        #[allow(unreachable_patterns)]
        other => Value::Text(other.to_string()),
    };
    unify(unified)
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| Some((hex_nibble(pair[0])? << 4) | hex_nibble(pair[1])?))
        .collect()
}

fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(integer) => Value::Integer(integer),
            Err(_) => Value::Text(value.to_string()),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(flag) => Value::from(flag),
            JsonValue::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Value::Integer(integer)
                } else if let Some(real) = number.as_f64() {
                    Value::Real(real)
                } else {
                    Value::Text(number.to_string())
                }
            }
            JsonValue::String(text) => Value::Text(text),
            composite @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                Value::Text(composite.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlparser::ast::Value as SqlValue;

    use super::{unify, unify_literal, unify_many};
    use crate::Value;

    #[test]
    fn integer_sources_unify_to_the_same_value() {
        let from_sql = unify_literal(&SqlValue::Number("7".to_string(), false));
        let from_native = unify(Value::from(7_u8));
        let from_bytes = unify(Value::Blob(b"7".to_vec()));

        assert_eq!(from_sql, Value::Integer(7));
        assert_eq!(from_native, from_sql);
        assert_eq!(from_bytes, from_sql);
    }

    #[test]
    fn null_sources_unify_to_one_sentinel() {
        assert_eq!(unify_literal(&SqlValue::Null), Value::Null);
        assert_eq!(unify(Value::from(None::<i64>)), Value::Null);
        assert_eq!(unify(Value::from(serde_json::Value::Null)), Value::Null);
    }

    #[test]
    fn unify_is_idempotent() {
        let samples = vec![
            Value::Null,
            Value::Integer(-4),
            Value::Real(2.5),
            Value::Text("12".to_string()),
            Value::Blob(b"12".to_vec()),
            Value::Blob(b"1.5".to_vec()),
            Value::Blob(b"hello".to_vec()),
            Value::Blob(b"Nan".to_vec()),
            Value::Blob(vec![0xff, 0xfe]),
        ];

        for sample in samples {
            let once = unify(sample.clone());
            assert_eq!(unify(once.clone()), once, "sample {sample:?}");
        }
    }

    #[test]
    fn non_numeric_words_stay_text() {
        for word in ["nan", "NaN", "Nan", "inf", "Infinity", "-infinity"] {
            let once = unify(Value::Blob(word.as_bytes().to_vec()));
            assert_eq!(once, Value::Text(word.to_string()));
            assert_eq!(unify(once.clone()), once, "word {word}");
        }
        assert_eq!(unify(Value::Blob(b"1e999".to_vec())), Value::Text("1e999".to_string()));
        assert_eq!(unify(Value::Blob(b"-1.5e2".to_vec())), Value::Real(-150.0));
        assert_eq!(unify(Value::Blob(b"1.5".to_vec())), Value::Real(1.5));
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        assert_eq!(unify(Value::Blob(vec![0xff, 0x00])), Value::Blob(vec![0xff, 0x00]));
    }

    #[test]
    fn text_literals_stay_text() {
        let literal = unify_literal(&SqlValue::SingleQuotedString("42".to_string()));
        assert_eq!(literal, Value::Text("42".to_string()));
    }

    #[test]
    fn hex_and_boolean_literals() {
        assert_eq!(
            unify_literal(&SqlValue::HexStringLiteral("ff00".to_string())),
            Value::Blob(vec![0xff, 0x00])
        );
        assert_eq!(unify_literal(&SqlValue::Boolean(true)), Value::Integer(1));
    }

    #[test]
    fn unify_many_converts_native_values() {
        assert_eq!(
            unify_many([1_i32, 2, 3]),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn json_scalars_map_to_values() {
        let json = serde_json::json!([1, 2.5, "x", true, {"a": 1}]);
        let serde_json::Value::Array(items) = json else {
            unreachable!();
        };
        let values: Vec<Value> = items.into_iter().map(Value::from).collect();
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::Real(2.5),
                Value::Text("x".to_string()),
                Value::Integer(1),
                Value::Text("{\"a\":1}".to_string()),
            ]
        );
    }
}
