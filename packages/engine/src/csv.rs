use crate::value::parse_real;
use crate::{StubError, Value};

/// One parsed CSV cell. Quoted cells keep their exact text and are never
/// retyped; bare cells are trimmed and typed.
#[derive(Debug, Clone, PartialEq)]
enum Field {
    Quoted(String),
    Bare(String),
}

impl Field {
    fn text(&self) -> &str {
        match self {
            Field::Quoted(text) | Field::Bare(text) => text,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Field::Quoted(text) => Value::Text(text),
            Field::Bare(text) => bare_value(text),
        }
    }
}

/// Parses CSV stub data into rows for a query projecting `columns`.
///
/// A leading record equal to `columns` is treated as a header and skipped.
pub(crate) fn csv_rows(columns: &[String], data: &str) -> Result<Vec<Vec<Value>>, StubError> {
    let mut records = parse_records(data)?;
    let has_header = records.first().is_some_and(|first| {
        first.len() == columns.len()
            && first
                .iter()
                .zip(columns)
                .all(|(field, column)| field.text().eq_ignore_ascii_case(column))
    });
    if has_header {
        records.remove(0);
    }
    Ok(records
        .into_iter()
        .map(|record| record.into_iter().map(Field::into_value).collect())
        .collect())
}

fn bare_value(field: String) -> Value {
    if field.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(integer) = field.parse::<i64>() {
        return Value::Integer(integer);
    }
    if let Some(real) = parse_real(&field) {
        return Value::Real(real);
    }
    Value::Text(field)
}

fn parse_records(data: &str) -> Result<Vec<Vec<Field>>, StubError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    // Set once a field opened with a quote; cleared when the field ends.
    let mut was_quoted = false;
    let mut line = 1;
    let mut chars = data.chars().peekable();

    while let Some(ch) = chars.next() {
        if quoted {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if !was_quoted && field.trim().is_empty() => {
                field.clear();
                quoted = true;
                was_quoted = true;
            }
            ',' => record.push(finish_field(&mut field, &mut was_quoted)),
            '\n' => {
                line += 1;
                record.push(finish_field(&mut field, &mut was_quoted));
                push_record(&mut records, std::mem::take(&mut record));
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            // Padding after a closing quote is not part of the field.
            _ if was_quoted && ch.is_whitespace() => {}
            _ => field.push(ch),
        }
    }

    if quoted {
        return Err(StubError::InvalidStub(format!(
            "unterminated quoted CSV field on line {line}"
        )));
    }
    record.push(finish_field(&mut field, &mut was_quoted));
    push_record(&mut records, record);
    Ok(records)
}

fn finish_field(field: &mut String, was_quoted: &mut bool) -> Field {
    let text = std::mem::take(field);
    if std::mem::take(was_quoted) {
        Field::Quoted(text)
    } else {
        Field::Bare(text.trim().to_string())
    }
}

fn push_record(records: &mut Vec<Vec<Field>>, record: Vec<Field>) {
    let blank = matches!(record.as_slice(), [Field::Bare(text)] if text.is_empty());
    if !blank {
        records.push(record);
    }
}
