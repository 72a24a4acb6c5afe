use serde_json::Value as JsonValue;

use crate::csv::csv_rows;
use crate::input::Input;
use crate::read_stub::{ReadOutcome, ReadStub};
use crate::write_stub::{WriteOutcome, WriteStub};
use crate::{ExecResult, QueryResult, StubError, Value};

/// Turns the winning read stub into the rows returned for `input`.
///
/// Deferred payloads (CSV, JSON) are resolved here against the columns the
/// query actually projects; the stub itself is never modified.
pub(crate) fn materialize_read(stub: &ReadStub, input: &Input) -> Result<QueryResult, StubError> {
    let columns = input.columns().to_vec();
    let rows = match stub.outcome() {
        Some(ReadOutcome::Error(error)) => return Err(error.clone()),
        Some(ReadOutcome::Rows(rows)) => rows.clone(),
        Some(ReadOutcome::Csv(data)) => csv_rows(&columns, data)?,
        Some(ReadOutcome::Json(rows)) => json_rows(&columns, rows)?,
        None => return Err(StubError::UnresolvedStub),
    };
    Ok(QueryResult { columns, rows })
}

pub(crate) fn materialize_write(stub: &WriteStub) -> Result<ExecResult, StubError> {
    match stub.outcome() {
        Some(WriteOutcome::Result(result)) => Ok(*result),
        Some(WriteOutcome::Error(error)) => Err(error.clone()),
        None => Err(StubError::UnresolvedStub),
    }
}

fn json_rows(columns: &[String], rows: &[JsonValue]) -> Result<Vec<Vec<Value>>, StubError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| match row {
            JsonValue::Array(cells) => Ok(cells.iter().cloned().map(Value::from).collect()),
            JsonValue::Object(fields) => Ok(columns
                .iter()
                .map(|column| fields.get(column).cloned().map_or(Value::Null, Value::from))
                .collect()),
            other => Err(StubError::InvalidStub(format!(
                "JSON row {index} must be an array or an object, got {other}"
            ))),
        })
        .collect()
}
