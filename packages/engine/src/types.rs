use crate::StubError;

/// Canonical value shared by stub declarations, query arguments and result rows.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Outcome of a stubbed INSERT, UPDATE or DELETE.
///
/// A field declared as [`ExecResult::UNAVAILABLE`] reports
/// [`StubError::InvalidMutationField`] when it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExecResult {
    last_insert_id: i64,
    rows_affected: i64,
}

impl ExecResult {
    pub const UNAVAILABLE: i64 = -1;

    pub const fn new(last_insert_id: i64, rows_affected: i64) -> Self {
        Self {
            last_insert_id,
            rows_affected,
        }
    }

    pub const fn with_rows_affected(rows_affected: i64) -> Self {
        Self::new(Self::UNAVAILABLE, rows_affected)
    }

    pub fn last_insert_id(&self) -> Result<i64, StubError> {
        available(self.last_insert_id, "last insert id")
    }

    pub fn rows_affected(&self) -> Result<i64, StubError> {
        available(self.rows_affected, "rows affected")
    }
}

fn available(value: i64, field: &'static str) -> Result<i64, StubError> {
    if value == ExecResult::UNAVAILABLE {
        return Err(StubError::InvalidMutationField(field));
    }
    Ok(value)
}
