use std::error::Error as StdError;

use serde_json::Value as JsonValue;

use crate::condition::{Condition, ConditionChain, Stub};
use crate::registry::global;
use crate::{StubError, Value};

/// What a read stub hands back once it wins resolution.
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    Rows(Vec<Vec<Value>>),
    /// CSV text, parsed against the projected columns of the matched query.
    Csv(String),
    /// JSON rows, either positional arrays or objects keyed by column name.
    Json(Vec<JsonValue>),
    Error(StubError),
}

/// Starts a stub for SELECT statements projecting `columns`.
///
/// With no columns the stub applies to every SELECT.
pub fn select<I>(columns: I) -> SelectStubBuilder
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    SelectStubBuilder {
        chain: ConditionChain::new(Condition::SelectColumns(
            columns.into_iter().map(Into::into).collect(),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct SelectStubBuilder {
    chain: ConditionChain,
}

impl SelectStubBuilder {
    /// Narrows to the un-aliased FROM and JOIN tables, in order.
    pub fn from<I>(mut self, tables: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.chain.push(Condition::FromTables(
            tables.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.chain.push(Condition::predicate(column, value));
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.chain.push(Condition::args(args));
        self
    }

    pub fn rows<R, I>(self, rows: R) -> ReadStub
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.finish(Some(ReadOutcome::Rows(rows)))
    }

    pub fn csv(self, data: impl Into<String>) -> ReadStub {
        self.finish(Some(ReadOutcome::Csv(data.into())))
    }

    pub fn json(self, data: &str) -> Result<ReadStub, StubError> {
        let parsed: JsonValue = serde_json::from_str(data)
            .map_err(|error| StubError::InvalidStub(format!("JSON rows: {error}")))?;
        let JsonValue::Array(rows) = parsed else {
            return Err(StubError::InvalidStub(
                "JSON rows must be an array".to_string(),
            ));
        };
        Ok(self.finish(Some(ReadOutcome::Json(rows))))
    }

    pub fn error(self, error: impl Into<Box<dyn StdError + Send + Sync>>) -> ReadStub {
        self.finish(Some(ReadOutcome::Error(StubError::declared(error))))
    }

    /// A stub that matches but declares nothing; resolving it reports
    /// [`StubError::UnresolvedStub`].
    pub fn unresolved(self) -> ReadStub {
        self.finish(None)
    }

    fn finish(self, outcome: Option<ReadOutcome>) -> ReadStub {
        ReadStub {
            chain: self.chain,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadStub {
    chain: ConditionChain,
    outcome: Option<ReadOutcome>,
}

impl ReadStub {
    pub fn outcome(&self) -> Option<&ReadOutcome> {
        self.outcome.as_ref()
    }

    /// Registers this stub with the process-wide registry.
    pub fn register(self) {
        global().register_read(self);
    }
}

impl Stub for ReadStub {
    fn chain(&self) -> &ConditionChain {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::{select, ReadOutcome};
    use crate::condition::{Condition, Stub};
    use crate::{StubError, Value};

    #[test]
    fn builder_appends_conditions_in_order() {
        let stub = select(["id", "name"])
            .from(["users"])
            .where_eq("id", 1)
            .args([1])
            .rows([[Value::from(1), Value::from("a")]]);

        assert_eq!(stub.specificity(), 4);
        assert_eq!(
            stub.chain().conditions(),
            [
                Condition::SelectColumns(vec!["id".to_string(), "name".to_string()]),
                Condition::FromTables(vec!["users".to_string()]),
                Condition::predicate("id", 1),
                Condition::args([1]),
            ]
        );
    }

    #[test]
    fn json_payload_must_be_an_array() {
        let error = select(Vec::<String>::new())
            .json(r#"{"id": 1}"#)
            .expect_err("object payload should be rejected");
        assert!(matches!(error, StubError::InvalidStub(_)));

        let stub = select(Vec::<String>::new())
            .json(r#"[[1, "a"], {"id": 2}]"#)
            .expect("array payload should parse");
        assert!(matches!(stub.outcome(), Some(ReadOutcome::Json(rows)) if rows.len() == 2));
    }

    #[test]
    fn unresolved_stub_has_no_outcome() {
        let stub = select(["id"]).unresolved();
        assert!(stub.outcome().is_none());
    }
}
