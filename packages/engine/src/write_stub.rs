use std::error::Error as StdError;

use crate::condition::{Condition, ConditionChain, Stub};
use crate::registry::global;
use crate::{ExecResult, StubError, Value};

#[derive(Debug, Clone)]
pub enum WriteOutcome {
    Result(ExecResult),
    Error(StubError),
}

/// Starts a stub for INSERT statements naming `columns`.
///
/// With no columns the stub applies to every INSERT.
pub fn insert<I>(columns: I) -> WriteStubBuilder
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    WriteStubBuilder::new(Condition::InsertColumns(
        columns.into_iter().map(Into::into).collect(),
    ))
}

/// Starts a stub for UPDATE statements assigning `columns`.
///
/// With no columns the stub applies to every UPDATE.
pub fn update<I>(columns: I) -> WriteStubBuilder
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    WriteStubBuilder::new(Condition::UpdateColumns(
        columns.into_iter().map(Into::into).collect(),
    ))
}

/// Starts a stub for DELETE statements.
pub fn delete() -> WriteStubBuilder {
    WriteStubBuilder::new(Condition::Delete)
}

#[derive(Debug, Clone)]
pub struct WriteStubBuilder {
    chain: ConditionChain,
}

impl WriteStubBuilder {
    fn new(first: Condition) -> Self {
        Self {
            chain: ConditionChain::new(first),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.chain.push(Condition::TargetTable(table.into()));
        self
    }

    /// Same as [`WriteStubBuilder::table`], reads better on INSERT stubs.
    pub fn into(self, table: impl Into<String>) -> Self {
        self.table(table)
    }

    /// Shortcut for `value_at(0, ..)`.
    pub fn value(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.value_at(0, column, value)
    }

    /// Narrows to statements writing `value` into `column`; `row` selects the
    /// inserted row and is ignored for UPDATE.
    pub fn value_at(
        mut self,
        row: usize,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.chain.push(Condition::row_value(row, column, value));
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

    pub fn result(self, result: ExecResult) -> WriteStub {
        self.finish(Some(WriteOutcome::Result(result)))
    }

    /// Either field may be [`ExecResult::UNAVAILABLE`] to make reading it fail.
    pub fn stub_result(self, last_insert_id: i64, rows_affected: i64) -> WriteStub {
        self.result(ExecResult::new(last_insert_id, rows_affected))
    }

    pub fn rows_affected(self, rows_affected: i64) -> WriteStub {
        self.result(ExecResult::with_rows_affected(rows_affected))
    }

    pub fn error(self, error: impl Into<Box<dyn StdError + Send + Sync>>) -> WriteStub {
        self.finish(Some(WriteOutcome::Error(StubError::declared(error))))
    }

    pub fn unresolved(self) -> WriteStub {
        self.finish(None)
    }

    fn finish(self, outcome: Option<WriteOutcome>) -> WriteStub {
        WriteStub {
            chain: self.chain,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteStub {
    chain: ConditionChain,
    outcome: Option<WriteOutcome>,
}

impl WriteStub {
    pub fn outcome(&self) -> Option<&WriteOutcome> {
        self.outcome.as_ref()
    }

    /// Registers this stub with the process-wide registry.
    pub fn register(self) {
        global().register_write(self);
    }
}

impl Stub for WriteStub {
    fn chain(&self) -> &ConditionChain {
        &self.chain
    }
}
