use crate::input::{Input, StatementView};
use crate::value::{unify, unify_many};
use crate::Value;

/// One structural test against an intercepted statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A SELECT projecting exactly these columns; empty matches any SELECT.
    SelectColumns(Vec<String>),
    /// A SELECT reading exactly these tables, in FROM/JOIN order.
    FromTables(Vec<String>),
    /// An INSERT, UPDATE or DELETE against this table.
    TargetTable(String),
    /// A WHERE equality pinning `column` to `value`.
    Predicate { column: String, value: Value },
    /// The positional arguments supplied with the statement.
    Args(Vec<Value>),
    /// An INSERT naming exactly these columns; empty matches any INSERT.
    InsertColumns(Vec<String>),
    /// An UPDATE assigning exactly these columns; empty matches any UPDATE.
    UpdateColumns(Vec<String>),
    Delete,
    /// The value written to `column`, in inserted row `row` or in the SET clause.
    RowValue {
        row: usize,
        column: String,
        value: Value,
    },
}

impl Condition {
    pub fn predicate(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Predicate {
            column: column.into(),
            value: unify(value.into()),
        }
    }

    pub fn args<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Args(unify_many(args))
    }

    pub fn row_value(row: usize, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::RowValue {
            row,
            column: column.into(),
            value: unify(value.into()),
        }
    }

    pub fn matches(&self, input: &Input) -> bool {
        match self {
            Self::SelectColumns(columns) => match input.view() {
                StatementView::Select(_) => columns_match(columns, input),
                StatementView::Insert(_)
                | StatementView::Update(_)
                | StatementView::Delete(_)
                | StatementView::Other => false,
            },
            Self::FromTables(tables) => match input.view() {
                StatementView::Select(_) => tables.as_slice() == input.tables(),
                StatementView::Insert(_)
                | StatementView::Update(_)
                | StatementView::Delete(_)
                | StatementView::Other => false,
            },
            Self::TargetTable(table) => match input.view() {
                StatementView::Insert(_) | StatementView::Update(_) | StatementView::Delete(_) => {
                    input.target_table().as_deref() == Some(table.as_str())
                }
                StatementView::Select(_) | StatementView::Other => false,
            },
            Self::Predicate { column, value } => input.predicates().get(column) == Some(value),
            Self::Args(args) => args.as_slice() == input.args(),
            Self::InsertColumns(columns) => match input.view() {
                StatementView::Insert(_) => columns_match(columns, input),
                StatementView::Select(_)
                | StatementView::Update(_)
                | StatementView::Delete(_)
                | StatementView::Other => false,
            },
            Self::UpdateColumns(columns) => match input.view() {
                StatementView::Update(_) => columns_match(columns, input),
                StatementView::Select(_)
                | StatementView::Insert(_)
                | StatementView::Delete(_)
                | StatementView::Other => false,
            },
            Self::Delete => matches!(input.view(), StatementView::Delete(_)),
            Self::RowValue { row, column, value } => match input.view() {
                StatementView::Insert(_) => input
                    .rows()
                    .get(*row)
                    .and_then(|values| values.get(column))
                    == Some(value),
                StatementView::Update(_) => input.assignments().get(column) == Some(value),
                StatementView::Select(_) | StatementView::Delete(_) | StatementView::Other => {
                    false
                }
            },
        }
    }
}

fn columns_match(columns: &[String], input: &Input) -> bool {
    columns.is_empty() || columns == input.columns()
}

/// Conditions that must all hold for a stub to apply.
///
/// The number of conditions is the chain's specificity: a longer chain
/// describes a narrower set of statements and wins over a shorter one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionChain(Vec<Condition>);

impl ConditionChain {
    pub fn new(first: Condition) -> Self {
        Self(vec![first])
    }

    pub(crate) fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }

    pub fn matches(&self, input: &Input) -> bool {
        self.0.iter().all(|condition| condition.matches(input))
    }

    pub fn specificity(&self) -> usize {
        self.0.len()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }
}

/// Anything resolution can pick: a condition chain plus whatever the stub
/// declares for the winning statement.
pub trait Stub {
    fn chain(&self) -> &ConditionChain;

    fn matches(&self, input: &Input) -> bool {
        self.chain().matches(input)
    }

    fn specificity(&self) -> usize {
        self.chain().specificity()
    }
}
