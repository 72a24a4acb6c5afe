use async_trait::async_trait;
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use crate::{ExecResult, QueryResult, StubError, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlDialect {
    #[default]
    Generic,
    Sqlite,
    Postgres,
    MySql,
}

impl SqlDialect {
    fn parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::MySql => Box::new(MySqlDialect {}),
        }
    }
}

/// The database-client surface the code under test talks to.
#[async_trait(?Send)]
pub trait SqlBackend: Send + Sync {
    fn dialect(&self) -> SqlDialect;

    /// Runs a statement that returns rows.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, StubError>;

    /// Runs a statement that modifies rows.
    async fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecResult, StubError>;
}

pub fn parse_statement(sql: &str, dialect: SqlDialect) -> Result<Statement, StubError> {
    let mut statements = Parser::parse_sql(dialect.parser_dialect().as_ref(), sql)?;
    if statements.len() != 1 {
        return Err(StubError::StatementCount(statements.len()));
    }
    Ok(statements.remove(0))
}
