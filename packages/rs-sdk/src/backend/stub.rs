use std::sync::Arc;

use async_trait::async_trait;
use sqlstub_engine::{
    parse_statement, statement_kind, ExecResult, QueryResult, SqlBackend, SqlDialect,
    StatementKind, StubError, StubRegistry, Value,
};
use tracing::debug;

/// A [`SqlBackend`] that answers every statement from registered stubs
/// instead of a database.
pub struct StubBackend {
    registry: Arc<StubRegistry>,
    dialect: SqlDialect,
}

impl StubBackend {
    pub fn new(registry: Arc<StubRegistry>, dialect: SqlDialect) -> Self {
        Self { registry, dialect }
    }

    pub fn registry(&self) -> &StubRegistry {
        &self.registry
    }

    /// Routes by statement kind: SELECT returns rows, writes return an
    /// empty row set.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult, StubError> {
        let statement = parse_statement(sql, self.dialect)?;
        match statement_kind(&statement) {
            StatementKind::Select | StatementKind::Other => {
                self.registry.resolve_read(&statement, params)
            }
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete => {
                self.registry.resolve_write(&statement, params)?;
                Ok(QueryResult {
                    columns: Vec::new(),
                    rows: Vec::new(),
                })
            }
        }
    }
}

#[async_trait(?Send)]
impl SqlBackend for StubBackend {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, StubError> {
        let statement = parse_statement(sql, self.dialect)?;
        debug!(%sql, params = params.len(), "intercepted query");
        self.registry.resolve_read(&statement, params)
    }

    async fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecResult, StubError> {
        let statement = parse_statement(sql, self.dialect)?;
        debug!(%sql, params = params.len(), "intercepted exec");
        self.registry.resolve_write(&statement, params)
    }
}
