mod backend;

use std::sync::Arc;

pub use backend::stub::StubBackend;

pub struct OpenStubBackendConfig {
    pub registry: Arc<StubRegistry>,
    pub dialect: SqlDialect,
}

impl Default for OpenStubBackendConfig {
    fn default() -> Self {
        Self {
            registry: global(),
            dialect: SqlDialect::default(),
        }
    }
}

pub async fn open_stub_backend(config: OpenStubBackendConfig) -> Result<StubBackend, StubError> {
    Ok(StubBackend::new(config.registry, config.dialect))
}

pub use sqlstub_engine::{
    delete, global, insert, select, update, ExecResult, QueryResult, SqlBackend, SqlDialect,
    StubError, StubRegistry, Value,
};
