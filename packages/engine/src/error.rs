use std::error::Error as StdError;
use std::sync::Arc;

pub type DeclaredError = Arc<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StubError {
    /// No registered stub matched the intercepted statement.
    #[error("no stub matches query: {sql}")]
    NoMatchingStub { sql: String },
    /// A stub matched but declares neither data nor a result nor an error.
    #[error("stub matched but declares no rows, result or error")]
    UnresolvedStub,
    /// An error the test declared on purpose, passed through verbatim.
    #[error("{0}")]
    Declared(DeclaredError),
    #[error("{0} is unavailable for this result")]
    InvalidMutationField(&'static str),
    #[error("invalid stub payload: {0}")]
    InvalidStub(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("expected a single SQL statement, got {0}")]
    StatementCount(usize),
}

impl StubError {
    pub fn declared(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Declared(Arc::from(error.into()))
    }
}

impl From<sqlparser::parser::ParserError> for StubError {
    fn from(error: sqlparser::parser::ParserError) -> Self {
        Self::Parse(error.to_string())
    }
}
