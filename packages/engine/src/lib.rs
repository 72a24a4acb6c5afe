mod backend;
mod condition;
mod csv;
mod error;
mod input;
mod materialize;
mod params;
mod read_stub;
mod registry;
mod types;
mod value;
mod write_stub;

pub use backend::{parse_statement, SqlBackend, SqlDialect};
pub use condition::{Condition, ConditionChain, Stub};
pub use error::{DeclaredError, StubError};
pub use input::{statement_kind, Input, StatementKind, StatementView, ValueMap};
pub use read_stub::{select, ReadOutcome, ReadStub, SelectStubBuilder};
pub use registry::{global, StubRegistry};
pub use types::{ExecResult, QueryResult, Value};
pub use value::{unify, unify_many};
pub use write_stub::{delete, insert, update, WriteOutcome, WriteStub, WriteStubBuilder};
