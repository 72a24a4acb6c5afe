use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use sqlparser::ast::Statement;
use tracing::{debug, warn};

use crate::condition::Stub;
use crate::input::Input;
use crate::materialize::{materialize_read, materialize_write};
use crate::read_stub::ReadStub;
use crate::write_stub::WriteStub;
use crate::{ExecResult, QueryResult, StubError, Value};

/// Registered read and write stubs, in registration order.
///
/// One lock covers both collections, so a [`StubRegistry::reset`] is never
/// observed half-done by a concurrent resolution.
#[derive(Debug, Default)]
pub struct StubRegistry {
    stubs: Mutex<Stubs>,
}

#[derive(Debug, Default)]
struct Stubs {
    reads: Vec<Arc<ReadStub>>,
    writes: Vec<Arc<WriteStub>>,
}

static GLOBAL: OnceLock<Arc<StubRegistry>> = OnceLock::new();

/// The process-wide registry used by [`ReadStub::register`] and
/// [`WriteStub::register`].
pub fn global() -> Arc<StubRegistry> {
    GLOBAL
        .get_or_init(|| Arc::new(StubRegistry::new()))
        .clone()
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_read(&self, stub: ReadStub) {
        self.stubs.lock().reads.push(Arc::new(stub));
    }

    pub fn register_write(&self, stub: WriteStub) {
        self.stubs.lock().writes.push(Arc::new(stub));
    }

    /// Drops every registered stub.
    pub fn reset(&self) {
        let mut stubs = self.stubs.lock();
        stubs.reads.clear();
        stubs.writes.clear();
    }

    pub fn read_stub_count(&self) -> usize {
        self.stubs.lock().reads.len()
    }

    pub fn write_stub_count(&self) -> usize {
        self.stubs.lock().writes.len()
    }

    pub fn resolve_read(
        &self,
        statement: &Statement,
        args: &[Value],
    ) -> Result<QueryResult, StubError> {
        let input = Input::new(statement, args);
        let winner = {
            let stubs = self.stubs.lock();
            select_winner(&stubs.reads, &input)
        };
        let Some(stub) = winner else {
            return Err(no_match(statement));
        };
        debug!(
            specificity = stub.specificity(),
            sql = %statement,
            "resolved read stub"
        );
        materialize_read(&stub, &input)
    }

    pub fn resolve_write(
        &self,
        statement: &Statement,
        args: &[Value],
    ) -> Result<ExecResult, StubError> {
        let input = Input::new(statement, args);
        let winner = {
            let stubs = self.stubs.lock();
            select_winner(&stubs.writes, &input)
        };
        let Some(stub) = winner else {
            return Err(no_match(statement));
        };
        debug!(
            specificity = stub.specificity(),
            sql = %statement,
            "resolved write stub"
        );
        materialize_write(&stub)
    }
}

fn no_match(statement: &Statement) -> StubError {
    let sql = statement.to_string();
    warn!(%sql, "no stub matches query");
    StubError::NoMatchingStub { sql }
}

/// Picks the matching stub with the highest specificity; among equally
/// specific matches the most recently registered one wins.
fn select_winner<S: Stub>(stubs: &[Arc<S>], input: &Input) -> Option<Arc<S>> {
    stubs
        .iter()
        .enumerate()
        .filter(|(_, stub)| stub.matches(input))
        .max_by_key(|(index, stub)| (stub.specificity(), *index))
        .map(|(_, stub)| Arc::clone(stub))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use sqlparser::ast::Statement;
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    use super::{select_winner, StubRegistry};
    use crate::condition::Stub;
    use crate::input::Input;
    use crate::read_stub::select;
    use crate::write_stub::{delete, insert, update};
    use crate::{StubError, Value};

    fn parse(sql: &str) -> Statement {
        let mut statements = Parser::parse_sql(&GenericDialect {}, sql).expect("parse SQL");
        statements.remove(0)
    }

    fn first_cell(registry: &StubRegistry, sql: &str) -> Value {
        let result = registry
            .resolve_read(&parse(sql), &[])
            .expect("read should resolve");
        result.rows[0][0].clone()
    }

    #[test]
    fn specific_stub_beats_wildcard_in_either_order() {
        for wildcard_first in [true, false] {
            let registry = StubRegistry::new();
            let wildcard = select(Vec::<String>::new()).rows([[Value::from("wildcard")]]);
            let specific = select(["id"]).from(["users"]).rows([[Value::from("specific")]]);
            if wildcard_first {
                registry.register_read(wildcard);
                registry.register_read(specific);
            } else {
                registry.register_read(specific);
                registry.register_read(wildcard);
            }

            assert_eq!(
                first_cell(&registry, "SELECT id FROM users"),
                Value::from("specific")
            );
            assert_eq!(
                first_cell(&registry, "SELECT name FROM users"),
                Value::from("wildcard")
            );
        }
    }

    #[test]
    fn equal_specificity_prefers_latest_registration() {
        let registry = StubRegistry::new();
        registry.register_read(select(Vec::<String>::new()).rows([[Value::from("first")]]));
        registry.register_read(select(["id"]).rows([[Value::from("second")]]));
        registry.register_read(select(Vec::<String>::new()).rows([[Value::from("third")]]));

        assert_eq!(first_cell(&registry, "SELECT id FROM t"), Value::from("third"));
    }

    #[test]
    fn winner_selection_is_shared_by_reads_and_writes() {
        let reads = vec![
            Arc::new(select(["id"]).from(["users"]).rows([[Value::from(1)]])),
            Arc::new(select(Vec::<String>::new()).rows([[Value::from(2)]])),
        ];
        let statement = parse("SELECT id FROM users");
        let input = Input::new(&statement, &[]);
        let winner = select_winner(&reads, &input).expect("a read stub should match");
        assert!(Arc::ptr_eq(&winner, &reads[0]));
        assert_eq!(winner.specificity(), 2);

        let writes = vec![
            Arc::new(update(["name"]).table("users").rows_affected(1)),
            Arc::new(update(["name"]).table("users").rows_affected(2)),
            Arc::new(update(["name"]).table("accounts").rows_affected(3)),
        ];
        let statement = parse("UPDATE users SET name = 'x'");
        let input = Input::new(&statement, &[]);
        let winner = select_winner(&writes, &input).expect("a write stub should match");
        assert!(Arc::ptr_eq(&winner, &writes[1]));
        assert!(!writes[2].matches(&input));
    }

    #[test]
    fn disjoint_stubs_resolve_independently() {
        let registry = StubRegistry::new();
        registry.register_read(
            select(["id"])
                .from(["users"])
                .where_eq("id", 1)
                .rows([[Value::from("one")]]),
        );
        registry.register_read(
            select(["id"])
                .from(["users"])
                .where_eq("id", 2)
                .rows([[Value::from("two")]]),
        );

        assert_eq!(
            first_cell(&registry, "SELECT id FROM users WHERE id = 1"),
            Value::from("one")
        );
        assert_eq!(
            first_cell(&registry, "SELECT id FROM users WHERE id = 2"),
            Value::from("two")
        );
        assert!(matches!(
            registry.resolve_read(&parse("SELECT id FROM users WHERE id = 3"), &[]),
            Err(StubError::NoMatchingStub { .. })
        ));
    }

    #[test]
    fn writes_consult_only_write_stubs() {
        let registry = StubRegistry::new();
        registry.register_read(select(Vec::<String>::new()).rows([[Value::from(1)]]));
        registry.register_write(insert(Vec::<String>::new()).stub_result(5, 1));
        registry.register_write(update(["name"]).table("users").rows_affected(2));
        registry.register_write(delete().table("users").error("foreign key violation"));

        let inserted = registry
            .resolve_write(&parse("INSERT INTO users (id) VALUES (1)"), &[])
            .expect("insert should resolve");
        assert_eq!(inserted.last_insert_id().unwrap(), 5);

        let updated = registry
            .resolve_write(&parse("UPDATE users SET name = 'x' WHERE id = 1"), &[])
            .expect("update should resolve");
        assert_eq!(updated.rows_affected().unwrap(), 2);
        assert!(matches!(
            updated.last_insert_id(),
            Err(StubError::InvalidMutationField(_))
        ));

        let deleted = registry.resolve_write(&parse("DELETE FROM users"), &[]);
        assert_eq!(
            deleted.expect_err("delete should fail").to_string(),
            "foreign key violation"
        );

        assert!(matches!(
            registry.resolve_write(&parse("SELECT 1"), &[]),
            Err(StubError::NoMatchingStub { .. })
        ));
        assert!(matches!(
            registry.resolve_read(&parse("INSERT INTO users (id) VALUES (1)"), &[]),
            Err(StubError::NoMatchingStub { .. })
        ));
    }

    #[test]
    fn unresolved_insert_stub_reports_unresolved() {
        let registry = StubRegistry::new();
        registry.register_write(insert(["id"]).unresolved());

        assert!(matches!(
            registry.resolve_write(&parse("INSERT INTO users (id) VALUES (1)"), &[]),
            Err(StubError::UnresolvedStub)
        ));
    }

    #[test]
    fn reset_forgets_every_stub() {
        let registry = StubRegistry::new();
        registry.register_read(select(["id"]).rows([[Value::from(1)]]));
        registry.register_write(insert(Vec::<String>::new()).stub_result(1, 1));
        assert!(registry.resolve_read(&parse("SELECT id FROM t"), &[]).is_ok());

        registry.reset();

        assert_eq!(registry.read_stub_count(), 0);
        assert_eq!(registry.write_stub_count(), 0);
        assert!(matches!(
            registry.resolve_read(&parse("SELECT id FROM t"), &[]),
            Err(StubError::NoMatchingStub { .. })
        ));
        assert!(matches!(
            registry.resolve_write(&parse("INSERT INTO t (id) VALUES (1)"), &[]),
            Err(StubError::NoMatchingStub { .. })
        ));
    }

    #[test]
    fn concurrent_registration_and_resolution() {
        let registry = Arc::new(StubRegistry::new());
        registry.register_read(select(Vec::<String>::new()).rows([[Value::from(0)]]));

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for round in 0..50 {
                        registry.register_read(
                            select(["id"])
                                .where_eq("id", worker * 100 + round)
                                .rows([[Value::from(worker)]]),
                        );
                        let result = registry
                            .resolve_read(&parse("SELECT id FROM t WHERE id = -1"), &[])
                            .expect("wildcard should always match");
                        assert_eq!(result.rows.len(), 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker should finish");
        }

        assert_eq!(registry.read_stub_count(), 201);
    }
}
