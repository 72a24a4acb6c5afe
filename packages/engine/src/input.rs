use std::cell::OnceCell;
use std::collections::BTreeMap;

use sqlparser::ast::{
    AssignmentTarget, BinaryOperator, Delete, Expr, FromTable, Insert, ObjectName,
    ObjectNamePart, Query, Select, SelectItem, SetExpr, Statement, TableFactor, TableObject,
    TableWithJoins, UnaryOperator, Update, Value as SqlValue,
};

use crate::params::{bind_placeholders, placeholder_index};
use crate::value::{unify_literal, unify_many};
use crate::Value;

pub type ValueMap = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

/// Borrowed view of the statement shapes the stub engine understands.
#[derive(Debug, Clone, Copy)]
pub enum StatementView<'a> {
    Select(&'a Select),
    Insert(&'a Insert),
    Update(&'a Update),
    Delete(&'a Delete),
    Other,
}

impl StatementView<'_> {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Select(_) => StatementKind::Select,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
            Self::Other => StatementKind::Other,
        }
    }
}

pub fn statement_kind(statement: &Statement) -> StatementKind {
    view_of(statement).kind()
}

fn view_of(statement: &Statement) -> StatementView<'_> {
    match statement {
        Statement::Query(query) => select_of_query(query)
            .map(StatementView::Select)
            .unwrap_or(StatementView::Other),
        Statement::Insert(insert) => StatementView::Insert(insert),
        Statement::Update(update) => StatementView::Update(update),
        Statement::Delete(delete) => StatementView::Delete(delete),
        _ => StatementView::Other,
    }
}

fn select_of_query(query: &Query) -> Option<&Select> {
    match query.body.as_ref() {
        SetExpr::Select(select) => Some(select.as_ref()),
        SetExpr::Query(inner) => select_of_query(inner),
        _ => None,
    }
}

/// Structural view of one intercepted statement and its arguments.
///
/// Derived facets are computed on first access and cached for the lifetime
/// of this value.
pub struct Input {
    statement: Statement,
    args: Vec<Value>,
    columns: OnceCell<Vec<String>>,
    tables: OnceCell<Vec<String>>,
    predicates: OnceCell<ValueMap>,
    rows: OnceCell<Vec<ValueMap>>,
    assignments: OnceCell<ValueMap>,
}

impl Input {
    pub fn new(statement: &Statement, args: &[Value]) -> Self {
        Self {
            statement: bind_placeholders(statement),
            args: unify_many(args.iter().cloned()),
            columns: OnceCell::new(),
            tables: OnceCell::new(),
            predicates: OnceCell::new(),
            rows: OnceCell::new(),
            assignments: OnceCell::new(),
        }
    }

    pub fn view(&self) -> StatementView<'_> {
        view_of(&self.statement)
    }

    pub fn kind(&self) -> StatementKind {
        self.view().kind()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Projected columns of a SELECT, the column list of an INSERT or the
    /// assigned columns of an UPDATE.
    pub fn columns(&self) -> &[String] {
        self.columns.get_or_init(|| match self.view() {
            StatementView::Select(select) => {
                select.projection.iter().map(select_item_name).collect()
            }
            StatementView::Insert(insert) => insert
                .columns
                .iter()
                .map(|column| column.value.clone())
                .collect(),
            StatementView::Update(update) => update
                .assignments
                .iter()
                .filter_map(|assignment| assignment_column(&assignment.target))
                .collect(),
            StatementView::Delete(_) | StatementView::Other => Vec::new(),
        })
    }

    /// Unaliased names of the FROM and JOIN tables of a SELECT, in clause order.
    pub fn tables(&self) -> &[String] {
        self.tables.get_or_init(|| {
            let mut tables = Vec::new();
            if let StatementView::Select(select) = self.view() {
                for table in &select.from {
                    collect_table_names(table, &mut tables);
                }
            }
            tables
        })
    }

    pub fn target_table(&self) -> Option<String> {
        match self.view() {
            StatementView::Insert(insert) => match &insert.table {
                TableObject::TableName(name) => last_ident(name),
                _ => None,
            },
            StatementView::Update(update) => table_with_joins_name(&update.table),
            StatementView::Delete(delete) => {
                let tables = match &delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                        tables
                    }
                };
                tables.first().and_then(table_with_joins_name)
            }
            StatementView::Select(_) | StatementView::Other => None,
        }
    }

    /// Column values pinned by equality filters in the WHERE clause.
    pub fn predicates(&self) -> &ValueMap {
        self.predicates.get_or_init(|| {
            let selection = match self.view() {
                StatementView::Select(select) => select.selection.as_ref(),
                StatementView::Update(update) => update.selection.as_ref(),
                StatementView::Delete(delete) => delete.selection.as_ref(),
                StatementView::Insert(_) | StatementView::Other => None,
            };
            let mut predicates = ValueMap::new();
            if let Some(selection) = selection {
                self.collect_predicates(selection, &mut predicates);
            }
            predicates
        })
    }

    /// One column-to-value map per row of an `INSERT ... VALUES`.
    pub fn rows(&self) -> &[ValueMap] {
        self.rows.get_or_init(|| {
            let StatementView::Insert(insert) = self.view() else {
                return Vec::new();
            };
            let Some(source) = &insert.source else {
                return Vec::new();
            };
            let SetExpr::Values(values) = source.body.as_ref() else {
                return Vec::new();
            };
            values
                .rows
                .iter()
                .map(|row| {
                    insert
                        .columns
                        .iter()
                        .zip(row)
                        .filter_map(|(column, expr)| {
                            self.expr_value(expr).map(|value| (column.value.clone(), value))
                        })
                        .collect()
                })
                .collect()
        })
    }

    /// Column values assigned by the SET clause of an UPDATE.
    pub fn assignments(&self) -> &ValueMap {
        self.assignments.get_or_init(|| {
            let StatementView::Update(update) = self.view() else {
                return ValueMap::new();
            };
            update
                .assignments
                .iter()
                .filter_map(|assignment| {
                    let column = assignment_column(&assignment.target)?;
                    let value = self.expr_value(&assignment.value)?;
                    Some((column, value))
                })
                .collect()
        })
    }

    fn collect_predicates(&self, expr: &Expr, predicates: &mut ValueMap) {
        match expr {
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                self.collect_predicates(left, predicates);
                self.collect_predicates(right, predicates);
            }
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                let pair = match (column_name(left), column_name(right)) {
                    (Some(column), _) => self.expr_value(right).map(|value| (column, value)),
                    (None, Some(column)) => self.expr_value(left).map(|value| (column, value)),
                    (None, None) => None,
                };
                if let Some((column, value)) = pair {
                    predicates.insert(column, value);
                }
            }
            Expr::IsNull(inner) => {
                if let Some(column) = column_name(inner) {
                    predicates.insert(column, Value::Null);
                }
            }
            Expr::Nested(inner) => self.collect_predicates(inner, predicates),
            _ => {}
        }
    }

    fn expr_value(&self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Value(value) => match &value.value {
                SqlValue::Placeholder(token) => {
                    placeholder_index(token).and_then(|index| self.args.get(index).cloned())
                }
                literal => Some(unify_literal(literal)),
            },
            Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr,
            } => match self.expr_value(expr)? {
                Value::Integer(integer) => integer.checked_neg().map(Value::Integer),
                Value::Real(real) => Some(Value::Real(-real)),
                _ => None,
            },
            Expr::UnaryOp {
                op: UnaryOperator::Plus,
                expr,
            }
            | Expr::Nested(expr) => self.expr_value(expr),
            _ => None,
        }
    }
}

fn select_item_name(item: &SelectItem) -> String {
    match item {
        SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
        SelectItem::UnnamedExpr(expr) => column_name(expr).unwrap_or_else(|| expr.to_string()),
        other => other.to_string(),
    }
}

fn column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|ident| ident.value.clone()),
        _ => None,
    }
}

fn assignment_column(target: &AssignmentTarget) -> Option<String> {
    let AssignmentTarget::ColumnName(name) = target else {
        return None;
    };
    last_ident(name)
}

fn last_ident(name: &ObjectName) -> Option<String> {
    name.0
        .last()
        .and_then(ObjectNamePart::as_ident)
        .map(|ident| ident.value.clone())
}

fn table_with_joins_name(table: &TableWithJoins) -> Option<String> {
    let TableFactor::Table { name, .. } = &table.relation else {
        return None;
    };
    last_ident(name)
}

fn collect_table_names(table: &TableWithJoins, out: &mut Vec<String>) {
    collect_table_factor_names(&table.relation, out);
    for join in &table.joins {
        collect_table_factor_names(&join.relation, out);
    }
}

fn collect_table_factor_names(factor: &TableFactor, out: &mut Vec<String>) {
    match factor {
        TableFactor::Table { name, .. } => out.extend(last_ident(name)),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => collect_table_names(table_with_joins, out),
        _ => {}
    }
}
