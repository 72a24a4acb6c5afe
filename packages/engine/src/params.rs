use std::convert::Infallible;
use std::ops::ControlFlow;

use sqlparser::ast::{Statement, Value as SqlValue};
use sqlparser::ast::{VisitMut, VisitorMut};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PlaceholderState {
    next_ordinal: usize,
}

impl PlaceholderState {
    pub(crate) fn new() -> Self {
        Self { next_ordinal: 0 }
    }

    /// Zero-based argument index for a placeholder token, advancing the
    /// ordinal for anonymous `?` placeholders.
    pub(crate) fn resolve(&mut self, token: &str) -> Option<usize> {
        let trimmed = token.trim();
        if trimmed.is_empty() || trimmed == "?" {
            let index = self.next_ordinal;
            self.next_ordinal += 1;
            return Some(index);
        }
        let index = placeholder_index(trimmed)?;
        self.next_ordinal = self.next_ordinal.max(index + 1);
        Some(index)
    }
}

/// Zero-based argument index of a numbered placeholder (`?N` or `$N`).
pub(crate) fn placeholder_index(token: &str) -> Option<usize> {
    let trimmed = token.trim();
    let numeric = trimmed
        .strip_prefix('?')
        .or_else(|| trimmed.strip_prefix('$'))?;
    match numeric.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(position) => Some(position - 1),
    }
}

/// Returns a copy of `statement` in which every placeholder is numbered, so
/// that a placeholder's argument can be looked up without knowing where it
/// sits in the statement.
pub(crate) fn bind_placeholders(statement: &Statement) -> Statement {
    let mut bound = statement.clone();
    let mut binder = PlaceholderBinder {
        state: PlaceholderState::new(),
    };
    let _ = bound.visit(&mut binder);
    bound
}

struct PlaceholderBinder {
    state: PlaceholderState,
}

impl VisitorMut for PlaceholderBinder {
    type Break = Infallible;

    fn pre_visit_value(&mut self, value: &mut SqlValue) -> ControlFlow<Self::Break> {
        let SqlValue::Placeholder(token) = value else {
            return ControlFlow::Continue(());
        };
        if let Some(index) = self.state.resolve(token) {
            *token = format!("${}", index + 1);
        }
        ControlFlow::Continue(())
    }
}
