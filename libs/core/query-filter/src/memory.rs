//! In-process [`QuerySource`] over JSON records.
//!
//! Useful for tests and for small, fully loaded collections. Semantics
//! follow the document store: a field holding an array matches an
//! equality on any of its elements, and comparisons between values of
//! different types never match.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::operator::OperatorKey;
use crate::predicate::{Clause, Condition, FieldFilter, FilterValue, Predicate, SearchClause};
use crate::source::QuerySource;

#[derive(Debug, Error)]
pub enum MemoryQueryError {
    #[error("Operator `{operator}` on field `{field}` is not supported in memory")]
    UnsupportedOperator { field: String, operator: String },
}

#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    records: Arc<Vec<Value>>,
    predicate: Predicate,
    skip: u64,
    limit: Option<u64>,
}

impl MemoryQuery {
    pub fn new(records: impl Into<Arc<Vec<Value>>>) -> Self {
        Self {
            records: records.into(),
            ..Self::default()
        }
    }

    /// Snapshot serialisable items as JSON records.
    pub fn from_items<T: Serialize>(items: &[T]) -> Result<Self, serde_json::Error> {
        let records = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(records))
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn check_supported(&self) -> Result<(), MemoryQueryError> {
        for clause in self.predicate.clauses() {
            if let Clause::Field(FieldFilter {
                field,
                condition: Condition::Bounded(bounds),
            }) = clause
            {
                if let Some(bound) = bounds
                    .iter()
                    .find(|b| matches!(b.key, OperatorKey::PassThrough(_)))
                {
                    return Err(MemoryQueryError::UnsupportedOperator {
                        field: field.clone(),
                        operator: bound.key.as_str().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn matching(&self) -> Result<impl Iterator<Item = &Value>, MemoryQueryError> {
        self.check_supported()?;
        Ok(self
            .records
            .iter()
            .filter(|record| matches_predicate(&self.predicate, record)))
    }
}

#[async_trait]
impl QuerySource for MemoryQuery {
    type Record = Value;
    type Error = MemoryQueryError;

    fn find(mut self, predicate: Predicate) -> Self {
        self.predicate = self.predicate.and(predicate);
        self
    }

    fn skip(mut self, n: u64) -> Self {
        self.skip = n;
        self
    }

    fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    async fn fetch(&self) -> Result<Vec<Value>, MemoryQueryError> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        Ok(self.matching()?.skip(skip).take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64, MemoryQueryError> {
        Ok(self.matching()?.count() as u64)
    }
}

fn matches_predicate(predicate: &Predicate, record: &Value) -> bool {
    predicate.clauses().iter().all(|clause| match clause {
        Clause::Search(search) => matches_search(search, record),
        Clause::Field(filter) => matches_field(filter, record),
    })
}

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, key| value.get(key))
}

fn matches_search(search: &SearchClause, record: &Value) -> bool {
    let pattern = search.pattern.to_lowercase();
    lookup(record, &search.field)
        .and_then(Value::as_str)
        .is_some_and(|text| text.to_lowercase().contains(&pattern))
}

fn matches_field(filter: &FieldFilter, record: &Value) -> bool {
    let Some(stored) = lookup(record, &filter.field) else {
        return false;
    };
    match &filter.condition {
        Condition::Equals(FilterValue::List(options)) => options.iter().any(|option| equals(stored, option)),
        Condition::Equals(expected) => equals(stored, expected),
        Condition::Bounded(bounds) => bounds.iter().all(|bound| match &bound.key {
            OperatorKey::Comparison(op) => compare(stored, &bound.operand).is_some_and(|ord| op.accepts(ord)),
            OperatorKey::PassThrough(_) => false,
        }),
    }
}

fn equals(stored: &Value, expected: &FilterValue) -> bool {
    if let Value::Array(items) = stored {
        if !matches!(expected, FilterValue::List(_)) {
            return items.iter().any(|item| equals(item, expected));
        }
    }
    match (stored, expected) {
        (Value::Array(items), FilterValue::List(expected)) => {
            items.len() == expected.len() && items.iter().zip(expected).all(|(a, b)| equals(a, b))
        }
        (Value::Bool(a), FilterValue::Bool(b)) => a == b,
        _ => compare(stored, expected) == Some(Ordering::Equal),
    }
}

/// Order `stored` against `operand`; `None` when the types differ.
fn compare(stored: &Value, operand: &FilterValue) -> Option<Ordering> {
    match (stored, operand) {
        (Value::String(a), FilterValue::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Number(a), FilterValue::Integer(b)) => match a.as_i64() {
            Some(a) => Some(a.cmp(b)),
            None => a.as_f64()?.partial_cmp(&(*b as f64)),
        },
        (Value::Number(a), FilterValue::Float(b)) => a.as_f64()?.partial_cmp(b),
        (Value::Bool(a), FilterValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
