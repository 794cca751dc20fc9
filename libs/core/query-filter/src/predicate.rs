//! Typed, store-independent predicate produced by the translator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::operator::OperatorKey;

/// An operand after coercion to the field's declared kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Integer(n) => Value::from(*n),
            Self::Float(n) => Value::from(*n),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

/// How operands for a field are coerced before they reach the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FieldKind {
    #[default]
    Text,
    Integer,
    Float,
    Bool,
}

impl FieldKind {
    /// Coerce a raw operand, `None` when it does not fit this kind.
    pub fn coerce(&self, raw: &str) -> Option<FilterValue> {
        match self {
            Self::Text => Some(FilterValue::Text(raw.to_string())),
            Self::Integer => raw.trim().parse().ok().map(FilterValue::Integer),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(FilterValue::Float),
            Self::Bool => match raw.trim() {
                "true" => Some(FilterValue::Bool(true)),
                "false" => Some(FilterValue::Bool(false)),
                _ => None,
            },
        }
    }
}

/// One `operator: operand` pair inside a field's brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub key: OperatorKey,
    pub operand: FilterValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field=value`, a list value means "any of".
    Equals(FilterValue),
    /// `field[op]=value`, all bounds must hold.
    Bounded(Vec<Bound>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub condition: Condition,
}

/// Case-insensitive substring match of `pattern` against `field`.
///
/// The pattern is a literal; store adapters escape it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchClause {
    pub field: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Search(SearchClause),
    Field(FieldFilter),
}

/// A conjunction of clauses. No clauses matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Conjunction of `self` and `other`.
    pub fn and(mut self, other: Predicate) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn search(&self) -> Option<&SearchClause> {
        self.clauses.iter().find_map(|clause| match clause {
            Clause::Search(search) => Some(search),
            Clause::Field(_) => None,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldFilter> {
        self.clauses.iter().find_map(|clause| match clause {
            Clause::Field(filter) if filter.field == name => Some(filter),
            _ => None,
        })
    }
}

impl From<SearchClause> for Predicate {
    fn from(clause: SearchClause) -> Self {
        Self {
            clauses: vec![Clause::Search(clause)],
        }
    }
}

impl From<FieldFilter> for Predicate {
    fn from(filter: FieldFilter) -> Self {
        Self {
            clauses: vec![Clause::Field(filter)],
        }
    }
}

impl FromIterator<Clause> for Predicate {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}
