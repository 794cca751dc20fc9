use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Comparison operators a client may use inside a field's brackets.
///
/// Parsing is exact and case-sensitive: `gte` is an operator, `GTE` and
/// `gtex` are not.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComparisonOperator {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOperator {
    pub const ALL: [Self; 4] = [Self::Gt, Self::Gte, Self::Lt, Self::Lte];

    /// Recognise a client-facing mnemonic such as `gte`.
    pub fn from_mnemonic(key: &str) -> Option<Self> {
        key.parse().ok()
    }

    pub fn mnemonic(&self) -> &'static str {
        self.into()
    }

    /// The operator as the store spells it, e.g. `$gte` for prefix `$`.
    pub fn native_token(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.mnemonic())
    }

    /// Whether `ordering` (stored value compared to operand) satisfies the operator.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::Gt => ordering.is_gt(),
            Self::Gte => ordering.is_ge(),
            Self::Lt => ordering.is_lt(),
            Self::Lte => ordering.is_le(),
        }
    }
}

/// Key found inside a field's brackets.
///
/// Anything that is not exactly a comparison mnemonic passes through to the
/// store verbatim and unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorKey {
    Comparison(ComparisonOperator),
    PassThrough(String),
}

impl OperatorKey {
    pub fn parse(key: &str) -> Self {
        match ComparisonOperator::from_mnemonic(key) {
            Some(op) => Self::Comparison(op),
            None => Self::PassThrough(key.to_string()),
        }
    }

    /// The key as written by the client.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Comparison(op) => op.mnemonic(),
            Self::PassThrough(key) => key,
        }
    }

    /// The key as sent to the store.
    pub fn native_key(&self, prefix: &str) -> String {
        match self {
            Self::Comparison(op) => op.native_token(prefix),
            Self::PassThrough(key) => key.clone(),
        }
    }
}

impl From<ComparisonOperator> for OperatorKey {
    fn from(op: ComparisonOperator) -> Self {
        Self::Comparison(op)
    }
}
