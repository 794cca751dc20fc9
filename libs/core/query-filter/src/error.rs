use thiserror::Error;

/// Errors raised while turning a raw query into a predicate.
///
/// Every variant is a client error: the query is rejected as a whole and
/// nothing reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Field `{field}` is given both a literal value and operator bounds")]
    ConflictingClause { field: String },

    #[error("Field `{field}` nests operators more than one level deep")]
    NestingTooDeep { field: String },

    #[error("Operator `{operator}` on field `{field}` was given more than one operand")]
    AmbiguousOperand { field: String, operator: String },

    #[error("Operand `{value}` for `{operator}` on field `{field}` is not a valid {expected}")]
    InvalidOperand {
        field: String,
        operator: String,
        value: String,
        expected: String,
    },

    #[error("Query parameter with an empty field name")]
    EmptyFieldName,

    #[error("Field name `{field}` is not allowed")]
    InvalidFieldName { field: String },
}

impl TranslationError {
    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ConflictingClause { field }
            | Self::NestingTooDeep { field }
            | Self::AmbiguousOperand { field, .. }
            | Self::InvalidOperand { field, .. }
            | Self::InvalidFieldName { field } => Some(field),
            Self::MalformedQuery(_) | Self::EmptyFieldName => None,
        }
    }
}

pub type TranslationResult<T> = Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_is_reported_for_field_errors() {
        let err = TranslationError::AmbiguousOperand {
            field: "price".to_string(),
            operator: "gte".to_string(),
        };
        assert_eq!(err.field(), Some("price"));
        assert_eq!(TranslationError::EmptyFieldName.field(), None);
    }

    #[test]
    fn test_display_names_operand() {
        let err = TranslationError::InvalidOperand {
            field: "price".to_string(),
            operator: "gte".to_string(),
            value: "cheap".to_string(),
            expected: "integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operand `cheap` for `gte` on field `price` is not a valid integer"
        );
    }
}
