//! Chainable builder that narrows a [`QuerySource`] from a [`RawQuery`].
//!
//! ```
//! use query_filter::{MemoryQuery, RawQuery, TranslatorConfig, WhereClause};
//!
//! let raw = RawQuery::parse("search=shirt&page=2").unwrap();
//! let config = TranslatorConfig::default();
//! let clause = WhereClause::new(MemoryQuery::default(), &raw, &config)
//!     .search()
//!     .filter()
//!     .unwrap()
//!     .paginate();
//!
//! assert_eq!(clause.window().map(|w| w.skip), Some(6));
//! ```

use std::num::NonZeroU64;

use tracing::debug;

use crate::config::TranslatorConfig;
use crate::error::{TranslationError, TranslationResult};
use crate::operator::OperatorKey;
use crate::page::PageWindow;
use crate::predicate::{Bound, Clause, Condition, FieldFilter, FieldKind, FilterValue, Predicate, SearchClause};
use crate::raw::{QueryValue, RawQuery};
use crate::source::QuerySource;

pub struct WhereClause<'q, S> {
    source: S,
    query: &'q RawQuery,
    config: &'q TranslatorConfig,
    predicate: Predicate,
    window: Option<PageWindow>,
}

impl<'q, S: QuerySource> WhereClause<'q, S> {
    pub fn new(source: S, query: &'q RawQuery, config: &'q TranslatorConfig) -> Self {
        Self {
            source,
            query,
            config,
            predicate: Predicate::match_all(),
            window: None,
        }
    }

    /// Narrow by the search term, if one was given.
    pub fn search(self) -> Self {
        match search_clause(self.query, self.config) {
            Some(clause) => {
                debug!(field = %clause.field, "applying search clause");
                self.narrow(Predicate::from(clause))
            }
            None => self,
        }
    }

    /// Narrow by every non-reserved parameter.
    ///
    /// Fails without touching the source when any parameter cannot be
    /// translated.
    pub fn filter(self) -> TranslationResult<Self> {
        let filters = field_filters(self.query, self.config)?;
        if filters.is_empty() {
            return Ok(self);
        }
        debug!(count = filters.len(), "applying field filters");
        Ok(self.narrow(filters.into_iter().map(Clause::Field).collect()))
    }

    /// Window the source to the requested page at the configured size.
    pub fn paginate(self) -> Self {
        let page_size = self.config.page_size;
        self.paginate_with(page_size)
    }

    pub fn paginate_with(mut self, page_size: NonZeroU64) -> Self {
        let window = PageWindow::from_query(self.query, &self.config.page_key, page_size);
        self.source = self.source.skip(window.skip).limit(window.limit);
        self.window = Some(window);
        self
    }

    /// Everything applied so far, as one conjunction.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// The applied page window, `None` until paginated.
    pub fn window(&self) -> Option<&PageWindow> {
        self.window.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn narrow(self, predicate: Predicate) -> Self {
        Self {
            source: self.source.find(predicate.clone()),
            predicate: self.predicate.and(predicate),
            ..self
        }
    }
}

/// Search clause for the configured search parameter.
///
/// An absent or empty term yields nothing.
pub fn search_clause(raw: &RawQuery, config: &TranslatorConfig) -> Option<SearchClause> {
    raw.text(&config.search_key)
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| SearchClause {
            field: config.search_field.clone(),
            pattern: pattern.to_string(),
        })
}

/// Field filters for every non-reserved parameter of `raw`.
pub fn field_filters(raw: &RawQuery, config: &TranslatorConfig) -> TranslationResult<Vec<FieldFilter>> {
    raw.iter()
        .filter(|(field, _)| !config.is_reserved(field))
        .map(|(field, value)| translate_field(field, value, config.field_kind(field)))
        .collect()
}

fn translate_field(field: &str, value: &QueryValue, kind: FieldKind) -> TranslationResult<FieldFilter> {
    if field.is_empty() {
        return Err(TranslationError::EmptyFieldName);
    }
    // Operator tokens such as `$where` are never field names.
    if field.starts_with('$') || field.contains('\0') {
        return Err(TranslationError::InvalidFieldName {
            field: field.to_string(),
        });
    }

    let condition = match value {
        QueryValue::Text(text) => Condition::Equals(coerce(field, "eq", text, kind)?),
        QueryValue::List(items) => Condition::Equals(FilterValue::List(
            items
                .iter()
                .map(|item| coerce(field, "eq", item, kind))
                .collect::<TranslationResult<_>>()?,
        )),
        QueryValue::Nested(bounds) => Condition::Bounded(
            bounds
                .iter()
                .map(|(key, operand)| translate_bound(field, key, operand, kind))
                .collect::<TranslationResult<_>>()?,
        ),
    };

    Ok(FieldFilter {
        field: field.to_string(),
        condition,
    })
}

fn translate_bound(field: &str, key: &str, operand: &QueryValue, kind: FieldKind) -> TranslationResult<Bound> {
    if key.is_empty() {
        return Err(TranslationError::MalformedQuery(format!(
            "empty operator under `{field}`"
        )));
    }

    let key = OperatorKey::parse(key);
    let operand = match (&key, operand) {
        (_, QueryValue::Nested(_)) => {
            return Err(TranslationError::NestingTooDeep {
                field: field.to_string(),
            });
        }
        (OperatorKey::Comparison(op), QueryValue::Text(text)) => coerce(field, op.mnemonic(), text, kind)?,
        (OperatorKey::Comparison(op), QueryValue::List(_)) => {
            return Err(TranslationError::AmbiguousOperand {
                field: field.to_string(),
                operator: op.mnemonic().to_string(),
            });
        }
        (OperatorKey::PassThrough(_), QueryValue::Text(text)) => coerce_lenient(text, kind),
        (OperatorKey::PassThrough(_), QueryValue::List(items)) => {
            FilterValue::List(items.iter().map(|item| coerce_lenient(item, kind)).collect())
        }
    };

    Ok(Bound { key, operand })
}

fn coerce(field: &str, operator: &str, raw: &str, kind: FieldKind) -> TranslationResult<FilterValue> {
    kind.coerce(raw).ok_or_else(|| TranslationError::InvalidOperand {
        field: field.to_string(),
        operator: operator.to_string(),
        value: raw.to_string(),
        expected: kind.to_string(),
    })
}

/// Pass-through operands are not validated; they keep their text when
/// they do not fit the field's kind.
fn coerce_lenient(raw: &str, kind: FieldKind) -> FilterValue {
    kind.coerce(raw)
        .unwrap_or_else(|| FilterValue::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryQuery;
    use crate::operator::ComparisonOperator::{self, *};
    use serde_json::json;

    fn products_config() -> TranslatorConfig {
        TranslatorConfig::default()
            .with_field_kind("price", FieldKind::Integer)
            .with_field_kind("ratings", FieldKind::Float)
    }

    fn bound(op: ComparisonOperator, n: i64) -> Bound {
        Bound {
            key: op.into(),
            operand: FilterValue::Integer(n),
        }
    }

    #[test]
    fn test_search_filter_and_page_together() {
        let raw = RawQuery::parse("search=shirt&price[gte]=500&price[lte]=1500&page=2").unwrap();
        let config = products_config();

        let clause = WhereClause::new(MemoryQuery::default(), &raw, &config)
            .search()
            .filter()
            .unwrap()
            .paginate();

        let predicate = clause.predicate();
        assert_eq!(predicate.clauses().len(), 2);
        assert_eq!(
            predicate.search(),
            Some(&SearchClause {
                field: "name".to_string(),
                pattern: "shirt".to_string()
            })
        );
        assert_eq!(
            predicate.field("price").map(|f| &f.condition),
            Some(&Condition::Bounded(vec![bound(Gte, 500), bound(Lte, 1500)]))
        );

        let window = clause.window().unwrap();
        assert_eq!(window.current_page, 2);
        assert_eq!(window.skip, 6);
        assert_eq!(window.limit, 6);
    }

    #[test]
    fn test_zero_page_is_first_page() {
        let raw = RawQuery::new().with("page", "0");
        let config = TranslatorConfig::default();
        let clause = WhereClause::new(MemoryQuery::default(), &raw, &config).paginate();
        assert_eq!(clause.window().map(|w| w.skip), Some(0));
    }

    #[test]
    fn test_empty_query_matches_all() {
        let raw = RawQuery::new();
        let config = TranslatorConfig::default();
        let clause = WhereClause::new(MemoryQuery::default(), &raw, &config)
            .search()
            .filter()
            .unwrap();
        assert!(clause.predicate().is_match_all());
        assert!(clause.window().is_none());
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let raw = RawQuery::new().with("search", "");
        assert_eq!(search_clause(&raw, &TranslatorConfig::default()), None);
    }

    #[test]
    fn test_search_field_is_configurable() {
        let raw = RawQuery::new().with("search", "nike");
        let config = TranslatorConfig::default().with_search_field("brand");
        assert_eq!(search_clause(&raw, &config).map(|c| c.field), Some("brand".to_string()));
    }

    #[test]
    fn test_reserved_keys_never_become_filters() {
        let raw = RawQuery::new()
            .with("search", "shirt")
            .with("page", "3")
            .with("limit", "50");
        let filters = field_filters(&raw, &TranslatorConfig::default()).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_literal_values_are_untouched() {
        let raw = RawQuery::new().with("category", "hoodies");
        let filters = field_filters(&raw, &products_config()).unwrap();
        assert_eq!(
            filters,
            vec![FieldFilter {
                field: "category".to_string(),
                condition: Condition::Equals(FilterValue::Text("hoodies".to_string())),
            }]
        );
    }

    #[test]
    fn test_repeated_literal_means_any_of() {
        let raw = RawQuery::parse("category=hoodies&category=sweatshirt").unwrap();
        let filters = field_filters(&raw, &products_config()).unwrap();
        assert_eq!(
            filters[0].condition,
            Condition::Equals(FilterValue::List(vec![
                FilterValue::Text("hoodies".to_string()),
                FilterValue::Text("sweatshirt".to_string()),
            ]))
        );
    }

    #[test]
    fn test_near_miss_operator_passes_through() {
        let raw = RawQuery::new().with("price", QueryValue::nested([("gtex", "5")]));
        let filters = field_filters(&raw, &products_config()).unwrap();
        assert_eq!(
            filters[0].condition,
            Condition::Bounded(vec![Bound {
                key: OperatorKey::PassThrough("gtex".to_string()),
                operand: FilterValue::Integer(5),
            }])
        );
    }

    #[test]
    fn test_top_level_operator_name_is_a_field() {
        let raw = RawQuery::new().with("gte", "5");
        let filters = field_filters(&raw, &products_config()).unwrap();
        assert_eq!(filters[0].field, "gte");
        assert_eq!(
            filters[0].condition,
            Condition::Equals(FilterValue::Text("5".to_string()))
        );
    }

    #[test]
    fn test_operator_shaped_field_names_are_rejected() {
        for query in ["$where=sleep(5000)", "%24where=sleep(5000)", "%24or[gt]=1"] {
            let raw = RawQuery::parse(query).unwrap();
            assert!(
                matches!(
                    field_filters(&raw, &products_config()),
                    Err(TranslationError::InvalidFieldName { ref field }) if field.starts_with('$')
                ),
                "{query}"
            );
        }
    }

    #[test]
    fn test_nul_in_field_name_is_rejected() {
        let raw = RawQuery::new().with("name\0x", "tee");
        assert_eq!(
            field_filters(&raw, &products_config()),
            Err(TranslationError::InvalidFieldName {
                field: "name\0x".to_string()
            })
        );
    }

    #[test]
    fn test_dollar_inside_a_field_name_is_allowed() {
        let raw = RawQuery::new().with("price$usd", "5");
        assert_eq!(field_filters(&raw, &products_config()).unwrap()[0].field, "price$usd");
    }

    #[test]
    fn test_invalid_operand_fails_closed() {
        let raw = RawQuery::new().with("price", QueryValue::nested([("gte", "cheap")]));
        let config = products_config();
        let result = WhereClause::new(MemoryQuery::default(), &raw, &config).filter();
        assert_eq!(
            result.err(),
            Some(TranslationError::InvalidOperand {
                field: "price".to_string(),
                operator: "gte".to_string(),
                value: "cheap".to_string(),
                expected: "integer".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_literal_fails_closed() {
        let raw = RawQuery::new().with("ratings", "high");
        assert!(matches!(
            field_filters(&raw, &products_config()),
            Err(TranslationError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let raw = RawQuery::parse("price[gte][x]=1").unwrap();
        assert_eq!(
            field_filters(&raw, &products_config()),
            Err(TranslationError::NestingTooDeep {
                field: "price".to_string()
            })
        );
    }

    #[test]
    fn test_repeated_comparison_is_ambiguous() {
        let raw = RawQuery::parse("price[gte]=1&price[gte]=2").unwrap();
        assert_eq!(
            field_filters(&raw, &products_config()),
            Err(TranslationError::AmbiguousOperand {
                field: "price".to_string(),
                operator: "gte".to_string(),
            })
        );
    }

    #[test]
    fn test_search_and_filter_on_same_field_are_both_kept() {
        let raw = RawQuery::new().with("search", "tee").with("name", "Basic Tee");
        let config = TranslatorConfig::default();
        let clause = WhereClause::new(MemoryQuery::default(), &raw, &config)
            .search()
            .filter()
            .unwrap();
        assert_eq!(clause.predicate().clauses().len(), 2);
        assert!(clause.predicate().search().is_some());
        assert!(clause.predicate().field("name").is_some());
    }

    #[tokio::test]
    async fn test_search_and_filter_commute() {
        let source = MemoryQuery::new(vec![
            json!({ "name": "Blue Shirt", "price": 700 }),
            json!({ "name": "Cheap Shirt", "price": 300 }),
            json!({ "name": "Hoodie", "price": 900 }),
            json!({ "name": "Night shirt", "price": 500 }),
        ]);
        let raw = RawQuery::parse("search=shirt&price[gte]=500").unwrap();
        let config = products_config();

        let search_first = WhereClause::new(source.clone(), &raw, &config)
            .search()
            .filter()
            .unwrap();
        let filter_first = WhereClause::new(source, &raw, &config)
            .filter()
            .unwrap()
            .search();

        let (a, b) = (search_first.predicate().clauses(), filter_first.predicate().clauses());
        assert_eq!(a.len(), b.len());
        assert!(a.iter().all(|clause| b.contains(clause)));

        let records = search_first.source().fetch().await.unwrap();
        assert_eq!(records, filter_first.source().fetch().await.unwrap());
        assert_eq!(
            records,
            vec![
                json!({ "name": "Blue Shirt", "price": 700 }),
                json!({ "name": "Night shirt", "price": 500 }),
            ]
        );
        assert_eq!(
            search_first.source().count().await.unwrap(),
            filter_first.source().count().await.unwrap()
        );
    }

    #[test]
    fn test_filter_is_idempotent_over_the_same_query() {
        let raw = RawQuery::parse("price[gt]=10&brand=acme").unwrap();
        let config = products_config();
        let first = field_filters(&raw, &config).unwrap();
        let second = field_filters(&raw, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_paginate_with_explicit_size() {
        let raw = RawQuery::new().with("page", "3");
        let config = TranslatorConfig::default();
        let clause = WhereClause::new(MemoryQuery::default(), &raw, &config)
            .paginate_with(NonZeroU64::new(10).unwrap());
        assert_eq!(clause.window().map(|w| (w.skip, w.limit)), Some((20, 10)));
    }

    #[tokio::test]
    async fn test_source_is_narrowed() {
        let source = MemoryQuery::new(vec![
            json!({ "name": "Blue Shirt", "price": 700 }),
            json!({ "name": "Red Shirt", "price": 2000 }),
            json!({ "name": "Hoodie", "price": 900 }),
        ]);
        let raw = RawQuery::parse("search=SHIRT&price[lte]=1500").unwrap();
        let config = products_config();

        let clause = WhereClause::new(source, &raw, &config).search().filter().unwrap();
        let records = clause.source().fetch().await.unwrap();
        assert_eq!(records, vec![json!({ "name": "Blue Shirt", "price": 700 })]);
    }
}
