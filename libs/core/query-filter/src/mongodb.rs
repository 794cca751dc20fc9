//! MongoDB adapter: renders predicates as BSON filter documents.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection,
    bson::{Bson, Document, doc},
    options::FindOptions,
};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::operator::OperatorKey;
use crate::page::MAX_SKIP;
use crate::predicate::{Clause, Condition, FieldFilter, FilterValue, Predicate, SearchClause};
use crate::source::QuerySource;

/// Prefix MongoDB puts on query operators.
pub const OPERATOR_PREFIX: &str = "$";

/// Render `predicate` as a filter document.
///
/// Clauses are joined with `$and` so several clauses on one field never
/// overwrite each other.
pub fn to_document(predicate: &Predicate) -> Document {
    let mut clauses: Vec<Document> = predicate.clauses().iter().map(clause_document).collect();
    match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    }
}

fn clause_document(clause: &Clause) -> Document {
    match clause {
        Clause::Search(search) => search_document(search),
        Clause::Field(filter) => field_document(filter),
    }
}

fn search_document(search: &SearchClause) -> Document {
    let mut inner = Document::new();
    inner.insert("$regex", regex::escape(&search.pattern));
    inner.insert("$options", "i");

    let mut document = Document::new();
    document.insert(search.field.as_str(), inner);
    document
}

fn field_document(filter: &FieldFilter) -> Document {
    let value = match &filter.condition {
        Condition::Equals(FilterValue::List(options)) => {
            Bson::Document(doc! { "$in": options.iter().map(to_bson).collect::<Vec<_>>() })
        }
        Condition::Equals(value) => to_bson(value),
        Condition::Bounded(bounds) => {
            let mut inner = Document::new();
            for bound in bounds {
                inner.insert(native_key(&bound.key), to_bson(&bound.operand));
            }
            Bson::Document(inner)
        }
    };

    let mut document = Document::new();
    document.insert(filter.field.as_str(), value);
    document
}

fn native_key(key: &OperatorKey) -> String {
    key.native_key(OPERATOR_PREFIX)
}

fn to_bson(value: &FilterValue) -> Bson {
    match value {
        FilterValue::Text(text) => Bson::String(text.clone()),
        FilterValue::Integer(n) => Bson::Int64(*n),
        FilterValue::Float(n) => Bson::Double(*n),
        FilterValue::Bool(flag) => Bson::Boolean(*flag),
        FilterValue::List(items) => Bson::Array(items.iter().map(to_bson).collect()),
    }
}

/// A lazily built find over a MongoDB collection.
pub struct MongoQuery<T: Send + Sync> {
    collection: Collection<T>,
    predicate: Predicate,
    skip: Option<u64>,
    limit: Option<u64>,
    sort: Option<Document>,
}

impl<T: Send + Sync> Clone for MongoQuery<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            predicate: self.predicate.clone(),
            skip: self.skip,
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }
}

impl<T: Send + Sync> MongoQuery<T> {
    pub fn new(collection: Collection<T>) -> Self {
        Self {
            collection,
            predicate: Predicate::match_all(),
            skip: None,
            limit: None,
            sort: None,
        }
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    /// The filter document this query will send.
    pub fn filter_document(&self) -> Document {
        to_document(&self.predicate)
    }

    fn find_options(&self) -> FindOptions {
        let mut options = FindOptions::default();
        options.skip = self.skip.map(|n| n.min(MAX_SKIP));
        options.limit = self.limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        options.sort = self.sort.clone();
        options
    }
}

#[async_trait]
impl<T> QuerySource for MongoQuery<T>
where
    T: DeserializeOwned + Send + Sync + Unpin + 'static,
{
    type Record = T;
    type Error = mongodb::error::Error;

    fn find(mut self, predicate: Predicate) -> Self {
        self.predicate = self.predicate.and(predicate);
        self
    }

    fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn fetch(&self) -> Result<Vec<T>, mongodb::error::Error> {
        let cursor = self
            .collection
            .find(self.filter_document())
            .with_options(self.find_options())
            .await?;
        cursor.try_collect().await
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn count(&self) -> Result<u64, mongodb::error::Error> {
        self.collection.count_documents(self.filter_document()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorConfig;
    use crate::predicate::FieldKind;
    use crate::raw::RawQuery;
    use crate::where_clause::{field_filters, search_clause};

    fn translate(query: &str) -> Document {
        let raw = RawQuery::parse(query).unwrap();
        let config = TranslatorConfig::default()
            .with_field_kind("price", FieldKind::Integer)
            .with_field_kind("ratings", FieldKind::Float);

        let mut predicate = Predicate::match_all();
        if let Some(search) = search_clause(&raw, &config) {
            predicate = predicate.and(search.into());
        }
        for filter in field_filters(&raw, &config).unwrap() {
            predicate = predicate.and(filter.into());
        }
        to_document(&predicate)
    }

    #[test]
    fn test_match_all_is_empty_document() {
        assert_eq!(translate(""), doc! {});
        assert_eq!(translate("page=3&limit=10"), doc! {});
    }

    #[test]
    fn test_search_is_escaped_case_insensitive_regex() {
        assert_eq!(
            translate("search=shirt"),
            doc! { "name": { "$regex": "shirt", "$options": "i" } }
        );
        assert_eq!(
            translate("search=a.b*"),
            doc! { "name": { "$regex": "a\\.b\\*", "$options": "i" } }
        );
    }

    #[test]
    fn test_comparison_operators_are_rewritten() {
        assert_eq!(
            translate("price[gte]=500&price[lte]=1500"),
            doc! { "price": { "$gte": 500_i64, "$lte": 1500_i64 } }
        );
        assert_eq!(
            translate("ratings[gt]=4"),
            doc! { "ratings": { "$gt": 4.0 } }
        );
    }

    #[test]
    fn test_pass_through_key_is_verbatim() {
        assert_eq!(
            translate("price[gtex]=5"),
            doc! { "price": { "gtex": 5_i64 } }
        );
        assert_eq!(
            translate("brand[$ne]=acme"),
            doc! { "brand": { "$ne": "acme" } }
        );
    }

    #[test]
    fn test_literals_are_untouched() {
        assert_eq!(translate("category=hoodies"), doc! { "category": "hoodies" });
        assert_eq!(translate("gte=5"), doc! { "gte": "5" });
    }

    #[test]
    fn test_repeated_literal_is_in() {
        assert_eq!(
            translate("category=hoodies&category=sweatshirt"),
            doc! { "category": { "$in": ["hoodies", "sweatshirt"] } }
        );
    }

    #[test]
    fn test_several_clauses_are_anded() {
        assert_eq!(
            translate("search=shirt&price[gte]=500&page=2"),
            doc! {
                "$and": [
                    { "name": { "$regex": "shirt", "$options": "i" } },
                    { "price": { "$gte": 500_i64 } },
                ]
            }
        );
    }

    #[test]
    fn test_bson_values() {
        assert_eq!(to_bson(&FilterValue::Bool(true)), Bson::Boolean(true));
        assert_eq!(
            to_bson(&FilterValue::List(vec![FilterValue::Integer(1)])),
            Bson::Array(vec![Bson::Int64(1)])
        );
    }

    #[tokio::test]
    async fn test_find_options_keep_skip_in_signed_range() {
        let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let collection = client.database("catalogue").collection::<Document>("products");

        let options = MongoQuery::new(collection).skip(u64::MAX).limit(6).find_options();
        assert_eq!(options.skip, Some(MAX_SKIP));
        assert_eq!(options.limit, Some(6));
    }
}
