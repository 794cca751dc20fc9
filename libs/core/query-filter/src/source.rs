use async_trait::async_trait;

use crate::predicate::Predicate;

/// A queryable collection the translator can narrow, window and run.
///
/// Narrowing methods consume and return the query so calls chain; cloning
/// a query lets it be issued again without disturbing the original.
#[async_trait]
pub trait QuerySource: Clone + Send + Sync {
    type Record: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Narrow to records also matching `predicate`.
    fn find(self, predicate: Predicate) -> Self;

    fn skip(self, n: u64) -> Self;

    fn limit(self, n: u64) -> Self;

    /// Run the query, honouring skip and limit.
    async fn fetch(&self) -> Result<Vec<Self::Record>, Self::Error>;

    /// Count matching records, ignoring skip and limit.
    async fn count(&self) -> Result<u64, Self::Error>;
}
