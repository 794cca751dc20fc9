use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::config::TranslatorConfig;
use crate::error::TranslationError;
use crate::page::PageWindow;
use crate::raw::RawQuery;
use crate::source::QuerySource;
use crate::where_clause::WhereClause;

/// One page of a filtered collection together with its counts.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    pub records: Vec<T>,
    /// Records matching search and filters, across all pages
    pub filtered_count: u64,
    /// Records in the collection, ignoring the query entirely
    pub total_count: u64,
    pub page: PageWindow,
}

impl<T> Listing<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            records: self.records.into_iter().map(f).collect(),
            filtered_count: self.filtered_count,
            total_count: self.total_count,
            page: self.page,
        }
    }
}

#[derive(Debug, Error)]
pub enum ListingError<E> {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Query source failed: {0}")]
    Source(E),
}

/// Run search, filter and pagination for `raw` against `base`.
///
/// The unfiltered total and the filtered count are taken concurrently and
/// before the page window is applied, so `filtered_count` reflects every
/// page.
#[instrument(skip_all, fields(params = raw.len()))]
pub async fn execute<S: QuerySource>(
    base: S,
    raw: &RawQuery,
    config: &TranslatorConfig,
) -> Result<Listing<S::Record>, ListingError<S::Error>> {
    let clause = WhereClause::new(base.clone(), raw, config).search().filter()?;

    let (total_count, filtered_count) =
        futures::try_join!(base.count(), clause.source().count()).map_err(ListingError::Source)?;

    let clause = clause.paginate();
    let page = clause
        .window()
        .copied()
        .unwrap_or_else(|| PageWindow::first(config.page_size));
    let records = clause.source().fetch().await.map_err(ListingError::Source)?;

    debug!(
        total_count,
        filtered_count,
        page = page.current_page,
        returned = records.len(),
        "listing executed"
    );

    Ok(Listing {
        records,
        filtered_count,
        total_count,
        page,
    })
}
