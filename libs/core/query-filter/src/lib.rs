//! Query translation for list endpoints: search, field filters and
//! pagination driven by client query parameters.
//!
//! A [`RawQuery`] is narrowed step by step by a [`WhereClause`]:
//!
//! ```text
//! ?search=shirt&price[gte]=500&price[lte]=1500&page=2
//!         │
//!         ▼
//!   RawQuery ──► search() ──► filter()? ──► paginate()
//!                   │             │             │
//!                   ▼             ▼             ▼
//!             name ~* shirt   price in      skip 6, limit 6
//!                             [500, 1500]
//! ```
//!
//! Each step narrows a [`QuerySource`]; the source decides how the typed
//! [`Predicate`] reaches the store. [`execute`] runs the whole flow and
//! returns a [`Listing`] with the page of records, the filtered count and
//! the unfiltered total.
//!
//! # Features
//!
//! - `axum` - `RawQuery` becomes a `FromRequestParts` extractor
//! - `mongodb` - [`mongodb::MongoQuery`] source and BSON rendering
//! - `config` - `TranslatorConfig::with_env_overrides`

pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongodb;
pub mod operator;
pub mod page;
pub mod predicate;
pub mod raw;
pub mod source;
pub mod where_clause;

pub use config::{DEFAULT_PAGE_SIZE, TranslatorConfig};
pub use error::{TranslationError, TranslationResult};
pub use listing::{Listing, ListingError, execute};
pub use memory::{MemoryQuery, MemoryQueryError};
pub use operator::{ComparisonOperator, OperatorKey};
pub use page::PageWindow;
pub use predicate::{Bound, Clause, Condition, FieldFilter, FieldKind, FilterValue, Predicate, SearchClause};
pub use raw::{QueryValue, RawQuery};
pub use source::QuerySource;
pub use where_clause::{WhereClause, field_filters, search_clause};
