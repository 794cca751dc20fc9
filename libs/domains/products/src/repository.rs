use async_trait::async_trait;
use query_filter::{Listing, RawQuery};
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product built from `input`
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Every product, newest first, ignoring any query
    async fn list_all(&self) -> ProductResult<Vec<Product>>;

    /// One page of products narrowed by search and filter parameters
    async fn list_filtered(&self, query: &RawQuery) -> ProductResult<Listing<Product>>;

    /// Overwrite the stored product with the same id
    async fn replace(&self, product: Product) -> ProductResult<Product>;

    /// Returns `false` when no product had this id
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Create the indexes listing queries rely on
    async fn init_indexes(&self) -> ProductResult<()>;
}
