//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, spec::BinarySubtype, Binary, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use query_filter::{mongodb::MongoQuery, Listing, RawQuery, TranslatorConfig};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{product_query_config, CreateProduct, Product};
use crate::repository::ProductRepository;

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
    query_config: TranslatorConfig,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "products")
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Product>(collection_name),
            query_config: product_query_config(),
        }
    }

    /// Replace the listing translation settings, e.g. page size overrides.
    pub fn with_query_config(mut self, config: TranslatorConfig) -> Self {
        self.query_config = config;
        self
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    fn newest_first() -> Document {
        doc! { "created_at": -1 }
    }

    /// Filter on `_id`. Documents are written through the raw (binary)
    /// serializer, which stores a `Uuid` as generic binary, so the filter
    /// has to match that rather than the hyphenated string form.
    fn by_id(id: Uuid) -> Document {
        let id = Binary {
            subtype: BinarySubtype::Generic,
            bytes: id.as_bytes().to_vec(),
        };
        doc! { "_id": id }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);

        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(Self::by_id(id)).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(Self::newest_first())
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self, query), fields(params = query.len()))]
    async fn list_filtered(&self, query: &RawQuery) -> ProductResult<Listing<Product>> {
        let base = MongoQuery::new(self.collection.clone()).sort(Self::newest_first());
        let listing = query_filter::execute(base, query, &self.query_config).await?;

        Ok(listing)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn replace(&self, product: Product) -> ProductResult<Product> {
        let result = self
            .collection
            .replace_one(Self::by_id(product.id), &product)
            .await?;

        if result.matched_count == 0 {
            return Err(ProductError::NotFound(product.id));
        }

        tracing::info!(product_id = %product.id, "Product replaced successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(Self::by_id(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            // Default listing order
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            // Category filter, newest first within it
            IndexModel::builder()
                .keys(doc! { "category": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_created".to_string())
                        .build(),
                )
                .build(),
            // Price range queries
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "ratings": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_ratings".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "brand": 1 })
                .options(IndexOptions::builder().name("idx_brand".to_string()).build())
                .build(),
            // Reviewer lookups
            IndexModel::builder()
                .keys(doc! { "reviews.user": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_reviews_user".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }
}
