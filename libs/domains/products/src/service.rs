//! Product Service - Business logic layer

use query_filter::{Listing, RawQuery};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, Review, UpdateProduct, UpsertReview};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input.validate()?;
        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Storefront listing: search, filters and one page of results.
    #[instrument(skip(self, query))]
    pub async fn list_products(&self, query: &RawQuery) -> ProductResult<Listing<Product>> {
        self.repository.list_filtered(query).await
    }

    /// Every product, unpaginated. Admin view.
    #[instrument(skip(self))]
    pub async fn list_all_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.list_all().await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input.validate()?;

        let mut product = self.get_product(id).await?;
        product.apply_update(input);

        self.repository.replace(product).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    /// Add the reviewer's review or replace their earlier one.
    #[instrument(skip(self, input), fields(user = %input.user))]
    pub async fn upsert_review(&self, product_id: Uuid, input: UpsertReview) -> ProductResult<Product> {
        input.validate()?;

        let mut product = self.get_product(product_id).await?;
        let replaced = product.upsert_review(input.into());
        tracing::debug!(replaced, ratings = product.ratings, "Review stored");

        self.repository.replace(product).await
    }

    #[instrument(skip(self))]
    pub async fn delete_review(&self, product_id: Uuid, user: Uuid) -> ProductResult<Product> {
        let mut product = self.get_product(product_id).await?;
        if !product.remove_review(user) {
            return Err(ProductError::ReviewNotFound {
                product: product_id,
                user,
            });
        }

        self.repository.replace(product).await
    }

    #[instrument(skip(self))]
    pub async fn list_reviews(&self, product_id: Uuid) -> ProductResult<Vec<Review>> {
        Ok(self.get_product(product_id).await?.reviews)
    }

    /// Create indexes on startup
    pub async fn init_indexes(&self) -> ProductResult<()> {
        self.repository.init_indexes().await
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductCategory, ProductPhoto};
    use crate::repository::MockProductRepository;
    use mockall::predicate::eq;
    use query_filter::PageWindow;

    fn product() -> Product {
        Product::new(CreateProduct {
            name: "Zip Hoodie".to_string(),
            price: 2499,
            description: "Heavy fleece".to_string(),
            photos: vec![ProductPhoto {
                id: "products/hoodie".to_string(),
                secure_url: "https://media.example.com/products/hoodie.jpg".to_string(),
            }],
            category: ProductCategory::Hoodies,
            stock: 4,
            brand: "Acme".to_string(),
            user: Uuid::new_v4(),
        })
    }

    fn review_input(user: Uuid, rating: u8) -> UpsertReview {
        UpsertReview {
            user,
            name: "Riley".to_string(),
            rating,
            comment: "warm".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(repo);
        let err = service.get_product(Uuid::nil()).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(id) if id.is_nil()));
    }

    #[tokio::test]
    async fn test_create_product_validates_before_persisting() {
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let service = ProductService::new(repo);
        let input = CreateProduct {
            name: "No Photo Tee".to_string(),
            price: 500,
            description: "tee".to_string(),
            photos: vec![],
            category: ProductCategory::Shortsleeves,
            stock: 1,
            brand: "Acme".to_string(),
            user: Uuid::new_v4(),
        };

        let err = service.create_product(input).await.unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_products_delegates_query() {
        let raw = RawQuery::parse("search=hoodie&page=2").unwrap();
        let mut repo = MockProductRepository::new();
        repo.expect_list_filtered()
            .withf(|q| q.text("search") == Some("hoodie"))
            .returning(|_| {
                Ok(Listing {
                    records: vec![],
                    filtered_count: 7,
                    total_count: 20,
                    page: PageWindow::new(2, query_filter::DEFAULT_PAGE_SIZE),
                })
            });

        let service = ProductService::new(repo);
        let listing = service.list_products(&raw).await.unwrap();
        assert_eq!(listing.filtered_count, 7);
        assert_eq!(listing.page.skip, 6);
    }

    #[tokio::test]
    async fn test_update_applies_and_replaces() {
        let existing = product();
        let id = existing.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_replace()
            .withf(|p| p.price == 1999 && p.name == "Zip Hoodie")
            .returning(Ok);

        let service = ProductService::new(repo);
        let updated = service
            .update_product(
                id,
                UpdateProduct {
                    price: Some(1999),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 1999);
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let mut repo = MockProductRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let service = ProductService::new(repo);
        assert!(matches!(
            service.delete_product(Uuid::nil()).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_review_recomputes_ratings() {
        let mut existing = product();
        let other = Uuid::new_v4();
        existing.upsert_review(review_input(other, 2).into());
        let id = existing.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_replace().returning(Ok);

        let service = ProductService::new(repo);
        let updated = service
            .upsert_review(id, review_input(Uuid::new_v4(), 5))
            .await
            .unwrap();

        assert_eq!(updated.number_of_reviews, 2);
        assert_eq!(updated.ratings, 3.5);
    }

    #[tokio::test]
    async fn test_upsert_review_rejects_bad_rating() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().never();

        let service = ProductService::new(repo);
        let err = service
            .upsert_review(Uuid::nil(), review_input(Uuid::new_v4(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_review_without_review() {
        let existing = product();
        let id = existing.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_replace().never();

        let service = ProductService::new(repo);
        let err = service.delete_review(id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ProductError::ReviewNotFound { product, .. } if product == id));
    }

    #[tokio::test]
    async fn test_list_reviews() {
        let mut existing = product();
        let reviewer = Uuid::new_v4();
        existing.upsert_review(review_input(reviewer, 4).into());

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));

        let service = ProductService::new(repo);
        let reviews = service.list_reviews(Uuid::nil()).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].user, reviewer);
    }
}
