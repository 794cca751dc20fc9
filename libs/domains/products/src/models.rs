use chrono::{DateTime, Utc};
use query_filter::{FieldKind, TranslatorConfig};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Product category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductCategory {
    Shortsleeves,
    Longsleeves,
    Sweatshirt,
    Hoodies,
}

/// Image already hosted by the media service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductPhoto {
    /// Public id assigned by the media service
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(url)]
    pub secure_url: String,
}

/// A customer review. Each user holds at most one review per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub user: Uuid,
    pub name: String,
    /// 1 to 5
    pub rating: u8,
    pub comment: String,
}

/// Product entity - represents a product stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Whole currency units, at most five digits
    pub price: i64,
    pub description: String,
    pub photos: Vec<ProductPhoto>,
    pub category: ProductCategory,
    pub stock: i64,
    pub brand: String,
    /// Mean review rating, 0 without reviews
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub number_of_reviews: u32,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// User who listed the product
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 0, max = 99_999))]
    pub price: i64,
    #[validate(length(min = 1))]
    pub description: String,
    /// At least one photo is required
    #[validate(length(min = 1), nested)]
    pub photos: Vec<ProductPhoto>,
    pub category: ProductCategory,
    #[validate(range(min = 0))]
    pub stock: i64,
    #[validate(length(min = 1))]
    pub brand: String,
    pub user: Uuid,
}

/// DTO for updating an existing product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 99_999))]
    pub price: Option<i64>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1), nested)]
    pub photos: Option<Vec<ProductPhoto>>,
    pub category: Option<ProductCategory>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    #[validate(length(min = 1))]
    pub brand: Option<String>,
}

/// DTO for adding or replacing the caller's review
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertReview {
    pub user: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

impl From<UpsertReview> for Review {
    fn from(input: UpsertReview) -> Self {
        Self {
            user: input.user,
            name: input.name,
            rating: input.rating,
            comment: input.comment,
        }
    }
}

/// Query translation settings for product listings.
///
/// Search matches `name`; numeric fields are typed so that
/// `price[gte]=500` compares numbers rather than strings.
pub fn product_query_config() -> TranslatorConfig {
    TranslatorConfig::default()
        .with_search_field("name")
        .with_field_kind("price", FieldKind::Integer)
        .with_field_kind("stock", FieldKind::Integer)
        .with_field_kind("number_of_reviews", FieldKind::Integer)
        .with_field_kind("ratings", FieldKind::Float)
}

impl Product {
    /// Create a new product from CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            price: input.price,
            description: input.description,
            photos: input.photos,
            category: input.category,
            stock: input.stock,
            brand: input.brand,
            ratings: 0.0,
            number_of_reviews: 0,
            reviews: Vec::new(),
            user: input.user,
            created_at: Utc::now(),
        }
    }

    /// Apply updates from UpdateProduct DTO
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(photos) = update.photos {
            self.photos = photos;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
    }

    /// Replace the reviewer's existing review, or append a new one.
    ///
    /// Returns `true` when an existing review was replaced.
    pub fn upsert_review(&mut self, review: Review) -> bool {
        let replaced = match self.reviews.iter_mut().find(|r| r.user == review.user) {
            Some(existing) => {
                existing.rating = review.rating;
                existing.comment = review.comment;
                true
            }
            None => {
                self.reviews.push(review);
                false
            }
        };
        self.recompute_ratings();
        replaced
    }

    /// Drop the user's review. Returns `false` if they had none.
    pub fn remove_review(&mut self, user: Uuid) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|r| r.user != user);
        let removed = self.reviews.len() != before;
        if removed {
            self.recompute_ratings();
        }
        removed
    }

    fn recompute_ratings(&mut self) {
        self.number_of_reviews = u32::try_from(self.reviews.len()).unwrap_or(u32::MAX);
        self.ratings = if self.reviews.is_empty() {
            0.0
        } else {
            let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
            f64::from(total) / self.reviews.len() as f64
        };
    }
}
