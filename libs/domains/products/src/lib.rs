//! Storefront product catalogue.
//!
//! Products carry photos already hosted by the media service, a stock
//! count and per-user reviews whose mean is kept in `ratings`. The public
//! listing is driven by query parameters and translated by `query_filter`:
//!
//! | Route                            | Operation                      |
//! |----------------------------------|--------------------------------|
//! | `GET /?search=&price[gte]=&page=`| filtered, paged listing        |
//! | `GET /all`                       | every product, newest first    |
//! | `POST /`, `GET/PUT/DELETE /{id}` | product CRUD                   |
//! | `GET/PUT /{id}/reviews`          | list or upsert a review        |
//! | `DELETE /{id}/reviews/{user_id}` | remove one user's review       |
//!
//! Handlers depend on [`ProductService`], which depends on any
//! [`ProductRepository`]; [`MongoProductRepository`] is the production one.
//!
//! ```rust,no_run
//! use domain_products::{handlers, MongoProductRepository, ProductService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let service = ProductService::new(MongoProductRepository::new(&client.database("storefront")));
//! service.init_indexes().await?;
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    product_query_config, CreateProduct, Product, ProductCategory, ProductPhoto, Review,
    UpdateProduct, UpsertReview,
};
pub use crate::mongodb::MongoProductRepository;
pub use repository::ProductRepository;
pub use service::ProductService;
