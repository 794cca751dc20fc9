//! Product catalogue routes

use axum::Router;
use domain_products::{MongoProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Product service over the `products` collection, using the configured
/// listing settings.
pub fn service(state: &AppState) -> ProductService<MongoProductRepository> {
    let repository =
        MongoProductRepository::new(&state.db).with_query_config(state.config.products.clone());
    ProductService::new(repository)
}

pub fn router(service: ProductService<MongoProductRepository>) -> Router {
    handlers::router(service)
}
