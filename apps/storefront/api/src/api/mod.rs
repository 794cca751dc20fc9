//! API routes, nested under `/api` by `axum_helpers::create_router`.

pub mod health;
pub mod products;

use axum::Router;
use domain_products::{MongoProductRepository, ProductService};

use crate::state::AppState;

pub fn routes(state: &AppState, products: ProductService<MongoProductRepository>) -> Router {
    Router::new()
        .nest("/v1/products", products::router(products))
        .merge(health::router(state.clone()))
}
