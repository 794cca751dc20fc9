//! HTTP handlers for Products API

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestQueryResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    },
    UuidPath, UuidPathPair, ValidatedJson,
};
use query_filter::{Listing, PageWindow, RawQuery};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, Product, ProductCategory, ProductPhoto, Review, UpdateProduct, UpsertReview,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        list_all_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        list_reviews,
        upsert_review,
        delete_review,
    ),
    components(
        schemas(
            Product, CreateProduct, UpdateProduct, UpsertReview, Review,
            ProductPhoto, ProductCategory, PageWindow, Listing<Product>
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            BadRequestQueryResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalogue and reviews")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/all", get(list_all_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/reviews", get(list_reviews).put(upsert_review))
        .route("/{id}/reviews/{user_id}", axum::routing::delete(delete_review))
        .with_state(shared_service)
}

/// List products matching search, filter and page parameters
///
/// `search` matches the product name case-insensitively. Any other
/// parameter filters a field: `category=hoodies` for equality,
/// `price[gte]=500&price[lte]=1500` for ranges (`gt`, `gte`, `lt`, `lte`).
/// `page` selects a 1-based page of six products.
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive name match"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("category" = Option<ProductCategory>, Query, description = "Exact category"),
        ("price[gte]" = Option<i64>, Query, description = "Minimum price, inclusive"),
        ("price[lte]" = Option<i64>, Query, description = "Maximum price, inclusive"),
        ("ratings[gte]" = Option<f64>, Query, description = "Minimum mean rating"),
    ),
    responses(
        (status = 200, description = "One page of matching products", body = Listing<Product>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    query: RawQuery,
) -> ProductResult<Json<Listing<Product>>> {
    let listing = service.list_products(&query).await?;
    Ok(Json(listing))
}

/// List every product without filtering or paging
#[utoipa::path(
    get,
    path = "/all",
    tag = "Products",
    responses(
        (status = 200, description = "All products, newest first", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_all_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.list_all_products().await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the reviews of a product
#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Reviews of the product", body = Vec<Review>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_reviews<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Vec<Review>>> {
    let reviews = service.list_reviews(id).await?;
    Ok(Json(reviews))
}

/// Add a review, or replace the reviewer's earlier one
#[utoipa::path(
    put,
    path = "/{id}/reviews",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpsertReview,
    responses(
        (status = 200, description = "Review stored, ratings recomputed", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upsert_review<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpsertReview>,
) -> ProductResult<Json<Product>> {
    let product = service.upsert_review(id, input).await?;
    Ok(Json(product))
}

/// Remove a user's review
#[utoipa::path(
    delete,
    path = "/{id}/reviews/{user_id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("user_id" = Uuid, Path, description = "Reviewer ID")
    ),
    responses(
        (status = 200, description = "Review removed, ratings recomputed", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_review<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPathPair(id, user_id): UuidPathPair,
) -> ProductResult<Json<Product>> {
    let product = service.delete_review(id, user_id).await?;
    Ok(Json(product))
}
