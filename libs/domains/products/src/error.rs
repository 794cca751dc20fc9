use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use query_filter::{ListingError, TranslationError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("User {user} has not reviewed product {product}")]
    ReviewNotFound { product: Uuid, user: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Translation(e) => AppError::InvalidQuery(e.to_string()),
            err @ ProductError::ReviewNotFound { .. } => AppError::NotFound(err.to_string()),
            ProductError::Database(e) => AppError::Database(e),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<validator::ValidationErrors> for ProductError {
    fn from(err: validator::ValidationErrors) -> Self {
        ProductError::Validation(err.to_string())
    }
}

impl From<ListingError<mongodb::error::Error>> for ProductError {
    fn from(err: ListingError<mongodb::error::Error>) -> Self {
        match err {
            ListingError::Translation(e) => ProductError::Translation(e),
            ListingError::Source(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn unreachable_database() -> ProductError {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        mongodb::error::Error::from(io).into()
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ProductError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (ProductError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ProductError::Translation(TranslationError::EmptyFieldName),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::ReviewNotFound {
                    product: Uuid::nil(),
                    user: Uuid::nil(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ProductError::Internal("corrupt".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (unreachable_database(), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_listing_translation_error_is_preserved() {
        let err: ProductError = ListingError::<mongodb::error::Error>::Translation(
            TranslationError::MalformedQuery("price[".into()),
        )
        .into();
        assert!(matches!(
            err,
            ProductError::Translation(TranslationError::MalformedQuery(_))
        ));
    }
}
