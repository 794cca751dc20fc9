use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body validated with [`validator::Validate`].
///
/// Malformed JSON is rejected with `JSON_EXTRACTION`; failed validation
/// with `VALIDATION_ERROR` and the per-field errors under `details`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct UpsertReview {
///     #[validate(range(min = 1, max = 5))]
///     rating: u8,
/// }
///
/// async fn review(ValidatedJson(input): ValidatedJson<UpsertReview>) -> StatusCode {
///     StatusCode::OK
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
