//! JSON body extractor that reports failures through the service error envelope.

use crate::error::GenerationError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// Like [`axum::Json`], but the body is also run through its `validator`
/// rules. A missing, unparsable or invalid body becomes a validation error
/// with a `{ "detail": ... }` body instead of axum's plain-text rejection.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| GenerationError::Validation(e.body_text()))?;

        value.validate().map_err(GenerationError::from)?;

        Ok(ValidatedJson(value))
    }
}
