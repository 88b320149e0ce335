//! Path parameters with JSON error bodies

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use newsnotes_common::errors::AppError;
use serde::de::DeserializeOwned;

/// `Path` that rejects malformed ids with `INVALID_FORMAT`
#[derive(Debug)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidFormat { message: e.body_text() })?;

        Ok(Self(value))
    }
}
