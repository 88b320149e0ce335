//! Note request body
//!
//! Notes carry whatever fields the client sends. JSON objects are stored as
//! they are; urlencoded forms (what a plain HTML form or `$.post` submits)
//! become an object of string fields. A request without a content type
//! carries no parseable body and yields an empty note.

use axum::{
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use newsnotes_common::errors::AppError;
use std::collections::HashMap;

/// Free-form note body; always a JSON object
#[derive(Debug)]
pub struct NotePayload(pub serde_json::Value);

impl<S> FromRequest<S> for NotePayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Some(content_type) = req.headers().get(header::CONTENT_TYPE) else {
            return Ok(Self(serde_json::Value::Object(serde_json::Map::new())));
        };
        let is_form = content_type
            .to_str()
            .is_ok_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidFormat { message: e.body_text() })?;

            serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect(),
            )
        } else {
            let Json(value) = Json::<serde_json::Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidFormat { message: e.body_text() })?;
            value
        };

        if !body.is_object() {
            return Err(AppError::Validation {
                message: "note body must be an object".to_string(),
            });
        }

        Ok(Self(body))
    }
}
