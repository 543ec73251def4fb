use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::Validate;

/// JSON body that has been parsed and validated.
///
/// Parse failures become `MalformedPayload`; rule failures become
/// `ValidationFailed` with every violation listed.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::malformed_payload(rejection.body_text()))?;

        let violations = payload.validate();
        if !violations.is_empty() {
            return Err(ApiError::validation_failed(violations));
        }

        Ok(ValidatedJson(payload))
    }
}

/// `:id` path segment parsed as a document id.
#[derive(Debug, Clone, Copy)]
pub struct DocumentId(pub ObjectId);

#[async_trait]
impl<S> FromRequestParts<S> for DocumentId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::malformed_id("Missing document id"))?;

        ObjectId::parse_str(&raw)
            .map(DocumentId)
            .map_err(|_| ApiError::malformed_id(format!("'{}' is not a valid id", raw)))
    }
}
