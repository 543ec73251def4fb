//! Resource definitions.
//!
//! Each resource names its collection and DTO, its create/update payloads,
//! and how those payloads become stored documents. The generic repository
//! and CRUD handlers are driven entirely by this trait.

pub mod customer;
pub mod invoice;
pub mod revenue;
pub mod user;

use async_trait::async_trait;
use mongodb::bson::{self, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::filter::{Filter, FilterError, ListParams};
use crate::state::AppState;
use crate::validation::Validate;

pub use customer::Customer;
pub use invoice::Invoice;
pub use revenue::Revenue;
pub use user::User;

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Singular display name used in response messages.
    const NAME: &'static str;
    const KEYWORD_FIELDS: &'static [&'static str];
    const UNIQUE_FIELDS: &'static [&'static str] = &[];
    /// Enumerated field filtered by the `status` query parameter.
    const STATUS_FIELD: Option<(&'static str, &'static [&'static str])> = None;

    type Dto: Serialize + DeserializeOwned + Unpin + Send + Sync + 'static;
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn projection() -> Option<Document> {
        None
    }

    /// Stored form of a validated create payload, without id or timestamps.
    async fn new_document(state: &AppState, payload: Self::Create) -> Result<Document, ApiError>;

    /// `$set` fields for a validated update payload; absent fields are omitted.
    async fn update_document(state: &AppState, payload: Self::Update)
        -> Result<Document, ApiError>;

    fn list_filter(params: &ListParams) -> Result<Document, FilterError> {
        let mut filter = Filter::new().keyword(Self::KEYWORD_FIELDS, params.keyword());
        if let Some((field, allowed)) = Self::STATUS_FIELD {
            filter = filter.one_of(field, params.status(), allowed)?;
        }
        Ok(filter.into_document())
    }
}

pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, ApiError> {
    bson::to_document(value).map_err(|e| {
        tracing::error!("failed to encode document: {}", e);
        ApiError::internal_server_error("Failed to process request")
    })
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim a validated required field.
pub(crate) fn required(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub(crate) fn trim_opt(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_filter_combines_keyword_and_status() {
        let params = ListParams {
            keyword: Some("ann".to_string()),
            status: Some("Paid".to_string()),
            ..Default::default()
        };
        let filter = Invoice::list_filter(&params).unwrap();
        assert_eq!(filter.get_str("status").unwrap(), "paid");
        assert_eq!(filter.get_array("$or").unwrap().len(), 2);
    }

    #[test]
    fn status_is_ignored_for_resources_without_one() {
        let params = ListParams {
            status: Some("anything".to_string()),
            ..Default::default()
        };
        assert!(Customer::list_filter(&params).unwrap().is_empty());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let params = ListParams {
            status: Some("lost".to_string()),
            ..Default::default()
        };
        assert!(Invoice::list_filter(&params).is_err());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ann@X.com "), "ann@x.com");
    }
}
