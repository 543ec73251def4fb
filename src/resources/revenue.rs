// resources/revenue.rs - monthly revenue figures

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use mongodb::bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::resources::{required, to_document, trim_opt, Resource};
use crate::state::AppState;
use crate::validation::{Validate, Validator, Violation};

pub struct Revenue;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDto {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub month: String,
    pub year: String,
    pub revenue: f64,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateRevenue {
    pub month: Option<String>,
    pub year: Option<String>,
    pub revenue: Option<f64>,
}

impl Validate for CreateRevenue {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .required("month", &self.month)
            .required("year", &self.year)
            .required("revenue", &self.revenue)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateRevenue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
}

impl Validate for UpdateRevenue {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .not_blank("month", self.month.as_deref())
            .not_blank("year", self.year.as_deref())
            .finish()
    }
}

#[async_trait]
impl Resource for Revenue {
    const COLLECTION: &'static str = "revenues";
    const NAME: &'static str = "Revenue";
    const KEYWORD_FIELDS: &'static [&'static str] = &["month", "year"];

    type Dto = RevenueDto;
    type Create = CreateRevenue;
    type Update = UpdateRevenue;

    async fn new_document(_state: &AppState, payload: CreateRevenue) -> Result<Document, ApiError> {
        Ok(doc! {
            "month": required(payload.month),
            "year": required(payload.year),
            "revenue": payload.revenue.unwrap_or_default(),
        })
    }

    async fn update_document(
        _state: &AppState,
        mut payload: UpdateRevenue,
    ) -> Result<Document, ApiError> {
        payload.month = trim_opt(payload.month);
        payload.year = trim_opt(payload.year);
        to_document(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_every_field() {
        let payload: CreateRevenue =
            serde_json::from_value(serde_json::json!({ "month": "Jan" })).unwrap();
        let fields: Vec<_> = payload.validate().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["year", "revenue"]);
    }

    #[test]
    fn zero_revenue_is_accepted() {
        let payload: CreateRevenue = serde_json::from_value(serde_json::json!({
            "month": "Jan", "year": "2024", "revenue": 0
        }))
        .unwrap();
        assert!(payload.validate().is_empty());
    }
}
