// resources/invoice.rs - invoices with an embedded customer snapshot

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use mongodb::bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::database::Repository;
use crate::error::ApiError;
use crate::resources::customer::{Customer, CustomerDto};
use crate::resources::{required, to_document, trim_opt, Resource};
use crate::state::AppState;
use crate::validation::{Validate, Validator, Violation};

pub const STATUSES: &[&str] = &["pending", "paid", "cancelled", "void"];
pub const DEFAULT_STATUS: &str = "pending";
pub const LATEST_LIMIT: i64 = 5;

pub struct Invoice;

/// Customer identity copied into the invoice at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: String,
}

impl CustomerSnapshot {
    fn to_document(&self) -> Document {
        doc! {
            "_id": self.id,
            "name": self.name.as_str(),
            "email": self.email.as_str(),
            "imageUrl": self.image_url.as_str(),
        }
    }
}

impl From<CustomerDto> for CustomerSnapshot {
    fn from(customer: CustomerDto) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            image_url: customer.image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDto {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub customer_id: ObjectId,
    pub customer: CustomerSnapshot,
    pub amount: f64,
    pub date: String,
    pub status: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
}

/// Flattened row of the latest-invoices report. Customer fields are absent
/// when the referenced customer has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestInvoice {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub email: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    pub customer_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub status: Option<String>,
}

impl Validate for CreateInvoice {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .required("customerId", &self.customer_id)
            .required("amount", &self.amount)
            .required("date", &self.date)
            .date("date", self.date.as_deref())
            .one_of("status", self.status.as_deref(), STATUSES)
            .finish()
    }
}

/// `customerId` is not updatable; unknown fields are ignored.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateInvoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Validate for UpdateInvoice {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .not_blank("date", self.date.as_deref())
            .date("date", self.date.as_deref())
            .one_of("status", self.status.as_deref(), STATUSES)
            .finish()
    }
}

fn normalize_status(status: Option<String>) -> Option<String> {
    status
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Newest invoices by date, joined with their customer.
pub fn latest_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$sort": { "date": -1, "_id": -1 } },
        doc! { "$limit": limit },
        doc! {
            "$lookup": {
                "from": Customer::COLLECTION,
                "localField": "customerId",
                "foreignField": "_id",
                "as": "customerInfo",
            }
        },
        doc! {
            "$unwind": {
                "path": "$customerInfo",
                "preserveNullAndEmptyArrays": true,
            }
        },
        doc! {
            "$project": {
                "_id": 1,
                "amount": 1,
                "name": "$customerInfo.name",
                "email": "$customerInfo.email",
                "imageUrl": "$customerInfo.imageUrl",
            }
        },
    ]
}

#[async_trait]
impl Resource for Invoice {
    const COLLECTION: &'static str = "invoices";
    const NAME: &'static str = "Invoice";
    const KEYWORD_FIELDS: &'static [&'static str] = &["customer.name", "customer.email"];
    const STATUS_FIELD: Option<(&'static str, &'static [&'static str])> =
        Some(("status", STATUSES));

    type Dto = InvoiceDto;
    type Create = CreateInvoice;
    type Update = UpdateInvoice;

    async fn new_document(state: &AppState, payload: CreateInvoice) -> Result<Document, ApiError> {
        let raw_id = required(payload.customer_id);
        let customer_id = ObjectId::parse_str(&raw_id).map_err(|_| {
            ApiError::malformed_id(format!("customerId '{}' is not a valid id", raw_id))
        })?;

        let customer = Repository::<Customer>::new(&state.db)
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| ApiError::customer_not_found("Customer not found"))?;
        let snapshot = CustomerSnapshot::from(customer);

        Ok(doc! {
            "customerId": customer_id,
            "customer": snapshot.to_document(),
            "amount": payload.amount.unwrap_or_default(),
            "date": required(payload.date),
            "status": normalize_status(payload.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }

    async fn update_document(
        _state: &AppState,
        mut payload: UpdateInvoice,
    ) -> Result<Document, ApiError> {
        payload.date = trim_opt(payload.date);
        payload.status = normalize_status(payload.status);
        to_document(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(value: serde_json::Value) -> CreateInvoice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_requires_reference_amount_and_date() {
        let fields: Vec<_> = create(serde_json::json!({}))
            .validate()
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, vec!["customerId", "amount", "date"]);
    }

    #[test]
    fn create_rejects_unknown_status() {
        let violations = create(serde_json::json!({
            "customerId": ObjectId::new().to_hex(),
            "amount": 10,
            "date": "2024-01-01",
            "status": "lost"
        }))
        .validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].tag, "oneof");
        assert_eq!(violations[0].value.as_deref(), Some("pending paid cancelled void"));
    }

    #[test]
    fn create_rejects_non_iso_date() {
        let violations = create(serde_json::json!({
            "customerId": ObjectId::new().to_hex(),
            "amount": 10,
            "date": "01/02/2024"
        }))
        .validate();
        assert_eq!(violations[0].field, "date");
    }

    #[test]
    fn status_is_normalized() {
        assert_eq!(normalize_status(Some(" PAID ".into())).as_deref(), Some("paid"));
        assert_eq!(normalize_status(Some("".into())), None);
    }

    #[test]
    fn update_ignores_customer_reference() {
        let payload: UpdateInvoice = serde_json::from_value(serde_json::json!({
            "customerId": ObjectId::new().to_hex(),
            "amount": 42.5
        }))
        .unwrap();
        let document = to_document(&payload).unwrap();
        assert_eq!(document.len(), 1);
        assert_eq!(document.get_f64("amount").unwrap(), 42.5);
    }

    #[test]
    fn snapshot_is_stored_with_object_id() {
        let id = ObjectId::new();
        let snapshot = CustomerSnapshot {
            id,
            name: "Ann".into(),
            email: "ann@x.com".into(),
            image_url: "u".into(),
        };
        let document = snapshot.to_document();
        assert_eq!(document.get_object_id("_id").unwrap(), id);
        assert_eq!(document.get_str("imageUrl").unwrap(), "u");
    }

    #[test]
    fn latest_pipeline_limits_and_keeps_orphans() {
        let pipeline = latest_pipeline(LATEST_LIMIT);
        assert_eq!(pipeline[1].get_i64("$limit").unwrap(), 5);
        let unwind = pipeline[3].get_document("$unwind").unwrap();
        assert!(unwind.get_bool("preserveNullAndEmptyArrays").unwrap());
    }

    #[test]
    fn latest_row_tolerates_missing_customer() {
        let row: LatestInvoice = mongodb::bson::from_document(doc! {
            "_id": ObjectId::new(),
            "amount": 10.0,
        })
        .unwrap();
        assert!(row.name.is_none());
    }
}
