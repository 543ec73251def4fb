// resources/customer.rs - customers: people being invoiced

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use mongodb::bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::filter::PageRequest;
use crate::resources::invoice::Invoice;
use crate::resources::{normalize_email, required, to_document, trim_opt, Resource};
use crate::state::AppState;
use crate::validation::{Validate, Validator, Violation};

pub struct Customer;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
}

/// Customer row with invoice counters, as produced by [`totals_pipeline`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithTotals {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
    pub total_invoices: i64,
    pub total_paid: i64,
    pub total_pending: i64,
}

/// One `$facet` result: the requested rows plus the unpaged match count.
#[derive(Debug, Deserialize)]
pub struct FacetPage<T> {
    pub rows: Vec<T>,
    #[serde(default)]
    pub total: Vec<FacetCount>,
}

#[derive(Debug, Deserialize)]
pub struct FacetCount {
    pub count: i64,
}

impl<T> FacetPage<T> {
    pub fn total_rows(&self) -> u64 {
        self.total
            .first()
            .map(|t| u64::try_from(t.count).unwrap_or(0))
            .unwrap_or(0)
    }
}

impl<T> Default for FacetPage<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .required("name", &self.name)
            .required("email", &self.email)
            .email("email", self.email.as_deref())
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Validate for UpdateCustomer {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .not_blank("name", self.name.as_deref())
            .not_blank("email", self.email.as_deref())
            .email("email", self.email.as_deref())
            .finish()
    }
}

/// Avatar URL seeded from the uppercase first letter of the name.
pub fn default_image_url(avatar_url: &str, name: &str) -> String {
    let initial: String = name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    format!("{}{}", avatar_url, initial)
}

/// Customers page with per-customer invoice counters, joined in one round trip.
pub fn totals_pipeline(filter: Document, page: PageRequest) -> Vec<Document> {
    let skip = i64::try_from(page.skip()).unwrap_or(i64::MAX);
    vec![
        doc! { "$match": filter },
        doc! {
            "$facet": {
                "rows": [
                    { "$sort": { "_id": -1 } },
                    { "$skip": skip },
                    { "$limit": page.limit() },
                    {
                        "$lookup": {
                            "from": Invoice::COLLECTION,
                            "localField": "_id",
                            "foreignField": "customerId",
                            "as": "invoices",
                        }
                    },
                    {
                        "$addFields": {
                            "totalInvoices": { "$size": "$invoices" },
                            "totalPaid": {
                                "$size": {
                                    "$filter": {
                                        "input": "$invoices",
                                        "as": "invoice",
                                        "cond": { "$eq": ["$$invoice.status", "paid"] },
                                    }
                                }
                            },
                            "totalPending": {
                                "$size": {
                                    "$filter": {
                                        "input": "$invoices",
                                        "as": "invoice",
                                        "cond": { "$ne": ["$$invoice.status", "paid"] },
                                    }
                                }
                            },
                        }
                    },
                    { "$project": { "invoices": 0 } },
                ],
                "total": [{ "$count": "count" }],
            }
        },
    ]
}

#[async_trait]
impl Resource for Customer {
    const COLLECTION: &'static str = "customers";
    const NAME: &'static str = "Customer";
    const KEYWORD_FIELDS: &'static [&'static str] = &["name", "email"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    type Dto = CustomerDto;
    type Create = CreateCustomer;
    type Update = UpdateCustomer;

    async fn new_document(state: &AppState, payload: CreateCustomer) -> Result<Document, ApiError> {
        let name = required(payload.name);
        let image_url = payload
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| default_image_url(&state.config.api.avatar_url, &name));

        Ok(doc! {
            "name": name,
            "email": normalize_email(&required(payload.email)),
            "imageUrl": image_url,
        })
    }

    async fn update_document(
        _state: &AppState,
        mut payload: UpdateCustomer,
    ) -> Result<Document, ApiError> {
        payload.name = trim_opt(payload.name);
        payload.email = payload.email.as_deref().map(normalize_email);
        payload.image_url = trim_opt(payload.image_url);
        to_document(&payload)
    }
}
