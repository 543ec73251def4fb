// resources/user.rs - application users and their credentials

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::{
    serialize_bson_datetime_as_rfc3339_string, serialize_object_id_as_hex_string,
};
use mongodb::bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::resources::{normalize_email, required, to_document, trim_opt, Resource};
use crate::state::AppState;
use crate::validation::{Validate, Validator, Violation};

pub struct User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(
        rename(deserialize = "_id", serialize = "id"),
        serialize_with = "serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub updated_at: DateTime,
}

/// Stored fields needed to check a sign-in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for CreateUser {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .required("name", &self.name)
            .required("email", &self.email)
            .email("email", self.email.as_deref())
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Validate for UpdateUser {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .not_blank("name", self.name.as_deref())
            .not_blank("email", self.email.as_deref())
            .email("email", self.email.as_deref())
            .not_blank("password", self.password.as_deref())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct SignIn {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for SignIn {
    fn validate(&self) -> Vec<Violation> {
        Validator::new()
            .required("email", &self.email)
            .required("password", &self.password)
            .finish()
    }
}

impl SignIn {
    pub fn email(&self) -> String {
        normalize_email(self.email.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl Resource for User {
    const COLLECTION: &'static str = "users";
    const NAME: &'static str = "User";
    const KEYWORD_FIELDS: &'static [&'static str] = &["name", "email"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    type Dto = UserDto;
    type Create = CreateUser;
    type Update = UpdateUser;

    fn projection() -> Option<Document> {
        Some(doc! { "password": 0 })
    }

    async fn new_document(state: &AppState, payload: CreateUser) -> Result<Document, ApiError> {
        let password = payload.password.unwrap_or_default();
        let hash = hash_password(password, state.config.security.bcrypt_cost).await?;

        Ok(doc! {
            "name": required(payload.name),
            "email": normalize_email(&required(payload.email)),
            "password": hash,
        })
    }

    async fn update_document(
        state: &AppState,
        mut payload: UpdateUser,
    ) -> Result<Document, ApiError> {
        payload.name = trim_opt(payload.name);
        payload.email = payload.email.as_deref().map(normalize_email);
        if let Some(password) = payload.password.take() {
            let hash = hash_password(password, state.config.security.bcrypt_cost).await?;
            payload.password = Some(hash);
        }
        to_document(&payload)
    }
}
