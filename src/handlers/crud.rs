// handlers/crud.rs - generic resource handlers
//
// One set of handlers serves every resource; the `Resource` impl decides the
// collection, payload types and stored document shape.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Router,
};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::Serialize;

use crate::database::Repository;
use crate::error::ApiError;
use crate::extractors::{DocumentId, ValidatedJson};
use crate::filter::{ListParams, Page};
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::Resource;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub inserted_id: ObjectId,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Total {
    pub total: u64,
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::not_found(format!("{} not found", R::NAME))
}

/**
 * POST /{resource} - validate, build and insert a document
 *
 * Every rule runs before any write; failures come back together as
 * VALIDATION_FAILED with one `{field, tag, value}` entry per violation.
 *
 * Expected Output (201):
 * ```json
 * { "insertedId": "65f0c1..." }
 * ```
 */
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<R::Create>,
) -> ApiResult<InsertAck> {
    let document = R::new_document(&state, payload).await?;
    let inserted_id = Repository::<R>::new(&state.db).insert(document).await?;

    tracing::debug!(collection = R::COLLECTION, id = %inserted_id, "document created");
    Ok(ApiResponse::created(InsertAck { inserted_id }))
}

/// GET /{resource}?keyword=&status=&size=&page= - paged, newest first
///
/// Responds with `{ totalRows, totalPages, pageNumber, pageSize, data: [...] }`.
pub async fn read_many<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<R::Dto>> {
    let filter = R::list_filter(&params)?;
    let page = params.page_request(&state.config.api);

    let result = Repository::<R>::new(&state.db).find_page(filter, page).await?;
    Ok(ApiResponse::success(result))
}

/// GET /{resource}/:id
pub async fn read_one<R: Resource>(
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> ApiResult<R::Dto> {
    Repository::<R>::new(&state.db)
        .find_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(not_found::<R>)
}

/// PATCH /{resource}/:id - partial update of the supplied fields
///
/// An update that matches a document but changes nothing is reported as
/// not found, the same as a missing id.
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
    ValidatedJson(payload): ValidatedJson<R::Update>,
) -> ApiResult<Message> {
    let fields = R::update_document(&state, payload).await?;
    let outcome = Repository::<R>::new(&state.db).update_by_id(id, fields).await?;

    if outcome.matched == 0 || outcome.modified == 0 {
        return Err(not_found::<R>());
    }

    Ok(ApiResponse::success(Message {
        message: format!("{} updated successfully", R::NAME),
    }))
}

/// DELETE /{resource}/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    DocumentId(id): DocumentId,
) -> ApiResult<Message> {
    let deleted = Repository::<R>::new(&state.db).delete_by_id(id).await?;
    if deleted == 0 {
        return Err(not_found::<R>());
    }

    tracing::debug!(collection = R::COLLECTION, id = %id, "document deleted");
    Ok(ApiResponse::success(Message {
        message: format!("{} deleted successfully", R::NAME),
    }))
}

/// GET /{resource}/count?keyword=&status=
pub async fn count<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Total> {
    let filter = R::list_filter(&params)?;
    let total = Repository::<R>::new(&state.db).count(filter).await?;
    Ok(ApiResponse::success(Total { total }))
}

/// Collection and item routes for one resource under `path`.
pub fn routes<R: Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, post(create::<R>).get(read_many::<R>))
        .route(
            &format!("{}/:id", path),
            get(read_one::<R>).patch(update::<R>).delete(delete::<R>),
        )
}
