use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use mongodb::bson::oid::ObjectId;

use crate::auth::{extract_token, validate_jwt};
use crate::database::Repository;
use crate::error::ApiError;
use crate::resources::user::{User, UserDto};
use crate::state::AppState;

/// Authenticated user loaded by the gate, password excluded
#[derive(Clone, Debug)]
pub struct CurrentUser(pub UserDto);

/// Session gate: token from `Authorization: Bearer` or the `token` cookie,
/// verified, then resolved to a stored user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::unauthenticated("You are not logged in"))?;

    let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
        tracing::debug!("rejected token: {}", e);
        ApiError::invalid_token(format!("Invalid token: {}", e))
    })?;

    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::invalid_token("Invalid token: malformed subject"))?;

    let user = Repository::<User>::new(&state.db)
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::warn!("user lookup for token failed: {}", e);
            ApiError::invalid_token("Invalid token: user lookup failed")
        })?
        .ok_or_else(|| ApiError::invalid_token("Invalid token: user not found"))?;

    // The subject must be the canonical form of the stored id
    if user.id.to_hex() != claims.sub {
        return Err(ApiError::forbidden("Token subject does not match the user"));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
