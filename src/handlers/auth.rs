// handlers/auth.rs - sign-up, sign-in and sign-out

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    Extension,
};
use serde_json::json;

use crate::auth::{expired_cookie, generate_jwt, session_cookie, verify_password, Claims};
use crate::database::Repository;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, CurrentUser};
use crate::resources::user::{CreateUser, Credentials, SignIn, User};
use crate::resources::Resource;
use crate::state::AppState;

/**
 * POST /auth/signup - register a user
 *
 * Same rules as `POST /users`; a taken email is a 409.
 *
 * Expected Input:
 * ```json
 * { "name": "Ann", "email": "ann@x.com", "password": "s3cret" }
 * ```
 *
 * Expected Output (201):
 * ```json
 * { "status": "success", "message": "User created successfully" }
 * ```
 */
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> Result<impl IntoResponse, ApiError> {
    let document = User::new_document(&state, payload).await?;
    let id = Repository::<User>::new(&state.db).insert(document).await?;

    tracing::info!(user = %id, "user signed up");
    Ok(ApiResponse::created(json!({
        "status": "success",
        "message": "User created successfully"
    })))
}

/**
 * POST /auth/signin - exchange credentials for a session token
 *
 * The token is returned in the body and as an HttpOnly `token` cookie.
 * Unknown email is 404, a wrong password is 400 INVALID_CREDENTIALS.
 *
 * Expected Input:
 * ```json
 * { "email": "ann@x.com", "password": "s3cret" }
 * ```
 *
 * Expected Output:
 * ```json
 * { "status": "success", "token": "eyJhbGciOiJIUzI1NiI..." }
 * ```
 */
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignIn>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email();
    let credentials: Credentials = Repository::<User>::new(&state.db)
        .find_as(Filter::new().eq("email", email).into_document())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let password = payload.password.unwrap_or_default();
    if !verify_password(password, credentials.password).await? {
        return Err(ApiError::invalid_credentials("Invalid email or password"));
    }

    let security = &state.config.security;
    let token = Claims::new(&credentials.id, security.jwt_expiry_hours)
        .and_then(|claims| generate_jwt(&claims, &security.jwt_secret))
        .map_err(|e| {
            tracing::error!("token signing failed: {}", e);
            ApiError::internal_server_error("Failed to issue token")
        })?;

    let cookie = session_cookie(
        &token,
        security.jwt_expiry_hours.saturating_mul(3600),
        security.cookie_secure,
    );

    tracing::info!(user = %credentials.id, "user signed in");
    Ok((
        [(SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "status": "success", "token": token })),
    ))
}

/// GET /auth/signout - clear the session cookie
pub async fn signout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> impl IntoResponse {
    tracing::info!(user = %user.id, "user signed out");
    (
        [(SET_COOKIE, expired_cookie(state.config.security.cookie_secure))],
        ApiResponse::success(json!({ "status": "success" })),
    )
}
