use crate::error::ApiError;

/// bcrypt hash, run on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("password hashing task failed: {}", e);
            ApiError::internal_server_error("Failed to process request")
        })?
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to process request")
        })
}

/// Malformed stored hashes count as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("password verification task failed: {}", e);
            ApiError::internal_server_error("Failed to process request")
        })?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("stored password hash is unusable: {}", e);
            Ok(false)
        }
    }
}
