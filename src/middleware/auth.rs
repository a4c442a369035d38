//! API key authentication middleware.
//!
//! This middleware intercepts every request under `/api` to:
//! 1. Extract the API key from the `X-API-Key` header
//! 2. Hash it and look it up in the key store
//! 3. Reject unknown or expired keys with HTTP 401
//! 4. Inject authentication context into the request

use crate::{
    app::AppState,
    error::AppError,
    models::api_key::hash_api_key,
    store::ApiKeyStore,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

/// Header carrying the plaintext API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Authentication context attached to authorized requests.
///
/// Handlers extract it with `Extension<AuthContext>` to record which key
/// performed a mutation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub api_key_id: Uuid,

    /// Label of the key, e.g. "Web app"
    pub key_name: String,
}

/// Check a plaintext key against the key store.
///
/// # Returns
///
/// - `Ok(AuthContext)` if the key exists and has not expired
/// - `Err(AppError::InvalidApiKey)` if it is unknown or expired
/// - `Err(AppError::Database)` if the lookup itself failed
pub async fn authorize(keys: &dyn ApiKeyStore, secret: &str) -> Result<AuthContext, AppError> {
    let api_key = keys
        .find_by_hash(&hash_api_key(secret))
        .await?
        .ok_or(AppError::InvalidApiKey)?;

    if !api_key.is_valid_at(Utc::now()) {
        tracing::debug!(key_name = %api_key.name, "Rejected expired API key");
        return Err(AppError::InvalidApiKey);
    }

    Ok(AuthContext {
        api_key_id: api_key.id,
        key_name: api_key.name,
    })
}

/// API key authentication middleware function.
///
/// # Headers
///
/// Expected header format:
/// ```text
/// X-API-Key: abc123xyz
/// ```
///
/// # Returns
///
/// - `Ok(Response)` if authorized (calls next handler)
/// - `Err(AppError::InvalidApiKey)` if the header is missing, empty, unknown or expired (401)
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(AppError::InvalidApiKey)?;

    let auth_context = authorize(state.api_keys.as_ref(), api_key).await?;

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
