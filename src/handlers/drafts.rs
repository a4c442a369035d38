//! Draft HTTP handlers.
//!
//! This module implements the draft API endpoints:
//! - PUT|POST /api/users/{userName}/drafts/{draftName} - Save or rename a draft
//! - GET /api/users/{userName}/drafts/{draftName} - Get one draft
//! - GET /api/users/{userName}/drafts - List a user's drafts
//! - DELETE /api/users/{userName}/drafts/{draftName} - Delete a draft

use crate::{
    app::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::draft::{DraftDetails, DraftSummary, DraftWrite, validate_name},
    services::draft_service,
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

/// Save a draft, or rename it.
///
/// # Endpoint
///
/// `PUT /api/users/{userName}/drafts/{draftName}` (`POST` is accepted too)
///
/// # Request Body
///
/// Either the invoice params themselves:
///
/// ```json
/// { "invoiceNumber": "123", "date": "2025-09-10", "from": { "name": "Acme Inc." } }
/// ```
///
/// or an envelope: `{"params": {...}}`, `{"newName": "q3"}`, or both.
///
/// A document whose only key is an object `params`, or a string `newName`,
/// is read as an envelope. To store such a document verbatim, wrap it:
/// `{"params": {"params": {...}}}`.
///
/// # Response
///
/// - **Success (200 OK)**: empty body
/// - **Error (400)**: body is not a JSON object, a name is empty or too
///   long, or the body or a name contains U+0000
/// - **Error (404)**: rename source does not exist
/// - **Error (409)**: rename target already exists
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((user_name, draft_name)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    validate_name("userName", &user_name)?;
    validate_name("draftName", &draft_name)?;
    let write = DraftWrite::from_body(body)?;
    let rename = matches!(write, DraftWrite::Rename { .. });

    tracing::debug!(%user_name, %draft_name, key = %auth.key_name, rename, "Save draft");

    draft_service::apply_write(state.drafts.as_ref(), &user_name, &draft_name, write).await?;

    Ok(StatusCode::OK)
}

/// Get one draft.
///
/// # Response
///
/// - **Success (200 OK)**:
///
/// ```json
/// {
///   "userName": "testuser",
///   "name": "test-draft",
///   "params": { "invoiceNumber": "123" }
/// }
/// ```
///
/// - **Error (400)**: invalid user or draft name
/// - **Error (404)**: no draft with that name for this user
pub async fn get_draft(
    State(state): State<AppState>,
    Path((user_name, draft_name)): Path<(String, String)>,
) -> Result<Json<DraftDetails>, AppError> {
    validate_name("userName", &user_name)?;
    validate_name("draftName", &draft_name)?;

    tracing::debug!(%user_name, %draft_name, "Get draft");

    let draft = state
        .drafts
        .get(&user_name, &draft_name)
        .await?
        .ok_or(AppError::DraftNotFound)?;

    Ok(Json(draft.into()))
}

/// List all drafts of a user.
///
/// # Response
///
/// - **Success (200 OK)**: array (possibly empty), most recently updated first
///
/// ```json
/// [
///   {
///     "userName": "testuser",
///     "name": "test-draft",
///     "params": { "invoiceNumber": "123" },
///     "updatedAt": "2025-09-10T10:00:00Z"
///   }
/// ]
/// ```
pub async fn list_drafts(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<DraftSummary>>, AppError> {
    validate_name("userName", &user_name)?;

    tracing::debug!(%user_name, "List drafts");

    let drafts = state.drafts.list(&user_name).await?;

    Ok(Json(drafts.into_iter().map(Into::into).collect()))
}

/// Delete a draft.
///
/// # Response
///
/// 204 No Content whether or not the draft existed; 400 for an invalid name.
pub async fn delete_draft(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((user_name, draft_name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    validate_name("userName", &user_name)?;
    validate_name("draftName", &draft_name)?;

    let deleted = state.drafts.delete(&user_name, &draft_name).await?;

    tracing::debug!(%user_name, %draft_name, key = %auth.key_name, deleted, "Delete draft");

    Ok(StatusCode::NO_CONTENT)
}
