//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Infrastructure**: the database is unreachable, timed out or rejected a query
/// - **Authentication**: missing, unknown or expired API keys
/// - **Resource**: drafts, templates or settings that do not exist
/// - **Input**: request bodies or names that cannot be accepted
/// - **PDF pipeline**: template rendering and HTML-to-PDF conversion failures
///
/// A missing draft is never produced by the stores themselves: they return
/// `Option` and the HTTP layer decides whether absence is an error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, pool timeout, query error).
    ///
    /// Returns HTTP 500; the underlying error is logged but never sent to the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, unknown or expired.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Requested draft does not exist for this user.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Draft not found")]
    DraftNotFound,

    /// A rename targeted a name the user already has a draft under.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Draft '{0}' already exists")]
    DraftConflict(String),

    /// No PDF template is stored under the requested name.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The settings row has not been created.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Settings not found")]
    SettingsNotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// The template could not be compiled or rendered with the given params.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Template rendering failed: {0}")]
    Render(String),

    /// The headless browser failed to produce a PDF.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("PDF conversion failed: {0}")]
    PdfConversion(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey` → 401 Unauthorized
/// - `DraftNotFound`, `TemplateNotFound`, `SettingsNotFound` → 404 Not Found
/// - `DraftConflict` → 409 Conflict
/// - `InvalidRequest` → 400 Bad Request
/// - `Render` → 422 Unprocessable Entity
/// - `PdfConversion` → 502 Bad Gateway (hides details from client)
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::DraftNotFound => {
                (StatusCode::NOT_FOUND, "draft_not_found", self.to_string())
            }
            AppError::DraftConflict(_) => {
                (StatusCode::CONFLICT, "draft_conflict", self.to_string())
            }
            AppError::TemplateNotFound(_) => (
                StatusCode::NOT_FOUND,
                "template_not_found",
                self.to_string(),
            ),
            AppError::SettingsNotFound => (
                StatusCode::NOT_FOUND,
                "settings_not_found",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Render(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "render_failed",
                self.to_string(),
            ),
            AppError::PdfConversion(ref detail) => {
                tracing::error!(detail = %detail, "PDF conversion failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "pdf_conversion_failed",
                    "PDF conversion failed".to_string(),
                )
            }
            AppError::Database(ref err) => {
                tracing::error!(error = ?err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
