//! PDF generation handler.

use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    app::AppState, error::AppError, models::draft::validate_name, services::pdf_service,
};

/// Generate a PDF from a stored template.
///
/// # Endpoint
///
/// `POST /api/pdf/generate/{templateName}`
///
/// # Request Body
///
/// Arbitrary JSON object passed to the template as its context, typically
/// the params of a draft.
///
/// # Response
///
/// - **Success (200 OK)**: `application/pdf` attachment named
///   `{templateName}-{YYYY-MM-DD}.pdf`
/// - **Error (400)**: body is not JSON, or the template name is invalid
/// - **Error (404)**: unknown template
/// - **Error (422)**: template failed to render
/// - **Error (502)**: the headless browser failed
pub async fn generate_pdf(
    State(state): State<AppState>,
    Path(template_name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(params) = body.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    validate_name("templateName", &template_name)?;

    tracing::debug!(%template_name, "Generate PDF");

    let pdf = pdf_service::generate_pdf(
        state.catalog.as_ref(),
        state.pdf.as_ref(),
        &template_name,
        &params,
    )
    .await?;

    let file_name = pdf_service::attachment_file_name(&template_name, Utc::now().date_naive());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|_| AppError::InvalidRequest("Template name is not a valid file name".to_string()))?;

    tracing::debug!(%file_name, size = pdf.len(), "Generated PDF");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(pdf.len())),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        Body::from(pdf),
    )
        .into_response())
}
