//! Settings endpoint.

use axum::{Json, extract::State};

use crate::{app::AppState, error::AppError, models::settings::SettingsResponse};

/// Get PDF settings.
///
/// # Endpoint
///
/// `GET /api/settings`
///
/// # Response
///
/// - **Success (200 OK)**: `{ "defaultFormat": "A4" }`
/// - **Error (404)**: the settings row has not been created
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let pdf_config = state
        .catalog
        .pdf_config()
        .await?
        .ok_or(AppError::SettingsNotFound)?;

    Ok(Json(SettingsResponse::from_pdf_config(&pdf_config)))
}
