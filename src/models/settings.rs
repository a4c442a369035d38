//! PDF settings exposed to the invoice editor.

use serde::Serialize;
use serde_json::Value;

/// Paper format used when `pdf_config` does not name one.
pub const DEFAULT_PDF_FORMAT: &str = "A4";

/// Response body for `GET /api/settings`.
///
/// # JSON Example
///
/// ```json
/// { "defaultFormat": "A5" }
/// ```
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub default_format: String,
}

impl SettingsResponse {
    /// Build the response from the stored `settings.pdf_config` document.
    pub fn from_pdf_config(pdf_config: &Value) -> Self {
        let default_format = pdf_config
            .get("defaultFormat")
            .and_then(Value::as_str)
            .filter(|format| !format.is_empty())
            .unwrap_or(DEFAULT_PDF_FORMAT)
            .to_string();

        Self { default_format }
    }
}
