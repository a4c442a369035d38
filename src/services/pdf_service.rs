//! PDF service - renders a stored template with draft params and converts it.
//!
//! # Process
//!
//! 1. Load the template body by name from the catalog
//! 2. Render it with `tera` and the invoice helper functions
//! 3. Hand the HTML to the configured `PdfConverter`

use std::error::Error as _;

use serde_json::Value;
use tera::{Context, Tera};

use super::{pdf_converter::PdfConverter, template_helpers};
use crate::{error::AppError, store::CatalogStore};

/// Render `template_name` with `params` and convert the result to PDF bytes.
///
/// # Errors
///
/// - `TemplateNotFound`: no template stored under that name
/// - `Render`: template syntax error, or params are not a JSON object
/// - `PdfConversion`: the browser failed
/// - `Database`: the catalog lookup failed
pub async fn generate_pdf(
    catalog: &dyn CatalogStore,
    converter: &dyn PdfConverter,
    template_name: &str,
    params: &Value,
) -> Result<Vec<u8>, AppError> {
    let body = catalog
        .template_body(template_name)
        .await?
        .ok_or_else(|| AppError::TemplateNotFound(template_name.to_string()))?;

    let html = render_html(template_name, &body, params)?;
    tracing::debug!(template_name, html_len = html.len(), "Template rendered");

    converter.convert(&html).await
}

/// Render a template source with the given params as its context.
///
/// Output is not HTML-escaped: templates are trusted and may embed markup
/// carried in params (e.g. formatted notes).
pub fn render_html(template_name: &str, body: &str, params: &Value) -> Result<String, AppError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    template_helpers::register(&mut tera);

    tera.add_raw_template(template_name, body)
        .map_err(|e| AppError::Render(describe(&e)))?;

    let context = Context::from_value(params.clone()).map_err(|e| AppError::Render(describe(&e)))?;

    tera.render(template_name, &context)
        .map_err(|e| AppError::Render(describe(&e)))
}

/// Tera reports the useful detail in the error's source chain.
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

/// `invoice-2025-09-10.pdf`
///
/// Quotes, backslashes and control characters become `_` so the result can
/// sit inside a quoted `filename="..."` parameter.
pub fn attachment_file_name(template_name: &str, date: chrono::NaiveDate) -> String {
    let stem: String = template_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    format!("{stem}-{}.pdf", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the HTML it was given and returns it as "PDF" bytes.
    #[derive(Default)]
    struct EchoConverter {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PdfConverter for EchoConverter {
        async fn convert(&self, html: &str) -> Result<Vec<u8>, AppError> {
            self.seen.lock().unwrap().push(html.to_string());
            Ok(html.as_bytes().to_vec())
        }
    }

    #[test]
    fn renders_params_without_escaping() {
        let html = render_html(
            "invoice",
            "<h1>{{ from.name }}</h1><p>{{ notes }}</p>",
            &json!({ "from": { "name": "Acme & Sons" }, "notes": "<b>Net 30</b>" }),
        )
        .unwrap();

        assert_eq!(html, "<h1>Acme & Sons</h1><p><b>Net 30</b></p>");
    }

    #[test]
    fn loops_over_line_items() {
        let html = render_html(
            "invoice",
            "{% for item in items %}{% set line = times(a=item.quantity, b=item.rate) %}{{ item.description }}={{ currency(code=\"USD\", amount=line) }};{% endfor %}",
            &json!({ "items": [
                { "description": "Design", "quantity": 10, "rate": 50 },
                { "description": "Hosting", "quantity": 1, "rate": 12 }
            ] }),
        )
        .unwrap();

        assert_eq!(html, "Design=$500.00;Hosting=$12.00;");
    }

    #[test]
    fn syntax_errors_are_render_errors() {
        let result = render_html("broken", "{% for item in items %}", &json!({}));
        assert!(matches!(result, Err(AppError::Render(_))));
    }

    #[test]
    fn non_object_params_are_render_errors() {
        let result = render_html("invoice", "hello", &json!([1, 2, 3]));
        assert!(matches!(result, Err(AppError::Render(_))));
    }

    #[tokio::test]
    async fn generate_pdf_uses_stored_template() {
        let catalog = InMemoryStore::new();
        catalog.insert_template("invoice", "Invoice #{{ invoiceNumber }}").await;
        let converter = EchoConverter::default();

        let pdf = generate_pdf(&catalog, &converter, "invoice", &json!({ "invoiceNumber": "123" }))
            .await
            .unwrap();

        assert_eq!(pdf, b"Invoice #123".to_vec());
        assert_eq!(converter.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn generate_pdf_of_unknown_template_is_not_found() {
        let catalog = InMemoryStore::new();
        let converter = EchoConverter::default();

        let result = generate_pdf(&catalog, &converter, "missing", &json!({})).await;
        assert!(matches!(result, Err(AppError::TemplateNotFound(name)) if name == "missing"));
        assert!(converter.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn file_name_carries_template_and_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        assert_eq!(attachment_file_name("invoice", date), "invoice-2025-09-10.pdf");
    }

    #[test]
    fn file_name_cannot_break_out_of_the_quoted_parameter() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        assert_eq!(
            attachment_file_name("a\"b\\c\td", date),
            "a_b_c_d-2025-09-10.pdf"
        );
    }
}
