mod common;

use axum::http::{Method, StatusCode, header};
use chrono::Utc;
use common::*;
use serde_json::json;

#[tokio::test]
async fn generates_pdf_attachment() {
    let app = TestApp::new().await;
    app.store
        .insert_template("invoice", "<h1>Invoice {{ invoiceNumber }}</h1>")
        .await;

    let response = app
        .post("/api/pdf/generate/invoice", json!({ "invoiceNumber": "123" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        FAKE_PDF.len().to_string().as_str()
    );
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!(
            "attachment; filename=\"invoice-{}.pdf\"",
            Utc::now().date_naive().format("%Y-%m-%d")
        )
        .as_str()
    );

    assert_eq!(body_bytes(response).await, FAKE_PDF);
}

#[tokio::test]
async fn unknown_template_is_404() {
    let app = TestApp::new().await;

    let response = app.post("/api/pdf/generate/missing", json!({})).await;
    assert_error(response, StatusCode::NOT_FOUND, "template_not_found").await;
}

#[tokio::test]
async fn broken_template_is_422() {
    let app = TestApp::new().await;
    app.store
        .insert_template("broken", "{% for item in items %}")
        .await;

    let response = app.post("/api/pdf/generate/broken", json!({})).await;
    assert_error(response, StatusCode::UNPROCESSABLE_ENTITY, "render_failed").await;
}

#[tokio::test]
async fn pdf_requires_api_key() {
    let app = TestApp::new().await;
    app.store.insert_template("invoice", "hello").await;

    let response = app
        .request(
            Method::POST,
            "/api/pdf/generate/invoice",
            None,
            Some(json!({})),
        )
        .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "invalid_api_key").await;
}

#[tokio::test]
async fn should_retrieve_settings() {
    let app = TestApp::new().await;
    app.store.set_pdf_config(json!({ "defaultFormat": "A5" })).await;

    let response = app.get("/api/settings").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "defaultFormat": "A5" }));
}

#[tokio::test]
async fn missing_settings_is_404() {
    let app = TestApp::new().await;

    let response = app.get("/api/settings").await;
    assert_error(response, StatusCode::NOT_FOUND, "settings_not_found").await;
}

#[tokio::test]
async fn quotes_in_template_name_do_not_break_the_disposition_header() {
    let app = TestApp::new().await;
    app.store.insert_template("q\"uote", "hello").await;

    let response = app.post("/api/pdf/generate/q%22uote", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!(
            "attachment; filename=\"q_uote-{}.pdf\"",
            Utc::now().date_naive().format("%Y-%m-%d")
        )
        .as_str()
    );
}

#[tokio::test]
async fn catalog_failure_is_500_not_404() {
    let app = TestApp::unavailable(false).await;

    let response = app.post("/api/pdf/generate/invoice", json!({})).await;
    assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "internal_error").await;

    let response = app.get("/api/settings").await;
    assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "internal_error").await;
}
