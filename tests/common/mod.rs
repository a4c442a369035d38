//! Shared fixtures for HTTP-level tests.
//!
//! Builds the real router over an `InMemoryStore` and a converter that
//! returns canned bytes, then drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode},
};
use chrono::Utc;
use invoice_drafts::{
    app::{AppState, build_router},
    error::AppError,
    models::{
        api_key::{ApiKey, hash_api_key},
        draft::Draft,
    },
    services::pdf_converter::PdfConverter,
    store::{ApiKeyStore, CatalogStore, DraftStore, InMemoryStore},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const API_KEY: &str = "test-api-key";
pub const EXPIRED_API_KEY: &str = "api-key-2";
pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake";

/// Returns `FAKE_PDF` for any HTML.
pub struct FakeConverter;

#[async_trait]
impl PdfConverter for FakeConverter {
    async fn convert(&self, _html: &str) -> Result<Vec<u8>, AppError> {
        Ok(FAKE_PDF.to_vec())
    }
}

fn unavailable() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

/// A backend that is down: every draft and catalog call fails. Key lookups
/// go to `keys` unless `keys_fail` is set.
pub struct FailingStore {
    pub keys: Arc<InMemoryStore>,
    pub keys_fail: bool,
}

#[async_trait]
impl DraftStore for FailingStore {
    async fn save(&self, _: &str, _: &str, _: &Value) -> Result<(), AppError> {
        Err(unavailable())
    }

    async fn rename(&self, _: &str, _: &str, _: &str) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn rename_and_save(&self, _: &str, _: &str, _: &str, _: &Value) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<Draft>, AppError> {
        Err(unavailable())
    }

    async fn list(&self, _: &str) -> Result<Vec<Draft>, AppError> {
        Err(unavailable())
    }

    async fn delete(&self, _: &str, _: &str) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(unavailable())
    }
}

#[async_trait]
impl ApiKeyStore for FailingStore {
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        if self.keys_fail {
            return Err(unavailable());
        }
        self.keys.find_by_hash(key_hash).await
    }
}

#[async_trait]
impl CatalogStore for FailingStore {
    async fn template_body(&self, _: &str) -> Result<Option<String>, AppError> {
        Err(unavailable())
    }

    async fn pdf_config(&self) -> Result<Option<Value>, AppError> {
        Err(unavailable())
    }
}

async fn seed_api_keys(store: &InMemoryStore) {
    store
        .insert_api_key(ApiKey {
            id: Uuid::new_v4(),
            name: "Test API Key".to_string(),
            key_hash: hash_api_key(API_KEY),
            expires_at: "2050-01-01T00:00:00Z".parse().ok(),
            created_at: Utc::now(),
        })
        .await;
    store
        .insert_api_key(ApiKey {
            id: Uuid::new_v4(),
            name: "Test API Key 2".to_string(),
            key_hash: hash_api_key(EXPIRED_API_KEY),
            expires_at: "2023-01-01T00:00:00Z".parse().ok(),
            created_at: Utc::now(),
        })
        .await;
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub router: Router,
}

impl TestApp {
    /// A router with one valid key (`API_KEY`) and one expired key (`EXPIRED_API_KEY`).
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        seed_api_keys(&store).await;

        let state = AppState::new(store.clone(), Arc::new(FakeConverter));
        let router = build_router(state, Duration::from_secs(5));

        Self { store, router }
    }

    /// A router whose storage is down. With `keys_fail` the key lookup fails
    /// too; otherwise `API_KEY` still authenticates.
    pub async fn unavailable(keys_fail: bool) -> Self {
        let store = Arc::new(InMemoryStore::new());
        seed_api_keys(&store).await;

        let failing = Arc::new(FailingStore {
            keys: store.clone(),
            keys_fail,
        });
        let state = AppState::new(failing, Arc::new(FakeConverter));
        let router = build_router(state, Duration::from_secs(5));

        Self { store, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(key) = api_key {
            builder = builder.header("X-API-Key", key);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn raw(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Method::GET, uri, Some(API_KEY), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response<Body> {
        self.request(Method::PUT, uri, Some(API_KEY), Some(body)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(API_KEY), Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.request(Method::DELETE, uri, Some(API_KEY), None).await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], code);
}
