//! Application state and HTTP router.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::get,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers, middleware,
    services::pdf_converter::PdfConverter,
    store::{ApiKeyStore, CatalogStore, DraftStore},
};

/// Process-wide resources shared by every handler.
///
/// Built once in `main` and cloned cheaply into each request.
#[derive(Clone)]
pub struct AppState {
    pub drafts: Arc<dyn DraftStore>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub pdf: Arc<dyn PdfConverter>,
}

impl AppState {
    /// State backed by a single store that serves drafts, keys and the catalog.
    pub fn new<S>(store: Arc<S>, pdf: Arc<dyn PdfConverter>) -> Self
    where
        S: DraftStore + ApiKeyStore + CatalogStore + 'static,
    {
        Self {
            drafts: store.clone(),
            api_keys: store.clone(),
            catalog: store,
            pdf,
        }
    }
}

/// Build the HTTP router.
///
/// - `/health` is public
/// - everything under `/api` requires a valid `X-API-Key`
/// - requests running longer than `request_timeout` are aborted with 504
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    // Create authenticated routes (API endpoints)
    let authenticated_routes = Router::new()
        // Draft routes
        .route(
            "/api/users/{user_name}/drafts",
            get(handlers::drafts::list_drafts),
        )
        .route(
            "/api/users/{user_name}/drafts/{draft_name}",
            get(handlers::drafts::get_draft)
                .put(handlers::drafts::save_draft)
                .post(handlers::drafts::save_draft)
                .delete(handlers::drafts::delete_draft),
        )
        // PDF routes
        .route(
            "/api/pdf/generate/{template_name}",
            axum::routing::post(handlers::pdf::generate_pdf),
        )
        .route("/api/settings", get(handlers::settings::get_settings))
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(authenticated_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        // Share stores with all handlers via State extraction
        .with_state(state)
}
