//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls the stores or services held in `AppState`
//! 3. Returns HTTP response (JSON, status code)

/// Draft endpoints
pub mod drafts;
/// Liveness and database connectivity
pub mod health;
/// PDF generation
pub mod pdf;
/// PDF settings
pub mod settings;
