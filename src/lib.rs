//! Invoice drafts service.
//!
//! A REST API that stores invoice drafts (arbitrary JSON documents keyed by
//! user and draft name), authorizes calls with static API keys, and renders
//! stored templates to PDF.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: `X-API-Key` header, keys stored as SHA-256 hashes
//! - **Templates**: tera, converted to PDF by a headless browser
//! - **Format**: JSON requests/responses

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
