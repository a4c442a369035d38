//! Storage traits and their backends.
//!
//! Handlers never talk to the database directly. They go through these
//! traits, held as `Arc<dyn ...>` in the application state:
//!
//! - `DraftStore`: keyed persistence of one JSON document per (user, draft name)
//! - `ApiKeyStore`: lookup of hashed API keys for the access guard
//! - `CatalogStore`: read-only PDF templates and settings
//!
//! `PgStore` implements all three on PostgreSQL. `InMemoryStore` implements
//! the same semantics in process memory for tests and local development.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::AppError,
    models::{api_key::ApiKey, draft::Draft},
};

/// Keyed persistence of invoice drafts.
///
/// Every operation is a single independent call; the backend is the only
/// serialization point. Absence is reported through `Option`/`bool`, and
/// `Err` always means the backend itself failed.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Insert the draft, or replace its params wholesale if it already exists.
    ///
    /// Atomic with respect to concurrent saves of the same key: the stored
    /// params always equal one complete input.
    async fn save(&self, user_name: &str, name: &str, params: &Value) -> Result<(), AppError>;

    /// Move a draft to a new name, keeping its params.
    ///
    /// Returns `false` if `old_name` does not exist. Fails with
    /// `AppError::DraftConflict` if the user already has a draft named `new_name`.
    async fn rename(
        &self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, AppError>;

    /// Move a draft to a new name and replace its params in one write.
    ///
    /// Same outcomes as `rename`; on any error neither the name nor the params
    /// change.
    async fn rename_and_save(
        &self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
        params: &Value,
    ) -> Result<bool, AppError>;

    async fn get(&self, user_name: &str, name: &str) -> Result<Option<Draft>, AppError>;

    /// All drafts of a user, most recently updated first.
    async fn list(&self, user_name: &str) -> Result<Vec<Draft>, AppError>;

    /// Remove a draft. Returns whether a row was removed; absence is not an error.
    async fn delete(&self, user_name: &str, name: &str) -> Result<bool, AppError>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Find a key by the SHA-256 hex hash of its secret, expired or not.
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;
}

/// Read-only collaborators of the PDF renderer.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn template_body(&self, name: &str) -> Result<Option<String>, AppError>;

    /// The `settings.pdf_config` document, if the settings row exists.
    async fn pdf_config(&self) -> Result<Option<Value>, AppError>;
}
