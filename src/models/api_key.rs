//! API Key model for authentication.
//!
//! API keys authorize every call under `/api`. They are stored in the database as SHA-256 hashes; the plaintext secret only ever exists on the client.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `name`: Unique human-readable label (e.g. "Web app")
/// - `key_hash`: SHA-256 hash of the actual API key
/// - `expires_at`: Optional expiry; NULL means the key never expires
/// - `created_at`: When the key was created
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    pub name: String,

    /// SHA-256 hash of the actual API key (64 hex characters)
    ///
    /// When a request comes in with `X-API-Key: abc123`, we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash in the database
    /// 3. If found and not expired, authorize the request
    pub key_hash: String,

    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// A key is usable when it has no expiry or expires strictly after `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Hash a plaintext API key the way it is stored in `api_keys.key_hash`.
///
/// Equivalent to `encode(sha256('<secret>'), 'hex')` in PostgreSQL.
pub fn hash_api_key(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
