//! In-memory storage backend for testing and local development.
//!
//! Mirrors the PostgreSQL semantics: every mutation happens under one write
//! guard, so concurrent saves of the same key never interleave.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ApiKeyStore, CatalogStore, DraftStore};
use crate::{
    error::AppError,
    models::{api_key::ApiKey, draft::Draft},
};

#[derive(Default)]
struct State {
    /// Keyed by (user_name, name)
    drafts: HashMap<(String, String), Draft>,
    /// Keyed by key hash
    api_keys: HashMap<String, ApiKey>,
    templates: HashMap<String, String>,
    pdf_config: Option<Value>,
    last_write: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing write timestamps, so "most recent first" is total
    /// even when two writes land within the same clock tick.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_write {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_write = Some(stamp);
        stamp
    }

    /// Rename under the caller's write guard, optionally replacing params.
    fn move_draft(
        &mut self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
        params: Option<&Value>,
    ) -> Result<bool, AppError> {
        if !self.drafts.contains_key(&key(user_name, old_name)) {
            return Ok(false);
        }

        if old_name != new_name && self.drafts.contains_key(&key(user_name, new_name)) {
            return Err(AppError::DraftConflict(new_name.to_string()));
        }

        let updated_at = self.next_timestamp();
        if let Some(mut draft) = self.drafts.remove(&key(user_name, old_name)) {
            draft.name = new_name.to_string();
            draft.updated_at = updated_at;
            if let Some(params) = params {
                draft.params = params.clone();
            }
            self.drafts.insert(key(user_name, new_name), draft);
        }

        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_api_key(&self, api_key: ApiKey) {
        let mut state = self.state.write().await;
        state.api_keys.insert(api_key.key_hash.clone(), api_key);
    }

    pub async fn insert_template(&self, name: impl Into<String>, body: impl Into<String>) {
        let mut state = self.state.write().await;
        state.templates.insert(name.into(), body.into());
    }

    pub async fn set_pdf_config(&self, pdf_config: Value) {
        let mut state = self.state.write().await;
        state.pdf_config = Some(pdf_config);
    }
}

fn key(user_name: &str, name: &str) -> (String, String) {
    (user_name.to_string(), name.to_string())
}

#[async_trait]
impl DraftStore for InMemoryStore {
    async fn save(&self, user_name: &str, name: &str, params: &Value) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let updated_at = state.next_timestamp();

        state.drafts.insert(
            key(user_name, name),
            Draft {
                user_name: user_name.to_string(),
                name: name.to_string(),
                params: params.clone(),
                updated_at,
            },
        );

        Ok(())
    }

    async fn rename(
        &self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        state.move_draft(user_name, old_name, new_name, None)
    }

    async fn rename_and_save(
        &self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
        params: &Value,
    ) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        state.move_draft(user_name, old_name, new_name, Some(params))
    }

    async fn get(&self, user_name: &str, name: &str) -> Result<Option<Draft>, AppError> {
        let state = self.state.read().await;
        Ok(state.drafts.get(&key(user_name, name)).cloned())
    }

    async fn list(&self, user_name: &str) -> Result<Vec<Draft>, AppError> {
        let state = self.state.read().await;

        let mut drafts: Vec<Draft> = state
            .drafts
            .values()
            .filter(|draft| draft.user_name == user_name)
            .cloned()
            .collect();

        drafts.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(drafts)
    }

    async fn delete(&self, user_name: &str, name: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        Ok(state.drafts.remove(&key(user_name, name)).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryStore {
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let state = self.state.read().await;
        Ok(state.api_keys.get(key_hash).cloned())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn template_body(&self, name: &str) -> Result<Option<String>, AppError> {
        let state = self.state.read().await;
        Ok(state.templates.get(name).cloned())
    }

    async fn pdf_config(&self) -> Result<Option<Value>, AppError> {
        let state = self.state.read().await;
        Ok(state.pdf_config.clone())
    }
}
