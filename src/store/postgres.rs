//! PostgreSQL storage backend using sqlx.
//!
//! All writes are single statements so PostgreSQL provides the atomicity:
//! - save is `INSERT ... ON CONFLICT (user_name, name) DO UPDATE`
//! - rename (with or without new params) is one `UPDATE` guarded by the
//!   `(user_name, name)` primary key

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiKeyStore, CatalogStore, DraftStore};
use crate::{
    db::DbPool,
    error::AppError,
    models::{api_key::ApiKey, draft::Draft},
};

/// Storage service backed by a PostgreSQL connection pool.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftStore for PgStore {
    async fn save(&self, user_name: &str, name: &str, params: &Value) -> Result<(), AppError> {
        // Whole-document replace; EXCLUDED.params is the incoming value
        sqlx::query(
            r#"
            INSERT INTO user_drafts (user_name, name, params, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_name, name) DO UPDATE
            SET params = EXCLUDED.params,
                updated_at = NOW()
            "#,
        )
        .bind(user_name)
        .bind(name)
        .bind(params)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn rename(
        &self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_drafts
            SET name = $3,
                updated_at = NOW()
            WHERE user_name = $1 AND name = $2
            "#,
        )
        .bind(user_name)
        .bind(old_name)
        .bind(new_name)
        .execute(&self.pool)
        .await;

        rename_outcome(result, new_name)
    }

    async fn rename_and_save(
        &self,
        user_name: &str,
        old_name: &str,
        new_name: &str,
        params: &Value,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_drafts
            SET name = $3,
                params = $4,
                updated_at = NOW()
            WHERE user_name = $1 AND name = $2
            "#,
        )
        .bind(user_name)
        .bind(old_name)
        .bind(new_name)
        .bind(params)
        .execute(&self.pool)
        .await;

        rename_outcome(result, new_name)
    }

    async fn get(&self, user_name: &str, name: &str) -> Result<Option<Draft>, AppError> {
        let draft = sqlx::query_as::<_, Draft>(
            r#"
            SELECT user_name, name, params, updated_at
            FROM user_drafts
            WHERE user_name = $1 AND name = $2
            "#,
        )
        .bind(user_name)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(draft)
    }

    async fn list(&self, user_name: &str) -> Result<Vec<Draft>, AppError> {
        let drafts = sqlx::query_as::<_, Draft>(
            r#"
            SELECT user_name, name, params, updated_at
            FROM user_drafts
            WHERE user_name = $1
            ORDER BY updated_at DESC, name ASC
            "#,
        )
        .bind(user_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(drafts)
    }

    async fn delete(&self, user_name: &str, name: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_drafts WHERE user_name = $1 AND name = $2")
            .bind(user_name)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn rename_outcome(
    result: Result<sqlx::postgres::PgQueryResult, sqlx::Error>,
    new_name: &str,
) -> Result<bool, AppError> {
    match result {
        Ok(done) => Ok(done.rows_affected() > 0),
        // (user_name, new_name) already taken
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            Err(AppError::DraftConflict(new_name.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ApiKeyStore for PgStore {
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            "SELECT id, name, key_hash, expires_at, created_at
             FROM api_keys
             WHERE key_hash = $1",
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(api_key)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn template_body(&self, name: &str) -> Result<Option<String>, AppError> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM templates WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(body)
    }

    async fn pdf_config(&self) -> Result<Option<Value>, AppError> {
        let config: Option<Value> =
            sqlx::query_scalar("SELECT pdf_config FROM settings ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(config)
    }
}
