//! PostgreSQL-backed token store.
//!
//! Table `oauth2_token`: one row per managed token, unique per
//! (created_by, name).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::TokenRepository;
use crate::error::StoreError;
use crate::models::ManagedToken;

/// Token store backed by PostgreSQL.
pub struct PgTokenStore {
    pub pool: PgPool,
}

impl PgTokenStore {
    pub async fn new(db_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect to PostgreSQL: {e}")))?;

        Ok(Self { pool })
    }

    /// Run schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS oauth2_token (
                id          UUID PRIMARY KEY,
                name        TEXT NOT NULL,
                provider    TEXT,
                token_json  JSONB NOT NULL,
                expires_at  TIMESTAMPTZ,
                created_by  UUID NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT uq_oauth2_token_creator_name UNIQUE (created_by, name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Indexes
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS ix_oauth2_token_created_by_name ON oauth2_token(created_by, name)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS ix_oauth2_token_name ON oauth2_token(name)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS ix_oauth2_token_provider ON oauth2_token(provider)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS ix_oauth2_token_expires_at ON oauth2_token(expires_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn token_from_row(row: &PgRow) -> Result<ManagedToken, StoreError> {
    Ok(ManagedToken {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        provider: row.try_get("provider")?,
        token_json: row.try_get("token_json")?,
        expires_at: row.try_get("expires_at")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TokenRepository for PgTokenStore {
    async fn insert(&self, token: &ManagedToken) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO oauth2_token
                (id, name, provider, token_json, expires_at, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(token.id)
        .bind(&token.name)
        .bind(&token.provider)
        .bind(&token.token_json)
        .bind(token.expires_at)
        .bind(token.created_by)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ManagedToken>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, provider, token_json, expires_at, created_by, created_at, updated_at
            FROM oauth2_token
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let affected = sqlx::query("DELETE FROM oauth2_token WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(affected > 0)
    }

    async fn fill_expires_at(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let affected = sqlx::query(
            r#"
            UPDATE oauth2_token
            SET expires_at = $2,
                updated_at = $3
            WHERE id = $1 AND expires_at IS NULL
            "#,
        )
        .bind(id)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(affected > 0)
    }
}
