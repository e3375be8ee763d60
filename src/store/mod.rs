//! Token persistence.
//!
//! `PgTokenStore` is the production backend; `MemoryTokenStore` keeps the
//! same contract in-process for local runs and tests.

pub mod db;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::ManagedToken;

pub use db::PgTokenStore;
pub use memory::MemoryTokenStore;

/// Storage contract for managed tokens. Every call is its own unit of work.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist a fully built record. Fails with `Conflict` when the creator
    /// already owns a token with the same name.
    async fn insert(&self, token: &ManagedToken) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ManagedToken>, StoreError>;

    /// Hard delete. Returns `false` when no record had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Set `expires_at` only if it is still null, stamping `updated_at` with
    /// `now`. Returns `true` when a row changed.
    async fn fill_expires_at(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}
