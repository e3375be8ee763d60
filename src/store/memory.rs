//! In-process token store for development runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::TokenRepository;
use crate::error::StoreError;
use crate::models::ManagedToken;

#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<Mutex<HashMap<Uuid, ManagedToken>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, ManagedToken>>, StoreError> {
        self.tokens
            .lock()
            .map_err(|_| StoreError::Internal("token store lock poisoned".into()))
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenStore {
    async fn insert(&self, token: &ManagedToken) -> Result<(), StoreError> {
        let mut tokens = self.lock()?;

        let duplicate = tokens
            .values()
            .any(|t| t.created_by == token.created_by && t.name == token.name);
        if duplicate || tokens.contains_key(&token.id) {
            return Err(StoreError::Conflict(
                "a token with this name already exists for this creator".into(),
            ));
        }

        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ManagedToken>, StoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    async fn fill_expires_at(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tokens = self.lock()?;
        match tokens.get_mut(&id) {
            Some(token) if token.expires_at.is_none() => {
                token.expires_at = Some(expires_at);
                token.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
