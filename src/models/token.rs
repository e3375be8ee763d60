//! Token payload and the persisted record that wraps it.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::expiry;

/// Credential set issued by an OAuth2 authorization flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OAuth2Token {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, relative to when the token was stored.
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    pub token_type: String,
}

/// A stored token: audit metadata, the raw payload, and its absolute expiry.
///
/// `(created_by, name)` is unique across the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedToken {
    pub id: Uuid,
    pub name: String,
    pub provider: Option<String>,
    /// Raw payload exactly as stored. Never leaves the service.
    pub token_json: Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManagedToken {
    /// Decode the stored payload.
    pub fn oauth2_token(&self) -> Result<OAuth2Token, serde_json::Error> {
        serde_json::from_value(self.token_json.clone())
    }

    /// Fill `expires_at` from the payload's `expires_in` if it is still unset.
    ///
    /// Uses `created_at` as the reference instant. Returns `true` when the
    /// field was filled. An existing value is never touched.
    pub fn ensure_expires_at(&mut self) -> bool {
        if self.expires_at.is_some() {
            return false;
        }
        self.expires_at = expiry::resolve_from_json(&self.token_json, self.created_at);
        self.expires_at.is_some()
    }

    /// Response projection: metadata plus the decoded payload, never the raw JSON.
    pub fn view(&self) -> ManagedTokenView {
        let oauth2_token = match self.oauth2_token() {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Token {} has an undecodable payload: {e}", self.id);
                None
            }
        };

        ManagedTokenView {
            id: self.id,
            name: self.name.clone(),
            provider: self.provider.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
            oauth2_token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedTokenView {
    pub id: Uuid,
    pub name: String,
    pub provider: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub oauth2_token: Option<OAuth2Token>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::json;

    fn record(token_json: Value) -> ManagedToken {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ManagedToken {
            id: Uuid::new_v4(),
            name: "github".into(),
            provider: Some("github.com".into()),
            token_json,
            expires_at: None,
            created_by: Uuid::new_v4(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_payload_optional_fields_default() {
        let token: OAuth2Token = serde_json::from_value(json!({
            "access_token": "a",
            "expires_in": 3600,
            "token_type": "bearer",
        }))
        .unwrap();
        assert_eq!(token.id_token, None);
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.scope, None);
    }

    #[test]
    fn test_ensure_expires_at_backfills_from_created_at() {
        let mut token = record(json!({
            "access_token": "a",
            "expires_in": 3600,
            "token_type": "bearer",
        }));
        assert!(token.ensure_expires_at());
        assert_eq!(
            token.expires_at,
            Some(token.created_at + TimeDelta::seconds(3600))
        );
    }

    #[test]
    fn test_ensure_expires_at_is_idempotent() {
        let mut token = record(json!({
            "access_token": "a",
            "expires_in": 3600,
            "token_type": "bearer",
        }));
        token.ensure_expires_at();
        let first = token.expires_at;

        token.created_at += TimeDelta::days(1);
        assert!(!token.ensure_expires_at());
        assert_eq!(token.expires_at, first);
    }

    #[test]
    fn test_ensure_expires_at_keeps_explicit_value() {
        let explicit = Utc.with_ymd_and_hms(2031, 6, 1, 0, 0, 0).unwrap();
        let mut token = record(json!({
            "access_token": "a",
            "expires_in": 10,
            "token_type": "bearer",
        }));
        token.expires_at = Some(explicit);
        assert!(!token.ensure_expires_at());
        assert_eq!(token.expires_at, Some(explicit));
    }

    #[test]
    fn test_malformed_payload_leaves_expiry_null() {
        let mut token = record(json!({ "access_token": "a" }));
        assert!(!token.ensure_expires_at());
        assert_eq!(token.expires_at, None);
    }

    #[test]
    fn test_view_hides_raw_payload() {
        let token = record(json!({
            "access_token": "secret-access",
            "expires_in": 3600,
            "token_type": "bearer",
        }));
        let body = serde_json::to_value(token.view()).unwrap();
        assert!(body.get("token_json").is_none());
        assert_eq!(body["oauth2_token"]["access_token"], "secret-access");
        assert_eq!(body["name"], "github");
    }

    #[test]
    fn test_view_of_legacy_payload() {
        let token = record(json!({ "legacy": true }));
        let view = token.view();
        assert!(view.oauth2_token.is_none());
    }
}
