//! Request shapes accepted by the token API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::StoreError;
use crate::expiry;
use crate::models::{ManagedToken, OAuth2Token};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOAuth2TokenRequest {
    pub created_by: Uuid,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    pub oauth2_token: OAuth2Token,
    /// Absolute expiry. When omitted it is derived from `expires_in`.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateOAuth2TokenRequest {
    /// Field checks that JSON deserialization alone does not cover.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name must not be blank".into()));
        }
        if self.oauth2_token.access_token.trim().is_empty() {
            return Err(StoreError::Validation(
                "oauth2_token.access_token must not be blank".into(),
            ));
        }
        if self.oauth2_token.token_type.trim().is_empty() {
            return Err(StoreError::Validation(
                "oauth2_token.token_type must not be blank".into(),
            ));
        }
        Ok(())
    }

    /// Validate and build the record to insert, stamped at `now`.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<ManagedToken, StoreError> {
        self.validate()?;

        let token_json = serde_json::to_value(&self.oauth2_token)
            .map_err(|e| StoreError::Internal(format!("failed to encode token payload: {e}")))?;
        let expires_at = expiry::resolve_expires_at(&self.oauth2_token, self.expires_at, now);

        Ok(ManagedToken {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            provider: self.provider,
            token_json,
            expires_at,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
        })
    }
}

/// JSON Schema of [`OAuth2Token`], served to clients that build forms from it.
pub fn oauth2_token_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(OAuth2Token)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::json;

    fn request(body: serde_json::Value) -> CreateOAuth2TokenRequest {
        serde_json::from_value(body).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_record_gets_derived_expiry() {
        let req = request(json!({
            "created_by": Uuid::new_v4(),
            "name": "github",
            "oauth2_token": {"access_token": "a", "expires_in": 3600, "token_type": "bearer"},
        }));
        let record = req.into_record(now()).unwrap();
        assert_eq!(record.expires_at, Some(now() + TimeDelta::seconds(3600)));
        assert_eq!(record.created_at, now());
        assert_eq!(record.token_json["access_token"], "a");
        assert_eq!(record.oauth2_token().unwrap().expires_in, 3600);
    }

    #[test]
    fn test_explicit_expiry_normalized_to_utc() {
        let req = request(json!({
            "created_by": Uuid::new_v4(),
            "name": "google",
            "provider": "accounts.google.com",
            "oauth2_token": {"access_token": "a", "expires_in": 3600, "token_type": "bearer"},
            "expires_at": "2025-01-01T02:00:00+02:00",
        }));
        let record = req.into_record(now()).unwrap();
        assert_eq!(
            record.expires_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(record.provider.as_deref(), Some("accounts.google.com"));
    }

    #[test]
    fn test_provider_kept_verbatim() {
        let req = request(json!({
            "created_by": Uuid::new_v4(),
            "name": "github",
            "provider": "",
            "oauth2_token": {"access_token": "a", "expires_in": 3600, "token_type": "bearer"},
        }));
        let record = req.into_record(now()).unwrap();
        assert_eq!(record.provider.as_deref(), Some(""));
    }

    #[test]
    fn test_blank_name_rejected() {
        let req = request(json!({
            "created_by": Uuid::new_v4(),
            "name": "   ",
            "oauth2_token": {"access_token": "a", "expires_in": 3600, "token_type": "bearer"},
        }));
        assert!(matches!(req.into_record(now()), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_blank_access_token_rejected() {
        let req = request(json!({
            "created_by": Uuid::new_v4(),
            "name": "github",
            "oauth2_token": {"access_token": "", "expires_in": 3600, "token_type": "bearer"},
        }));
        assert!(matches!(req.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_missing_expires_in_fails_to_parse() {
        let parsed = serde_json::from_value::<CreateOAuth2TokenRequest>(json!({
            "created_by": Uuid::new_v4(),
            "name": "github",
            "oauth2_token": {"access_token": "a", "token_type": "bearer"},
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_schema_lists_payload_fields() {
        let schema = oauth2_token_schema();
        let properties = schema["properties"].as_object().unwrap();
        for field in [
            "access_token",
            "id_token",
            "refresh_token",
            "expires_in",
            "scope",
            "token_type",
        ] {
            assert!(properties.contains_key(field), "missing {field}");
        }
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"access_token"));
        assert!(required.contains(&"expires_in"));
        assert!(required.contains(&"token_type"));
        assert!(!required.contains(&"scope"));
    }
}
