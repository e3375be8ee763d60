//! Absolute expiry derivation for stored tokens.
//!
//! Providers hand out a relative lifetime (`expires_in`, seconds); the store
//! keeps an absolute UTC instant so callers can filter and compare without
//! knowing when the token was saved.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::warn;

use crate::models::OAuth2Token;

/// Resolve the authoritative expiry for a token payload.
///
/// An explicit `expires_at` wins over `expires_in`. Otherwise a positive
/// `expires_in` is added to `reference`; anything else yields `None`.
pub fn resolve_expires_at(
    payload: &OAuth2Token,
    explicit: Option<DateTime<Utc>>,
    reference: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if explicit.is_some() {
        return explicit;
    }
    offset_by(reference, payload.expires_in)
}

/// Same as [`resolve_expires_at`] without an explicit value, reading
/// `expires_in` out of a stored JSON payload.
///
/// Payloads that do not decode as an [`OAuth2Token`] produce `None` instead
/// of an error so legacy rows stay readable.
pub fn resolve_from_json(token_json: &Value, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match serde_json::from_value::<OAuth2Token>(token_json.clone()) {
        Ok(payload) => resolve_expires_at(&payload, None, reference),
        Err(e) => {
            warn!("Stored token payload could not be decoded, leaving expiry unset: {e}");
            None
        }
    }
}

fn offset_by(reference: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in <= 0 {
        return None;
    }
    TimeDelta::try_seconds(expires_in).and_then(|delta| reference.checked_add_signed(delta))
}
