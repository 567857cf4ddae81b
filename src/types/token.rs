//! Token Types
//!
//! Token endpoint responses and the in-memory token state they produce.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Response from the token and token-service endpoints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token currently held by a client.
#[derive(Clone)]
pub struct TokenState {
    pub access_token: SecretString,
    pub token_type: String,
    /// `None` when the provider did not report a lifetime; such tokens are never
    /// refreshed proactively.
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<SecretString>,
    pub acquired_at: DateTime<Utc>,
}

impl TokenState {
    /// Build state from a response received at `acquired_at`.
    ///
    /// An `expires_in` too large to represent is treated as no expiry.
    pub fn from_response(response: &TokenResponse, acquired_at: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::new(response.access_token.clone()),
            token_type: response.token_type.clone(),
            expires_at: response
                .expires_in
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| acquired_at.checked_add_signed(lifetime)),
            refresh_token: response
                .refresh_token
                .as_ref()
                .map(|t| SecretString::new(t.clone())),
            acquired_at,
        }
    }

    /// Remaining lifetime at `now`; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at.map(|exp| exp - now)
    }

    /// Check if the token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: Option<i64>) -> TokenResponse {
        TokenResponse {
            access_token: "A21AAF".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: Some("R-1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{
            "scope": "https://uri.paypal.com/services/payments/payment",
            "access_token": "A21AAFEpH4PsADK7qSS7pSRsgzfENtu",
            "token_type": "Bearer",
            "app_id": "APP-80W284485P519543T",
            "expires_in": 31668,
            "nonce": "2020-04-03T15:35:36ZaYZlGvEkV4yVSz8g6bAKFoGSEzuy3CQcz3ljhibkOHg"
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "A21AAFEpH4PsADK7qSS7pSRsgzfENtu");
        assert_eq!(response.expires_in, Some(31668));
        assert_eq!(response.app_id.as_deref(), Some("APP-80W284485P519543T"));
        assert!(response.refresh_token.is_none());
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "expires_in": 10}"#).unwrap();
        assert_eq!(response.token_type, "Bearer");
    }

    #[test]
    fn test_expiry_is_acquisition_plus_lifetime() {
        let acquired = Utc::now();
        let state = TokenState::from_response(&response(Some(3600)), acquired);

        assert_eq!(state.expires_at, Some(acquired + Duration::seconds(3600)));
        assert_eq!(state.remaining(acquired), Some(Duration::seconds(3600)));
        assert!(!state.is_expired(acquired));
        assert!(state.is_expired(acquired + Duration::seconds(3600)));
    }

    #[test]
    fn test_missing_lifetime_never_expires() {
        let state = TokenState::from_response(&response(None), Utc::now());
        assert!(state.expires_at.is_none());
        assert!(!state.is_expired(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_treated_as_no_expiry() {
        let huge: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t","expires_in":9223372036854775807}"#).unwrap();
        let state = TokenState::from_response(&huge, Utc::now());
        assert!(state.expires_at.is_none());

        // representable as a duration, but past the end of the calendar
        let state = TokenState::from_response(&response(Some(i64::MAX / 1000)), Utc::now());
        assert!(state.expires_at.is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let state = TokenState::from_response(&response(Some(60)), Utc::now());
        let debug = format!("{:?}", state);
        assert!(!debug.contains("A21AAF"));
        assert!(!debug.contains("R-1"));
        assert_eq!(state.authorization_header(), "Bearer A21AAF");
    }
}
