//! Identity operations.

use crate::client::PayPalClient;
use crate::error::PaymentResult;
use crate::types::Address;
use serde::{Deserialize, Deserializer};

/// Service for identity operations.
pub struct IdentityService<'a> {
    client: &'a PayPalClient,
}

impl<'a> IdentityService<'a> {
    pub fn new(client: &'a PayPalClient) -> Self {
        Self { client }
    }

    /// Gets the profile of the user the held token was issued for.
    ///
    /// `schema` is usually `"paypalv1.1"` or `"openid"`.
    pub async fn get_user_info(&self, schema: &str) -> PaymentResult<UserInfo> {
        self.client
            .get_with_query("/v1/identity/openidconnect/userinfo/", &[("schema", schema)])
            .await
    }
}

/// OpenID Connect user profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "user_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub verified: bool,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub zoneinfo: Option<String>,
    pub locale: Option<String>,
    #[serde(rename = "phone_number")]
    pub phone: Option<String>,
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub verified_account: bool,
    pub account_type: Option<String>,
    pub age_range: Option<String>,
    pub payer_id: Option<String>,
}

// The userinfo endpoint reports booleans either as JSON booleans or as "true"/"false".
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}
