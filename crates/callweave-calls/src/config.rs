use serde::{Deserialize, Serialize};
use std::fmt;

fn default_subdomain() -> String {
    "api".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

/// Configuration for the telephony provider's call-origination API.
///
/// Dispatch refuses to place calls until `account_sid`, `api_key`,
/// `api_token`, and `phone_number` are all set.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_token: String,
    /// Provider API subdomain (`https://<subdomain>.exotel.com`).
    #[serde(default = "default_subdomain")]
    pub subdomain: String,
    /// The agent's registered origination number.
    #[serde(default)]
    pub phone_number: String,
    /// Full API base URL override. When set, `subdomain` is ignored.
    /// Used by tests to point dispatch at a local stand-in provider.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bound on each origination round-trip.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            api_key: String::new(),
            api_token: String::new(),
            subdomain: default_subdomain(),
            phone_number: String::new(),
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for TelephonyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelephonyConfig")
            .field("account_sid", &self.account_sid)
            .field("api_key", &"[REDACTED]")
            .field("api_token", &"[REDACTED]")
            .field("subdomain", &self.subdomain)
            .field("phone_number", &self.phone_number)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl TelephonyConfig {
    /// Whether every credential dispatch needs is present.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty()
            && !self.api_key.is_empty()
            && !self.api_token.is_empty()
            && !self.phone_number.is_empty()
    }

    /// The call-origination endpoint URL.
    pub fn origination_url(&self) -> String {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.exotel.com", self.subdomain),
        };
        format!("{}/v1/Accounts/{}/Calls/connect.json", base, self.account_sid)
    }
}
