//! Outbound call origination against the telephony provider.
//!
//! Dispatch creates the call context first, then asks the provider to
//! originate the call, passing the context id as the `CustomField`
//! correlation token the provider echoes back in status callbacks. A
//! failed origination keeps the context — retries and manual follow-up
//! may still need it, and the idle sweep reclaims it otherwise.

use crate::config::TelephonyConfig;
use crate::error::CallError;
use crate::registry::CallRegistry;
use serde::Deserialize;
use std::time::Duration;

/// A successfully originated call: the local context id paired with the
/// provider's call handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub call_id: String,
    pub provider_call_sid: String,
}

/// Provider response envelope for a call-origination request.
#[derive(Debug, Deserialize)]
struct OriginateResponse {
    #[serde(rename = "Call")]
    call: Option<CallHandle>,
}

#[derive(Debug, Deserialize)]
struct CallHandle {
    #[serde(rename = "Sid")]
    sid: Option<String>,
}

/// Places outbound calls through the telephony provider's REST API.
///
/// Not idempotent: dispatching twice originates two real phone calls.
/// Callers that add retry logic must dedupe upstream.
#[derive(Debug)]
pub struct CallDispatcher {
    config: TelephonyConfig,
    http: reqwest::Client,
}

impl CallDispatcher {
    pub fn new(config: TelephonyConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Whether telephony credentials are configured.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Originates an outbound call to `phone` for `customer_name`.
    ///
    /// Credentials are validated before any context creation or network
    /// I/O. On provider success (strictly HTTP 200) the provider's call
    /// handle is returned paired with the freshly created call id.
    pub async fn start_call(
        &self,
        registry: &CallRegistry,
        phone: &str,
        customer_name: &str,
        domain_context: &str,
    ) -> Result<DispatchOutcome, CallError> {
        if !self.config.is_configured() {
            return Err(CallError::Configuration(
                "telephony credentials are missing".to_string(),
            ));
        }

        let call_id = registry.create(customer_name, domain_context);
        tracing::info!(call_id = %call_id, to = phone, "initiating outbound call");

        let params = [
            // The customer being called.
            ("From", phone),
            // The agent's registered origination number.
            ("To", self.config.phone_number.as_str()),
            ("CallerId", self.config.phone_number.as_str()),
            // Correlation token echoed back in provider callbacks.
            ("CustomField", call_id.as_str()),
        ];

        let response = self
            .http
            .post(self.config.origination_url())
            .basic_auth(&self.config.api_key, Some(&self.config.api_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != reqwest::StatusCode::OK {
            tracing::error!(
                call_id = %call_id,
                status = status.as_u16(),
                "call origination rejected; context retained for follow-up"
            );
            return Err(CallError::Dispatch {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OriginateResponse = serde_json::from_str(&body)
            .map_err(|e| CallError::Payload(format!("unparsable origination response: {e}")))?;
        let provider_call_sid = parsed
            .call
            .and_then(|c| c.sid)
            .ok_or_else(|| CallError::Payload(format!("no call sid in response: {body}")))?;

        tracing::info!(call_id = %call_id, sid = %provider_call_sid, "call originated");
        Ok(DispatchOutcome {
            call_id,
            provider_call_sid,
        })
    }
}
