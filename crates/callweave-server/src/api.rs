//! API handlers for the Callweave server.

use crate::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use callweave_calls::CallError;
use callweave_types::Turn;
use callweave_voice::VoiceError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Request body for call initiation.
#[derive(Debug, Deserialize)]
pub struct StartCallRequest {
    /// The customer's phone number.
    pub phone: String,
    /// The customer's display name.
    pub name: String,
    /// Domain facts injected into the call's opening system turn.
    #[serde(rename = "propertyContext", default = "default_property_context")]
    pub property_context: String,
}

fn default_property_context() -> String {
    "No specific properties.".to_string()
}

/// Response body for a successfully initiated call.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartCallResponse {
    /// The local call context id (also the provider correlation token).
    #[serde(rename = "callId")]
    pub call_id: String,
    /// The telephony provider's call handle.
    #[serde(rename = "providerCallSid")]
    pub provider_call_sid: String,
}

/// Response body for call context introspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallDetailResponse {
    #[serde(rename = "callId")]
    pub call_id: String,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    pub history: Vec<Turn>,
}

/// Request body for prompt synthesis.
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    /// Voice override; the configured default voice is used when absent.
    #[serde(rename = "voiceId")]
    pub voice_id: Option<String>,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("upstream provider error: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<CallError> for ApiError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Configuration(msg) => ApiError::ServiceUnavailable(msg),
            CallError::Dispatch { status, body } => {
                ApiError::BadGateway(format!("provider rejected call (status {status}): {body}"))
            }
            CallError::Http(e) => ApiError::BadGateway(e.to_string()),
            CallError::Payload(msg) => ApiError::BadGateway(msg),
            CallError::ContextNotFound(id) => ApiError::NotFound(format!("no call context: {id}")),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::Provider { status, body } => ApiError::BadGateway(format!(
                "synthesis provider error (status {status}): {body}"
            )),
            VoiceError::Http(e) => ApiError::BadGateway(e.to_string()),
            VoiceError::Input(msg) => ApiError::BadRequest(msg),
            VoiceError::Cache(e) => {
                ApiError::InternalServerError(format!("audio cache error: {e}"))
            }
        }
    }
}

/// Health check handler.
///
/// Reports configuration readiness alongside liveness, so operators and
/// monitoring can tell a running-but-unconfigured instance from a ready
/// one.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "telephonyConfigured": state.dispatcher.is_configured(),
        "synthesisConfigured": state.tts.is_configured(),
        "activeCalls": state.registry.len(),
    }))
}

/// Handler for `POST /api/calls`.
pub async fn start_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<StartCallRequest>,
) -> Result<Json<StartCallResponse>, ApiError> {
    let phone = payload.phone.trim();
    if phone.is_empty() {
        return Err(ApiError::BadRequest("phone must not be empty".to_string()));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    let outcome = state
        .dispatcher
        .start_call(
            &state.registry,
            phone,
            payload.name.trim(),
            &payload.property_context,
        )
        .await?;

    Ok(Json(StartCallResponse {
        call_id: outcome.call_id,
        provider_call_sid: outcome.provider_call_sid,
    }))
}

/// Handler for `GET /api/calls/{callId}`.
pub async fn get_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(call_id): Path<String>,
) -> Result<Json<CallDetailResponse>, ApiError> {
    let context = state
        .registry
        .get(&call_id)
        .ok_or_else(|| ApiError::NotFound(format!("no call context: {call_id}")))?;

    Ok(Json(CallDetailResponse {
        call_id: context.call_id,
        customer_name: context.customer_name,
        history: context.history,
    }))
}

/// Handler for `DELETE /api/calls/{callId}`.
///
/// Explicit teardown, intended to be driven by the provider's call-status
/// callback when a call ends. Idempotent.
pub async fn end_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(call_id): Path<String>,
) -> Json<Value> {
    let removed = state.registry.remove(&call_id);
    Json(json!({ "removed": removed }))
}

/// Handler for `POST /api/audio/synthesize`.
///
/// Renders a prompt to a cached audio artifact and returns the media-path
/// URL the telephony leg can fetch it from.
pub async fn synthesize_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SynthesizeRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let synthesized = state
        .tts
        .synthesize(&payload.text, payload.voice_id.as_deref())
        .await?
        .ok_or_else(|| {
            ApiError::ServiceUnavailable("speech synthesis is not configured".to_string())
        })?;

    Ok(Json(json!({
        "filename": synthesized.filename,
        "url": format!("/audio/{}", synthesized.filename),
        "cacheHit": synthesized.cache_hit,
    })))
}

/// Handler for `GET /audio/{filename}`.
///
/// Serves a cached artifact over the call's media path. The filename is
/// validated against the fingerprint format before any filesystem access;
/// malformed names are indistinguishable from missing artifacts.
pub async fn get_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state
        .cache
        .read_public(&filename)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("audio cache read failed: {e}")))?
        .ok_or_else(|| ApiError::NotFound(format!("no cached audio named {filename}")))?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response())
}
