use serde::{Deserialize, Serialize};
use std::fmt;

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.5
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Configuration for the hosted speech synthesis provider.
///
/// An empty `api_key` means synthesis is not configured; the client then
/// reports "voice unavailable" instead of erroring.
#[derive(Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Default voice used when a request does not name one.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Voice stability setting passed verbatim to the provider.
    #[serde(default = "default_stability")]
    pub stability: f32,
    /// Voice similarity-boost setting passed verbatim to the provider.
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    /// Provider API base URL. Overridable for tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bound on each provider round-trip.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("api_key", &"[REDACTED]")
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("stability", &self.stability)
            .field("similarity_boost", &self.similarity_boost)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl SynthesisConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
