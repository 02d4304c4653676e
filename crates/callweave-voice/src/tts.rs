//! Client for the hosted text-to-speech provider.
//!
//! Every synthesis request is served cache-first: the text is fingerprinted
//! and looked up in the [`AudioCache`] before the provider is contacted.
//! Concurrent cache misses for the same text collapse into one in-flight
//! provider request; the other callers wait for it to land and then read
//! the cached artifact.

use crate::cache::AudioCache;
use crate::config::SynthesisConfig;
use crate::error::VoiceError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Maximum text input size for synthesis (8 KiB). Prevents resource
/// exhaustion from oversized synthesis requests.
const MAX_SYNTHESIS_INPUT_BYTES: usize = 8 * 1024;

/// A synthesized (or cache-served) audio artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    /// Fingerprint-derived artifact filename, servable over the media path.
    pub filename: String,
    /// Raw audio bytes (MPEG).
    pub audio: Vec<u8>,
    /// Whether the artifact came from the cache without a provider call.
    pub cache_hit: bool,
}

/// Client for generating speech from text through a hosted provider.
#[derive(Debug)]
pub struct TtsClient {
    config: SynthesisConfig,
    http: reqwest::Client,
    cache: AudioCache,
    /// In-flight synthesis table keyed by text fingerprint.
    ///
    /// Uses `std::sync::Mutex` intentionally: all lock acquisitions are
    /// brief HashMap operations (get/insert/remove) that never span
    /// `.await` points. The per-key `tokio::sync::Mutex` inside is what is
    /// held across the provider round-trip.
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TtsClient {
    pub fn new(config: SynthesisConfig, cache: AudioCache) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();
        Self {
            config,
            http,
            cache,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Whether synthesis credentials are configured.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// The voice used when a request does not name one.
    pub fn default_voice_id(&self) -> &str {
        &self.config.voice_id
    }

    /// Synthesizes speech for `text`, reusing the cached artifact when one
    /// exists.
    ///
    /// Returns `Ok(None)` when no synthesis credentials are configured —
    /// callers must treat this as "voice unavailable", not as a failure.
    /// A provider error never writes the cache, so a later call with the
    /// same text retries the provider.
    ///
    /// The cache key is the text alone: `voice_id` does not participate in
    /// the fingerprint, so all voices share one artifact per phrase.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<Option<Synthesized>, VoiceError> {
        if !self.config.is_configured() {
            return Ok(None);
        }
        if text.len() > MAX_SYNTHESIS_INPUT_BYTES {
            return Err(VoiceError::Input(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_SYNTHESIS_INPUT_BYTES
            )));
        }

        let fingerprint = AudioCache::fingerprint(text);
        let filename = AudioCache::filename_for(&fingerprint);

        if let Some(audio) = self.cache.read(&fingerprint).await? {
            return Ok(Some(Synthesized {
                filename,
                audio,
                cache_hit: true,
            }));
        }

        // Cache miss: serialize with any concurrent flight for the same
        // fingerprint, then re-check — the previous holder may have landed
        // the artifact while we waited.
        let flight = self.flight_guard(&fingerprint);
        let _guard = flight.lock().await;

        match self.cache.read(&fingerprint).await {
            Ok(Some(audio)) => {
                self.release_flight(&fingerprint);
                return Ok(Some(Synthesized {
                    filename,
                    audio,
                    cache_hit: true,
                }));
            }
            Ok(None) => {}
            Err(e) => {
                self.release_flight(&fingerprint);
                return Err(VoiceError::Cache(e));
            }
        }

        let voice = voice_id.unwrap_or(&self.config.voice_id);
        let result = self.fetch_from_provider(text, voice).await;
        let outcome = match result {
            Ok(audio) => match self.cache.put(&fingerprint, &audio).await {
                Ok(_) => {
                    tracing::debug!(
                        fingerprint = %fingerprint,
                        bytes = audio.len(),
                        "synthesized and cached audio artifact"
                    );
                    Ok(Some(Synthesized {
                        filename,
                        audio,
                        cache_hit: false,
                    }))
                }
                Err(e) => Err(VoiceError::Cache(e)),
            },
            Err(e) => Err(e),
        };
        self.release_flight(&fingerprint);
        outcome
    }

    /// Returns the keyed flight mutex for a fingerprint, creating it on
    /// first use.
    fn flight_guard(&self, fingerprint: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.entry(fingerprint.to_string()).or_default().clone()
    }

    /// Drops the flight entry once its leader has finished. Waiters already
    /// holding a clone still serialize on it and then hit the cache.
    fn release_flight(&self, fingerprint: &str) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.remove(fingerprint);
    }

    async fn fetch_from_provider(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, VoiceError> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": self.config.model_id,
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost,
            },
        });

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), voice_id, "synthesis provider error");
            return Err(VoiceError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
