//! Speech synthesis for the Callweave platform.
//!
//! Wraps a hosted text-to-speech provider and a content-addressed on-disk
//! audio cache. Synthesized prompts are fingerprinted by their text and
//! stored as reusable `.mp3` artifacts, so a phrase is rendered by the
//! provider at most once per deployment. Concurrent requests for the same
//! uncached phrase collapse into a single provider round-trip.

pub mod cache;
pub mod config;
pub mod error;
pub mod tts;

pub use cache::AudioCache;
pub use config::SynthesisConfig;
pub use error::VoiceError;
pub use tts::{Synthesized, TtsClient};
