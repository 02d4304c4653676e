//! Content-addressed on-disk store for synthesized audio.
//!
//! Artifacts are keyed by the SHA-256 fingerprint of the synthesized text
//! and stored as `<fingerprint>.mp3` in a flat directory. An artifact is
//! reused indefinitely: there is no expiry and no invalidation, so the
//! provider voice and model must stay fixed for the artifact's lifetime.
//! The fingerprint covers the text only, not the voice id — changing the
//! configured voice without clearing the cache directory serves audio
//! rendered with the old voice.

use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};

/// File extension for cached artifacts.
const AUDIO_EXT: &str = ".mp3";

/// Length of a hex-encoded SHA-256 digest.
const FINGERPRINT_LEN: usize = 64;

/// Flat-directory audio store, keyed by text fingerprint.
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Creates the cache directory if it does not exist.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic fingerprint of a piece of text to synthesize.
    pub fn fingerprint(text: &str) -> String {
        let digest = Sha256::digest(text.as_bytes());
        hex::encode(digest)
    }

    /// The artifact filename for a fingerprint.
    pub fn filename_for(fingerprint: &str) -> String {
        format!("{fingerprint}{AUDIO_EXT}")
    }

    fn path_for(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(Self::filename_for(fingerprint))
    }

    /// Returns the artifact path if an artifact exists for this fingerprint.
    pub async fn get(&self, fingerprint: &str) -> Option<PathBuf> {
        let path = self.path_for(fingerprint);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// Reads the cached artifact for a fingerprint, if present.
    pub async fn read(&self, fingerprint: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(fingerprint)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes an artifact under its fingerprint-derived name.
    ///
    /// Overwrite-safe: writing the same fingerprint twice with identical
    /// bytes leaves the store unchanged in effect.
    pub async fn put(&self, fingerprint: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(fingerprint);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Whether a caller-supplied filename matches the fixed artifact format:
    /// exactly 64 lowercase hex characters followed by `.mp3`.
    pub fn is_valid_public_filename(filename: &str) -> bool {
        let Some(stem) = filename.strip_suffix(AUDIO_EXT) else {
            return false;
        };
        stem.len() == FINGERPRINT_LEN
            && stem
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    /// Reads an artifact by caller-supplied filename for serving over the
    /// call's media path.
    ///
    /// The filename is validated against the fingerprint format before any
    /// filesystem access; anything else (path traversal, wrong length,
    /// uppercase hex, wrong extension) is reported as missing.
    pub async fn read_public(&self, filename: &str) -> io::Result<Option<Vec<u8>>> {
        if !Self::is_valid_public_filename(filename) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
