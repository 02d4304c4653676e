use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("synthesis provider error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("synthesis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("synthesis input rejected: {0}")]
    Input(String),

    #[error("audio cache I/O error: {0}")]
    Cache(#[from] std::io::Error),
}
