use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallError {
    #[error("telephony not configured: {0}")]
    Configuration(String),

    #[error("call origination rejected by provider (status {status}): {body}")]
    Dispatch { status: u16, body: String },

    #[error("telephony request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected provider payload: {0}")]
    Payload(String),

    #[error("no call context for id: {0}")]
    ContextNotFound(String),
}
