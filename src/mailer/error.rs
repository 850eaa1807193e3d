use thiserror::Error;

/// Failure to hand a message to the relay. Says nothing about delivery.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Relay refused credentials (status {0})")]
    Unauthorized(u16),

    #[error("Relay returned error status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}
