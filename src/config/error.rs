use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Recipient limit must be at least 1, got {0}")]
    InvalidRecipientLimit(i64),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: String, value: String },
}
