use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipientError {
    #[error("Recipient is empty")]
    Empty,

    #[error("Malformed recipient: {0}")]
    InvalidShape(String),

    #[error("The email address you entered was not valid: {0}")]
    InvalidEmail(String),
}
