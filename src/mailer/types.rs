// the relay contract
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What every batch of a bulk send shares: sender, subject and body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub from: String,
    pub subject: String,
    pub text: String,
}

impl MessageTemplate {
    pub fn new(
        from: impl Into<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            text: text.into(),
        }
    }
}

/// The mail submission agent took the message for relay.
///
/// This is NOT proof of delivery. Bounces and unknown mailboxes only show
/// up later, in the provider's own activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAcceptance {
    pub recipient_count: usize,
    pub message_id: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

impl RelayAcceptance {
    pub fn new(recipient_count: usize, message_id: Option<String>) -> Self {
        Self {
            recipient_count,
            message_id,
            accepted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelayRequest<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RelayResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
