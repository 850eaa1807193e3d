// Public API exports
pub mod app;
pub mod batcher;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod mailer;
pub mod recipient;

// Re-export main types for convenience
pub use app::App;
pub use batcher::{Batch, Batcher, DEFAULT_RECIPIENT_LIMIT};
pub use config::{Config, ConfigError};
pub use db::{Signup, SubscriberDB};
pub use dispatch::{BatchOutcome, BulkDispatcher, DispatchError, DispatchReport, FailedBatch};
pub use mailer::{HttpRelayMailer, Mailer, MessageTemplate, RelayAcceptance, TransportError};
pub use recipient::{
    is_valid_email, Recipient, RecipientError, RecipientSource, StaticRecipients,
    SyntheticRecipients,
};
