mod client;
mod error;
mod transport;
mod types;


pub use client::HttpRelayMailer;
pub use error::TransportError;
pub use transport::Mailer;
pub use types::{MessageTemplate, RelayAcceptance, RelayRequest, RelayResponse};
