mod address;
mod error;
mod source;
mod validate;


pub use address::Recipient;
pub use error::RecipientError;
pub use source::{RecipientSource, StaticRecipients, SyntheticRecipients};
pub use validate::is_valid_email;
