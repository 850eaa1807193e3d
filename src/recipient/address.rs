// address.rs - a single "to" entry, checked once at the boundary
use super::RecipientError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One mail recipient: either `addr@host` or `"Display Name" <addr@host>`.
///
/// Only the shape is checked here. Strict address validation belongs to
/// whatever collected the address (see [`super::is_valid_email`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Recipient(String);

impl Recipient {
    pub fn parse(raw: &str) -> Result<Self, RecipientError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecipientError::Empty);
        }

        // A comma or line break would split the joined header into extra recipients
        if trimmed.contains([',', '\n', '\r']) {
            return Err(RecipientError::InvalidShape(trimmed.to_string()));
        }

        let address = match split_display_form(trimmed) {
            Some((_, address)) => address,
            None if trimmed.contains(['<', '>']) => {
                return Err(RecipientError::InvalidShape(trimmed.to_string()));
            }
            None => trimmed,
        };

        if !looks_like_address(address) {
            return Err(RecipientError::InvalidShape(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Build `"Name" <addr>`, or the bare address when the name is blank.
    pub fn with_name(name: &str, address: &str) -> Result<Self, RecipientError> {
        let name = name.trim();
        if name.is_empty() {
            return Self::parse(address);
        }
        // Quotes, commas, brackets and line breaks can't survive inside the joined header
        let cleaned = name
            .replace(['"', ',', '<', '>'], "")
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if cleaned.is_empty() {
            return Self::parse(address);
        }
        Self::parse(&format!("\"{}\" <{}>", cleaned, address.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The mailbox part, without any display name
    pub fn address(&self) -> &str {
        split_display_form(&self.0)
            .map(|(_, address)| address)
            .unwrap_or(&self.0)
    }

    pub fn display_name(&self) -> Option<&str> {
        split_display_form(&self.0)
            .map(|(name, _)| name.trim().trim_matches('"').trim())
            .filter(|name| !name.is_empty())
    }
}

/// Split `Name <addr>` into its halves. Returns `None` for a bare address.
fn split_display_form(raw: &str) -> Option<(&str, &str)> {
    let stripped = raw.strip_suffix('>')?;
    let (name, address) = stripped.rsplit_once('<')?;
    if address.contains(['<', '>']) || name.contains(['<', '>']) {
        return None;
    }
    Some((name, address.trim()))
}

fn looks_like_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !address.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Recipient {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Recipient {
    type Error = RecipientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Recipient> for String {
    fn from(recipient: Recipient) -> Self {
        recipient.0
    }
}
