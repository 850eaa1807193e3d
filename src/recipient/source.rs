// source.rs - where recipient lists come from
use super::Recipient;

/// Anything that can hand the dispatcher a flat list of recipients.
pub trait RecipientSource {
    fn list(&self) -> anyhow::Result<Vec<Recipient>>;
}

/// A fixed, in-memory list
#[derive(Debug, Clone, Default)]
pub struct StaticRecipients {
    recipients: Vec<Recipient>,
}

impl StaticRecipients {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self { recipients }
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

impl RecipientSource for StaticRecipients {
    fn list(&self) -> anyhow::Result<Vec<Recipient>> {
        Ok(self.recipients.clone())
    }
}

/// Generates `customer{i}@{domain}` addresses, for load tests and dry runs.
#[derive(Debug, Clone)]
pub struct SyntheticRecipients {
    count: usize,
    domain: String,
}

impl SyntheticRecipients {
    pub fn new(count: usize) -> Self {
        Self::with_domain(count, "nowhere.com")
    }

    pub fn with_domain(count: usize, domain: impl Into<String>) -> Self {
        Self {
            count,
            domain: domain.into(),
        }
    }
}

impl RecipientSource for SyntheticRecipients {
    fn list(&self) -> anyhow::Result<Vec<Recipient>> {
        (0..self.count)
            .map(|idx| {
                Recipient::parse(&format!("customer{}@{}", idx, self.domain))
                    .map_err(anyhow::Error::from)
            })
            .collect()
    }
}
