// partition.rs - splits a recipient list into per-message groups
use super::Batch;
use crate::config::ConfigError;
use crate::recipient::Recipient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    recipient_limit: usize,
}

impl Batcher {
    /// A zero limit is rejected up front; it could never make progress.
    pub fn new(recipient_limit: usize) -> Result<Self, ConfigError> {
        if recipient_limit == 0 {
            return Err(ConfigError::InvalidRecipientLimit(0));
        }
        Ok(Self { recipient_limit })
    }

    /// For limits that arrive signed (CLI flags, env vars)
    pub fn from_signed(recipient_limit: i64) -> Result<Self, ConfigError> {
        if recipient_limit < 1 {
            return Err(ConfigError::InvalidRecipientLimit(recipient_limit));
        }
        let limit = usize::try_from(recipient_limit)
            .map_err(|_| ConfigError::InvalidRecipientLimit(recipient_limit))?;
        Self::new(limit)
    }

    pub fn recipient_limit(&self) -> usize {
        self.recipient_limit
    }

    /// Greedy single pass: fill the last batch, open a new one when it is full.
    ///
    /// Works on any iterator, so the input length need not be known. Empty
    /// input gives no batches at all.
    pub fn partition<I>(&self, recipients: I) -> Vec<Batch>
    where
        I: IntoIterator<Item = Recipient>,
    {
        let mut batches: Vec<Batch> = Vec::new();

        for recipient in recipients {
            match batches.last_mut() {
                Some(last) if last.len() < self.recipient_limit => last.push(recipient),
                _ => {
                    let index = batches.len();
                    batches.push(Batch::new(index, recipient));
                }
            }
        }

        batches
    }

    pub fn split(&self, recipients: &[Recipient]) -> Vec<Batch> {
        self.partition(recipients.iter().cloned())
    }

    /// Number of batches `count` recipients will produce
    pub fn batch_count(&self, count: usize) -> usize {
        count.div_ceil(self.recipient_limit)
    }
}
