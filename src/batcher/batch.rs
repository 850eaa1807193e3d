use crate::recipient::Recipient;
use serde::Serialize;

/// A bounded group of recipients addressed by a single outbound message.
///
/// Only [`super::Batcher`] builds these, so a batch is never empty and
/// never larger than the limit it was partitioned with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    index: usize,
    recipients: Vec<Recipient>,
}

impl Batch {
    pub(super) fn new(index: usize, first: Recipient) -> Self {
        Self {
            index,
            recipients: vec![first],
        }
    }

    pub(super) fn push(&mut self, recipient: Recipient) {
        self.recipients.push(recipient);
    }

    /// Position of this batch in the partition, starting at 0
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// The single comma-joined `to` value handed to the transport
    pub fn to_header(&self) -> String {
        self.recipients
            .iter()
            .map(Recipient::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn into_recipients(self) -> Vec<Recipient> {
        self.recipients
    }
}
