use super::DispatchError;
use crate::batcher::Batch;
use crate::mailer::RelayAcceptance;
use crate::recipient::Recipient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How one batch fared. `Sent` means accepted for relay, not delivered.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Sent {
        batch: Batch,
        acceptance: RelayAcceptance,
    },
    Failed {
        batch: Batch,
        reason: String,
    },
}

impl BatchOutcome {
    pub fn batch(&self) -> &Batch {
        match self {
            BatchOutcome::Sent { batch, .. } | BatchOutcome::Failed { batch, .. } => batch,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, BatchOutcome::Sent { .. })
    }
}

/// A batch that could not be submitted, with enough detail to retry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBatch {
    pub index: usize,
    pub recipients: Vec<Recipient>,
    pub reason: String,
}

/// Every batch's outcome from one dispatch, in batch order
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    outcomes: Vec<BatchOutcome>,
}

impl DispatchReport {
    pub(super) fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        outcomes: Vec<BatchOutcome>,
    ) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn outcomes(&self) -> &[BatchOutcome] {
        &self.outcomes
    }

    pub fn batch_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn submitted(&self) -> Vec<&RelayAcceptance> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                BatchOutcome::Sent { acceptance, .. } => Some(acceptance),
                BatchOutcome::Failed { .. } => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<FailedBatch> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                BatchOutcome::Failed { batch, reason } => Some(FailedBatch {
                    index: batch.index(),
                    recipients: batch.recipients().to_vec(),
                    reason: reason.clone(),
                }),
                BatchOutcome::Sent { .. } => None,
            })
            .collect()
    }

    /// Messages the relay accepted
    pub fn submitted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    pub fn submitted_recipient_count(&self) -> usize {
        self.submitted().iter().map(|a| a.recipient_count).sum()
    }

    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(BatchOutcome::is_sent)
    }

    /// Recipients of every failed batch, in original order
    pub fn retry_recipients(&self) -> Vec<Recipient> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_sent())
            .flat_map(|o| o.batch().recipients().iter().cloned())
            .collect()
    }

    /// All acceptances, or the full picture of what failed and what didn't
    pub fn into_result(self) -> Result<Vec<RelayAcceptance>, DispatchError> {
        let failed = self.failed();
        let submitted: Vec<RelayAcceptance> = self
            .outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                BatchOutcome::Sent { acceptance, .. } => Some(acceptance),
                BatchOutcome::Failed { .. } => None,
            })
            .collect();

        if failed.is_empty() {
            Ok(submitted)
        } else {
            Err(DispatchError::PartialFailure { submitted, failed })
        }
    }
}
