// dispatcher.rs - one message per batch, all in flight at once
use super::{BatchOutcome, DispatchError, DispatchReport};
use crate::batcher::{Batch, Batcher};
use crate::mailer::{Mailer, MessageTemplate};
use crate::recipient::{Recipient, RecipientSource};
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

/// Works over any `Mailer`, including `dyn Mailer` behind a `Box` or `Arc`
pub struct BulkDispatcher<M: ?Sized> {
    mailer: M,
}

impl<M: Mailer> BulkDispatcher<M> {
    pub fn new(mailer: M) -> Self {
        Self { mailer }
    }
}

impl<M: Mailer + ?Sized> BulkDispatcher<M> {
    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Send every batch concurrently and wait for all of them to settle.
    ///
    /// A failed batch never stops the others. Exactly one send is attempted
    /// per batch and nothing is retried. Outcomes come back in batch order,
    /// whatever order the relay answered in.
    pub async fn dispatch(&self, batches: Vec<Batch>, template: &MessageTemplate) -> DispatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, batches = batches.len(), "dispatching bulk mail");

        let sends = batches.into_iter().map(|batch| async move {
            let to = batch.to_header();
            match self.mailer.send(&to, template).await {
                Ok(acceptance) => BatchOutcome::Sent { batch, acceptance },
                Err(err) => {
                    warn!(
                        %run_id,
                        batch = batch.index(),
                        recipients = batch.len(),
                        "batch failed to submit: {}",
                        err
                    );
                    BatchOutcome::Failed {
                        batch,
                        reason: err.to_string(),
                    }
                }
            }
        });

        let report = DispatchReport::new(run_id, started_at, join_all(sends).await);

        info!(
            %run_id,
            submitted = report.submitted_count(),
            failed = report.batch_count() - report.submitted_count(),
            recipients = report.submitted_recipient_count(),
            "bulk mail settled"
        );
        report
    }

    /// Partition then dispatch. A bad limit fails before anything is sent.
    pub async fn send_bulk(
        &self,
        recipients: Vec<Recipient>,
        recipient_limit: usize,
        template: &MessageTemplate,
    ) -> Result<DispatchReport, DispatchError> {
        let batcher = Batcher::new(recipient_limit)?;
        Ok(self.dispatch(batcher.partition(recipients), template).await)
    }

    /// Pull the list from a source and dispatch it
    pub async fn send_to_source<S>(
        &self,
        source: &S,
        batcher: &Batcher,
        template: &MessageTemplate,
    ) -> anyhow::Result<DispatchReport>
    where
        S: RecipientSource + ?Sized,
    {
        let recipients = source.list()?;
        Ok(self.dispatch(batcher.partition(recipients), template).await)
    }
}
