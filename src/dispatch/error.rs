use super::FailedBatch;
use crate::config::ConfigError;
use crate::mailer::RelayAcceptance;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Some batches were refused. Everything that was accepted is kept
    /// alongside every failure, so only the failed subset needs a retry.
    #[error(
        "{} batch(es) failed to submit, {} accepted for relay",
        .failed.len(),
        .submitted.len()
    )]
    PartialFailure {
        submitted: Vec<RelayAcceptance>,
        failed: Vec<FailedBatch>,
    },
}
