mod dispatcher;
mod error;
mod report;

#[cfg(test)]
mod tests;

pub use dispatcher::BulkDispatcher;
pub use error::DispatchError;
pub use report::{BatchOutcome, DispatchReport, FailedBatch};
