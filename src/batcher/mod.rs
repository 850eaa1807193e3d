mod batch;
mod partition;


pub use batch::Batch;
pub use partition::Batcher;

/// Recipients per message when nothing else is configured.
/// Relays commonly cap a single message well above this (around a thousand).
pub const DEFAULT_RECIPIENT_LIMIT: usize = 100;
