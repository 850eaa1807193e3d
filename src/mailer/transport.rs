use super::{MessageTemplate, RelayAcceptance, TransportError};
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound mail transport.
///
/// `to` is one comma-joined list of recipients. Implementations are shared
/// across concurrent sends, so `send` takes `&self` and must not rely on
/// per-call mutable state.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        template: &MessageTemplate,
    ) -> Result<RelayAcceptance, TransportError>;
}

#[async_trait]
impl<M: Mailer + ?Sized> Mailer for Arc<M> {
    async fn send(
        &self,
        to: &str,
        template: &MessageTemplate,
    ) -> Result<RelayAcceptance, TransportError> {
        (**self).send(to, template).await
    }
}

/// Count the entries in a joined `to` value
pub fn count_recipients(to: &str) -> usize {
    to.split(',').filter(|part| !part.trim().is_empty()).count()
}
