// app.rs - the one place that opens the store and builds the transport
use crate::batcher::Batcher;
use crate::config::Config;
use crate::db::SubscriberDB;
use crate::dispatch::{BulkDispatcher, DispatchReport};
use crate::mailer::{HttpRelayMailer, Mailer, MessageTemplate};
use crate::recipient::Recipient;
use anyhow::{Context, Result};
use tracing::info;

/// Owned handle to the subscriber store plus configuration.
///
/// Nothing connects until [`App::initialize`] is called; dropping the
/// handle closes the database.
pub struct App {
    config: Config,
    store: SubscriberDB,
}

impl App {
    pub fn initialize(config: Config) -> Result<Self> {
        config.batcher().context("Invalid recipient limit")?;
        let store = SubscriberDB::open(&config.database_path)?;
        info!(database = %config.database_path, "subscriber store opened");
        Ok(Self { config, store })
    }

    /// Same as `initialize`, backed by a throwaway in-memory store
    pub fn initialize_in_memory(config: Config) -> Result<Self> {
        config.batcher().context("Invalid recipient limit")?;
        let store = SubscriberDB::new_in_memory()?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SubscriberDB {
        &self.store
    }

    pub fn batcher(&self) -> Result<Batcher> {
        Ok(self.config.batcher()?)
    }

    /// Relay-backed dispatcher; fails if relay settings are missing
    pub fn dispatcher(&self) -> Result<BulkDispatcher<HttpRelayMailer>> {
        let mailer = HttpRelayMailer::from_config(&self.config)
            .context("Mail relay is not configured")?;
        Ok(BulkDispatcher::new(mailer))
    }

    /// Template sent from the configured sender
    pub fn template(&self, subject: &str, text: &str) -> MessageTemplate {
        MessageTemplate::new(self.config.from.clone(), subject, text)
    }

    /// Mail an explicit list, split at the configured recipient limit
    pub async fn send_to<M: Mailer + ?Sized>(
        &self,
        dispatcher: &BulkDispatcher<M>,
        recipients: Vec<Recipient>,
        template: &MessageTemplate,
    ) -> Result<DispatchReport> {
        let batches = self.batcher()?.partition(recipients);
        Ok(dispatcher.dispatch(batches, template).await)
    }

    /// Mail everyone signed up for the newsletter
    pub async fn send_newsletter<M: Mailer + ?Sized>(
        &self,
        dispatcher: &BulkDispatcher<M>,
        template: &MessageTemplate,
    ) -> Result<DispatchReport> {
        dispatcher
            .send_to_source(&self.store, &self.batcher()?, template)
            .await
    }

    /// Mail everyone waiting on one vacation package
    pub async fn send_in_season<M: Mailer + ?Sized>(
        &self,
        dispatcher: &BulkDispatcher<M>,
        sku: &str,
        template: &MessageTemplate,
    ) -> Result<DispatchReport> {
        dispatcher
            .send_to_source(&self.store.in_season(sku), &self.batcher()?, template)
            .await
    }
}
