use super::transport::count_recipients;
use super::{Mailer, MessageTemplate, RelayAcceptance, RelayRequest, RelayResponse, TransportError};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Submits mail to an HTTP relay (`POST {endpoint}/send`) with a bearer key
pub struct HttpRelayMailer {
    http: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl HttpRelayMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, api_key, Duration::from_secs(30))
    }

    /// The timeout covers each send; the dispatcher never imposes its own.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        let endpoint: String = endpoint.into();
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mailer = Self::with_timeout(config.relay_url()?, config.api_key()?, config.timeout)?;
        Ok(mailer)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check the relay is reachable and accepts our key
    pub async fn health_check(&self) -> Result<(), TransportError> {
        let response = self
            .http
            .get(format!("{}/health", self.endpoint))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(TransportError::Unauthorized(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(TransportError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(
        &self,
        to: &str,
        template: &MessageTemplate,
    ) -> Result<RelayAcceptance, TransportError> {
        let req = RelayRequest {
            from: &template.from,
            to,
            subject: &template.subject,
            text: &template.text,
        };

        let response = self
            .http
            .post(format!("{}/send", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let response = check_status(response).await?;

        let header_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Relays differ on whether they answer with a body at all
        let body = response.text().await?;
        let parsed: RelayResponse = serde_json::from_str(&body).unwrap_or_default();
        let message_id = parsed.id.or(header_id);

        debug!(
            recipients = count_recipients(to),
            message_id = message_id.as_deref().unwrap_or("-"),
            "relay accepted message"
        );

        Ok(RelayAcceptance::new(count_recipients(to), message_id))
    }
}
