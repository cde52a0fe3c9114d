//! Webhook delivery with absorbed failures.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use repairhub_core::AppResult;
use repairhub_core::config::WebhookConfig;
use repairhub_core::error::{AppError, ErrorKind};

use crate::embed::Embed;
use crate::render;

/// Delivers embeds to the configured external endpoint.
///
/// Every delivery is a single attempt. Failures of any kind (missing
/// configuration, network error, non-success response) are logged and
/// absorbed; the in-app path never observes them.
#[derive(Debug)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookDispatcher {
    /// Create a dispatcher from configuration.
    pub fn new(config: WebhookConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Failed to build webhook HTTP client",
                    e,
                )
            })?;

        if config.url.is_none() {
            debug!("Webhook URL not configured; external channel disabled");
        }

        Ok(Self { client, config })
    }

    /// Whether an endpoint is configured.
    pub fn is_configured(&self) -> bool {
        self.config.url.is_some()
    }

    /// Deliver an embed, absorbing any failure.
    pub async fn dispatch(&self, embed: Embed) {
        if let Err(e) = self.try_send(&embed).await {
            warn!(error = %e, title = %embed.title, "External notification delivery failed");
        }
    }

    /// Deliver an embed on a detached task, fire-and-forget.
    ///
    /// The attempt runs to its terminal outcome regardless of what the
    /// triggering caller does afterwards.
    pub fn dispatch_detached(self: &Arc<Self>, embed: Embed) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            dispatcher.dispatch(embed).await;
        });
    }

    /// Send a self-test embed; true when the endpoint accepted it.
    pub async fn test_connection(&self) -> bool {
        self.try_send(&render::self_test()).await.is_ok()
    }

    async fn try_send(&self, embed: &Embed) -> AppResult<()> {
        let url = self
            .config
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("webhook URL is not configured"))?;

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "embeds": [embed] }))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Webhook request failed", e)
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Webhook endpoint returned {}",
                response.status()
            )));
        }

        debug!(title = %embed.title, "External notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> WebhookConfig {
        WebhookConfig {
            // Reserved discard port; connection is refused immediately.
            url: Some("http://127.0.0.1:9/webhook".to_string()),
            timeout_seconds: 1,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_dispatcher_fails_self_test() {
        let dispatcher = WebhookDispatcher::new(WebhookConfig::default()).unwrap();
        assert!(!dispatcher.is_configured());
        assert!(!dispatcher.test_connection().await);
    }

    #[tokio::test]
    async fn test_dispatch_absorbs_unreachable_endpoint() {
        let dispatcher = WebhookDispatcher::new(unreachable_config()).unwrap();
        // Must return normally; the failure is logged, not raised.
        dispatcher.dispatch(render::self_test()).await;
    }

    #[tokio::test]
    async fn test_try_send_reports_unreachable_endpoint() {
        let dispatcher = WebhookDispatcher::new(unreachable_config()).unwrap();
        let err = dispatcher.try_send(&render::self_test()).await.unwrap_err();
        assert!(err.is_kind(ErrorKind::ExternalService));
    }
}
