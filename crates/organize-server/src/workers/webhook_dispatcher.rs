use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::Webhook;

/// Hands a payload off for delivery to every listed webhook.
///
/// Delivery happens in the background; callers never see the outcome.
pub trait WebhookDispatcher: Send + Sync {
    fn dispatch(&self, webhooks: &[Webhook], payload: &Value);
}

/// Posts each payload as JSON on its own tokio task. No retries, no signing.
#[derive(Clone)]
pub struct HttpWebhookDispatcher {
    client: Client,
    timeout: Duration,
}

impl HttpWebhookDispatcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl WebhookDispatcher for HttpWebhookDispatcher {
    fn dispatch(&self, webhooks: &[Webhook], payload: &Value) {
        let Ok(runtime) = Handle::try_current() else {
            error!("no tokio runtime available, dropping webhook notifications");
            return;
        };

        let event = payload
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        for webhook in webhooks {
            let client = self.client.clone();
            let timeout = self.timeout;
            let webhook = webhook.clone();
            let payload = payload.clone();
            let event = event.clone();

            runtime.spawn(async move {
                if let Err(e) = deliver(&client, &webhook, &event, &payload, timeout).await {
                    warn!(
                        webhook_id = %webhook.id,
                        target_url = %webhook.target_url,
                        error = %e,
                        "webhook delivery failed"
                    );
                }
            });
        }
    }
}

async fn deliver(
    client: &Client,
    webhook: &Webhook,
    event: &str,
    payload: &Value,
    timeout: Duration,
) -> anyhow::Result<()> {
    let response = client
        .post(&webhook.target_url)
        .header("X-Webhook-Id", Uuid::new_v4().to_string())
        .header("X-Webhook-Event", event)
        .header("X-Webhook-Timestamp", Utc::now().timestamp().to_string())
        .json(payload)
        .timeout(timeout)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "webhook delivery failed: {}",
            response.status()
        ));
    }

    debug!(webhook_id = %webhook.id, event, "webhook delivered");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchCall {
    pub webhooks: Vec<Webhook>,
    pub payload: Value,
}

/// Keeps every dispatch call in memory instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    calls: Arc<Mutex<Vec<DispatchCall>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl WebhookDispatcher for RecordingDispatcher {
    fn dispatch(&self, webhooks: &[Webhook], payload: &Value) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(DispatchCall {
                webhooks: webhooks.to_vec(),
                payload: payload.clone(),
            });
        }
    }
}
