//! Fire-and-forget webhook delivery.
//!
//! Given a shipment and an event, loads the tenant's active subscriptions and
//! POSTs a signed JSON payload to each, independently. Any 2xx response is
//! success; everything else (including timeouts) is logged and dropped. There
//! is no retry, no backoff, and no failure state: a failing subscriber never
//! affects another subscriber or the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;

use parcelo_db::{Shipment, WebhookSubscription};

use crate::crypto;
use crate::error::WebhookError;
use crate::events::{ShipmentEvent, WebhookPayload};
use crate::store::SubscriptionStore;

/// Fixed timeout applied to each outbound delivery attempt.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers shipment lifecycle events to a tenant's subscriptions.
#[derive(Clone)]
pub struct WebhookDispatcher {
    subscriptions: Arc<dyn SubscriptionStore>,
    http_client: Client,
    encryption_key: Vec<u8>,
}

impl WebhookDispatcher {
    /// Create a dispatcher with a shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::Internal` if the HTTP client cannot be built.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        encryption_key: Vec<u8>,
    ) -> Result<Self, WebhookError> {
        Ok(Self {
            subscriptions,
            http_client: build_client(DELIVERY_TIMEOUT)?,
            encryption_key,
        })
    }

    /// Replace the per-attempt timeout (tests use short timeouts).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, WebhookError> {
        self.http_client = build_client(timeout)?;
        Ok(self)
    }

    /// Notify every active subscription of the shipment's tenant.
    ///
    /// Purely a side effect: never returns anything and never raises. Zero
    /// active subscriptions is a no-op.
    pub async fn notify(&self, shipment: &Shipment, event: ShipmentEvent) {
        let subscriptions = match self.subscriptions.list_active(shipment.tenant_id).await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!(
                    target: "webhook_delivery",
                    tenant_id = %shipment.tenant_id,
                    event = %event,
                    error = %e,
                    "Failed to load webhook subscriptions"
                );
                return;
            }
        };

        if subscriptions.is_empty() {
            tracing::debug!(
                target: "webhook_delivery",
                tenant_id = %shipment.tenant_id,
                event = %event,
                "No active webhook subscriptions for tenant"
            );
            return;
        }

        let payload = WebhookPayload::new(shipment, event);
        // Serialized exactly once; the same bytes are signed and sent.
        let body = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    target: "webhook_delivery",
                    tenant_id = %shipment.tenant_id,
                    event = %event,
                    error = %e,
                    "Failed to serialize webhook payload"
                );
                return;
            }
        };

        tracing::info!(
            target: "webhook_delivery",
            tenant_id = %shipment.tenant_id,
            tracking_number = %shipment.tracking_number,
            event = %event,
            subscription_count = subscriptions.len(),
            "Delivering event to subscriptions"
        );

        for subscription in &subscriptions {
            self.deliver_to_subscription(subscription, event, &body)
                .await;
        }
    }

    /// One isolated delivery attempt. Failures are logged, never propagated.
    async fn deliver_to_subscription(
        &self,
        subscription: &WebhookSubscription,
        event: ShipmentEvent,
        body: &[u8],
    ) {
        let mut request = self
            .http_client
            .post(&subscription.url)
            .header("Content-Type", "application/json")
            .header("X-Webhook-Event", event.as_str());

        if let Some(ref encrypted) = subscription.secret_encrypted {
            match crypto::decrypt_secret(encrypted, &self.encryption_key) {
                Ok(secret) => {
                    request =
                        request.header("X-Webhook-Signature", crypto::compute_signature(&secret, body));
                }
                Err(e) => {
                    tracing::warn!(
                        target: "webhook_delivery",
                        subscription_id = %subscription.id,
                        error = %e,
                        "Failed to decrypt subscription secret; delivering unsigned"
                    );
                }
            }
        }

        let start = Instant::now();
        let result = request.body(body.to_vec()).send().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    target: "webhook_delivery",
                    subscription_id = %subscription.id,
                    url = %subscription.url,
                    event = %event,
                    status = response.status().as_u16(),
                    latency_ms,
                    "Webhook delivered"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    target: "webhook_delivery",
                    subscription_id = %subscription.id,
                    url = %subscription.url,
                    event = %event,
                    status = response.status().as_u16(),
                    latency_ms,
                    "Webhook endpoint returned non-success status"
                );
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "request timed out"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request error"
                };
                tracing::error!(
                    target: "webhook_delivery",
                    subscription_id = %subscription.id,
                    url = %subscription.url,
                    event = %event,
                    latency_ms,
                    error = %e,
                    "Webhook delivery failed: {reason}"
                );
            }
        }
    }
}

fn build_client(timeout: Duration) -> Result<Client, WebhookError> {
    Client::builder()
        .timeout(timeout)
        .user_agent("parcelo-webhooks/1.0")
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| WebhookError::Internal(format!("Failed to build HTTP client: {e}")))
}
