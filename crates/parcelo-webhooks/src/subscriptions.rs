//! Webhook subscription registration.
//!
//! Registration validates the destination URL (HTTPS plus SSRF screening),
//! enforces the per-tenant subscription limit, generates the signing secret,
//! and stores it encrypted. The plaintext secret is returned to the caller
//! exactly once; after that only the dispatcher can recover it.

use std::sync::Arc;

use uuid::Uuid;

use parcelo_db::{CreateWebhookSubscription, WebhookSubscription};

use crate::crypto;
use crate::error::WebhookError;
use crate::store::SubscriptionStore;
use crate::validation;

/// Default maximum subscriptions per tenant.
pub const DEFAULT_MAX_SUBSCRIPTIONS: i64 = 25;

/// A freshly registered subscription and its one-time plaintext secret.
#[derive(Debug, Clone)]
pub struct RegisteredSubscription {
    pub subscription: WebhookSubscription,
    /// Shown to the registrant once, then only stored encrypted.
    pub secret: String,
}

/// Service for webhook subscription registration and removal.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    encryption_key: Vec<u8>,
    max_subscriptions: i64,
    allow_http: bool,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub fn new(store: Arc<dyn SubscriptionStore>, encryption_key: Vec<u8>) -> Self {
        Self {
            store,
            encryption_key,
            max_subscriptions: DEFAULT_MAX_SUBSCRIPTIONS,
            allow_http: false,
        }
    }

    /// Set the maximum subscriptions per tenant.
    #[must_use]
    pub fn with_max_subscriptions(mut self, max: i64) -> Self {
        self.max_subscriptions = max;
        self
    }

    /// Allow HTTP URLs (for development/testing).
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    /// Register a new subscription for a tenant.
    pub async fn register(
        &self,
        tenant_id: Uuid,
        url: String,
    ) -> Result<RegisteredSubscription, WebhookError> {
        validation::validate_webhook_url(&url, self.allow_http)?;

        let count = self.store.count_by_tenant(tenant_id).await?;
        if count >= self.max_subscriptions {
            return Err(WebhookError::SubscriptionLimitExceeded {
                limit: self.max_subscriptions,
            });
        }

        let secret = crypto::generate_secret();
        let secret_encrypted = crypto::encrypt_secret(&secret, &self.encryption_key)?;

        let subscription = self
            .store
            .insert(CreateWebhookSubscription {
                tenant_id,
                url,
                secret_encrypted: Some(secret_encrypted),
            })
            .await?;

        tracing::info!(
            target: "webhook_subscriptions",
            tenant_id = %tenant_id,
            subscription_id = %subscription.id,
            url = %subscription.url,
            "Webhook subscription registered"
        );

        Ok(RegisteredSubscription {
            subscription,
            secret,
        })
    }

    /// Delete a subscription.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), WebhookError> {
        if !self.store.delete(tenant_id, id).await? {
            return Err(WebhookError::SubscriptionNotFound);
        }

        tracing::info!(
            target: "webhook_subscriptions",
            tenant_id = %tenant_id,
            subscription_id = %id,
            "Webhook subscription deleted"
        );
        Ok(())
    }
}
