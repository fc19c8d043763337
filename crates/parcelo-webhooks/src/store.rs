//! Subscription storage trait with in-memory and Postgres backends.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use parcelo_db::{CreateWebhookSubscription, WebhookSubscription};

use crate::error::WebhookError;

/// Trait for webhook subscription storage backends.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// All active subscriptions for a tenant, oldest first.
    async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<WebhookSubscription>, WebhookError>;

    /// Insert a new active subscription. A second subscription for the same
    /// (tenant, URL) pair fails with `DuplicateSubscription`.
    async fn insert(
        &self,
        input: CreateWebhookSubscription,
    ) -> Result<WebhookSubscription, WebhookError>;

    /// Number of subscriptions a tenant holds, active or not.
    async fn count_by_tenant(&self, tenant_id: Uuid) -> Result<i64, WebhookError>;

    /// Remove a subscription. Returns whether a row was deleted.
    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, WebhookError>;
}

// ---------------------------------------------------------------------------
// In-memory store (for tests)
// ---------------------------------------------------------------------------

/// In-memory implementation of [`SubscriptionStore`] for testing.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<HashMap<Uuid, WebhookSubscription>>,
}

impl InMemorySubscriptionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built subscription, bypassing uniqueness checks. Lets
    /// tests seed inactive or oddly-shaped rows directly.
    pub async fn insert_subscription(&self, subscription: WebhookSubscription) {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription);
    }

    /// Total number of stored subscriptions (for tests).
    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Whether the store is empty (for tests).
    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<WebhookSubscription>, WebhookError> {
        let subscriptions = self.subscriptions.read().await;
        let mut active: Vec<WebhookSubscription> = subscriptions
            .values()
            .filter(|s| s.tenant_id == tenant_id && s.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|s| s.created_at);
        Ok(active)
    }

    async fn insert(
        &self,
        input: CreateWebhookSubscription,
    ) -> Result<WebhookSubscription, WebhookError> {
        let mut subscriptions = self.subscriptions.write().await;

        if subscriptions
            .values()
            .any(|s| s.tenant_id == input.tenant_id && s.url == input.url)
        {
            return Err(WebhookError::DuplicateSubscription);
        }

        let now = Utc::now();
        let subscription = WebhookSubscription {
            id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            url: input.url,
            secret_encrypted: input.secret_encrypted,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> Result<i64, WebhookError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .count() as i64)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, WebhookError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get(&id) {
            Some(s) if s.tenant_id == tenant_id => {
                subscriptions.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Postgres store
// ---------------------------------------------------------------------------

/// Postgres-backed implementation of [`SubscriptionStore`].
#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn list_active(&self, tenant_id: Uuid) -> Result<Vec<WebhookSubscription>, WebhookError> {
        Ok(WebhookSubscription::find_active_by_tenant(&self.pool, tenant_id).await?)
    }

    async fn insert(
        &self,
        input: CreateWebhookSubscription,
    ) -> Result<WebhookSubscription, WebhookError> {
        WebhookSubscription::create(&self.pool, input)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    WebhookError::DuplicateSubscription
                } else {
                    WebhookError::Database(e)
                }
            })
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> Result<i64, WebhookError> {
        Ok(WebhookSubscription::count_by_tenant(&self.pool, tenant_id).await?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, WebhookError> {
        Ok(WebhookSubscription::delete(&self.pool, tenant_id, id).await?)
    }
}
