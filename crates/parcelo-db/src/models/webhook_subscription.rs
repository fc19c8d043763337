//! Webhook subscription model.
//!
//! A tenant's registered delivery endpoint. The signing secret is encrypted
//! at rest (AES-256-GCM, handled by the webhooks crate) and is never returned
//! after the initial registration response. The dispatcher only ever reads
//! these rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DbError;

/// A tenant's registered webhook endpoint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WebhookSubscription {
    /// Unique identifier.
    pub id: Uuid,

    /// Owning tenant.
    pub tenant_id: Uuid,

    /// Destination URL. At most one subscription per (tenant, URL).
    pub url: String,

    /// Encrypted signing secret, when one was configured.
    #[serde(skip_serializing)]
    pub secret_encrypted: Option<String>,

    /// Inactive subscriptions are skipped by the dispatcher.
    pub is_active: bool,

    /// Timestamp when the subscription was registered.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last change.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a webhook subscription.
#[derive(Debug, Clone)]
pub struct CreateWebhookSubscription {
    pub tenant_id: Uuid,
    pub url: String,
    pub secret_encrypted: Option<String>,
}

impl WebhookSubscription {
    /// Insert a new active subscription.
    ///
    /// A second registration for the same (tenant, URL) pair fails with a
    /// unique-constraint violation; callers map that to a domain error.
    pub async fn create(pool: &PgPool, input: CreateWebhookSubscription) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO webhook_subscriptions (tenant_id, url, secret_encrypted)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, url, secret_encrypted, is_active, created_at, updated_at
            ",
        )
        .bind(input.tenant_id)
        .bind(input.url)
        .bind(input.secret_encrypted)
        .fetch_one(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// All active subscriptions for a tenant, oldest first.
    pub async fn find_active_by_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, tenant_id, url, secret_encrypted, is_active, created_at, updated_at
            FROM webhook_subscriptions
            WHERE tenant_id = $1 AND is_active = TRUE
            ORDER BY created_at ASC
            ",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Find a subscription by id, scoped to its owning tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, tenant_id, url, secret_encrypted, is_active, created_at, updated_at
            FROM webhook_subscriptions
            WHERE tenant_id = $1 AND id = $2
            ",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Number of subscriptions a tenant holds, active or not.
    pub async fn count_by_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<i64, DbError> {
        let result: (i64,) =
            sqlx::query_as(r"SELECT COUNT(*) FROM webhook_subscriptions WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(pool)
                .await
                .map_err(DbError::QueryFailed)?;

        Ok(result.0)
    }

    /// Remove a subscription. Returns whether a row was deleted.
    pub async fn delete(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, DbError> {
        let result =
            sqlx::query(r"DELETE FROM webhook_subscriptions WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(id)
                .execute(pool)
                .await
                .map_err(DbError::QueryFailed)?;

        Ok(result.rows_affected() > 0)
    }
}
