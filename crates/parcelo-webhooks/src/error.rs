//! Error types for the webhook system.

use parcelo_db::DbError;

/// Webhook system error variants.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("SSRF protection: {0}")]
    SsrfDetected(String),

    #[error("Subscription already exists for this URL")]
    DuplicateSubscription,

    #[error("Subscription limit ({limit}) reached for tenant")]
    SubscriptionLimitExceeded { limit: i64 },

    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
