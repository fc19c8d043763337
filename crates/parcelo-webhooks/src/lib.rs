//! Webhook notifications for shipment lifecycle events.
//!
//! Provides tenant-scoped subscription registration with encrypted signing
//! secrets, and best-effort delivery of HMAC-SHA256-signed JSON payloads.
//! Delivery is fire-and-forget: each subscriber is attempted independently
//! with a bounded timeout and no retry.

pub mod crypto;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod store;
pub mod subscriptions;
pub mod validation;

pub use dispatcher::{WebhookDispatcher, DELIVERY_TIMEOUT};
pub use error::WebhookError;
pub use events::{ShipmentEvent, WebhookPayload};
pub use store::{InMemorySubscriptionStore, PgSubscriptionStore, SubscriptionStore};
pub use subscriptions::{RegisteredSubscription, SubscriptionService};
