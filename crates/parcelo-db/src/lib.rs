//! Persistence layer for the parcelo shipment platform.
//!
//! Provides the shipment, tracking-event, and webhook-subscription models
//! with tenant-scoped query methods, the shipment status lifecycle table,
//! and embedded SQL migrations.

pub mod error;
pub mod migrations;
pub mod models;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{
    CreateShipment, CreateWebhookSubscription, NewTrackingEvent, Shipment, ShipmentStatus,
    TrackingEvent, WebhookSubscription,
};
