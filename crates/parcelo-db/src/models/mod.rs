//! Database models for the parcelo platform.

pub mod shipment;
pub mod tracking_event;
pub mod webhook_subscription;

pub use shipment::{CreateShipment, Shipment, ShipmentStatus};
pub use tracking_event::{NewTrackingEvent, TrackingEvent};
pub use webhook_subscription::{CreateWebhookSubscription, WebhookSubscription};
