//! Shipment lifecycle event types and the webhook payload they produce.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parcelo_db::{Shipment, ShipmentStatus};

/// Events a tenant can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentEvent {
    /// A shipment was booked.
    #[serde(rename = "shipment.created")]
    Created,
    /// A shipment's lifecycle status changed.
    #[serde(rename = "shipment.status_changed")]
    StatusChanged,
    /// A shipment reached the receiver. Fired in addition to the generic
    /// status-changed event.
    #[serde(rename = "shipment.delivered")]
    Delivered,
}

impl ShipmentEvent {
    /// Stable wire representation, used in payloads and the
    /// `X-Webhook-Event` header.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentEvent::Created => "shipment.created",
            ShipmentEvent::StatusChanged => "shipment.status_changed",
            ShipmentEvent::Delivered => "shipment.delivered",
        }
    }

    /// Parse a wire representation. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "shipment.created" => Some(ShipmentEvent::Created),
            "shipment.status_changed" => Some(ShipmentEvent::StatusChanged),
            "shipment.delivered" => Some(ShipmentEvent::Delivered),
            _ => None,
        }
    }

    /// All known event types.
    #[must_use]
    pub fn all() -> &'static [ShipmentEvent] {
        &[
            ShipmentEvent::Created,
            ShipmentEvent::StatusChanged,
            ShipmentEvent::Delivered,
        ]
    }
}

impl std::fmt::Display for ShipmentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The flat JSON body POSTed to every subscription.
///
/// The timestamp is rendered as UTC RFC 3339 with an explicit `Z` suffix at
/// payload-construction time, so the signed bytes and the visible body can
/// never disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    pub tracking_number: String,
    pub new_status: ShipmentStatus,
    pub reference_number: String,
    pub shipment_id: Uuid,
    pub timestamp: String,
}

impl WebhookPayload {
    /// Build the payload for a shipment event, stamped with the current time.
    #[must_use]
    pub fn new(shipment: &Shipment, event: ShipmentEvent) -> Self {
        Self {
            event: event.as_str().to_string(),
            tracking_number: shipment.tracking_number.clone(),
            new_status: shipment.status,
            reference_number: shipment.reference_number.clone().unwrap_or_default(),
            shipment_id: shipment.id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
