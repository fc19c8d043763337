//! Common test utilities for parcelo-shipments integration tests.
//!
//! Wires the status engine to in-memory stores and a real dispatcher so
//! end-to-end transition behavior (including outbound webhooks against
//! wiremock endpoints) runs without a database.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use parcelo_db::{Shipment, ShipmentStatus, WebhookSubscription};
use parcelo_shipments::{InMemoryShipmentStore, StatusEngine};
use parcelo_webhooks::{crypto, InMemorySubscriptionStore, WebhookDispatcher};

/// Encryption key used by every test; secrets at rest are AES-256-GCM.
pub const TEST_KEY: [u8; 32] = [42u8; 32];

/// Standard test tenant IDs.
pub const TENANT_A: Uuid = Uuid::from_bytes([
    0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11,
]);

pub const TENANT_B: Uuid = Uuid::from_bytes([
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
]);

/// Engine plus the stores behind it, for seeding and inspection.
pub struct Harness {
    pub shipments: Arc<InMemoryShipmentStore>,
    pub subscriptions: Arc<InMemorySubscriptionStore>,
    pub engine: StatusEngine,
}

/// Build an engine over fresh in-memory stores.
pub fn harness() -> Harness {
    let shipments = Arc::new(InMemoryShipmentStore::new());
    let subscriptions = Arc::new(InMemorySubscriptionStore::new());
    let dispatcher = Arc::new(
        WebhookDispatcher::new(subscriptions.clone(), TEST_KEY.to_vec())
            .expect("dispatcher should build"),
    );
    let engine = StatusEngine::new(shipments.clone(), dispatcher);
    Harness {
        shipments,
        subscriptions,
        engine,
    }
}

/// A shipment owned by `tenant_id` in the given status.
pub fn sample_shipment(tenant_id: Uuid, status: ShipmentStatus) -> Shipment {
    let now = Utc::now();
    Shipment {
        id: Uuid::new_v4(),
        tenant_id,
        carrier_id: None,
        tracking_number: format!("SHP{:012}", rand_suffix()),
        reference_number: Some("ORDER-42".to_string()),
        sender_address_id: Uuid::new_v4(),
        receiver_address_id: Uuid::new_v4(),
        weight_kg: Decimal::new(250, 2),
        length_cm: Decimal::new(3000, 2),
        width_cm: Decimal::new(2000, 2),
        height_cm: Decimal::new(1500, 2),
        service_type_id: Uuid::new_v4(),
        estimated_cost: Decimal::new(1999, 2),
        estimated_delivery_date: None,
        status,
        label_url: None,
        created_at: now,
        updated_at: now,
    }
}

/// An active subscription whose secret is encrypted with [`TEST_KEY`].
pub fn active_subscription(tenant_id: Uuid, url: &str, secret: &str) -> WebhookSubscription {
    let now = Utc::now();
    WebhookSubscription {
        id: Uuid::new_v4(),
        tenant_id,
        url: url.to_string(),
        secret_encrypted: Some(crypto::encrypt_secret(secret, &TEST_KEY).unwrap()),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn rand_suffix() -> u64 {
    // Unique-enough tracking numbers derived from the v4 UUID generator.
    let bytes = Uuid::new_v4().into_bytes();
    u64::from_be_bytes(bytes[..8].try_into().unwrap()) % 1_000_000_000_000
}
