//! Common test utilities for parcelo-webhooks integration tests.
//!
//! Provides mock-server responders and fixtures for verifying webhook
//! delivery behavior without a real database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use wiremock::{Request, Respond, ResponseTemplate};

use parcelo_db::{Shipment, ShipmentStatus, WebhookSubscription};
use parcelo_webhooks::crypto;

/// Encryption key used by every test; secrets at rest are AES-256-GCM.
pub const TEST_KEY: [u8; 32] = [42u8; 32];

/// Standard test tenant IDs.
pub const TENANT_A: Uuid = Uuid::from_bytes([
    0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11,
]);

pub const TENANT_B: Uuid = Uuid::from_bytes([
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x22,
]);

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A shipment owned by `tenant_id` in the given status.
pub fn sample_shipment(tenant_id: Uuid, status: ShipmentStatus) -> Shipment {
    let now = Utc::now();
    Shipment {
        id: Uuid::new_v4(),
        tenant_id,
        carrier_id: None,
        tracking_number: "SHP123456789012".to_string(),
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

/// An active subscription with an encrypted secret and a controlled
/// creation timestamp (delivery order follows `created_at`).
pub fn subscription_at(
    tenant_id: Uuid,
    url: &str,
    secret: Option<&str>,
    created_at: DateTime<Utc>,
) -> WebhookSubscription {
    WebhookSubscription {
        id: Uuid::new_v4(),
        tenant_id,
        url: url.to_string(),
        secret_encrypted: secret.map(|s| crypto::encrypt_secret(s, &TEST_KEY).unwrap()),
        is_active: true,
        created_at,
        updated_at: created_at,
    }
}

/// An active subscription created "now".
pub fn active_subscription(
    tenant_id: Uuid,
    url: &str,
    secret: Option<&str>,
) -> WebhookSubscription {
    subscription_at(tenant_id, url, secret, Utc::now())
}

/// Shift a timestamp for deterministic subscription ordering.
pub fn seconds_ago(secs: i64) -> DateTime<Utc> {
    Utc::now() - Duration::seconds(secs)
}

// ---------------------------------------------------------------------------
// CapturedRequest - for inspecting webhook requests
// ---------------------------------------------------------------------------

/// A captured HTTP request with body and headers.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl CapturedRequest {
    /// Parse the body as JSON.
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// CaptureResponder - captures requests and returns a fixed status
// ---------------------------------------------------------------------------

/// A wiremock responder that captures incoming requests.
#[derive(Clone)]
pub struct CaptureResponder {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    response_code: u16,
}

impl CaptureResponder {
    /// Create a new capture responder that returns 200 OK.
    pub fn new() -> Self {
        Self::with_status(200)
    }

    /// Create a capture responder that returns a custom status code.
    pub fn with_status(status: u16) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response_code: status,
        }
    }

    /// Get all captured requests.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the number of captured requests.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for CaptureResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Respond for CaptureResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let captured = CapturedRequest {
            body: request.body.clone(),
            headers: request
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
                .collect(),
        };
        self.requests.lock().unwrap().push(captured);
        ResponseTemplate::new(self.response_code)
    }
}

// ---------------------------------------------------------------------------
// DelayedResponder - adds response delay
// ---------------------------------------------------------------------------

/// A wiremock responder that delays before answering, to trip client
/// timeouts.
#[derive(Clone)]
pub struct DelayedResponder {
    delay_ms: u64,
}

impl DelayedResponder {
    /// Create a responder that delays for `ms` milliseconds.
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Respond for DelayedResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(self.delay_ms))
    }
}
