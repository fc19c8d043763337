//! Shipment storage trait with in-memory and Postgres backends.
//!
//! The engine only needs fetch-by-identifier, a compare-and-swap status
//! update, and append/list on the tracking history; everything else about
//! the relational store stays behind this seam.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use parcelo_db::{NewTrackingEvent, Shipment, ShipmentStatus, TrackingEvent};

use crate::error::ShipmentError;

/// Trait for shipment persistence backends.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Fetch a shipment by id, scoped to its owning tenant.
    async fn get(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
    ) -> Result<Option<Shipment>, ShipmentError>;

    /// Fetch a shipment by its globally unique tracking number.
    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, ShipmentError>;

    /// Compare-and-swap the status. Returns the updated shipment, or `None`
    /// when the row is missing or its status no longer equals `expected`.
    async fn update_status_if(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
        expected: ShipmentStatus,
        new: ShipmentStatus,
    ) -> Result<Option<Shipment>, ShipmentError>;

    /// Append an immutable tracking event.
    async fn append_event(&self, event: NewTrackingEvent) -> Result<TrackingEvent, ShipmentError>;

    /// Full history for a shipment, newest first.
    async fn events_for_shipment(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, ShipmentError>;
}

// ---------------------------------------------------------------------------
// In-memory store (for tests)
// ---------------------------------------------------------------------------

/// In-memory implementation of [`ShipmentStore`] for testing.
#[derive(Debug, Default)]
pub struct InMemoryShipmentStore {
    shipments: RwLock<HashMap<Uuid, Shipment>>,
    // Insertion order; listing reverses it for newest-first display.
    events: RwLock<Vec<TrackingEvent>>,
}

impl InMemoryShipmentStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a shipment directly (for tests).
    pub async fn insert_shipment(&self, shipment: Shipment) {
        self.shipments
            .write()
            .await
            .insert(shipment.id, shipment);
    }

    /// Total number of recorded events across all shipments (for tests).
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn get(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
    ) -> Result<Option<Shipment>, ShipmentError> {
        let shipments = self.shipments.read().await;
        Ok(shipments
            .get(&shipment_id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, ShipmentError> {
        let shipments = self.shipments.read().await;
        Ok(shipments
            .values()
            .find(|s| s.tracking_number == tracking_number)
            .cloned())
    }

    async fn update_status_if(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
        expected: ShipmentStatus,
        new: ShipmentStatus,
    ) -> Result<Option<Shipment>, ShipmentError> {
        let mut shipments = self.shipments.write().await;
        match shipments.get_mut(&shipment_id) {
            Some(s) if s.tenant_id == tenant_id && s.status == expected => {
                s.status = new;
                s.updated_at = Utc::now();
                Ok(Some(s.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn append_event(&self, event: NewTrackingEvent) -> Result<TrackingEvent, ShipmentError> {
        let stored = TrackingEvent {
            id: Uuid::new_v4(),
            shipment_id: event.shipment_id,
            status: event.status,
            description: event.description,
            location: event.location,
            created_by: event.created_by,
            created_at: Utc::now(),
        };
        self.events.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn events_for_shipment(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, ShipmentError> {
        let events = self.events.read().await;
        let mut history: Vec<TrackingEvent> = events
            .iter()
            .filter(|e| e.shipment_id == shipment_id)
            .cloned()
            .collect();
        history.reverse();
        Ok(history)
    }
}

// ---------------------------------------------------------------------------
// Postgres store
// ---------------------------------------------------------------------------

/// Postgres-backed implementation of [`ShipmentStore`].
#[derive(Clone)]
pub struct PgShipmentStore {
    pool: PgPool,
}

impl PgShipmentStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShipmentStore for PgShipmentStore {
    async fn get(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
    ) -> Result<Option<Shipment>, ShipmentError> {
        Ok(Shipment::find_by_id(&self.pool, tenant_id, shipment_id).await?)
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, ShipmentError> {
        Ok(Shipment::find_by_tracking_number(&self.pool, tracking_number).await?)
    }

    async fn update_status_if(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
        expected: ShipmentStatus,
        new: ShipmentStatus,
    ) -> Result<Option<Shipment>, ShipmentError> {
        Ok(Shipment::update_status_if(&self.pool, tenant_id, shipment_id, expected, new).await?)
    }

    async fn append_event(&self, event: NewTrackingEvent) -> Result<TrackingEvent, ShipmentError> {
        Ok(TrackingEvent::create(&self.pool, event).await?)
    }

    async fn events_for_shipment(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<TrackingEvent>, ShipmentError> {
        Ok(TrackingEvent::list_for_shipment(&self.pool, shipment_id).await?)
    }
}
