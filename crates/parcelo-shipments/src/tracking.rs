//! Public tracking queries.
//!
//! Tracking numbers are shareable identifiers: anyone holding one can read
//! the shipment's status history, so lookups here are deliberately not
//! tenant-scoped.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use parcelo_db::{ShipmentStatus, TrackingEvent};

use crate::error::ShipmentError;
use crate::store::ShipmentStore;

/// Everything a tracking page needs for one shipment.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingSnapshot {
    pub tracking_number: String,
    pub current_status: ShipmentStatus,
    /// Timestamp of the most recent event, falling back to the shipment's
    /// own update time before any history exists.
    pub last_update: DateTime<Utc>,
    pub reference_number: Option<String>,
    pub estimated_delivery_date: Option<NaiveDate>,
    /// Status history, newest first.
    pub history: Vec<TrackingEvent>,
}

/// Read-only tracking lookups by tracking number.
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn ShipmentStore>,
}

impl TrackingService {
    /// Create a new tracking service.
    #[must_use]
    pub fn new(store: Arc<dyn ShipmentStore>) -> Self {
        Self { store }
    }

    /// Look up a shipment's tracking snapshot.
    pub async fn track(&self, tracking_number: &str) -> Result<TrackingSnapshot, ShipmentError> {
        let shipment = self
            .store
            .find_by_tracking_number(tracking_number)
            .await?
            .ok_or(ShipmentError::NotFound)?;

        let history = self.store.events_for_shipment(shipment.id).await?;
        let last_update = history
            .first()
            .map_or(shipment.updated_at, |event| event.created_at);

        Ok(TrackingSnapshot {
            tracking_number: shipment.tracking_number,
            current_status: shipment.status,
            last_update,
            reference_number: shipment.reference_number,
            estimated_delivery_date: shipment.estimated_delivery_date,
            history,
        })
    }
}
