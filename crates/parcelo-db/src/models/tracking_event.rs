//! Tracking event model.
//!
//! Append-only history of status changes per shipment. Rows are created by
//! the status engine and never updated or deleted; display order is newest
//! first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::shipment::ShipmentStatus;

/// One immutable entry in a shipment's history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Unique identifier.
    pub id: Uuid,

    /// Parent shipment. Cascade-deleted with it.
    pub shipment_id: Uuid,

    /// Status value at the time of the event.
    pub status: ShipmentStatus,

    /// Free-text description shown in tracking views.
    pub description: Option<String>,

    /// Where the event happened, when the carrier reported one.
    pub location: Option<String>,

    /// The user who recorded the event (carrier scan, admin update).
    pub created_by: Option<Uuid>,

    /// Timestamp when the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Input for appending a tracking event.
#[derive(Debug, Clone)]
pub struct NewTrackingEvent {
    pub shipment_id: Uuid,
    pub status: ShipmentStatus,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_by: Option<Uuid>,
}

impl TrackingEvent {
    /// Append an event to a shipment's history.
    pub async fn create(pool: &PgPool, input: NewTrackingEvent) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO tracking_events (shipment_id, status, description, location, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, shipment_id, status, description, location, created_by, created_at
            ",
        )
        .bind(input.shipment_id)
        .bind(input.status)
        .bind(input.description)
        .bind(input.location)
        .bind(input.created_by)
        .fetch_one(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Full history for a shipment, newest first.
    pub async fn list_for_shipment(pool: &PgPool, shipment_id: Uuid) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, shipment_id, status, description, location, created_by, created_at
            FROM tracking_events
            WHERE shipment_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(shipment_id)
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// The most recent event for a shipment, if any.
    pub async fn latest_for_shipment(
        pool: &PgPool,
        shipment_id: Uuid,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, shipment_id, status, description, location, created_by, created_at
            FROM tracking_events
            WHERE shipment_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(shipment_id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }
}
