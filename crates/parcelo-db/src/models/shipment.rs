//! Shipment model and status lifecycle.
//!
//! The status transition table lives here, next to the enum it governs, so
//! that every caller (status engine, admin tooling, tests) shares one
//! authoritative definition of which lifecycle moves are legal.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use uuid::Uuid;

use crate::error::DbError;

/// Lifecycle states of a shipment.
///
/// The happy path runs `Created → PickedUp → InTransit → OutForDelivery →
/// Delivered`. `Cancelled` and `Delivered` are terminal under normal flow;
/// the single modeled escape is `Delivered → Returned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Type, Serialize, Deserialize)]
#[sqlx(type_name = "shipment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Booked but not yet handed to a carrier.
    #[default]
    Created,
    /// Collected by the assigned carrier.
    PickedUp,
    /// Moving through the carrier network.
    InTransit,
    /// On the final delivery vehicle.
    OutForDelivery,
    /// Handed over to the receiver.
    Delivered,
    /// Cancelled before entering active transit.
    Cancelled,
    /// Sent back after delivery or during transit.
    Returned,
}

impl ShipmentStatus {
    /// Stable wire/database representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentStatus::Created => "created",
            ShipmentStatus::PickedUp => "picked_up",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::OutForDelivery => "out_for_delivery",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
            ShipmentStatus::Returned => "returned",
        }
    }

    /// Parse a wire representation. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(ShipmentStatus::Created),
            "picked_up" => Some(ShipmentStatus::PickedUp),
            "in_transit" => Some(ShipmentStatus::InTransit),
            "out_for_delivery" => Some(ShipmentStatus::OutForDelivery),
            "delivered" => Some(ShipmentStatus::Delivered),
            "cancelled" => Some(ShipmentStatus::Cancelled),
            "returned" => Some(ShipmentStatus::Returned),
            _ => None,
        }
    }

    /// Returns `true` if no further transitions are allowed from this state,
    /// modeled exceptions aside (`Delivered → Returned`).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ShipmentStatus::Cancelled | ShipmentStatus::Delivered)
    }

    /// The set of statuses reachable from this one.
    ///
    /// Encodes the full lifecycle policy in one place:
    /// - nothing leaves `Cancelled`;
    /// - `Delivered` may only become `Returned`;
    /// - cancellation is allowed only before active transit (`Created`,
    ///   `PickedUp`);
    /// - `Returned` is reachable from carrier-side states and `Delivered`;
    /// - active states may repeat (carrier re-scans) or jump forward, and
    ///   `Created` is never re-entered.
    #[must_use]
    pub fn allowed_targets(self) -> &'static [ShipmentStatus] {
        use ShipmentStatus::{
            Cancelled, Created, Delivered, InTransit, OutForDelivery, PickedUp, Returned,
        };
        match self {
            Created => &[PickedUp, InTransit, OutForDelivery, Delivered, Cancelled],
            PickedUp => &[
                PickedUp,
                InTransit,
                OutForDelivery,
                Delivered,
                Returned,
                Cancelled,
            ],
            InTransit | OutForDelivery => {
                &[PickedUp, InTransit, OutForDelivery, Delivered, Returned]
            }
            Delivered => &[Returned],
            Returned => &[PickedUp, InTransit, OutForDelivery, Delivered],
            Cancelled => &[],
        }
    }

    /// Whether `target` is a legal next status from `self`.
    #[must_use]
    pub fn can_transition_to(self, target: ShipmentStatus) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipmentStatus::parse(s).ok_or_else(|| DbError::NotFound(format!("shipment status {s}")))
    }
}

/// A tenant-owned parcel-movement record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique identifier.
    pub id: Uuid,

    /// Owning tenant. All reads and writes are scoped by this column.
    pub tenant_id: Uuid,

    /// Carrier user assigned by an administrator, if any.
    pub carrier_id: Option<Uuid>,

    /// Human-readable tracking code. Globally unique, immutable once set.
    pub tracking_number: String,

    /// Customer-supplied order reference.
    pub reference_number: Option<String>,

    /// Pickup address reference.
    pub sender_address_id: Uuid,

    /// Delivery address reference.
    pub receiver_address_id: Uuid,

    /// Package weight in kilograms.
    pub weight_kg: Decimal,

    /// Package length in centimeters.
    pub length_cm: Decimal,

    /// Package width in centimeters.
    pub width_cm: Decimal,

    /// Package height in centimeters.
    pub height_cm: Decimal,

    /// Selected service tier.
    pub service_type_id: Uuid,

    /// Quoted cost at booking time.
    pub estimated_cost: Decimal,

    /// Quoted delivery date at booking time.
    pub estimated_delivery_date: Option<NaiveDate>,

    /// Current lifecycle status. Mutated only through the status engine.
    pub status: ShipmentStatus,

    /// Shipping label location, once generated.
    pub label_url: Option<String>,

    /// Timestamp when the shipment was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last persisted change.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a shipment row.
#[derive(Debug, Clone)]
pub struct CreateShipment {
    pub tenant_id: Uuid,
    /// Explicit tracking number; generated when absent.
    pub tracking_number: Option<String>,
    pub reference_number: Option<String>,
    pub sender_address_id: Uuid,
    pub receiver_address_id: Uuid,
    pub weight_kg: Decimal,
    pub length_cm: Decimal,
    pub width_cm: Decimal,
    pub height_cm: Decimal,
    pub service_type_id: Uuid,
    pub estimated_cost: Decimal,
    pub estimated_delivery_date: Option<NaiveDate>,
}

const SELECT_COLUMNS: &str = "id, tenant_id, carrier_id, tracking_number, reference_number, \
     sender_address_id, receiver_address_id, weight_kg, length_cm, width_cm, height_cm, \
     service_type_id, estimated_cost, estimated_delivery_date, status, label_url, \
     created_at, updated_at";

impl Shipment {
    /// Generate a fresh tracking number: `SHP` followed by 12 random digits.
    #[must_use]
    pub fn generate_tracking_number() -> String {
        use rand::rngs::OsRng;
        use rand::Rng;

        let mut number = String::with_capacity(15);
        number.push_str("SHP");
        for _ in 0..12 {
            number.push(char::from(b'0' + OsRng.gen_range(0..10)));
        }
        number
    }

    /// Insert a new shipment in the initial `created` state.
    pub async fn create(pool: &PgPool, input: CreateShipment) -> Result<Self, DbError> {
        let tracking_number = input
            .tracking_number
            .unwrap_or_else(Self::generate_tracking_number);

        sqlx::query_as::<_, Self>(&format!(
            r"
            INSERT INTO shipments (
                tenant_id, tracking_number, reference_number,
                sender_address_id, receiver_address_id,
                weight_kg, length_cm, width_cm, height_cm,
                service_type_id, estimated_cost, estimated_delivery_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(input.tenant_id)
        .bind(tracking_number)
        .bind(input.reference_number)
        .bind(input.sender_address_id)
        .bind(input.receiver_address_id)
        .bind(input.weight_kg)
        .bind(input.length_cm)
        .bind(input.width_cm)
        .bind(input.height_cm)
        .bind(input.service_type_id)
        .bind(input.estimated_cost)
        .bind(input.estimated_delivery_date)
        .fetch_one(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Find a shipment by id, scoped to its owning tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM shipments
            WHERE tenant_id = $1 AND id = $2
            "
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Find a shipment by tracking number. Unscoped: tracking numbers are
    /// globally unique and serve the public tracking query.
    pub async fn find_by_tracking_number(
        pool: &PgPool,
        tracking_number: &str,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM shipments
            WHERE tracking_number = $1
            "
        ))
        .bind(tracking_number)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Compare-and-swap the status column.
    ///
    /// The row is updated only while its status still equals `expected`;
    /// `None` means the shipment is gone or another writer got there first.
    pub async fn update_status_if(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        expected: ShipmentStatus,
        new: ShipmentStatus,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            r"
            UPDATE shipments
            SET status = $4, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND status = $3
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(expected)
        .bind(new)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Administrative carrier reassignment. Leaves the status untouched, so
    /// it fires no lifecycle notifications.
    pub async fn assign_carrier(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        carrier_id: Uuid,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            r"
            UPDATE shipments
            SET carrier_id = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(tenant_id)
        .bind(id)
        .bind(carrier_id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Administrative deletion safeguard: only rows that never entered
    /// transit (`created`) or were cancelled can be removed. Returns whether
    /// a row was deleted.
    pub async fn delete(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            DELETE FROM shipments
            WHERE tenant_id = $1 AND id = $2 AND status IN ('created', 'cancelled')
            ",
        )
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(DbError::QueryFailed)?;

        Ok(result.rows_affected() > 0)
    }
}
