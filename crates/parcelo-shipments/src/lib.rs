//! Shipment lifecycle engine for the parcelo platform.
//!
//! Enforces the status transition table, records the append-only tracking
//! history, and publishes lifecycle webhooks through the dispatcher. The
//! persistence seam is the [`ShipmentStore`] trait with in-memory and
//! Postgres implementations.

pub mod change;
pub mod engine;
pub mod error;
pub mod store;
pub mod tracking;

pub use change::events_for;
pub use engine::{StatusEngine, TransitionInput, Transitioned};
pub use error::ShipmentError;
pub use store::{InMemoryShipmentStore, PgShipmentStore, ShipmentStore};
pub use tracking::{TrackingService, TrackingSnapshot};
