//! The shipment status engine.
//!
//! Every status mutation flows through [`StatusEngine::transition`]:
//! validate against the transition table, persist via compare-and-swap,
//! append exactly one tracking event, then detect the change and hand the
//! resulting events to the webhook dispatcher. Notification is a visible
//! step of the same function rather than a persistence-layer side effect,
//! and its outcome never changes the result of the transition.

use std::sync::Arc;

use uuid::Uuid;

use parcelo_db::{NewTrackingEvent, Shipment, ShipmentStatus, TrackingEvent};
use parcelo_webhooks::WebhookDispatcher;

use crate::change::events_for;
use crate::error::ShipmentError;
use crate::store::ShipmentStore;

/// Optional details recorded with a transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionInput {
    /// Free-text description; auto-generated when absent.
    pub description: Option<String>,
    /// Where the change was observed (carrier scan location).
    pub location: Option<String>,
    /// The user who triggered the change, for audit attribution.
    pub actor_id: Option<Uuid>,
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct Transitioned {
    /// The shipment as persisted with its new status.
    pub shipment: Shipment,
    /// The history entry recorded for this transition.
    pub event: TrackingEvent,
}

/// Validates, applies, and records shipment status transitions.
#[derive(Clone)]
pub struct StatusEngine {
    store: Arc<dyn ShipmentStore>,
    dispatcher: Arc<WebhookDispatcher>,
}

impl StatusEngine {
    /// Create a new engine over a store and a dispatcher.
    #[must_use]
    pub fn new(store: Arc<dyn ShipmentStore>, dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Move a shipment to `target`, recording one tracking event.
    ///
    /// Fails with `InvalidTransition` when the transition table forbids the
    /// move, `NotFound` when the shipment is not visible to the tenant, and
    /// `Conflict` when another writer changed the status in between. On any
    /// failure no state is written and no event is appended.
    pub async fn transition(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
        target: ShipmentStatus,
        input: TransitionInput,
    ) -> Result<Transitioned, ShipmentError> {
        let shipment = self
            .store
            .get(tenant_id, shipment_id)
            .await?
            .ok_or(ShipmentError::NotFound)?;

        let from = shipment.status;
        if !from.can_transition_to(target) {
            tracing::info!(
                target: "status_engine",
                shipment_id = %shipment_id,
                tenant_id = %tenant_id,
                from = %from,
                to = %target,
                "Rejected status transition"
            );
            return Err(ShipmentError::InvalidTransition { from, to: target });
        }

        let updated = self
            .store
            .update_status_if(tenant_id, shipment_id, from, target)
            .await?
            .ok_or(ShipmentError::Conflict)?;

        let description = input
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("Status changed from {from} to {target}"));

        let event = self
            .store
            .append_event(NewTrackingEvent {
                shipment_id,
                status: target,
                description: Some(description),
                location: input.location,
                created_by: input.actor_id,
            })
            .await?;

        tracing::info!(
            target: "status_engine",
            shipment_id = %shipment_id,
            tenant_id = %tenant_id,
            tracking_number = %updated.tracking_number,
            from = %from,
            to = %target,
            "Shipment status updated"
        );

        // Fire-and-forget: delivery failures are contained in the dispatcher
        // and the transition result is already committed.
        for event_kind in events_for(Some(from), target) {
            self.dispatcher.notify(&updated, event_kind).await;
        }

        Ok(Transitioned {
            shipment: updated,
            event,
        })
    }

    /// Cancel a shipment.
    ///
    /// Legality comes entirely from the transition table: only shipments
    /// that have not entered active transit can be cancelled. Callers whose
    /// shipments are already moving get `InvalidTransition` and must go
    /// through a support workflow instead.
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        shipment_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<Transitioned, ShipmentError> {
        self.transition(
            tenant_id,
            shipment_id,
            ShipmentStatus::Cancelled,
            TransitionInput {
                description: Some("Shipment cancelled by user.".to_string()),
                location: None,
                actor_id,
            },
        )
        .await
    }

    /// Record the initial history entry for a freshly created shipment and
    /// publish `shipment.created`.
    ///
    /// Shipment creation itself happens in the booking flow; this makes the
    /// creation notification an explicit step of that flow.
    pub async fn record_creation(
        &self,
        shipment: &Shipment,
    ) -> Result<TrackingEvent, ShipmentError> {
        let event = self
            .store
            .append_event(NewTrackingEvent {
                shipment_id: shipment.id,
                status: shipment.status,
                description: Some("Shipment created".to_string()),
                location: None,
                created_by: None,
            })
            .await?;

        for event_kind in events_for(None, shipment.status) {
            self.dispatcher.notify(shipment, event_kind).await;
        }

        Ok(event)
    }
}
