//! Status change detection.
//!
//! Maps an observed before/after status pair to the notification events it
//! should produce. Kept as a pure function so the "observe diff, then
//! notify" rule is testable without persistence or HTTP in the loop.

use parcelo_db::ShipmentStatus;
use parcelo_webhooks::ShipmentEvent;

/// Events to publish for a persisted status observation.
///
/// - No previous status (a freshly created shipment) produces
///   `shipment.created`.
/// - An unchanged status (a save touching other fields, or a repeated
///   carrier scan) produces nothing.
/// - A changed status produces `shipment.status_changed`, plus
///   `shipment.delivered` when the new status is `delivered`.
#[must_use]
pub fn events_for(
    previous: Option<ShipmentStatus>,
    current: ShipmentStatus,
) -> Vec<ShipmentEvent> {
    match previous {
        None => vec![ShipmentEvent::Created],
        Some(old) if old == current => Vec::new(),
        Some(_) => {
            let mut events = vec![ShipmentEvent::StatusChanged];
            if current == ShipmentStatus::Delivered {
                events.push(ShipmentEvent::Delivered);
            }
            events
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelo_db::ShipmentStatus::*;

    #[test]
    fn test_creation_produces_created_event() {
        assert_eq!(events_for(None, Created), vec![ShipmentEvent::Created]);
    }

    #[test]
    fn test_unchanged_status_produces_nothing() {
        for status in [Created, PickedUp, InTransit, Delivered] {
            assert!(events_for(Some(status), status).is_empty());
        }
    }

    #[test]
    fn test_change_produces_status_changed() {
        assert_eq!(
            events_for(Some(Created), PickedUp),
            vec![ShipmentEvent::StatusChanged]
        );
        assert_eq!(
            events_for(Some(Delivered), Returned),
            vec![ShipmentEvent::StatusChanged]
        );
    }

    #[test]
    fn test_delivery_adds_second_event_in_order() {
        assert_eq!(
            events_for(Some(OutForDelivery), Delivered),
            vec![ShipmentEvent::StatusChanged, ShipmentEvent::Delivered]
        );
        // Direct jump to delivered behaves the same.
        assert_eq!(
            events_for(Some(PickedUp), Delivered),
            vec![ShipmentEvent::StatusChanged, ShipmentEvent::Delivered]
        );
    }
}
