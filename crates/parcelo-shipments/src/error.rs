//! Error types for the shipment lifecycle engine.

use parcelo_db::{DbError, ShipmentStatus};

/// Shipment engine error variants.
#[derive(Debug, thiserror::Error)]
pub enum ShipmentError {
    /// The requested status is not reachable from the current status.
    /// Surfaced to the caller as a rejected request; never retried.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    /// The shipment does not exist or is not owned by the caller's tenant.
    #[error("Shipment not found")]
    NotFound,

    /// Another writer changed the status between read and write. The caller
    /// may re-read and retry with the fresh state.
    #[error("Shipment status changed concurrently")]
    Conflict,

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl ShipmentError {
    /// Check if this error indicates a rejected transition.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, ShipmentError::InvalidTransition { .. })
    }

    /// Check if this error indicates a lost concurrent race.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ShipmentError::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display_names_both_states() {
        let err = ShipmentError::InvalidTransition {
            from: ShipmentStatus::Cancelled,
            to: ShipmentStatus::InTransit,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from cancelled to in_transit"
        );
        assert!(err.is_invalid_transition());
        assert!(!err.is_conflict());
    }
}
