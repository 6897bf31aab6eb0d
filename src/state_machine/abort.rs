use tracing::{trace, warn};

use super::StateMachine;
use crate::messages::AbortSignal;
use crate::vehicle::VehicleId;

/// Filters abort signals down to the ones addressed to this vehicle.
///
/// Any number of matching signals received between two polls collapse into a single
/// [`AbortRequest`].
pub struct AbortHandler {
    vehicle_id: VehicleId,
    received: u32,
    pending: bool,
}

/// An accepted abort for this vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortRequest {
    /// Total aborts accepted so far, including this one.
    pub count: u32,
}

impl AbortHandler {
    pub fn new(vehicle_id: VehicleId) -> Self {
        Self {
            vehicle_id,
            received: 0,
            pending: false,
        }
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    fn on_abort(&mut self, signal: AbortSignal) {
        if signal.destination_id != self.vehicle_id {
            trace!(
                vehicle_id = %self.vehicle_id,
                destination = %signal.destination_id,
                "Ignoring abort for another vehicle"
            );
            return;
        }

        self.received = self.received.saturating_add(1);
        self.pending = true;
        warn!(vehicle_id = %self.vehicle_id, count = self.received, "Abort received");
    }

    fn poll_abort(&mut self) -> Option<AbortRequest> {
        std::mem::take(&mut self.pending).then_some(AbortRequest {
            count: self.received,
        })
    }
}

impl StateMachine for AbortHandler {
    type Input = AbortSignal;
    type Output = AbortRequest;

    fn process_input(&mut self, input: Self::Input) {
        self.on_abort(input);
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.poll_abort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abort_for(id: &str) -> AbortSignal {
        AbortSignal {
            destination_id: VehicleId::from(id),
        }
    }

    #[test]
    fn test_accepts_own_abort() {
        let mut handler = AbortHandler::new(VehicleId::from("caravela"));
        handler.process_input(abort_for("caravela"));

        assert_eq!(handler.poll_output(), Some(AbortRequest { count: 1 }));
        assert!(handler.poll_output().is_none());
    }

    #[test]
    fn test_discards_foreign_abort() {
        let mut handler = AbortHandler::new(VehicleId::from("caravela"));
        handler.process_input(abort_for("lauv-xplore-2"));

        assert!(handler.poll_output().is_none());
        assert_eq!(handler.received(), 0);
    }

    #[test]
    fn test_repeated_aborts_collapse() {
        let mut handler = AbortHandler::new(VehicleId::from("caravela"));
        handler.process_input(abort_for("caravela"));
        handler.process_input(abort_for("caravela"));

        assert_eq!(handler.poll_output(), Some(AbortRequest { count: 2 }));
        assert!(handler.poll_output().is_none());
    }
}
