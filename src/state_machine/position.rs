use std::time::{Duration, Instant};

use tracing::trace;

use super::StateMachine;
use crate::messages::PositionEstimate;
use crate::vehicle::VehicleId;

/// How trustworthy the cached position is at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No sample for this vehicle has been accepted yet.
    Absent,
    Fresh,
    /// The last accepted sample is older than the stale timeout.
    Stale,
}

/// Single-writer cache of this vehicle's latest position estimate.
///
/// Samples for other vehicles are dropped silently. Accepted samples replace the cache wholesale;
/// there is no smoothing and no history.
pub struct PositionTracker {
    vehicle_id: VehicleId,
    stale_timeout: Duration,
    latest: Option<PositionEstimate>,
    received_at: Option<Instant>,
    pending: bool,
}

impl PositionTracker {
    pub fn new(vehicle_id: VehicleId, stale_timeout: Duration) -> Self {
        Self {
            vehicle_id,
            stale_timeout,
            latest: None,
            received_at: None,
            pending: false,
        }
    }

    pub fn latest(&self) -> Option<&PositionEstimate> {
        self.latest.as_ref()
    }

    pub fn freshness(&self, now: Instant) -> Freshness {
        match self.received_at {
            None => Freshness::Absent,
            Some(at) if now.saturating_duration_since(at) > self.stale_timeout => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.freshness(now) == Freshness::Fresh
    }

    fn update_position(&mut self, sample: PositionEstimate, received_at: Instant) {
        if sample.vehicle_id != self.vehicle_id {
            trace!(
                vehicle_id = %self.vehicle_id,
                sender = %sample.vehicle_id,
                "Ignoring position of another vehicle"
            );
            return;
        }

        self.latest = Some(sample);
        self.received_at = Some(received_at);
        self.pending = true;
    }

    fn poll_position(&mut self) -> Option<PositionEstimate> {
        if self.pending {
            self.pending = false;
            self.latest.clone()
        } else {
            None
        }
    }
}

pub enum PositionInput {
    Sample {
        sample: PositionEstimate,
        received_at: Instant,
    },
}

pub enum PositionOutput {
    /// A sample for this vehicle was accepted since the last poll.
    Accepted(PositionEstimate),
}

impl StateMachine for PositionTracker {
    type Input = PositionInput;
    type Output = PositionOutput;

    fn process_input(&mut self, input: Self::Input) {
        match input {
            PositionInput::Sample {
                sample,
                received_at,
            } => self.update_position(sample, received_at),
        }
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.poll_position().map(PositionOutput::Accepted)
    }
}
