//! Error types for talking to a running guidance session.

use crate::mission::error::StartMissionError;
use crate::vehicle::VehicleId;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The runner task has exited and no longer accepts requests.
    #[error("guidance session for {vehicle_id} has shut down")]
    SessionClosed { vehicle_id: VehicleId },

    #[error("failed to start mission")]
    StartMission(#[from] StartMissionError),
}
