//! Error types for fleet session management.

use crate::vehicle::VehicleId;

/// Indicates that a guidance session could not be registered because one already exists.
#[derive(Debug, thiserror::Error)]
#[error("vehicle {vehicle_id} already has an active guidance session")]
pub struct SessionAlreadyActive {
    pub vehicle_id: VehicleId,
}

/// Indicates that no guidance session is registered for the vehicle.
#[derive(Debug, thiserror::Error)]
#[error("no guidance session for vehicle {vehicle_id}")]
pub struct SessionNotFound {
    pub vehicle_id: VehicleId,
}
