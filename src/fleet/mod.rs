pub mod error;

use std::fmt;

use dashmap::{DashMap, Entry};
use uuid::Uuid;

use crate::runner::GuidanceHandle;
use crate::vehicle::VehicleId;

use self::error::{SessionAlreadyActive, SessionNotFound};

#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct GuidanceSession {
    pub session_id: SessionId,
    pub handle: GuidanceHandle,
}

/// Registry of guidance sessions, at most one per vehicle.
///
/// Sessions are keyed by the vehicle id of their handle, so a second runner for the same vehicle
/// cannot be registered while the first one is still listed.
#[derive(Debug)]
pub struct GuidanceFleet {
    sessions: DashMap<VehicleId, GuidanceSession, ahash::RandomState>,
}

impl GuidanceFleet {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::default(),
        }
    }

    pub fn register(&self, handle: GuidanceHandle) -> Result<SessionId, SessionAlreadyActive> {
        match self.sessions.entry(handle.vehicle_id().clone()) {
            Entry::Occupied(entry) => Err(SessionAlreadyActive {
                vehicle_id: entry.key().clone(),
            }),
            Entry::Vacant(slot) => {
                let session_id = SessionId::generate();
                slot.insert(GuidanceSession {
                    session_id,
                    handle,
                });
                Ok(session_id)
            }
        }
    }

    pub fn remove(&self, vehicle_id: &VehicleId) -> Result<GuidanceSession, SessionNotFound> {
        self.sessions
            .remove(vehicle_id)
            .map(|(_, session)| session)
            .ok_or_else(|| SessionNotFound {
                vehicle_id: vehicle_id.clone(),
            })
    }

    pub fn handle(&self, vehicle_id: &VehicleId) -> Result<GuidanceHandle, SessionNotFound> {
        self.sessions
            .get(vehicle_id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| SessionNotFound {
                vehicle_id: vehicle_id.clone(),
            })
    }

    pub fn has_session(&self, vehicle_id: &VehicleId) -> bool {
        self.sessions.contains_key(vehicle_id)
    }

    /// Handles of every registered session, in no particular order.
    pub fn handles(&self) -> Vec<GuidanceHandle> {
        self.sessions
            .iter()
            .map(|entry| entry.handle.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for GuidanceFleet {
    fn default() -> Self {
        Self::new()
    }
}
