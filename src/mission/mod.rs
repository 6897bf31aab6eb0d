pub mod error;

use std::fmt;
use std::time::Duration;

use bon::Builder;
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::pattern::{LawnmowerPattern, Waypoint};

/// Plan name used when a request does not provide one.
pub const DEFAULT_PLAN_ID: &str = "lawnmower_plan";

/// Maneuver name of the single reference-following maneuver in every plan.
pub const FOLLOW_REFERENCE_MANEUVER_ID: &str = "followref";

#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct MissionId(Uuid);

impl MissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MissionId({})", self.0)
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to start a lawnmower survey.
///
/// The [`MissionId`] is generated by the builder, outside of any state machine, so that mission
/// creation itself stays deterministic.
#[derive(Debug, Clone, Builder)]
pub struct MissionRequest {
    #[builder(default = MissionId::generate())]
    pub mission_id: MissionId,

    #[builder(into, default = DEFAULT_PLAN_ID.to_string())]
    pub plan_id: String,

    /// First waypoint of the survey.
    pub origin: GeoPoint,

    pub pattern: LawnmowerPattern,

    #[builder(default = 0xFFFF)]
    pub control_source_id: u16,

    #[builder(default = 0xFF)]
    pub control_entity_id: u8,

    /// Overrides the configured loiter radius for this mission.
    pub loiter_radius: Option<f64>,

    /// Reference-following timeout handed to the vehicle with the start command.
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
}

/// Caller-side reference to a created mission, used to stop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionHandle {
    pub mission_id: MissionId,
    pub plan_id: String,
}

/// A live survey: the waypoints generated at creation and the progress through them.
#[derive(Debug, Clone)]
pub struct Mission {
    id: MissionId,
    plan_id: String,
    waypoints: Vec<Waypoint>,
    current_index: usize,
    control_source_id: u16,
    control_entity_id: u8,
    loiter_radius: f64,
}

impl Mission {
    pub(crate) fn new(
        request: &MissionRequest,
        waypoints: Vec<Waypoint>,
        loiter_radius: f64,
    ) -> Self {
        Self {
            id: request.mission_id,
            plan_id: request.plan_id.clone(),
            waypoints,
            current_index: 0,
            control_source_id: request.control_source_id,
            control_entity_id: request.control_entity_id,
            loiter_radius,
        }
    }

    pub fn id(&self) -> &MissionId {
        &self.id
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current_index)
    }

    pub fn is_last_waypoint(&self) -> bool {
        self.current_index + 1 >= self.waypoints.len()
    }

    pub fn control_source_id(&self) -> u16 {
        self.control_source_id
    }

    pub fn control_entity_id(&self) -> u8 {
        self.control_entity_id
    }

    pub fn loiter_radius(&self) -> f64 {
        self.loiter_radius
    }

    pub fn handle(&self) -> MissionHandle {
        MissionHandle {
            mission_id: self.id,
            plan_id: self.plan_id.clone(),
        }
    }

    /// Move to the next waypoint. The index never passes the number of waypoints.
    pub(crate) fn advance(&mut self) -> Option<&Waypoint> {
        self.current_index = (self.current_index + 1).min(self.waypoints.len());
        self.current_waypoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Tolerance;

    fn request() -> MissionRequest {
        MissionRequest::builder()
            .origin(GeoPoint::new(10.0, 20.0))
            .pattern(LawnmowerPattern::new(10.0, 25.0, 3))
            .build()
    }

    fn mission() -> Mission {
        let request = request();
        let waypoints = request
            .pattern
            .generate(
                request.origin,
                0.0,
                Tolerance {
                    horizontal: 1.0,
                    vertical: 1.0,
                },
            )
            .unwrap();
        Mission::new(&request, waypoints, 7.5)
    }

    #[test]
    fn test_request_defaults() {
        let request = request();
        assert_eq!(request.plan_id, DEFAULT_PLAN_ID);
        assert_eq!(request.control_source_id, 0xFFFF);
        assert_eq!(request.control_entity_id, 0xFF);
        assert_eq!(request.loiter_radius, None);
        assert_eq!(request.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(request().mission_id, request().mission_id);
    }

    #[test]
    fn test_advance_is_bounded() {
        let mut mission = mission();
        assert_eq!(mission.current_index(), 0);
        assert!(!mission.is_last_waypoint());

        assert!(mission.advance().is_some());
        assert!(mission.advance().is_some());
        assert!(mission.is_last_waypoint());

        assert!(mission.advance().is_none());
        assert_eq!(mission.current_index(), 3);
        assert!(mission.advance().is_none());
        assert_eq!(mission.current_index(), 3);
    }

    #[test]
    fn test_handle_matches_mission() {
        let mission = mission();
        let handle = mission.handle();
        assert_eq!(&handle.mission_id, mission.id());
        assert_eq!(handle.plan_id, DEFAULT_PLAN_ID);
    }
}
