//! Waypoint sequencing for a lawnmower survey.
//!
//! ```text
//!  IDLE --mission--> WAITING --fresh position--> EN_ROUTE --within tolerance--> ARRIVED
//!                       ^                           |                              |
//!                       +------ position stale -----+        more waypoints: EN_ROUTE
//!                                                             last waypoint: COMPLETE
//!
//!  any non-terminal state --abort / stop--> ABORTED
//! ```
//!
//! ARRIVED is transient: it is resolved to EN_ROUTE or COMPLETE while handling the same position
//! sample, so the waypoint index moves by exactly one per accepted sample at most.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use super::StateMachine;
use super::abort::AbortHandler;
use super::plan::{PlanController, PlanInput, PlanStart};
use super::position::{PositionInput, PositionOutput, PositionTracker};
use super::wrappers::input::system::SystemInput;
use crate::config::GuidanceConfig;
use crate::messages::{
    AbortSignal, BusEvent, FollowState, GuidanceCommand, PositionEstimate, ReferenceCommand,
    ReferenceFeedback, ReferenceFlags,
};
use crate::mission::error::StartMissionError;
use crate::mission::{Mission, MissionHandle, MissionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidanceState {
    Idle,
    Waiting,
    EnRoute,
    Arrived,
    Complete,
    Aborted,
}

impl GuidanceState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Aborted)
    }

    /// A mission exists and is being worked on.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::EnRoute | Self::Arrived)
    }
}

/// Snapshot of a guidance session for callers outside the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceStatus {
    pub state: GuidanceState,
    pub plan_id: Option<String>,
    pub current_index: Option<usize>,
    pub waypoint_count: usize,
}

/// Input of the [`GuidanceMachine`]: bus events, or the current time as a clock tick.
pub type GuidanceInput = SystemInput<BusEvent, Instant>;

/// The guidance session of one vehicle.
///
/// Owns the mission, the position cache, the plan controller and the abort filter, and is the only
/// place any of them is mutated. Every [`GuidanceInput::System`] tick advances the internal clock
/// and runs the staleness and keep-alive checks.
pub struct GuidanceMachine {
    config: GuidanceConfig,
    state: GuidanceState,
    mission: Option<Mission>,
    tracker: PositionTracker,
    plan: PlanController,
    abort: AbortHandler,
    now: Option<Instant>,
    last_dispatch: Option<Instant>,
    last_feedback: Option<ReferenceFeedback>,
    position_lost: bool,
    pending_references: VecDeque<ReferenceCommand>,
}

impl GuidanceMachine {
    pub fn new(config: GuidanceConfig) -> Self {
        Self {
            tracker: PositionTracker::new(
                config.vehicle_id.clone(),
                config.position_stale_timeout,
            ),
            plan: PlanController::new(config.first_request_id),
            abort: AbortHandler::new(config.vehicle_id.clone()),
            config,
            state: GuidanceState::Idle,
            mission: None,
            now: None,
            last_dispatch: None,
            last_feedback: None,
            position_lost: false,
            pending_references: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    pub fn state(&self) -> GuidanceState {
        self.state
    }

    pub fn mission(&self) -> Option<&Mission> {
        self.mission.as_ref()
    }

    /// Latest accepted position of this vehicle, fresh or not.
    pub fn position(&self) -> Option<&PositionEstimate> {
        self.tracker.latest()
    }

    pub fn last_feedback(&self) -> Option<&ReferenceFeedback> {
        self.last_feedback.as_ref()
    }

    pub fn status(&self) -> GuidanceStatus {
        GuidanceStatus {
            state: self.state,
            plan_id: self.mission.as_ref().map(|m| m.plan_id().to_string()),
            current_index: self.mission.as_ref().map(Mission::current_index),
            waypoint_count: self.mission.as_ref().map_or(0, |m| m.waypoints().len()),
        }
    }

    /// Create a mission and queue the plan start for the vehicle.
    ///
    /// Waypoints are generated once, here. On error nothing is queued and the state is unchanged.
    pub fn start_mission(
        &mut self,
        request: MissionRequest,
    ) -> Result<MissionHandle, StartMissionError> {
        if let Some(mission) = &self.mission {
            return Err(StartMissionError::MissionAlreadyActive {
                plan_id: mission.plan_id().to_string(),
            });
        }

        let waypoints = request.pattern.generate(
            request.origin,
            self.config.default_z,
            self.config.tolerance(),
        )?;
        let loiter_radius = request.loiter_radius.unwrap_or(self.config.loiter_radius);
        let mission = Mission::new(&request, waypoints, loiter_radius);
        let handle = mission.handle();

        self.plan.process_input(PlanInput::Start(PlanStart {
            plan_id: request.plan_id,
            control_source_id: request.control_source_id,
            control_entity_id: request.control_entity_id,
            loiter_radius,
            timeout: request.timeout,
        }));

        info!(
            vehicle_id = %self.config.vehicle_id,
            plan_id = %handle.plan_id,
            mission_id = %handle.mission_id,
            waypoints = mission.waypoints().len(),
            "Mission created"
        );

        self.mission = Some(mission);
        self.state = GuidanceState::Waiting;
        self.last_dispatch = None;
        self.last_feedback = None;
        self.position_lost = false;
        self.pending_references.clear();

        if self.now.is_some_and(|now| self.tracker.is_fresh(now)) {
            self.enter_en_route();
        }

        Ok(handle)
    }

    /// Stop the mission behind `handle`. Stopping anything but the live mission is a no-op.
    pub fn stop_mission(&mut self, handle: &MissionHandle) {
        let is_live = self
            .mission
            .as_ref()
            .is_some_and(|mission| mission.id() == &handle.mission_id);

        if is_live {
            self.abort_mission("stop requested");
        } else {
            debug!(
                vehicle_id = %self.config.vehicle_id,
                mission_id = %handle.mission_id,
                "Ignoring stop for a mission that is not running"
            );
        }
    }

    /// Abort the live mission, if any, as if an abort signal had been accepted.
    ///
    /// Used when inbound events were lost and an abort for this vehicle may have been among them.
    pub fn halt(&mut self, reason: &'static str) {
        self.abort_mission(reason);
    }

    fn on_tick(&mut self, now: Instant) {
        self.now = Some(now);

        if self.state != GuidanceState::EnRoute {
            return;
        }

        if !self.tracker.is_fresh(now) {
            self.state = GuidanceState::Waiting;
            self.position_lost = true;
            warn!(
                vehicle_id = %self.config.vehicle_id,
                timeout_ms = self.config.position_stale_timeout.as_millis() as u64,
                "Position stale, suspending reference dispatch"
            );
            return;
        }

        let keep_alive_due = self.last_dispatch.is_none_or(|at| {
            now.saturating_duration_since(at) >= self.config.keep_alive_interval
        });
        if keep_alive_due {
            self.dispatch_current();
        }
    }

    fn on_position(&mut self, sample: PositionEstimate) {
        let Some(now) = self.now else {
            debug!(vehicle_id = %self.config.vehicle_id, "No clock yet, dropping position sample");
            return;
        };

        self.tracker.process_input(PositionInput::Sample {
            sample,
            received_at: now,
        });
        let Some(PositionOutput::Accepted(sample)) = self.tracker.poll_output() else {
            return;
        };

        match self.state {
            GuidanceState::Waiting => {
                if self.position_lost {
                    info!(vehicle_id = %self.config.vehicle_id, "Position recovered, resuming guidance");
                }
                self.enter_en_route();
            }
            GuidanceState::EnRoute => self.check_arrival(&sample),
            _ => {}
        }
    }

    fn check_arrival(&mut self, sample: &PositionEstimate) {
        let Some(mission) = &self.mission else {
            return;
        };
        let Some(waypoint) = mission.current_waypoint() else {
            return;
        };

        let position = sample.absolute();
        if !waypoint.is_reached(&position, sample.depth_or_altitude) {
            trace!(
                vehicle_id = %self.config.vehicle_id,
                index = mission.current_index(),
                distance_m = waypoint.point.horizontal_distance(&position),
                "En route"
            );
            return;
        }

        info!(
            vehicle_id = %self.config.vehicle_id,
            index = mission.current_index(),
            of = mission.waypoints().len(),
            "Waypoint reached"
        );
        self.state = GuidanceState::Arrived;

        let finished = match self.mission.as_mut() {
            Some(mission) if mission.is_last_waypoint() => true,
            Some(mission) => {
                mission.advance();
                false
            }
            None => return,
        };

        if finished {
            self.complete();
        } else {
            self.enter_en_route();
        }
    }

    fn on_feedback(&mut self, feedback: ReferenceFeedback) {
        let Some(mission) = &self.mission else {
            return;
        };
        if feedback.control_source_id != mission.control_source_id()
            || feedback.control_entity_id != mission.control_entity_id()
        {
            trace!(
                vehicle_id = %self.config.vehicle_id,
                control_source_id = feedback.control_source_id,
                control_entity_id = feedback.control_entity_id,
                "Ignoring feedback for another controller"
            );
            return;
        }

        debug!(
            vehicle_id = %self.config.vehicle_id,
            proximity = feedback.proximity.bits(),
            follow_state = ?feedback.follow_state,
            "Reference feedback"
        );

        if self.state == GuidanceState::EnRoute {
            if feedback.proximity.is_near() {
                debug!(
                    vehicle_id = %self.config.vehicle_id,
                    "Follower reports proximity, waiting for a position within tolerance"
                );
            }
            if feedback.follow_state == FollowState::Timeout {
                warn!(
                    vehicle_id = %self.config.vehicle_id,
                    "Reference follower timed out, refreshing reference"
                );
                self.dispatch_current();
            }
        }

        self.last_feedback = Some(feedback);
    }

    fn on_abort(&mut self, signal: AbortSignal) {
        self.abort.process_input(signal);
        if self.abort.poll_output().is_none() {
            return;
        }

        if self.mission.is_none() {
            debug!(
                vehicle_id = %self.config.vehicle_id,
                state = ?self.state,
                "Abort with no active mission"
            );
            return;
        }

        self.abort_mission("abort signal");
    }

    fn enter_en_route(&mut self) {
        self.state = GuidanceState::EnRoute;
        self.position_lost = false;
        self.dispatch_current();
    }

    fn complete(&mut self) {
        let Some(mut mission) = self.mission.take() else {
            return;
        };
        mission.advance();

        self.state = GuidanceState::Complete;
        self.pending_references.clear();
        self.plan.process_input(PlanInput::Stop);

        info!(
            vehicle_id = %self.config.vehicle_id,
            plan_id = %mission.plan_id(),
            waypoints = mission.current_index(),
            "Survey complete"
        );
    }

    fn abort_mission(&mut self, reason: &'static str) {
        let Some(mission) = self.mission.take() else {
            return;
        };

        self.state = GuidanceState::Aborted;
        self.pending_references.clear();
        self.plan.process_input(PlanInput::Stop);

        info!(
            vehicle_id = %self.config.vehicle_id,
            plan_id = %mission.plan_id(),
            index = mission.current_index(),
            reason,
            "Mission aborted"
        );
    }

    fn dispatch_current(&mut self) {
        if !matches!(self.state, GuidanceState::Waiting | GuidanceState::EnRoute) {
            return;
        }
        let Some(mission) = &self.mission else {
            return;
        };
        let Some(waypoint) = mission.current_waypoint() else {
            return;
        };

        let reference = ReferenceCommand {
            latitude: waypoint.latitude(),
            longitude: waypoint.longitude(),
            depth_or_altitude: waypoint.target_z,
            z_units: self.config.z_units(),
            speed: self.config.default_speed,
            speed_units: self.config.speed_units,
            loiter_radius: mission.loiter_radius(),
            flags: ReferenceFlags::LOCATION
                | ReferenceFlags::SPEED
                | ReferenceFlags::Z
                | ReferenceFlags::RADIUS,
        };

        debug!(
            vehicle_id = %self.config.vehicle_id,
            index = mission.current_index(),
            lat = reference.latitude,
            lon = reference.longitude,
            z = reference.depth_or_altitude,
            "Dispatching reference"
        );

        self.pending_references.push_back(reference);
        self.last_dispatch = self.now;
    }
}

impl StateMachine for GuidanceMachine {
    type Input = GuidanceInput;
    type Output = GuidanceCommand;

    fn process_input(&mut self, input: Self::Input) {
        match input {
            SystemInput::System(now) => self.on_tick(now),
            SystemInput::Input(BusEvent::Position(sample)) => self.on_position(sample),
            SystemInput::Input(BusEvent::Feedback(feedback)) => self.on_feedback(feedback),
            SystemInput::Input(BusEvent::Abort(signal)) => self.on_abort(signal),
        }
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        if let Some(command) = self.plan.poll_output() {
            return Some(command.into());
        }

        self.pending_references
            .pop_front()
            .map(GuidanceCommand::Reference)
    }
}
