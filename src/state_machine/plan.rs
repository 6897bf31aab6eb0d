use std::collections::VecDeque;
use std::time::Duration;

use tracing::debug;

use super::StateMachine;
use crate::messages::{GuidanceCommand, StartMissionCommand, StopMissionCommand};
use crate::mission::FOLLOW_REFERENCE_MANEUVER_ID;

/// Issues start/stop commands to the vehicle's mission-execution plane.
///
/// Commands are fire-and-forget: no acknowledgement is awaited or expected. Stopping is
/// idempotent, a stop with no running plan queues nothing.
pub struct PlanController {
    next_request_id: u16,
    active_plan: Option<String>,
    pending_commands: VecDeque<PlanCommand>,
}

impl PlanController {
    pub fn new(first_request_id: u16) -> Self {
        Self {
            next_request_id: first_request_id,
            active_plan: None,
            pending_commands: VecDeque::new(),
        }
    }

    pub fn active_plan(&self) -> Option<&str> {
        self.active_plan.as_deref()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_commands.len()
    }

    fn request_id(&mut self) -> u16 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    fn start(&mut self, start: PlanStart) {
        // A plan still marked active is superseded rather than left running.
        self.stop();

        let request_id = self.request_id();
        debug!(plan_id = %start.plan_id, request_id, "Queuing plan start");

        self.active_plan = Some(start.plan_id.clone());
        self.pending_commands
            .push_back(PlanCommand::Start(StartMissionCommand {
                plan_id: start.plan_id,
                request_id,
                maneuver_id: FOLLOW_REFERENCE_MANEUVER_ID.to_string(),
                control_source_id: start.control_source_id,
                control_entity_id: start.control_entity_id,
                loiter_radius: start.loiter_radius,
                timeout: start.timeout,
                ignore_errors: true,
            }));
    }

    fn stop(&mut self) {
        let Some(plan_id) = self.active_plan.take() else {
            return;
        };

        let request_id = self.request_id();
        debug!(plan_id = %plan_id, request_id, "Queuing plan stop");

        self.pending_commands
            .push_back(PlanCommand::Stop(StopMissionCommand {
                plan_id,
                request_id,
            }));
    }

    fn dequeue(&mut self) -> Option<PlanCommand> {
        self.pending_commands.pop_front()
    }
}

/// Arguments of a plan start.
#[derive(Debug, Clone)]
pub struct PlanStart {
    pub plan_id: String,
    pub control_source_id: u16,
    pub control_entity_id: u8,
    pub loiter_radius: f64,
    pub timeout: Duration,
}

pub enum PlanInput {
    Start(PlanStart),
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanCommand {
    Start(StartMissionCommand),
    Stop(StopMissionCommand),
}

impl From<PlanCommand> for GuidanceCommand {
    fn from(command: PlanCommand) -> Self {
        match command {
            PlanCommand::Start(start) => GuidanceCommand::StartMission(start),
            PlanCommand::Stop(stop) => GuidanceCommand::StopMission(stop),
        }
    }
}

impl StateMachine for PlanController {
    type Input = PlanInput;
    type Output = PlanCommand;

    fn process_input(&mut self, input: Self::Input) {
        match input {
            PlanInput::Start(start) => self.start(start),
            PlanInput::Stop => self.stop(),
        }
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.dequeue()
    }
}
