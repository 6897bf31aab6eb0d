use tokio::sync::{mpsc, oneshot};

use crate::mission::error::StartMissionError;
use crate::mission::{MissionHandle, MissionRequest};
use crate::runner::error::RunnerError;
use crate::state_machine::guidance::GuidanceStatus;
use crate::vehicle::VehicleId;

/// Requests from a [`GuidanceHandle`] to its runner, each with a reply channel.
pub(crate) enum ControlRequest {
    StartMission {
        request: MissionRequest,
        reply: oneshot::Sender<Result<MissionHandle, StartMissionError>>,
    },
    StopMission {
        handle: MissionHandle,
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<GuidanceStatus>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable control handle for one vehicle's guidance runner.
#[derive(Debug, Clone)]
pub struct GuidanceHandle {
    vehicle_id: VehicleId,
    control: mpsc::Sender<ControlRequest>,
}

impl GuidanceHandle {
    pub(crate) fn new(vehicle_id: VehicleId, control: mpsc::Sender<ControlRequest>) -> Self {
        Self {
            vehicle_id,
            control,
        }
    }

    pub fn vehicle_id(&self) -> &VehicleId {
        &self.vehicle_id
    }

    /// Start a survey. Fails synchronously on bad geometry or when a mission is already live.
    pub async fn start_mission(&self, request: MissionRequest) -> Result<MissionHandle, RunnerError> {
        let result = self
            .call(|reply| ControlRequest::StartMission { request, reply })
            .await?;
        Ok(result?)
    }

    /// Stop a mission. Always succeeds locally once the runner has seen the request.
    pub async fn stop_mission(&self, handle: MissionHandle) -> Result<(), RunnerError> {
        self.call(|reply| ControlRequest::StopMission { handle, reply })
            .await
    }

    pub async fn status(&self) -> Result<GuidanceStatus, RunnerError> {
        self.call(|reply| ControlRequest::Status { reply }).await
    }

    /// Stop any live mission and end the runner.
    pub async fn shutdown(&self) -> Result<(), RunnerError> {
        self.call(|reply| ControlRequest::Shutdown { reply }).await
    }

    async fn call<T>(
        &self,
        make_request: impl FnOnce(oneshot::Sender<T>) -> ControlRequest,
    ) -> Result<T, RunnerError> {
        let (reply, response) = oneshot::channel();

        self.control
            .send(make_request(reply))
            .await
            .map_err(|_| self.closed())?;

        response.await.map_err(|_| self.closed())
    }

    fn closed(&self) -> RunnerError {
        RunnerError::SessionClosed {
            vehicle_id: self.vehicle_id.clone(),
        }
    }
}
