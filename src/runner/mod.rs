//! Async runtime adapter around the pure [`GuidanceMachine`].
//!
//! The runner owns the machine and is its only driver. It turns the outside world into machine
//! inputs (bus events, control requests, clock ticks) one at a time, and after every step drains
//! the machine's output into a [`CommandSink`].
//!
//! ```ignore
//! let (bus, _) = tokio::sync::broadcast::channel(1024);
//! let (commands, mut outbound) = tokio::sync::mpsc::unbounded_channel();
//!
//! let (runner, handle) = GuidanceRunner::init(config, bus.subscribe(), commands);
//! tokio::spawn(runner.run());
//!
//! let mission = handle.start_mission(request).await?;
//! // ... publish PositionEstimate / AbortSignal events on `bus`, forward `outbound` to the vehicle
//! handle.shutdown().await?;
//! ```

pub mod error;
pub mod handle;
pub mod sink;

use std::time::Instant;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::GuidanceConfig;
use crate::messages::BusEvent;
use crate::state_machine::StateMachine;
use crate::state_machine::guidance::GuidanceMachine;
use crate::state_machine::wrappers::input::system::{SystemInput, SystemResource};
use crate::vehicle::VehicleId;

pub use self::error::RunnerError;
pub use self::handle::GuidanceHandle;
pub use self::sink::CommandSink;

use self::handle::ControlRequest;

const CONTROL_CHANNEL_CAPACITY: usize = 16;

/// Drives one vehicle's guidance session on a single task.
pub struct GuidanceRunner<S> {
    machine: GuidanceMachine,
    bus: broadcast::Receiver<BusEvent>,
    control: mpsc::Receiver<ControlRequest>,
    sink: S,
}

impl<S: CommandSink> GuidanceRunner<S> {
    /// Build the session and its control handle. Nothing runs until [`run`](Self::run).
    pub fn init(
        config: GuidanceConfig,
        bus: broadcast::Receiver<BusEvent>,
        sink: S,
    ) -> (Self, GuidanceHandle) {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let handle = GuidanceHandle::new(config.vehicle_id.clone(), control_tx);

        info!(
            vehicle_id = %config.vehicle_id,
            kind = ?config.vehicle_kind,
            keep_alive_ms = config.keep_alive_interval.as_millis() as u64,
            stale_ms = config.position_stale_timeout.as_millis() as u64,
            "Guidance session initialised"
        );

        let runner = Self {
            machine: GuidanceMachine::new(config),
            bus,
            control: control_rx,
            sink,
        };

        (runner, handle)
    }

    /// Process events until shutdown is requested or the bus closes.
    ///
    /// Losing every [`GuidanceHandle`] does not stop guidance; a running survey continues until
    /// it completes, is aborted over the bus, or the bus closes.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.machine.config().tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut control_open = true;

        loop {
            tokio::select! {
                biased;

                request = self.control.recv(), if control_open => match request {
                    Some(request) => {
                        if !self.handle_control(request) {
                            return;
                        }
                    }
                    None => {
                        debug!(vehicle_id = %self.vehicle_id(), "All guidance handles dropped");
                        control_open = false;
                    }
                },

                event = self.bus.recv() => match event {
                    Ok(event) => self.step(event),
                    Err(RecvError::Lagged(skipped)) => self.on_lagged(skipped),
                    Err(RecvError::Closed) => {
                        info!(vehicle_id = %self.vehicle_id(), "Bus closed");
                        break;
                    }
                },

                _ = ticker.tick() => {
                    self.tick();
                    self.flush();
                }
            }
        }

        self.shutdown();
    }

    fn vehicle_id(&self) -> &VehicleId {
        &self.machine.config().vehicle_id
    }

    /// Apply a control request. Returns `false` once the runner should stop.
    fn handle_control(&mut self, request: ControlRequest) -> bool {
        self.tick();

        match request {
            ControlRequest::StartMission { request, reply } => {
                let result = self.machine.start_mission(request);
                if let Err(e) = &result {
                    warn!(vehicle_id = %self.vehicle_id(), error = %e, "Mission rejected");
                }
                let _ = reply.send(result);
            }
            ControlRequest::StopMission { handle, reply } => {
                self.machine.stop_mission(&handle);
                let _ = reply.send(());
            }
            ControlRequest::Status { reply } => {
                let _ = reply.send(self.machine.status());
            }
            ControlRequest::Shutdown { reply } => {
                self.shutdown();
                let _ = reply.send(());
                return false;
            }
        }

        self.flush();
        true
    }

    fn step(&mut self, event: BusEvent) {
        self.tick();
        self.machine.process_input(SystemInput::Input(event));
        self.flush();
    }

    /// Lost bus events may include an abort for this vehicle, so the live mission is stopped.
    fn on_lagged(&mut self, skipped: u64) {
        warn!(vehicle_id = %self.vehicle_id(), skipped, "Bus receiver lagged, halting guidance");
        self.tick();
        self.machine.halt("bus events lost");
        self.flush();
    }

    fn tick(&mut self) {
        self.machine.process_input(SystemInput::System(Instant::generate()));
    }

    fn flush(&mut self) {
        while let Some(command) = self.machine.poll_output() {
            self.sink.emit(command);
        }
    }

    /// Stop the live mission, if any, and flush the resulting commands.
    fn shutdown(&mut self) {
        self.machine.halt("runner shut down");
        self.flush();
        info!(vehicle_id = %self.vehicle_id(), state = ?self.machine.state(), "Guidance session shut down");
    }
}
