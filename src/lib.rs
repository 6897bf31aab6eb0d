//! Reference-following guidance for lawnmower coverage surveys.
//!
//! A vehicle is put into reference-following by starting a single-maneuver plan, then fed one
//! survey waypoint at a time. The guidance core is a set of pure state machines
//! ([`state_machine`]) driven by an async [`runner`] that connects them to the bus.

pub mod config;
pub mod fleet;
pub mod geo;
pub mod messages;
pub mod mission;
pub mod pattern;
pub mod runner;
pub mod state_machine;
pub mod vehicle;

pub use config::GuidanceConfig;
pub use fleet::GuidanceFleet;
pub use messages::{BusEvent, GuidanceCommand};
pub use mission::{MissionHandle, MissionRequest};
pub use runner::{CommandSink, GuidanceHandle, GuidanceRunner, RunnerError};
pub use state_machine::StateMachine;
pub use state_machine::guidance::{GuidanceMachine, GuidanceState, GuidanceStatus};
pub use vehicle::{VehicleId, VehicleKind};

/// Capacity of the bus channel used by the bundled binaries.
pub const BUS_CAPACITY: usize = 1024;
