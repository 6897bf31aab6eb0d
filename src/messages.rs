//! Messages exchanged with the vehicle over the shared bus.
//!
//! Inbound events are [`BusEvent`]s; everything the guidance core emits is a [`GuidanceCommand`].
//! Only semantic fields are modelled here, the wire encoding belongs to whatever transport carries
//! them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bitflags::bitflags;

use crate::geo::GeoPoint;
use crate::vehicle::VehicleId;

/// Navigation estimate published by a vehicle.
///
/// `local_offset_x`/`local_offset_y` are metric north/east offsets from the `latitude`/`longitude`
/// reference, as navigation filters typically report them.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEstimate {
    pub vehicle_id: VehicleId,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_or_altitude: f64,
    pub local_offset_x: f64,
    pub local_offset_y: f64,
    pub timestamp: u64,
}

impl PositionEstimate {
    /// Absolute horizontal position with the local offsets applied.
    pub fn absolute(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
            .displaced(self.local_offset_x, self.local_offset_y)
    }
}

bitflags! {
    /// Proximity bits reported by the vehicle's reference follower.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Proximity: u8 {
        const FAR = 0x01;
        const XY_NEAR = 0x02;
        const Z_NEAR = 0x04;
        const XY_UNSAFE = 0x08;
        const Z_UNSAFE = 0x10;
    }
}

impl Proximity {
    /// Both horizontal and vertical near bits are set.
    pub fn is_near(self) -> bool {
        self.contains(Self::XY_NEAR | Self::Z_NEAR)
    }
}

/// What the vehicle's reference follower reports it is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    Wait,
    Goto,
    Loiter,
    Hover,
    Elevator,
    Timeout,
}

/// Feedback from the vehicle's reference follower.
///
/// Advisory only: arrival is decided by measured distance, never by `proximity`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFeedback {
    pub control_source_id: u16,
    pub control_entity_id: u8,
    pub proximity: Proximity,
    pub follow_state: FollowState,
}

/// Request to abort whatever the destination vehicle is doing.
#[derive(Debug, Clone, PartialEq)]
pub struct AbortSignal {
    pub destination_id: VehicleId,
}

/// Everything the guidance core consumes from the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    Position(PositionEstimate),
    Feedback(ReferenceFeedback),
    Abort(AbortSignal),
}

/// Units of the speed field of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedUnits {
    #[default]
    MetersPerSecond,
    Rpm,
    Percent,
}

impl FromStr for SpeedUnits {
    type Err = UnknownUnits;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m/s" => Ok(Self::MetersPerSecond),
            "rpm" => Ok(Self::Rpm),
            "%" => Ok(Self::Percent),
            _ => Err(UnknownUnits(s.to_string())),
        }
    }
}

impl fmt::Display for SpeedUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MetersPerSecond => "m/s",
            Self::Rpm => "rpm",
            Self::Percent => "%",
        })
    }
}

/// Reference frame of the vertical coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZUnits {
    #[default]
    Depth,
    Altitude,
    Height,
}

impl FromStr for ZUnits {
    type Err = UnknownUnits;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEPTH" => Ok(Self::Depth),
            "ALTITUDE" => Ok(Self::Altitude),
            "HEIGHT" => Ok(Self::Height),
            _ => Err(UnknownUnits(s.to_string())),
        }
    }
}

/// Indicates a units string that is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown units '{0}'")]
pub struct UnknownUnits(pub String);

bitflags! {
    /// Which fields of a [`ReferenceCommand`] the vehicle should honour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReferenceFlags: u8 {
        const LOCATION = 0x01;
        const SPEED = 0x02;
        const Z = 0x04;
        const RADIUS = 0x08;
        const START_POINT = 0x10;
        const DIRECT = 0x20;
        const MANDONE = 0x80;
    }
}

/// A single guidance target for the vehicle's reference follower.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCommand {
    pub latitude: f64,
    pub longitude: f64,
    pub depth_or_altitude: f64,
    pub z_units: ZUnits,
    pub speed: f64,
    pub speed_units: SpeedUnits,
    pub loiter_radius: f64,
    pub flags: ReferenceFlags,
}

/// Ask the vehicle's mission-execution plane to start a reference-following plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StartMissionCommand {
    pub plan_id: String,
    pub request_id: u16,
    pub maneuver_id: String,
    pub control_source_id: u16,
    pub control_entity_id: u8,
    pub loiter_radius: f64,
    pub timeout: Duration,
    pub ignore_errors: bool,
}

/// Ask the vehicle's mission-execution plane to stop a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StopMissionCommand {
    pub plan_id: String,
    pub request_id: u16,
}

/// Everything the guidance core emits.
#[derive(Debug, Clone, PartialEq)]
pub enum GuidanceCommand {
    StartMission(StartMissionCommand),
    StopMission(StopMissionCommand),
    Reference(ReferenceCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_applies_local_offsets() {
        let estimate = PositionEstimate {
            vehicle_id: VehicleId::from("caravela"),
            latitude: 41.0,
            longitude: -8.0,
            depth_or_altitude: 2.0,
            local_offset_x: 100.0,
            local_offset_y: 0.0,
            timestamp: 0,
        };

        let absolute = estimate.absolute();
        let (north, east) = GeoPoint::new(41.0, -8.0).offset_to(&absolute);
        assert!((north - 100.0).abs() < 1e-6);
        assert!(east.abs() < 1e-6);
    }

    #[test]
    fn test_proximity_near() {
        assert!((Proximity::XY_NEAR | Proximity::Z_NEAR).is_near());
        assert!(!Proximity::XY_NEAR.is_near());
        assert!(!Proximity::FAR.is_near());
        assert!(Proximity::from_bits_retain(0x06).is_near());
        assert_eq!(Proximity::from_bits(0x40), None);
    }

    #[test]
    fn test_reference_flags_combine() {
        let flags = ReferenceFlags::LOCATION | ReferenceFlags::Z;
        assert!(flags.contains(ReferenceFlags::LOCATION));
        assert!(!flags.contains(ReferenceFlags::SPEED));
        assert_eq!(flags.bits(), 0x05);
    }

    #[test]
    fn test_units_parse() {
        assert_eq!("m/s".parse::<SpeedUnits>().unwrap(), SpeedUnits::MetersPerSecond);
        assert_eq!("RPM".parse::<SpeedUnits>().unwrap(), SpeedUnits::Rpm);
        assert_eq!("%".parse::<SpeedUnits>().unwrap(), SpeedUnits::Percent);
        assert!("knots".parse::<SpeedUnits>().is_err());

        assert_eq!("altitude".parse::<ZUnits>().unwrap(), ZUnits::Altitude);
        assert!("pressure".parse::<ZUnits>().is_err());
    }
}
