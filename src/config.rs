use std::time::Duration;

use bon::Builder;

use crate::messages::{SpeedUnits, ZUnits};
use crate::pattern::Tolerance;
use crate::vehicle::{VehicleId, VehicleKind};

/// Per-vehicle guidance configuration.
///
/// Defaults follow the parameters the survey task has historically shipped with for a small
/// surface/underwater vehicle.
#[derive(Debug, Clone, Builder)]
pub struct GuidanceConfig {
    /// Identity of the vehicle being guided. Traffic for other vehicles is ignored.
    #[builder(into)]
    pub vehicle_id: VehicleId,

    #[builder(default)]
    pub vehicle_kind: VehicleKind,

    /// Loiter radius in meters, used when a mission request does not set its own.
    #[builder(default = 7.5)]
    pub loiter_radius: f64,

    /// Horizontal arrival threshold in meters.
    #[builder(default = 15.0)]
    pub horizontal_tolerance: f64,

    /// Vertical arrival threshold in meters.
    #[builder(default = 1.0)]
    pub vertical_tolerance: f64,

    /// Cruise speed sent with every reference.
    #[builder(default = 1.2)]
    pub default_speed: f64,

    #[builder(default)]
    pub speed_units: SpeedUnits,

    /// Target depth or altitude for every survey waypoint.
    #[builder(default = 0.0)]
    pub default_z: f64,

    /// Vertical reference frame. Derived from [`vehicle_kind`](Self::vehicle_kind) when unset.
    pub z_units: Option<ZUnits>,

    /// A position sample older than this is not trusted for guidance.
    #[builder(default = Duration::from_secs(5))]
    pub position_stale_timeout: Duration,

    /// Longest allowed gap between reference dispatches while en route.
    #[builder(default = Duration::from_secs(3))]
    pub keep_alive_interval: Duration,

    /// How often the runner injects a clock tick when the bus is quiet.
    #[builder(default = Duration::from_millis(500))]
    pub tick_interval: Duration,

    /// Request id of the first mission-plane command; later commands count up from here.
    #[builder(default = 1000)]
    pub first_request_id: u16,
}

impl GuidanceConfig {
    pub fn z_units(&self) -> ZUnits {
        self.z_units.unwrap_or(match self.vehicle_kind {
            VehicleKind::Auv => ZUnits::Depth,
            VehicleKind::Uav => ZUnits::Altitude,
        })
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            horizontal: self.horizontal_tolerance,
            vertical: self.vertical_tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuidanceConfig::builder().vehicle_id("caravela").build();

        assert_eq!(config.vehicle_id, VehicleId::from("caravela"));
        assert_eq!(config.loiter_radius, 7.5);
        assert_eq!(config.speed_units, SpeedUnits::MetersPerSecond);
        assert_eq!(config.z_units(), ZUnits::Depth);
        assert_eq!(config.keep_alive_interval, Duration::from_secs(3));
        assert_eq!(config.first_request_id, 1000);
    }

    #[test]
    fn test_z_units_follow_vehicle_kind() {
        let uav = GuidanceConfig::builder()
            .vehicle_id("skywalker")
            .vehicle_kind(VehicleKind::Uav)
            .build();
        assert_eq!(uav.z_units(), ZUnits::Altitude);

        let explicit = GuidanceConfig::builder()
            .vehicle_id("skywalker")
            .vehicle_kind(VehicleKind::Uav)
            .z_units(ZUnits::Height)
            .build();
        assert_eq!(explicit.z_units(), ZUnits::Height);
    }
}
