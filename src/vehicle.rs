use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identity of a vehicle on the shared bus.
///
/// Every vehicle observes the traffic of every other vehicle, so position samples and abort
/// signals are matched against this id before they are allowed to touch guidance state. The name
/// is immutable; clones share it.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VehicleId(Arc<str>);

impl VehicleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for VehicleId {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

/// Parses an operator-supplied vehicle name, as found in configuration and env lists.
impl FromStr for VehicleId {
    type Err = InvalidVehicleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidVehicleId(s.to_string()));
        }
        Ok(Self::from(name))
    }
}

/// Indicates a vehicle name that is empty or contains whitespace.
#[derive(Debug, thiserror::Error)]
#[error("invalid vehicle id '{0}', expected a non-empty name without whitespace")]
pub struct InvalidVehicleId(pub String);

/// The kind of airframe or hull being guided, which decides how the vertical axis is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VehicleKind {
    /// Autonomous underwater vehicle, referenced by depth.
    #[default]
    Auv,
    /// Unmanned aerial vehicle, referenced by altitude.
    Uav,
}

impl FromStr for VehicleKind {
    type Err = UnknownVehicleKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUV" => Ok(Self::Auv),
            "UAV" => Ok(Self::Uav),
            _ => Err(UnknownVehicleKind(s.to_string())),
        }
    }
}

/// Indicates that a vehicle kind string was neither `AUV` nor `UAV`.
#[derive(Debug, thiserror::Error)]
#[error("unknown vehicle kind '{0}', expected AUV or UAV")]
pub struct UnknownVehicleKind(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_id_equality() {
        assert_eq!(VehicleId::from("caravela"), VehicleId::from(String::from("caravela")));
        assert_ne!(VehicleId::from("caravela"), VehicleId::from("lauv-xplore-1"));
    }

    #[test]
    fn test_vehicle_id_parse() {
        let id: VehicleId = " lauv-xplore-1 ".parse().unwrap();
        assert_eq!(id.as_str(), "lauv-xplore-1");
        assert_eq!(id.to_string(), "lauv-xplore-1");

        assert!("".parse::<VehicleId>().is_err());
        assert!("   ".parse::<VehicleId>().is_err());
        assert!("lauv xplore".parse::<VehicleId>().is_err());
    }

    #[test]
    fn test_vehicle_kind_parse() {
        assert_eq!("auv".parse::<VehicleKind>().unwrap(), VehicleKind::Auv);
        assert_eq!(" UAV ".parse::<VehicleKind>().unwrap(), VehicleKind::Uav);
        assert!("boat".parse::<VehicleKind>().is_err());
    }
}
