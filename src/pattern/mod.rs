pub mod error;

use crate::geo::{GeoPoint, MAX_LATITUDE_DEG};

use self::error::InvalidPattern;

/// Arrival thresholds attached to every generated waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Maximum planar distance in meters.
    pub horizontal: f64,
    /// Maximum depth/altitude difference in meters.
    pub vertical: f64,
}

/// A single survey target. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub point: GeoPoint,
    pub target_z: f64,
    pub tolerance: Tolerance,
}

impl Waypoint {
    pub fn latitude(&self) -> f64 {
        self.point.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.point.longitude
    }

    /// Whether a vehicle at `position` and vertical coordinate `z` is within both tolerances.
    pub fn is_reached(&self, position: &GeoPoint, z: f64) -> bool {
        self.point.horizontal_distance(position) <= self.tolerance.horizontal
            && (z - self.target_z).abs() <= self.tolerance.vertical
    }
}

/// Geometry of a boustrophedon ("lawnmower") sweep.
///
/// The vehicle sweeps east for `leg_length` meters, steps north by `leg_spacing`, sweeps back
/// west, steps north again, and so on. Each waypoint ends one leg of the path; `leg_count` is the
/// number of waypoints produced.
///
/// ```text
///   wp4 ------> wp5
///    ^
///   wp3 <------ wp2
///                ^
///   wp0 ------> wp1
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LawnmowerPattern {
    pub leg_length: f64,
    pub leg_spacing: f64,
    pub leg_count: usize,
}

impl LawnmowerPattern {
    pub fn new(leg_length: f64, leg_spacing: f64, leg_count: usize) -> Self {
        Self {
            leg_length,
            leg_spacing,
            leg_count,
        }
    }

    /// Check the geometry against `origin` without generating anything.
    pub fn validate(&self, origin: &GeoPoint) -> Result<(), InvalidPattern> {
        // Negated comparisons so NaN is rejected too.
        if !(origin.latitude.abs() <= MAX_LATITUDE_DEG) {
            return Err(InvalidPattern::NearPole {
                latitude: origin.latitude,
            });
        }
        if !origin.longitude.is_finite() {
            return Err(InvalidPattern::NonFiniteLongitude {
                longitude: origin.longitude,
            });
        }
        if !(self.leg_length > 0.0 && self.leg_length.is_finite()) {
            return Err(InvalidPattern::NonPositiveLegLength {
                leg_length: self.leg_length,
            });
        }
        if !(self.leg_spacing > 0.0 && self.leg_spacing.is_finite()) {
            return Err(InvalidPattern::NonPositiveLegSpacing {
                leg_spacing: self.leg_spacing,
            });
        }
        if self.leg_count < 2 {
            return Err(InvalidPattern::TooFewLegs {
                leg_count: self.leg_count,
            });
        }
        Ok(())
    }

    /// Generate the ordered waypoint sequence starting at `origin`.
    ///
    /// Pure and deterministic: identical arguments always yield bit-identical waypoints. Every
    /// waypoint is displaced directly from `origin` so rounding does not accumulate along the path.
    pub fn generate(
        &self,
        origin: GeoPoint,
        target_z: f64,
        tolerance: Tolerance,
    ) -> Result<Vec<Waypoint>, InvalidPattern> {
        self.validate(&origin)?;

        let waypoints = (0..self.leg_count)
            .map(|index| {
                let (north, east) = self.offset_of(index);
                Waypoint {
                    point: origin.displaced(north, east),
                    target_z,
                    tolerance,
                }
            })
            .collect();

        Ok(waypoints)
    }

    /// Metric `(north, east)` offset of waypoint `index` from the origin.
    fn offset_of(&self, index: usize) -> (f64, f64) {
        let row = index / 2;
        let end_of_row = index % 2;
        // Even rows run west to east, odd rows east to west.
        let east = if (row + end_of_row) % 2 == 1 {
            self.leg_length
        } else {
            0.0
        };
        (row as f64 * self.leg_spacing, east)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{meters_to_latitude, meters_to_longitude};

    const TOLERANCE: Tolerance = Tolerance {
        horizontal: 2.0,
        vertical: 1.0,
    };

    fn origin() -> GeoPoint {
        GeoPoint::new(10.0, 20.0)
    }

    #[test]
    fn test_generate_is_deterministic() {
        let pattern = LawnmowerPattern::new(10.0, 25.0, 6);
        let first = pattern.generate(origin(), 2.0, TOLERANCE).unwrap();
        let second = pattern.generate(origin(), 2.0, TOLERANCE).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.latitude().to_bits(), b.latitude().to_bits());
            assert_eq!(a.longitude().to_bits(), b.longitude().to_bits());
        }
    }

    #[test]
    fn test_six_leg_geometry() {
        let pattern = LawnmowerPattern::new(10.0, 25.0, 6);
        let waypoints = pattern.generate(origin(), 0.0, TOLERANCE).unwrap();
        assert_eq!(waypoints.len(), 6);

        let d_lat = meters_to_latitude(25.0);
        let d_lon = meters_to_longitude(10.0, 10.0);

        // Longitude only ever takes the two sweep-edge values.
        for wp in &waypoints {
            let west = (wp.longitude() - 20.0).abs() < 1e-12;
            let east = (wp.longitude() - (20.0 + d_lon)).abs() < 1e-12;
            assert!(west ^ east, "unexpected longitude {}", wp.longitude());
        }

        // Consecutive waypoints alternate sweep edge within a row and hold it across a row change.
        let edges: Vec<bool> = waypoints.iter().map(|wp| wp.longitude() > 20.0).collect();
        assert_eq!(edges, vec![false, true, true, false, false, true]);

        // Latitude steps by the leg spacing every two waypoints.
        for pair in waypoints.windows(3) {
            let step = pair[2].latitude() - pair[0].latitude();
            assert!((step - d_lat).abs() < 1e-12);
            assert!(pair[2].latitude() > pair[0].latitude());
        }
        assert_eq!(waypoints[0].latitude(), 10.0);
    }

    #[test]
    fn test_waypoints_carry_target_and_tolerance() {
        let pattern = LawnmowerPattern::new(40.0, 10.0, 4);
        let waypoints = pattern.generate(origin(), 3.5, TOLERANCE).unwrap();
        assert!(
            waypoints
                .iter()
                .all(|wp| wp.target_z == 3.5 && wp.tolerance == TOLERANCE)
        );
    }

    #[test]
    fn test_arbitrary_leg_count() {
        let pattern = LawnmowerPattern::new(50.0, 5.0, 11);
        let waypoints = pattern.generate(origin(), 0.0, TOLERANCE).unwrap();
        assert_eq!(waypoints.len(), 11);

        // Last waypoint opens row 5, which runs east to west, so it sits on the east edge.
        let (north, east) = origin().offset_to(&waypoints[10].point);
        assert!((north - 25.0).abs() < 1e-6);
        assert!((east - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_leg_length_matches_sweep() {
        let pattern = LawnmowerPattern::new(120.0, 30.0, 2);
        let waypoints = pattern.generate(GeoPoint::new(-33.9, 151.2), 0.0, TOLERANCE).unwrap();
        let leg = waypoints[0].point.horizontal_distance(&waypoints[1].point);
        assert!((leg - 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_near_pole() {
        let pattern = LawnmowerPattern::new(10.0, 25.0, 6);
        let result = pattern.generate(GeoPoint::new(89.95, 0.0), 0.0, TOLERANCE);
        assert!(matches!(result, Err(InvalidPattern::NearPole { .. })));

        let result = pattern.generate(GeoPoint::new(-90.0, 0.0), 0.0, TOLERANCE);
        assert!(matches!(result, Err(InvalidPattern::NearPole { .. })));

        assert!(pattern.validate(&GeoPoint::new(89.9, 0.0)).is_ok());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let cases = [
            LawnmowerPattern::new(0.0, 25.0, 6),
            LawnmowerPattern::new(-1.0, 25.0, 6),
            LawnmowerPattern::new(f64::NAN, 25.0, 6),
            LawnmowerPattern::new(f64::INFINITY, 25.0, 6),
        ];
        for pattern in cases {
            assert!(matches!(
                pattern.validate(&origin()),
                Err(InvalidPattern::NonPositiveLegLength { .. })
            ));
        }

        assert!(matches!(
            LawnmowerPattern::new(10.0, 0.0, 6).validate(&origin()),
            Err(InvalidPattern::NonPositiveLegSpacing { .. })
        ));
        assert!(matches!(
            LawnmowerPattern::new(10.0, f64::INFINITY, 6).validate(&origin()),
            Err(InvalidPattern::NonPositiveLegSpacing { .. })
        ));
        assert!(matches!(
            LawnmowerPattern::new(10.0, 25.0, 1).validate(&origin()),
            Err(InvalidPattern::TooFewLegs { leg_count: 1 })
        ));
    }

    #[test]
    fn test_rejects_non_finite_origin() {
        let pattern = LawnmowerPattern::new(10.0, 25.0, 6);

        for longitude in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                pattern.generate(GeoPoint::new(10.0, longitude), 0.0, TOLERANCE),
                Err(InvalidPattern::NonFiniteLongitude { .. })
            ));
        }
        assert!(matches!(
            pattern.validate(&GeoPoint::new(f64::NAN, 20.0)),
            Err(InvalidPattern::NearPole { .. })
        ));
    }

    #[test]
    fn test_is_reached_boundaries() {
        let wp = Waypoint {
            point: origin(),
            target_z: 5.0,
            tolerance: TOLERANCE,
        };

        assert!(wp.is_reached(&origin().displaced(1.999, 0.0), 5.0));
        assert!(!wp.is_reached(&origin().displaced(2.0 + 1e-3, 0.0), 5.0));
        assert!(wp.is_reached(&origin(), 6.0));
        assert!(!wp.is_reached(&origin(), 6.0 + 1e-3));
    }
}
