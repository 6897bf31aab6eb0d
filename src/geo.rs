//! Flat-earth coordinate helpers.
//!
//! Survey legs are tens to hundreds of meters long, so an equirectangular approximation around a
//! reference point is used instead of full ellipsoidal geodesy. All angles are in degrees.

/// WGS-84 equatorial radius, used as the radius of the approximating sphere.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Largest absolute latitude at which the longitude scaling is still trusted.
pub const MAX_LATITUDE_DEG: f64 = 89.9;

/// Convert a north/south distance in meters into degrees of latitude.
pub fn meters_to_latitude(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

/// Convert an east/west distance in meters into degrees of longitude at `latitude`.
pub fn meters_to_longitude(meters: f64, latitude: f64) -> f64 {
    (meters / (EARTH_RADIUS_M * latitude.to_radians().cos())).to_degrees()
}

/// A horizontal position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The point `north` meters north and `east` meters east of this one.
    ///
    /// The longitude scale is taken at this point's latitude, so displacing several points from a
    /// common origin keeps them on the same grid.
    pub fn displaced(&self, north: f64, east: f64) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude + meters_to_latitude(north),
            longitude: self.longitude + meters_to_longitude(east, self.latitude),
        }
    }

    /// The `(north, east)` offset in meters from this point to `other`.
    ///
    /// Inverse of [`displaced`](Self::displaced) for the same reference point.
    pub fn offset_to(&self, other: &GeoPoint) -> (f64, f64) {
        let north = (other.latitude - self.latitude).to_radians() * EARTH_RADIUS_M;
        let east = (other.longitude - self.longitude).to_radians()
            * EARTH_RADIUS_M
            * self.latitude.to_radians().cos();
        (north, east)
    }

    /// Planar distance in meters from this point to `other`.
    pub fn horizontal_distance(&self, other: &GeoPoint) -> f64 {
        let (north, east) = self.offset_to(other);
        north.hypot(east)
    }
}
