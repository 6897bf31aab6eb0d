//! Error types for lawnmower pattern generation.

/// Indicates that the requested survey geometry cannot be turned into a waypoint sequence.
///
/// Returned synchronously when a mission is created; no mission exists afterwards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidPattern {
    #[error("origin latitude {latitude} is too close to a pole for a flat-earth survey")]
    NearPole { latitude: f64 },

    #[error("origin longitude must be finite, got {longitude}")]
    NonFiniteLongitude { longitude: f64 },

    #[error("leg length must be positive and finite, got {leg_length} m")]
    NonPositiveLegLength { leg_length: f64 },

    #[error("leg spacing must be positive and finite, got {leg_spacing} m")]
    NonPositiveLegSpacing { leg_spacing: f64 },

    #[error("a lawnmower pattern needs at least 2 legs, got {leg_count}")]
    TooFewLegs { leg_count: usize },
}
