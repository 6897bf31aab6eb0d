//! Error types for mission creation.

use crate::pattern::error::InvalidPattern;

/// Indicates that a mission could not be created. No mission exists afterwards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StartMissionError {
    #[error("invalid survey pattern")]
    InvalidPattern(#[from] InvalidPattern),

    #[error("mission for plan '{plan_id}' is still active")]
    MissionAlreadyActive { plan_id: String },
}
