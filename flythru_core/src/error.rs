//! Error types for path loading and resampling.

use thiserror::Error;

/// Errors raised while loading a path or deriving its step sequences.
///
/// All of them surface before playback starts; the scheduler itself never
/// fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// Bad interpolation order, unparseable geometry, undefined trajectory
    #[error("Malformed path: {0}")]
    MalformedPathError(String),

    /// A discrete track opens with a transition it has nothing to blend from
    #[error("Invalid first waypoint: {0}")]
    InvalidFirstWaypointError(String),

    /// The waypoint description was found neither where given nor in the
    /// fallback paths directory
    #[error("Path not found: {0}")]
    LookupError(String),

    /// A look-target symbol outside {center, forward}
    #[error("Unknown look target: {0}")]
    UnknownTargetError(String),
}

impl PathError {
    /// Creates a malformed path error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPathError(msg.into())
    }

    /// Creates an invalid first waypoint error for the named track.
    pub fn invalid_first(track: &str) -> Self {
        Self::InvalidFirstWaypointError(format!(
            "first {} waypoint cannot have a duration (it sets the original value)",
            track
        ))
    }

    /// Creates a lookup error.
    pub fn lookup(identifier: impl std::fmt::Display) -> Self {
        Self::LookupError(identifier.to_string())
    }
}
