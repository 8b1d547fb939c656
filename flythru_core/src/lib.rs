//! Flythru Core - Camera Trajectory Engine
//!
//! Turns a sparse, hand-authored list of camera waypoints into dense,
//! time-accurate step sequences and plays them back frame by frame:
//! 1. **Position track**: arc-length parametrized splines of mixed order,
//!    resampled into evenly time-spaced steps
//! 2. **Look and field-of-view tracks**: discrete values with microstepped
//!    transitions
//! 3. **Playback**: three independent cursors advanced by one cooperative
//!    `tick` per rendered frame, looping forever, suspendable for manual
//!    control

pub mod autopilot;
pub mod discrete;
pub mod error;
pub mod path;
pub mod resample;
pub mod spline;
pub mod waypoint;

// Re-export key types for convenience
pub use autopilot::{Autopilot, AutopilotConfig, CameraUpdate, PlaybackState, TrajectorySteps};
pub use discrete::{discrete_steps, Blend, DiscreteEntry, FOV_CADENCE_HZ};
pub use error::PathError;
pub use path::{Path, PathLoader, DEFAULT_PATHS_DIR};
pub use resample::{group_waypoints, resample_positions, SegmentGroup};
pub use waypoint::{FovWaypoint, InterpolationOrder, LookWaypoint, PositionWaypoint, Step};
