//! Waypoint model: the authored control points of a path and the dense
//! steps derived from them.

use crate::error::PathError;
use flythru_env::LookTarget;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Polynomial order used to interpolate a run of position waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationOrder {
    Linear = 1,
    Quadratic = 2,
    Cubic = 3,
}

impl InterpolationOrder {
    /// Spline degree for this order.
    pub fn degree(self) -> usize {
        self as usize
    }
}

impl Default for InterpolationOrder {
    fn default() -> Self {
        InterpolationOrder::Cubic
    }
}

impl TryFrom<i64> for InterpolationOrder {
    type Error = PathError;

    fn try_from(order: i64) -> Result<Self, Self::Error> {
        match order {
            1 => Ok(InterpolationOrder::Linear),
            2 => Ok(InterpolationOrder::Quadratic),
            3 => Ok(InterpolationOrder::Cubic),
            other => Err(PathError::malformed(format!(
                "bad order {}, must be 1, 2 or 3",
                other
            ))),
        }
    }
}

/// A position control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionWaypoint {
    /// Pre-timescale seconds allotted to reach this waypoint from the
    /// previous one (a starting dwell for the first waypoint)
    pub duration: f64,

    /// Position in unscaled path units
    pub value: Vector3<f64>,

    /// Interpolation order of the run this waypoint belongs to
    pub order: InterpolationOrder,
}

impl PositionWaypoint {
    pub fn new(duration: f64, value: Vector3<f64>, order: InterpolationOrder) -> Self {
        Self {
            duration,
            value,
            order,
        }
    }
}

/// A look-target change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookWaypoint {
    /// Cumulative pre-timescale position-track time at which it activates
    pub activation_time: f64,
    pub target: LookTarget,
}

/// A field-of-view change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FovWaypoint {
    /// Cumulative pre-timescale position-track time at which it activates
    pub activation_time: f64,

    /// Field of view in degrees
    pub value: f64,

    /// When present the change is smoothed over this many pre-timescale
    /// seconds instead of being instantaneous
    pub transition: Option<f64>,
}

/// The atomic unit consumed by the playback scheduler.
///
/// `value` becomes current when the step is reached and is held for `dt`
/// seconds. A zero `dt` is an instantaneous step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step<T> {
    pub dt: f64,
    pub value: T,
}

impl<T> Step<T> {
    pub fn new(dt: f64, value: T) -> Self {
        Self { dt, value }
    }
}

/// Total held time of a step sequence.
pub fn total_dt<T>(steps: &[Step<T>]) -> f64 {
    steps.iter().map(|s| s.dt).sum()
}
