//! Discrete track stepping with microstepped transitions.
//!
//! Look-target and field-of-view waypoints are sparse: a value and the
//! cumulative time it activates at. This module turns them into dense step
//! sequences. A transition is "microstepped": subdivided at a fixed cadence
//! into small linear steps from the previously held value to the target,
//! followed by one coarse step holding the target for the rest of the gap.

use crate::error::PathError;
use crate::waypoint::Step;
use flythru_env::LookTarget;
use tracing::warn;

/// Sub-steps per second used for field-of-view transitions.
pub const FOV_CADENCE_HZ: f64 = 100.0;

/// Values that can be blended during a microstepped transition.
pub trait Blend: Clone {
    /// Value at fraction `t` (0 = self, 1 = target) of the way to `target`.
    fn blend(&self, target: &Self, t: f64) -> Self;
}

impl Blend for f64 {
    fn blend(&self, target: &f64, t: f64) -> f64 {
        self + (target - self) * t
    }
}

/// Symbolic targets have no in-between: they snap half way.
///
/// Look waypoints in a document never carry a transition, so `Path` only
/// needs this to share the generic stepper. Callers assembling their own
/// look tracks with `discrete_steps` get the snapping behavior.
impl Blend for LookTarget {
    fn blend(&self, target: &LookTarget, t: f64) -> LookTarget {
        if t < 0.5 {
            *self
        } else {
            *target
        }
    }
}

/// One sparse entry of a discrete track.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteEntry<T> {
    /// Cumulative pre-timescale time at which the value activates
    pub activation_time: f64,
    pub value: T,

    /// Pre-timescale transition length, if the change is smoothed
    pub transition: Option<f64>,
}

impl<T> DiscreteEntry<T> {
    pub fn new(activation_time: f64, value: T, transition: Option<f64>) -> Self {
        Self {
            activation_time,
            value,
            transition,
        }
    }
}

/// Converts sparse entries into a dense step sequence.
///
/// Each entry holds until the next activation. The last entry holds until
/// `track_end` when given, otherwise it gets `dt = 0` ("hold until loop
/// restart"). A transition of `d` seconds becomes `floor(cadence * d * ts)`
/// sub-steps of `d * ts / n` each, linearly spaced from the previous value
/// to the target inclusive (a single sub-step holds the previous value).
/// A transition too short for one sub-step is an instantaneous change.
///
/// # Errors
/// `InvalidFirstWaypointError` if the first entry declares a transition.
pub fn discrete_steps<T: Blend>(
    track: &str,
    entries: &[DiscreteEntry<T>],
    time_scale: f64,
    cadence_hz: f64,
    track_end: Option<f64>,
) -> Result<Vec<Step<T>>, PathError> {
    let mut steps: Vec<Step<T>> = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        let gap = match entries.get(i + 1) {
            Some(next) => next.activation_time - entry.activation_time,
            None => track_end.map_or(0.0, |end| (end - entry.activation_time).max(0.0)),
        };

        let Some(transition) = entry.transition else {
            steps.push(Step::new(gap * time_scale, entry.value.clone()));
            continue;
        };

        let previous = match steps.last() {
            Some(step) if i > 0 => step.value.clone(),
            _ => return Err(PathError::invalid_first(track)),
        };

        let scaled = transition * time_scale;
        let count = (cadence_hz * scaled).floor() as usize;

        if count > 0 {
            let dt = scaled / count as f64;
            for j in 0..count {
                let t = if count == 1 {
                    0.0
                } else {
                    j as f64 / (count - 1) as f64
                };
                steps.push(Step::new(dt, previous.blend(&entry.value, t)));
            }
        }

        let microstepped = if count > 0 { scaled } else { 0.0 };
        let remaining = gap * time_scale - microstepped;
        if remaining > 1e-9 {
            steps.push(Step::new(remaining, entry.value.clone()));
        } else {
            if remaining < -1e-9 && i + 1 < entries.len() {
                warn!(
                    "{} transition at t={} runs {:.3}s past the next waypoint",
                    track, entry.activation_time, -remaining
                );
            }
            // The target must still be reached
            if count < 2 {
                steps.push(Step::new(0.0, entry.value.clone()));
            }
        }
    }

    Ok(steps)
}
