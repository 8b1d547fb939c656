//! The render/camera boundary.

use crate::LookTarget;
use nalgebra::Vector3;

/// Smallest field of view handed to a renderer, in degrees.
pub const FOV_MIN_DEGREES: f64 = 1.0;

/// Largest field of view handed to a renderer, in degrees.
pub const FOV_MAX_DEGREES: f64 = 179.0;

/// Clamps a field of view into the open interval (0, 180).
///
/// Out-of-range requests are clamped, never rejected: anything at or below
/// zero becomes `FOV_MIN_DEGREES`, anything at or above 180 becomes
/// `FOV_MAX_DEGREES`.
pub fn clamp_fov(degrees: f64) -> f64 {
    if degrees <= 0.0 {
        FOV_MIN_DEGREES
    } else if degrees >= 180.0 {
        FOV_MAX_DEGREES
    } else {
        degrees
    }
}

/// The camera primitives a host renderer exposes to the trajectory engine.
///
/// Implemented by the scene-graph adapter in production and by a recording
/// rig in the simulation harness.
pub trait CameraRig {
    /// Moves the camera to an absolute position (scaled scene units).
    fn set_position(&mut self, position: Vector3<f64>);

    /// Points the camera at a symbolic target.
    ///
    /// The host resolves the target each frame, see `LookTarget::resolve`.
    fn set_look_target(&mut self, target: LookTarget);

    /// Sets the vertical field of view in degrees, already clamped.
    fn set_field_of_view(&mut self, degrees: f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_fov_in_range() {
        assert_eq!(clamp_fov(55.0), 55.0);
        assert_eq!(clamp_fov(0.5), 0.5);
        assert_eq!(clamp_fov(179.5), 179.5);
    }

    #[test]
    fn test_clamp_fov_out_of_range() {
        assert_eq!(clamp_fov(0.0), FOV_MIN_DEGREES);
        assert_eq!(clamp_fov(-20.0), FOV_MIN_DEGREES);
        assert_eq!(clamp_fov(180.0), FOV_MAX_DEGREES);
        assert_eq!(clamp_fov(720.0), FOV_MAX_DEGREES);
    }
}
