//! Recording camera rig.

use flythru_env::{CameraRig, LookTarget};
use nalgebra::Vector3;
use serde::Serialize;

/// Number of calls received per setter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RigCalls {
    pub position: u64,
    pub look_target: u64,
    pub field_of_view: u64,
}

impl RigCalls {
    pub fn total(&self) -> u64 {
        self.position + self.look_target + self.field_of_view
    }
}

/// Headless stand-in for the host camera.
///
/// Keeps the latest value of each property and counts every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingRig {
    position: Option<Vector3<f64>>,
    look_target: Option<LookTarget>,
    field_of_view: Option<f64>,
    calls: RigCalls,
}

impl RecordingRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Vector3<f64>> {
        self.position
    }

    pub fn look_target(&self) -> Option<LookTarget> {
        self.look_target
    }

    pub fn field_of_view(&self) -> Option<f64> {
        self.field_of_view
    }

    pub fn calls(&self) -> RigCalls {
        self.calls
    }
}

impl CameraRig for RecordingRig {
    fn set_position(&mut self, position: Vector3<f64>) {
        self.position = Some(position);
        self.calls.position += 1;
    }

    fn set_look_target(&mut self, target: LookTarget) {
        self.look_target = Some(target);
        self.calls.look_target += 1;
    }

    fn set_field_of_view(&mut self, degrees: f64) {
        self.field_of_view = Some(degrees);
        self.calls.field_of_view += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_latest_values() {
        let mut rig = RecordingRig::new();
        assert_eq!(rig.position(), None);

        rig.set_position(Vector3::new(1.0, 2.0, 3.0));
        rig.set_position(Vector3::new(4.0, 5.0, 6.0));
        rig.set_look_target(LookTarget::Forward);
        rig.set_field_of_view(70.0);

        assert_eq!(rig.position(), Some(Vector3::new(4.0, 5.0, 6.0)));
        assert_eq!(rig.look_target(), Some(LookTarget::Forward));
        assert_eq!(rig.field_of_view(), Some(70.0));
        assert_eq!(
            rig.calls(),
            RigCalls {
                position: 2,
                look_target: 1,
                field_of_view: 1
            }
        );
        assert_eq!(rig.calls().total(), 4);
    }
}
