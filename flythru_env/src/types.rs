//! Common types shared across the camera boundary.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Where the camera looks while following a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookTarget {
    /// The scene origin (center of the point cloud)
    Center,

    /// The direction of travel
    Forward,
}

impl LookTarget {
    /// Returns the symbol used in waypoint documents.
    pub fn name(&self) -> &'static str {
        match self {
            LookTarget::Center => "center",
            LookTarget::Forward => "forward",
        }
    }

    /// Resolves the target to a look-at point.
    ///
    /// `Forward` needs a heading; until the camera has moved it falls back
    /// to the scene origin.
    pub fn resolve(
        &self,
        camera: &Vector3<f64>,
        heading: Option<&Vector3<f64>>,
        origin: &Vector3<f64>,
    ) -> Vector3<f64> {
        match (self, heading) {
            (LookTarget::Forward, Some(heading)) => camera + heading,
            _ => *origin,
        }
    }
}

impl std::fmt::Display for LookTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for LookTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "center" => Ok(LookTarget::Center),
            "forward" | "front" => Ok(LookTarget::Forward),
            _ => Err(format!("Unknown look target: {}", s)),
        }
    }
}
