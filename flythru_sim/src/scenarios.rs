//! Built-in playback scenarios.

use crate::world::Takeover;
use flythru_core::{Path, PathError, PathLoader};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Two linear waypoints, constant speed
    StraightLine,

    /// Three cubic waypoints around a right-angle corner
    CubicCorner,

    /// Held field of view followed by a 2s zoom transition
    FovZoom,

    /// Linear, quadratic and cubic groups sharing boundary waypoints
    MixedOrders,

    /// Manual takeover in the middle of a run
    Takeover,

    /// Bundled orbit path with every feature in use
    Showcase,
}

const STRAIGHT_LINE: &str = r#"[
    {"type": "pos", "pos": "0,0,0", "duration": 0, "order": 1},
    {"type": "pos", "pos": "100,0,0", "duration": 10, "order": 1}
]"#;

const CUBIC_CORNER: &str = r#"[
    {"type": "pos", "pos": "0,0,0", "duration": 0, "order": 3},
    {"type": "pos", "pos": "10,0,0", "duration": 10, "order": 3},
    {"type": "pos", "pos": "10,10,0", "duration": 10, "order": 3}
]"#;

const FOV_ZOOM: &str = r#"[
    {"type": "pos", "pos": "0,0,0", "duration": 0},
    {"type": "fov", "fov": 55},
    {"type": "pos", "pos": "10,0,0", "duration": 5},
    {"type": "fov", "fov": 80, "duration": 2},
    {"type": "pos", "pos": "20,0,0", "duration": 5}
]"#;

const MIXED_ORDERS: &str = r#"[
    {"type": "scale", "value": 10},
    {"type": "timescale", "value": 0.5},
    {"type": "look", "at": "center"},
    {"type": "fov", "fov": 55},
    {"type": "pos", "pos": "0,0,0", "duration": 1, "order": 1},
    {"type": "pos", "pos": "5,0,0", "duration": 4, "order": 1},
    {"type": "pos", "pos": "8,2,1", "duration": 3, "order": 2},
    {"type": "look", "at": "forward"},
    {"type": "pos", "pos": "9,6,2", "duration": 3, "order": 2},
    {"type": "pos", "pos": "6,9,2", "duration": 3, "order": 3},
    {"type": "fov", "fov": 40, "duration": 1.5},
    {"type": "pos", "pos": "2,8,1", "duration": 4, "order": 3},
    {"type": "pos", "pos": "0,4,0", "duration": 4, "order": 3}
]"#;

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::StraightLine,
            ScenarioId::CubicCorner,
            ScenarioId::FovZoom,
            ScenarioId::MixedOrders,
            ScenarioId::Takeover,
            ScenarioId::Showcase,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::StraightLine => "straight_line",
            ScenarioId::CubicCorner => "cubic_corner",
            ScenarioId::FovZoom => "fov_zoom",
            ScenarioId::MixedOrders => "mixed_orders",
            ScenarioId::Takeover => "takeover",
            ScenarioId::Showcase => "showcase",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::StraightLine => "100 units in 10s along x, linear",
            ScenarioId::CubicCorner => "cubic spline through a corner, 20s",
            ScenarioId::FovZoom => "fov 55 for 5s, zoom to 80 over 2s, hold 3s",
            ScenarioId::MixedOrders => "three interpolation orders, scaled space and time",
            ScenarioId::Takeover => "fov zoom path with a 2s manual takeover at t=4s",
            ScenarioId::Showcase => "bundled crab_orbit.json path",
        }
    }

    /// Builds the scenario's path.
    pub fn path(&self) -> Result<Path, PathError> {
        match self {
            ScenarioId::StraightLine => Path::parse(STRAIGHT_LINE),
            ScenarioId::CubicCorner => Path::parse(CUBIC_CORNER),
            ScenarioId::FovZoom | ScenarioId::Takeover => Path::parse(FOV_ZOOM),
            ScenarioId::MixedOrders => Path::parse(MIXED_ORDERS),
            ScenarioId::Showcase => PathLoader::new().load("crab_orbit.json"),
        }
    }

    /// Takeover built into the scenario, if any.
    pub fn takeover(&self) -> Option<Takeover> {
        match self {
            ScenarioId::Takeover => Some(Takeover {
                at_secs: 4.0,
                for_secs: 2.0,
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "straight_line" | "straightline" | "straight" => Ok(ScenarioId::StraightLine),
            "cubic_corner" | "cubiccorner" | "corner" => Ok(ScenarioId::CubicCorner),
            "fov_zoom" | "fovzoom" | "zoom" => Ok(ScenarioId::FovZoom),
            "mixed_orders" | "mixedorders" | "mixed" => Ok(ScenarioId::MixedOrders),
            "takeover" => Ok(ScenarioId::Takeover),
            "showcase" | "crab_orbit" => Ok(ScenarioId::Showcase),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
