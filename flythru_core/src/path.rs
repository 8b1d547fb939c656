//! Path model and waypoint description loader.
//!
//! A waypoint description is a JSON array of entries tagged by `"type"`:
//!
//! ```json
//! [
//!   {"type": "scale", "value": 1000},
//!   {"type": "timescale", "value": 1},
//!   {"type": "pos", "pos": "0,0,0", "duration": 0, "order": 3},
//!   {"type": "look", "at": "center"},
//!   {"type": "fov", "fov": 55},
//!   {"type": "pos", "pos": "10,0,0", "duration": 10},
//!   {"type": "fov", "fov": 80, "duration": 2}
//! ]
//! ```
//!
//! Document order matters: `look` and `fov` entries activate at the running
//! sum of `pos` durations seen so far, before the time scale is applied.

use crate::discrete::{discrete_steps, DiscreteEntry, FOV_CADENCE_HZ};
use crate::error::PathError;
use crate::resample::resample_positions;
use crate::waypoint::{FovWaypoint, InterpolationOrder, LookWaypoint, PositionWaypoint, Step};
use flythru_env::LookTarget;
use nalgebra::Vector3;
use serde::Deserialize;
use std::path::{Path as FsPath, PathBuf};
use tracing::{debug, info};

/// Directory searched when a waypoint description is not found where given.
pub const DEFAULT_PATHS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/paths");

/// A camera path: scales plus the three waypoint tracks.
///
/// Always holds at least two position waypoints; construction validates
/// every waypoint so that resampling only fails on geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Multiplies every position value
    space_scale: f64,

    /// Multiplies every duration
    time_scale: f64,

    positions: Vec<PositionWaypoint>,
    looks: Vec<LookWaypoint>,
    fovs: Vec<FovWaypoint>,
}

impl Path {
    /// Builds a path from already typed waypoints.
    pub fn from_waypoints(
        space_scale: f64,
        time_scale: f64,
        positions: Vec<PositionWaypoint>,
        looks: Vec<LookWaypoint>,
        fovs: Vec<FovWaypoint>,
    ) -> Result<Self, PathError> {
        if !(space_scale.is_finite() && space_scale > 0.0) {
            return Err(PathError::malformed(format!("bad scale {}", space_scale)));
        }
        if !(time_scale.is_finite() && time_scale > 0.0) {
            return Err(PathError::malformed(format!("bad timescale {}", time_scale)));
        }
        if positions.len() < 2 {
            return Err(PathError::malformed(format!(
                "trajectory needs at least two position waypoints, got {}",
                positions.len()
            )));
        }

        for (i, wp) in positions.iter().enumerate() {
            if !(wp.duration.is_finite() && wp.duration >= 0.0) {
                return Err(PathError::malformed(format!(
                    "position waypoint {} has bad duration {}",
                    i, wp.duration
                )));
            }
            if !wp.value.iter().all(|c| c.is_finite()) {
                return Err(PathError::malformed(format!(
                    "position waypoint {} has non-finite value",
                    i
                )));
            }
        }

        check_activation_times("look", looks.iter().map(|l| l.activation_time))?;
        check_activation_times("fov", fovs.iter().map(|f| f.activation_time))?;

        for (i, fov) in fovs.iter().enumerate() {
            if !fov.value.is_finite() {
                return Err(PathError::malformed(format!("fov waypoint {} is not finite", i)));
            }
            if let Some(d) = fov.transition {
                if i == 0 {
                    return Err(PathError::invalid_first("fov"));
                }
                if !(d.is_finite() && d >= 0.0) {
                    return Err(PathError::malformed(format!(
                        "fov waypoint {} has bad duration {}",
                        i, d
                    )));
                }
            }
        }

        Ok(Self {
            space_scale,
            time_scale,
            positions,
            looks,
            fovs,
        })
    }

    /// Parses a waypoint description held in memory.
    pub fn parse(document: &str) -> Result<Self, PathError> {
        let entries: Vec<Entry> = serde_json::from_str(document)
            .map_err(|e| PathError::malformed(format!("invalid waypoint document: {}", e)))?;

        let mut space_scale = 1.0;
        let mut time_scale = 1.0;
        let mut positions = Vec::new();
        let mut looks = Vec::new();
        let mut fovs = Vec::new();
        let mut timing = 0.0;

        for entry in entries {
            match entry {
                Entry::Scale { value } => space_scale = value,
                Entry::Timescale { value } => time_scale = value,
                Entry::Pos {
                    pos,
                    duration,
                    order,
                } => {
                    let order = match order {
                        Some(order) => InterpolationOrder::try_from(order)?,
                        None => InterpolationOrder::default(),
                    };
                    positions.push(PositionWaypoint::new(duration, parse_vector3(&pos)?, order));
                    timing += duration;
                }
                Entry::Look { at } => {
                    let target = at
                        .parse::<LookTarget>()
                        .map_err(|_| PathError::UnknownTargetError(at.clone()))?;
                    looks.push(LookWaypoint {
                        activation_time: timing,
                        target,
                    });
                }
                Entry::Fov { fov, duration } => fovs.push(FovWaypoint {
                    activation_time: timing,
                    value: fov,
                    transition: duration,
                }),
            }
        }

        let path = Self::from_waypoints(space_scale, time_scale, positions, looks, fovs)?;
        info!("path duration: {}", path.total_duration());
        Ok(path)
    }

    pub fn space_scale(&self) -> f64 {
        self.space_scale
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn positions(&self) -> &[PositionWaypoint] {
        &self.positions
    }

    pub fn looks(&self) -> &[LookWaypoint] {
        &self.looks
    }

    pub fn fovs(&self) -> &[FovWaypoint] {
        &self.fovs
    }

    /// Sum of position durations before the time scale.
    pub fn raw_duration(&self) -> f64 {
        self.positions.iter().map(|p| p.duration).sum()
    }

    /// Playback length of one loop: `time_scale * Σ durations`.
    pub fn total_duration(&self) -> f64 {
        self.raw_duration() * self.time_scale
    }

    /// Dense position steps, `step_budget` samples spread over the path.
    pub fn position_steps(&self, step_budget: usize) -> Result<Vec<Step<Vector3<f64>>>, PathError> {
        resample_positions(&self.positions, self.space_scale, self.time_scale, step_budget)
    }

    /// Dense look-target steps covering the whole loop.
    ///
    /// Until the first look waypoint activates the camera looks at
    /// `default`. Look changes are always instantaneous.
    pub fn look_steps(&self, default: LookTarget) -> Result<Vec<Step<LookTarget>>, PathError> {
        let entries: Vec<DiscreteEntry<LookTarget>> = self
            .looks
            .iter()
            .map(|l| DiscreteEntry::new(l.activation_time, l.target, None))
            .collect();
        // No transitions, so the cadence is never used
        self.track_steps("look", entries, FOV_CADENCE_HZ, default)
    }

    /// Dense field-of-view steps covering the whole loop.
    ///
    /// Until the first fov waypoint activates the field of view is
    /// `default`.
    pub fn fov_steps(&self, cadence_hz: f64, default: f64) -> Result<Vec<Step<f64>>, PathError> {
        let entries: Vec<DiscreteEntry<f64>> = self
            .fovs
            .iter()
            .map(|f| DiscreteEntry::new(f.activation_time, f.value, f.transition))
            .collect();
        self.track_steps("fov", entries, cadence_hz, default)
    }

    fn track_steps<T: crate::discrete::Blend>(
        &self,
        track: &str,
        mut entries: Vec<DiscreteEntry<T>>,
        cadence_hz: f64,
        default: T,
    ) -> Result<Vec<Step<T>>, PathError> {
        if entries.first().map_or(true, |e| e.activation_time > 0.0) {
            if entries.first().is_some_and(|e| e.transition.is_some()) {
                return Err(PathError::invalid_first(track));
            }
            entries.insert(0, DiscreteEntry::new(0.0, default, None));
        }
        discrete_steps(
            track,
            &entries,
            self.time_scale,
            cadence_hz,
            Some(self.raw_duration()),
        )
    }
}

fn check_activation_times(
    track: &str,
    times: impl Iterator<Item = f64>,
) -> Result<(), PathError> {
    let mut last = 0.0;
    for (i, t) in times.enumerate() {
        if !(t.is_finite() && t >= last) {
            return Err(PathError::malformed(format!(
                "{} waypoint {} activates at {} before the previous one",
                track, i, t
            )));
        }
        last = t;
    }
    Ok(())
}

/// Parses `"x,y,z"` into a vector.
pub fn parse_vector3(text: &str) -> Result<Vector3<f64>, PathError> {
    let coords: Vec<f64> = text
        .trim()
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| PathError::malformed(format!("bad position '{}': {}", text, e)))?;

    match coords.as_slice() {
        [x, y, z] if coords.iter().all(|c| c.is_finite()) => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(PathError::malformed(format!(
            "bad position '{}': expected three finite coordinates",
            text
        ))),
    }
}

/// Raw document entry, before validation.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Entry {
    Scale {
        value: f64,
    },
    Timescale {
        value: f64,
    },
    Pos {
        pos: String,
        duration: f64,
        order: Option<i64>,
    },
    Look {
        at: String,
    },
    Fov {
        fov: f64,
        duration: Option<f64>,
    },
}

/// Resolves and loads waypoint descriptions.
#[derive(Debug, Clone)]
pub struct PathLoader {
    /// Fallback directory tried when an identifier is not an existing file
    search_dir: PathBuf,
}

impl PathLoader {
    /// Creates a loader falling back to the bundled `paths` directory.
    pub fn new() -> Self {
        Self {
            search_dir: PathBuf::from(DEFAULT_PATHS_DIR),
        }
    }

    /// Uses `dir` as the fallback directory instead.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = dir.into();
        self
    }

    pub fn search_dir(&self) -> &FsPath {
        &self.search_dir
    }

    /// Returns the file an identifier refers to.
    pub fn resolve(&self, identifier: impl AsRef<FsPath>) -> Result<PathBuf, PathError> {
        let identifier = identifier.as_ref();
        if identifier.is_file() {
            return Ok(identifier.to_path_buf());
        }

        debug!(
            "{} not found, trying in {}",
            identifier.display(),
            self.search_dir.display()
        );
        let fallback = self.search_dir.join(identifier);
        if fallback.is_file() {
            Ok(fallback)
        } else {
            Err(PathError::lookup(identifier.display()))
        }
    }

    /// Resolves, reads and parses a waypoint description.
    pub fn load(&self, identifier: impl AsRef<FsPath>) -> Result<Path, PathError> {
        let file = self.resolve(identifier)?;
        let document = std::fs::read_to_string(&file)
            .map_err(|e| PathError::LookupError(format!("{}: {}", file.display(), e)))?;
        Path::parse(&document)
    }
}

impl Default for PathLoader {
    fn default() -> Self {
        Self::new()
    }
}
