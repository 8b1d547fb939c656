//! JSON exporter for recorded playback.
//!
//! Writes the camera state of every frame, plus optionally the raw step
//! sequences, for offline plotting.

use crate::error::SimError;
use crate::rig::RecordingRig;
use flythru_core::TrajectorySteps;
use flythru_env::LookTarget;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path as FsPath;

/// Camera state at the end of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackFrame {
    /// Virtual time in seconds
    pub time_sec: f64,

    /// Whether the autopilot drove this frame
    pub playing: bool,

    pub x: f64,
    pub y: f64,
    pub z: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub look: Option<LookTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fov: Option<f64>,
}

impl PlaybackFrame {
    /// Snapshots the rig.
    pub fn from_rig(time_sec: f64, playing: bool, rig: &RecordingRig) -> Self {
        let position = rig.position().unwrap_or_else(Vector3::zeros);
        Self {
            time_sec,
            playing,
            x: position.x,
            y: position.y,
            z: position.z,
            look: rig.look_target(),
            fov: rig.field_of_view(),
        }
    }
}

/// Complete playback export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackExport {
    /// Scenario or path name
    pub scenario: String,

    /// Seed used for frame pacing
    pub seed: u64,

    pub fps: f64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// Length of one position loop
    pub period_sec: f64,

    /// All frames
    pub frames: Vec<PlaybackFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl PlaybackExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, fps: f64, period_sec: f64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            fps,
            duration_sec: 0.0,
            period_sec,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: PlaybackFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<FsPath>) -> Result<(), SimError> {
        write_json(self, path.as_ref())
    }
}

/// Writes the three step sequences of a session to a JSON file.
pub fn write_steps(steps: &TrajectorySteps, path: impl AsRef<FsPath>) -> Result<(), SimError> {
    write_json(steps, path.as_ref())
}

fn write_json<T: Serialize>(value: &T, path: &FsPath) -> Result<(), SimError> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
