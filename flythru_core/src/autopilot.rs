//! Autopilot - the trajectory playback scheduler.
//!
//! Drives three step tracks (position, look target, field of view) from a
//! per-frame `tick(elapsed)`. Each track keeps its own cursor and
//! countdown; the tracks are synchronized only by the shared elapsed time,
//! never by a shared step index, and each one loops on its own period.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Autopilot                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐        │
//! │  │   POSITION   │  │     LOOK     │  │     FOV      │        │
//! │  │ TrackCursor  │  │ TrackCursor  │  │ TrackCursor  │        │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘        │
//! │         └─────────────────┼─────────────────┘                │
//! │                     CameraUpdate                             │
//! └───────────────────────────┼──────────────────────────────────┘
//!                             ▼
//!                   CameraRig (host renderer)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use flythru_core::{Autopilot, AutopilotConfig, PathLoader};
//!
//! let path = PathLoader::new().load("crab_orbit.json")?;
//! let mut autopilot = Autopilot::engage(&path, &AutopilotConfig::default())?;
//! autopilot.start().apply(&mut rig);
//!
//! // once per rendered frame
//! autopilot.tick(frame_seconds).apply(&mut rig);
//! ```

use crate::discrete::FOV_CADENCE_HZ;
use crate::error::PathError;
use crate::path::Path;
use crate::waypoint::{total_dt, Step};
use flythru_env::{clamp_fov, CameraRig, LookTarget};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for an autopilot session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotConfig {
    /// Total position samples spread over the path (default: 30000)
    pub step_budget: usize,

    /// Field-of-view microsteps per second (default: 100)
    pub fov_cadence_hz: f64,

    /// Field of view before the first fov waypoint (default: 55)
    pub default_fov: f64,

    /// Look target before the first look waypoint (default: center)
    pub default_look: LookTarget,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            step_budget: 30_000,
            fov_cadence_hz: FOV_CADENCE_HZ,
            default_fov: 55.0,
            default_look: LookTarget::Center,
        }
    }
}

/// The three dense step sequences of one autopilot session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySteps {
    pub position: Vec<Step<Vector3<f64>>>,
    pub look: Vec<Step<LookTarget>>,
    pub fov: Vec<Step<f64>>,
}

impl TrajectorySteps {
    /// Resamples every track of `path`.
    pub fn build(path: &Path, config: &AutopilotConfig) -> Result<Self, PathError> {
        let steps = Self {
            position: path.position_steps(config.step_budget)?,
            look: path.look_steps(config.default_look)?,
            fov: path.fov_steps(config.fov_cadence_hz, config.default_fov)?,
        };
        info!(
            "resampled path: {} position, {} look, {} fov steps over {:.2}s",
            steps.position.len(),
            steps.look.len(),
            steps.fov.len(),
            path.total_duration()
        );
        Ok(steps)
    }
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not driving the camera (never started, or manual takeover)
    Idle,

    /// Advancing tracks every tick
    Playing,
}

/// Values due on the camera this frame. `None` means unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraUpdate {
    pub position: Option<Vector3<f64>>,
    pub look_target: Option<LookTarget>,

    /// Already clamped into (0, 180)
    pub field_of_view: Option<f64>,
}

impl CameraUpdate {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.look_target.is_none() && self.field_of_view.is_none()
    }

    /// Applies the due values through the camera boundary.
    pub fn apply<R: CameraRig + ?Sized>(&self, rig: &mut R) {
        if let Some(position) = self.position {
            rig.set_position(position);
        }
        if let Some(target) = self.look_target {
            rig.set_look_target(target);
        }
        if let Some(fov) = self.field_of_view {
            rig.set_field_of_view(fov);
        }
    }
}

/// Cursor and countdown over one track.
#[derive(Debug, Clone)]
struct TrackCursor<T> {
    steps: Vec<Step<T>>,
    index: usize,

    /// Time left before the next step is due
    countdown: f64,

    /// Sum of all step durations (one loop)
    period: f64,

    /// Completed passes through the track
    loops: u64,
}

impl<T: Clone> TrackCursor<T> {
    fn new(steps: Vec<Step<T>>) -> Self {
        let period = total_dt(&steps);
        Self {
            steps,
            index: 0,
            countdown: 0.0,
            period,
            loops: 0,
        }
    }

    /// Rewinds to the first step and returns its value. A track without
    /// duration jumps straight to its last step and holds it.
    fn rewind(&mut self) -> Option<T> {
        let last = self.steps.len().checked_sub(1)?;
        self.index = if self.period > 0.0 { 0 } else { last };
        self.countdown = self.steps[self.index].dt;
        self.loops = 0;
        Some(self.steps[self.index].value.clone())
    }

    fn current(&self) -> Option<T> {
        self.steps.get(self.index).map(|s| s.value.clone())
    }

    /// Consumes `elapsed` seconds, returning the newest value that became
    /// due, if any.
    fn advance(&mut self, elapsed: f64) -> Option<T> {
        if self.steps.is_empty() || self.period <= 0.0 {
            return None;
        }

        self.countdown -= elapsed;

        // Whole loops land back on the same step
        if self.countdown <= -self.period {
            let skipped = (-self.countdown / self.period).floor();
            self.loops += skipped as u64;
            self.countdown %= self.period;
        }

        let mut due = None;
        while self.countdown <= 0.0 {
            self.index += 1;
            if self.index == self.steps.len() {
                self.index = 0;
                self.loops += 1;
            }
            self.countdown += self.steps[self.index].dt;
            due = Some(self.index);
        }

        due.map(|i| self.steps[i].value.clone())
    }
}

/// Trajectory playback scheduler for one autopilot session.
///
/// Owns the session's step sequences and never mutates them. Starting a
/// new session means building a new `Autopilot`.
#[derive(Debug, Clone)]
pub struct Autopilot {
    position: TrackCursor<Vector3<f64>>,
    look: TrackCursor<LookTarget>,
    fov: TrackCursor<f64>,

    state: PlaybackState,
    started: bool,

    /// Seconds spent playing (suspended time excluded)
    playing_time: f64,

    last_position: Option<Vector3<f64>>,

    /// Unit direction of travel
    heading: Option<Vector3<f64>>,
}

impl Autopilot {
    /// Creates an idle autopilot over pre-built steps.
    pub fn new(steps: TrajectorySteps) -> Self {
        Self {
            position: TrackCursor::new(steps.position),
            look: TrackCursor::new(steps.look),
            fov: TrackCursor::new(steps.fov),
            state: PlaybackState::Idle,
            started: false,
            playing_time: 0.0,
            last_position: None,
            heading: None,
        }
    }

    /// Resamples `path` and creates an idle autopilot over it.
    pub fn engage(path: &Path, config: &AutopilotConfig) -> Result<Self, PathError> {
        Ok(Self::new(TrajectorySteps::build(path, config)?))
    }

    /// Starts playback from the beginning of every track.
    pub fn start(&mut self) -> CameraUpdate {
        self.state = PlaybackState::Playing;
        self.started = true;
        self.playing_time = 0.0;
        self.last_position = None;
        self.heading = None;

        let update = CameraUpdate {
            position: self.position.rewind(),
            look_target: self.look.rewind(),
            field_of_view: self.fov.rewind().map(clamp_fov),
        };
        self.track_heading(&update);
        debug!("autopilot started");
        update
    }

    /// Interactive takeover: stop driving the camera, keeping every cursor
    /// where it is. The field of view freezes with the other tracks since
    /// the user zooms by hand while in control.
    pub fn suspend(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Idle;
            debug!("autopilot suspended at t={:.3}s", self.playing_time);
        }
    }

    /// Resumes after a takeover from the exact point of suspension and
    /// re-reports the current values so the camera snaps back onto the
    /// path. Starts from the beginning if never started.
    pub fn resume(&mut self) -> CameraUpdate {
        if !self.started {
            return self.start();
        }
        if self.state == PlaybackState::Playing {
            return CameraUpdate::default();
        }

        self.state = PlaybackState::Playing;
        debug!("autopilot resumed at t={:.3}s", self.playing_time);
        CameraUpdate {
            position: self.position.current(),
            look_target: self.look.current(),
            field_of_view: self.fov.current().map(clamp_fov),
        }
    }

    /// Advances every track by `elapsed` seconds of frame time.
    ///
    /// Does nothing while idle.
    pub fn tick(&mut self, elapsed: f64) -> CameraUpdate {
        if self.state != PlaybackState::Playing || !(elapsed >= 0.0) {
            return CameraUpdate::default();
        }

        self.playing_time += elapsed;
        let update = CameraUpdate {
            position: self.position.advance(elapsed),
            look_target: self.look.advance(elapsed),
            field_of_view: self.fov.advance(elapsed).map(clamp_fov),
        };
        self.track_heading(&update);
        update
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Seconds of playback so far, suspended time excluded.
    pub fn playing_time(&self) -> f64 {
        self.playing_time
    }

    /// Completed passes through the position track.
    pub fn loops(&self) -> u64 {
        self.position.loops
    }

    /// Length of one position-track loop in seconds.
    pub fn period(&self) -> f64 {
        self.position.period
    }

    /// Unit direction of travel, once the camera has moved.
    pub fn heading(&self) -> Option<Vector3<f64>> {
        self.heading
    }

    /// Current step index of the position, look and fov tracks.
    pub fn cursors(&self) -> (usize, usize, usize) {
        (self.position.index, self.look.index, self.fov.index)
    }

    fn track_heading(&mut self, update: &CameraUpdate) {
        let Some(position) = update.position else {
            return;
        };
        if let Some(last) = self.last_position {
            let delta = position - last;
            if delta.norm() > 1e-12 {
                self.heading = Some(delta.normalize());
            }
        }
        self.last_position = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct MockRig {
        position: Option<Vector3<f64>>,
        look: Option<LookTarget>,
        fov: Option<f64>,
        calls: usize,
    }

    impl CameraRig for MockRig {
        fn set_position(&mut self, position: Vector3<f64>) {
            self.position = Some(position);
            self.calls += 1;
        }

        fn set_look_target(&mut self, target: LookTarget) {
            self.look = Some(target);
            self.calls += 1;
        }

        fn set_field_of_view(&mut self, degrees: f64) {
            self.fov = Some(degrees);
            self.calls += 1;
        }
    }

    fn line_steps() -> TrajectorySteps {
        TrajectorySteps {
            position: vec![
                Step::new(1.0, Vector3::new(0.0, 0.0, 0.0)),
                Step::new(1.0, Vector3::new(1.0, 0.0, 0.0)),
                Step::new(1.0, Vector3::new(2.0, 0.0, 0.0)),
            ],
            look: vec![
                Step::new(1.5, LookTarget::Center),
                Step::new(1.5, LookTarget::Forward),
            ],
            fov: vec![Step::new(2.0, 55.0), Step::new(0.0, 250.0)],
        }
    }

    #[test]
    fn test_idle_until_started() {
        let mut autopilot = Autopilot::new(line_steps());
        assert_eq!(autopilot.state(), PlaybackState::Idle);
        assert!(autopilot.tick(0.5).is_empty());
        assert_eq!(autopilot.cursors(), (0, 0, 0));
    }

    #[test]
    fn test_start_reports_first_values() {
        let mut autopilot = Autopilot::new(line_steps());
        let update = autopilot.start();

        assert!(autopilot.is_playing());
        assert_eq!(update.position, Some(Vector3::zeros()));
        assert_eq!(update.look_target, Some(LookTarget::Center));
        assert_eq!(update.field_of_view, Some(55.0));
    }

    #[test]
    fn test_tracks_advance_independently() {
        let mut autopilot = Autopilot::new(line_steps());
        autopilot.start();

        let update = autopilot.tick(1.0);
        assert_eq!(update.position, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(update.look_target, None);
        assert_eq!(update.field_of_view, None);

        let update = autopilot.tick(0.5);
        assert_eq!(update.position, None);
        assert_eq!(update.look_target, Some(LookTarget::Forward));

        // fov jumps through its zero-length step and wraps; 250 is clamped
        // but immediately superseded by the looped first step
        let update = autopilot.tick(0.5);
        assert_eq!(update.position, Some(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(update.field_of_view, Some(55.0));
        assert_eq!(autopilot.cursors(), (2, 1, 0));
    }

    #[test]
    fn test_position_loops() {
        let mut autopilot = Autopilot::new(line_steps());
        autopilot.start();

        autopilot.tick(2.0);
        let update = autopilot.tick(1.0);
        assert_eq!(update.position, Some(Vector3::zeros()));
        assert_eq!(autopilot.loops(), 1);
        assert_relative_eq!(autopilot.period(), 3.0);
    }

    #[test]
    fn test_residual_carried_over() {
        let mut autopilot = Autopilot::new(line_steps());
        autopilot.start();

        // 0.4 + 0.4 + 0.4 crosses the first boundary with 0.2 spare
        autopilot.tick(0.4);
        autopilot.tick(0.4);
        let update = autopilot.tick(0.4);
        assert_eq!(update.position, Some(Vector3::new(1.0, 0.0, 0.0)));

        // 0.8 more (plus margin) reaches the second boundary
        let update = autopilot.tick(0.81);
        assert_eq!(update.position, Some(Vector3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_long_frame_skips_whole_loops() {
        let mut autopilot = Autopilot::new(line_steps());
        autopilot.start();

        let update = autopilot.tick(31.5);
        assert_eq!(update.position, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(autopilot.loops(), 10);
    }

    #[test]
    fn test_fov_clamped() {
        let steps = TrajectorySteps {
            position: line_steps().position,
            look: vec![],
            fov: vec![Step::new(1.0, 0.0), Step::new(1.0, 200.0)],
        };
        let mut autopilot = Autopilot::new(steps);

        assert_eq!(autopilot.start().field_of_view, Some(1.0));
        assert_eq!(autopilot.tick(1.0).field_of_view, Some(179.0));
    }

    #[test]
    fn test_suspend_preserves_cursors() {
        let mut autopilot = Autopilot::new(line_steps());
        autopilot.start();
        autopilot.tick(1.2);
        let before = autopilot.cursors();

        autopilot.suspend();
        assert_eq!(autopilot.state(), PlaybackState::Idle);
        for _ in 0..100 {
            assert!(autopilot.tick(0.5).is_empty());
        }
        assert_eq!(autopilot.cursors(), before);
        assert_relative_eq!(autopilot.playing_time(), 1.2);

        let update = autopilot.resume();
        assert!(autopilot.is_playing());
        assert_eq!(update.position, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(update.look_target, Some(LookTarget::Center));

        // 0.8 left on the position step, as at suspension
        assert!(autopilot.tick(0.7).position.is_none());
        assert_eq!(autopilot.tick(0.2).position, Some(Vector3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_resume_without_start_starts() {
        let mut autopilot = Autopilot::new(line_steps());
        let update = autopilot.resume();
        assert!(autopilot.is_playing());
        assert_eq!(update.position, Some(Vector3::zeros()));
        assert!(autopilot.resume().is_empty());
    }

    #[test]
    fn test_heading_follows_motion() {
        let mut autopilot = Autopilot::new(line_steps());
        autopilot.start();
        assert_eq!(autopilot.heading(), None);

        autopilot.tick(1.0);
        assert_relative_eq!(autopilot.heading().unwrap(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_period_track_holds() {
        let steps = TrajectorySteps {
            position: line_steps().position,
            look: vec![Step::new(0.0, LookTarget::Forward)],
            fov: vec![],
        };
        let mut autopilot = Autopilot::new(steps);

        let update = autopilot.start();
        assert_eq!(update.look_target, Some(LookTarget::Forward));
        assert_eq!(update.field_of_view, None);
        assert_eq!(autopilot.tick(5.0).look_target, None);
    }

    #[test]
    fn test_zero_duration_path_lands_on_endpoint() {
        let doc = r#"[
            {"type": "pos", "pos": "0,0,0", "duration": 0},
            {"type": "pos", "pos": "10,0,0", "duration": 0}
        ]"#;
        let path = Path::parse(doc).unwrap();
        let mut autopilot = Autopilot::engage(&path, &AutopilotConfig::default()).unwrap();

        let update = autopilot.start();
        assert_eq!(update.position, Some(Vector3::new(10.0, 0.0, 0.0)));
        assert_eq!(update.field_of_view, Some(55.0));
        assert!(autopilot.tick(1.0).is_empty());
        assert_eq!(autopilot.period(), 0.0);
    }

    #[test]
    fn test_fov_frozen_during_takeover() {
        let steps = TrajectorySteps {
            position: line_steps().position,
            look: vec![],
            fov: vec![
                Step::new(0.5, 40.0),
                Step::new(0.5, 50.0),
                Step::new(0.5, 60.0),
            ],
        };
        let mut autopilot = Autopilot::new(steps);
        autopilot.start();
        assert_eq!(autopilot.tick(0.6).field_of_view, Some(50.0));

        autopilot.suspend();
        assert_eq!(autopilot.tick(0.5).field_of_view, None);
        assert_eq!(autopilot.cursors().2, 1);

        // Resume restores the path value, then 0.4 s remain on it
        assert_eq!(autopilot.resume().field_of_view, Some(50.0));
        assert_eq!(autopilot.tick(0.3).field_of_view, None);
        assert_eq!(autopilot.tick(0.2).field_of_view, Some(60.0));
    }

    #[test]
    fn test_apply_to_rig() {
        let mut autopilot = Autopilot::new(line_steps());
        let mut rig = MockRig::default();

        autopilot.start().apply(&mut rig);
        assert_eq!(rig.calls, 3);
        assert_eq!(rig.position, Some(Vector3::zeros()));
        assert_eq!(rig.look, Some(LookTarget::Center));
        assert_eq!(rig.fov, Some(55.0));

        autopilot.tick(1.0).apply(&mut rig);
        assert_eq!(rig.calls, 4);
        assert_eq!(rig.position, Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_engage_scenario_b() {
        let doc = r#"[
            {"type": "pos", "pos": "0,0,0", "duration": 0},
            {"type": "fov", "fov": 55},
            {"type": "pos", "pos": "10,0,0", "duration": 5},
            {"type": "fov", "fov": 80, "duration": 2},
            {"type": "pos", "pos": "20,0,0", "duration": 5}
        ]"#;
        let path = Path::parse(doc).unwrap();
        let mut autopilot = Autopilot::engage(&path, &AutopilotConfig::default()).unwrap();
        autopilot.start();

        let frame = 1.0 / 50.0;
        let mut fov = 55.0;
        let mut time = 0.0;
        while time < 9.5 {
            if let Some(f) = autopilot.tick(frame).field_of_view {
                fov = f;
            }
            time += frame;
            if (time - 6.0).abs() < 1e-9 {
                assert!(fov > 55.0 && fov < 80.0, "fov {} mid-transition", fov);
            }
        }
        assert_relative_eq!(fov, 80.0);
        assert_relative_eq!(autopilot.period(), 10.0, epsilon = 1e-9);
    }
}
