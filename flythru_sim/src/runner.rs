//! Scenario runner - plays paths headless and checks trajectory invariants.

use crate::error::SimError;
use crate::exporter::{PlaybackExport, PlaybackFrame};
use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimWorld, Takeover};

use flythru_core::{Path, TrajectorySteps};
use flythru_core::waypoint::total_dt;
use flythru_env::{FOV_MAX_DEGREES, FOV_MIN_DEGREES};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Relative tolerance on summed step durations.
const DURATION_TOLERANCE: f64 = 1e-9;

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario or path name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Whether the run upheld every invariant
    pub passed: bool,

    /// Total frames rendered
    pub total_frames: u64,

    /// Final virtual time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Dense steps per track
    pub position_steps: usize,
    pub look_steps: usize,
    pub fov_steps: usize,

    /// Camera setter calls
    pub position_updates: u64,
    pub look_updates: u64,
    pub fov_updates: u64,

    /// Completed position loops
    pub loops: u64,

    /// Length of one position loop
    pub period_secs: f64,

    /// Seconds the autopilot played
    pub playing_secs: f64,

    /// Seconds under manual control
    pub suspended_secs: f64,

    pub min_fov: f64,
    pub max_fov: f64,

    /// Largest camera move between two frames, loop restarts included
    pub max_frame_jump: f64,
}

/// A run together with everything needed to export it.
#[derive(Debug, Clone)]
pub struct Recording {
    pub result: ScenarioResult,
    pub export: PlaybackExport,
    pub steps: TrajectorySteps,
}

/// Runs playback scenarios.
pub struct ScenarioRunner {
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Sets the run duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.config.duration_secs = secs;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs a built-in scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.config.seed);
        debug!("  {}", scenario.description());

        match scenario.path() {
            Ok(path) => self.run_path(scenario.name(), &path, self.takeover_for(scenario)),
            Err(e) => self.failed(scenario.name(), e.into()),
        }
    }

    /// Runs a built-in scenario, keeping every frame.
    pub fn record(&self, scenario: ScenarioId) -> Result<Recording, SimError> {
        let path = scenario.path()?;
        self.record_path(scenario.name(), &path, self.takeover_for(scenario))
    }

    /// Runs an arbitrary path and returns the result.
    pub fn run_path(&self, name: &str, path: &Path, takeover: Option<Takeover>) -> ScenarioResult {
        match self.record_path(name, path, takeover) {
            Ok(recording) => recording.result,
            Err(e) => self.failed(name, e),
        }
    }

    /// Runs an arbitrary path, keeping every frame.
    pub fn record_path(
        &self,
        name: &str,
        path: &Path,
        takeover: Option<Takeover>,
    ) -> Result<Recording, SimError> {
        let config = SimConfig {
            takeover,
            ..self.config.clone()
        };
        let mut world = SimWorld::new(path, config)?;
        let mut export = PlaybackExport::new(
            name,
            self.config.seed,
            self.config.fps,
            world.autopilot().period(),
        );

        let mut metrics = ScenarioMetrics {
            min_fov: f64::INFINITY,
            max_fov: f64::NEG_INFINITY,
            ..Default::default()
        };
        let mut violations = Vec::new();
        let mut last_position = world.rig().position();
        if let Some(fov) = world.rig().field_of_view() {
            metrics.min_fov = fov;
            metrics.max_fov = fov;
        }

        while world.time() < self.config.duration_secs {
            let frame = world.tick();

            if let Some(position) = frame.update.position {
                if !position.iter().all(|c| c.is_finite()) {
                    violations.push(format!("non-finite position at t={:.3}s", frame.time_secs));
                }
                if let Some(last) = last_position {
                    metrics.max_frame_jump = metrics.max_frame_jump.max((position - last).norm());
                }
                last_position = Some(position);
            }
            if let Some(fov) = frame.update.field_of_view {
                if !(FOV_MIN_DEGREES..=FOV_MAX_DEGREES).contains(&fov) {
                    violations.push(format!("fov {} out of range at t={:.3}s", fov, frame.time_secs));
                }
                metrics.min_fov = metrics.min_fov.min(fov);
                metrics.max_fov = metrics.max_fov.max(fov);
            }

            export.add_frame(PlaybackFrame::from_rig(frame.time_secs, frame.playing, world.rig()));
        }

        let steps = world.steps().clone();
        let calls = world.rig().calls();
        let autopilot = world.autopilot();
        metrics.position_steps = steps.position.len();
        metrics.look_steps = steps.look.len();
        metrics.fov_steps = steps.fov.len();
        metrics.position_updates = calls.position;
        metrics.look_updates = calls.look_target;
        metrics.fov_updates = calls.field_of_view;
        metrics.loops = autopilot.loops();
        metrics.period_secs = autopilot.period();
        metrics.playing_secs = autopilot.playing_time();
        metrics.suspended_secs = world.suspended_secs();

        violations.extend(check_invariants(&world, path));
        violations.truncate(5);

        let passed = violations.is_empty();
        let failure_reason = (!passed).then(|| violations.join("; "));
        if let Some(reason) = &failure_reason {
            warn!("{}: {}", name, reason);
        }
        export.finalize(passed, failure_reason.clone());

        let result = ScenarioResult {
            scenario: name.to_string(),
            seed: self.config.seed,
            passed,
            total_frames: world.tick_count(),
            final_time_secs: world.time(),
            failure_reason,
            metrics,
        };

        Ok(Recording {
            result,
            export,
            steps,
        })
    }

    // ========== Private Helper Methods ==========

    fn takeover_for(&self, scenario: ScenarioId) -> Option<Takeover> {
        self.config.takeover.or_else(|| scenario.takeover())
    }

    fn failed(&self, name: &str, error: SimError) -> ScenarioResult {
        warn!("{}: {}", name, error);
        ScenarioResult {
            scenario: name.to_string(),
            seed: self.config.seed,
            passed: false,
            total_frames: 0,
            final_time_secs: 0.0,
            failure_reason: Some(error.to_string()),
            metrics: ScenarioMetrics::default(),
        }
    }
}

/// Checks the whole-run invariants, returning one message per violation.
fn check_invariants(world: &SimWorld, path: &Path) -> Vec<String> {
    let mut violations = Vec::new();
    let steps = world.steps();
    let total = path.total_duration();
    let tolerance = DURATION_TOLERANCE * total.max(1.0);

    let position_total = total_dt(&steps.position);
    if (position_total - total).abs() > tolerance {
        violations.push(format!(
            "position steps last {}s, path lasts {}s",
            position_total, total
        ));
    }

    let look_total = total_dt(&steps.look);
    if (look_total - total).abs() > tolerance {
        violations.push(format!("look steps last {}s, path lasts {}s", look_total, total));
    }

    // A transition on the last fov waypoint may run past the loop end
    let fov_total = total_dt(&steps.fov);
    if fov_total < total - tolerance {
        violations.push(format!("fov steps last {}s, path lasts {}s", fov_total, total));
    }

    let autopilot = world.autopilot();
    let accounted = autopilot.playing_time() + world.suspended_secs();
    if (accounted - world.time()).abs() > 1e-6 {
        violations.push(format!(
            "played {}s + suspended {}s != elapsed {}s",
            autopilot.playing_time(),
            world.suspended_secs(),
            world.time()
        ));
    }

    if world.updates_while_suspended() > 0 {
        violations.push(format!(
            "{} camera updates while suspended",
            world.updates_while_suspended()
        ));
    }

    let period = autopilot.period();
    if period > 0.0 {
        let expected = (autopilot.playing_time() / period).floor() as u64;
        if autopilot.loops().abs_diff(expected) > 1 {
            violations.push(format!(
                "{} loops in {}s of a {}s path",
                autopilot.loops(),
                autopilot.playing_time(),
                period
            ));
        }
    }

    violations
}
