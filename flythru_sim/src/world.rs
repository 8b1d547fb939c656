//! SimWorld - one headless playback run.

use crate::clock::SimClock;
use crate::error::SimError;
use crate::pacer::FramePacer;
use crate::rig::RecordingRig;

use flythru_core::{Autopilot, AutopilotConfig, CameraUpdate, Path, TrajectorySteps};
use flythru_env::FrameTimer;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A manual takeover window in virtual seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Takeover {
    /// Virtual time at which the user grabs the camera
    pub at_secs: f64,

    /// How long the user keeps it
    pub for_secs: f64,
}

impl Takeover {
    fn ends_at(&self) -> f64 {
        self.at_secs + self.for_secs
    }

    fn covers(&self, time: f64) -> bool {
        time >= self.at_secs && time < self.ends_at()
    }
}

/// Configuration for a playback run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master seed for frame pacing
    pub seed: u64,

    /// Nominal frames per second
    pub fps: f64,

    /// Virtual seconds to run for
    pub duration_secs: f64,

    /// Frame length standard deviation, as a fraction of a frame
    pub jitter: f64,

    /// Position samples spread over the path
    pub step_budget: usize,

    /// Optional manual takeover window
    pub takeover: Option<Takeover>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            fps: 60.0,
            duration_secs: 30.0,
            jitter: 0.1,
            step_budget: AutopilotConfig::default().step_budget,
            takeover: None,
        }
    }
}

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Virtual time at the end of the frame
    pub time_secs: f64,

    /// Frame length handed to the autopilot
    pub elapsed: f64,

    /// Whether the autopilot drove the camera this frame
    pub playing: bool,

    pub update: CameraUpdate,
}

/// The SimWorld - autopilot, clock and camera for one run.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Virtual clock (shared with the frame timer)
    clock: SimClock,

    timer: FrameTimer<SimClock>,
    pacer: FramePacer,

    steps: TrajectorySteps,
    autopilot: Autopilot,
    rig: RecordingRig,

    /// Virtual seconds spent under manual control
    suspended_secs: f64,

    /// Camera updates delivered while suspended (must stay 0)
    updates_while_suspended: u64,

    tick_count: u64,
}

impl SimWorld {
    /// Resamples `path` and starts the autopilot on a fresh rig.
    pub fn new(path: &Path, config: SimConfig) -> Result<Self, SimError> {
        if !(config.duration_secs.is_finite() && config.duration_secs >= 0.0) {
            return Err(SimError::config(format!(
                "duration must be non-negative, got {}",
                config.duration_secs
            )));
        }
        if let Some(takeover) = config.takeover {
            if !(takeover.at_secs >= 0.0 && takeover.for_secs >= 0.0) {
                return Err(SimError::config(format!("bad takeover window {:?}", takeover)));
            }
        }

        let pacer = FramePacer::new(config.fps, config.jitter, config.seed)?;
        let autopilot_config = AutopilotConfig {
            step_budget: config.step_budget,
            ..Default::default()
        };
        let steps = TrajectorySteps::build(path, &autopilot_config)?;

        let clock = SimClock::new();
        let timer = FrameTimer::new(clock.clone());

        let mut autopilot = Autopilot::new(steps.clone());
        let mut rig = RecordingRig::new();
        autopilot.start().apply(&mut rig);

        Ok(Self {
            config,
            clock,
            timer,
            pacer,
            steps,
            autopilot,
            rig,
            suspended_secs: 0.0,
            updates_while_suspended: 0,
            tick_count: 0,
        })
    }

    /// Advances the run by one frame.
    pub fn tick(&mut self) -> FrameRecord {
        self.clock.advance(self.pacer.next_frame());
        let elapsed = self.timer.next_frame();
        let time = self.clock.secs();
        self.tick_count += 1;

        let mut update = CameraUpdate::default();
        match self.config.takeover {
            Some(takeover) if takeover.covers(time) => {
                if self.autopilot.is_playing() {
                    self.autopilot.suspend();
                    debug!("t={:.3}s: manual takeover", time);
                }
            }
            Some(takeover) if time >= takeover.ends_at() && !self.autopilot.is_playing() => {
                update = self.autopilot.resume();
                debug!("t={:.3}s: autopilot resumed", time);
            }
            _ => {}
        }

        let playing = self.autopilot.is_playing() && update.is_empty();
        if playing {
            update = self.autopilot.tick(elapsed);
        } else if update.is_empty() {
            self.suspended_secs += elapsed;
            // The host keeps calling tick during a takeover
            if !self.autopilot.tick(elapsed).is_empty() {
                self.updates_while_suspended += 1;
            }
        } else {
            // Resume frame: the camera snaps back, no time is played
            self.suspended_secs += elapsed;
        }
        update.apply(&mut self.rig);

        FrameRecord {
            time_secs: time,
            elapsed,
            playing,
            update,
        }
    }

    /// Runs until `duration_secs` of virtual time have passed.
    pub fn run(&mut self) -> Vec<FrameRecord> {
        let mut frames = Vec::new();
        while self.time() < self.config.duration_secs {
            frames.push(self.tick());
        }
        frames
    }

    /// Returns the current simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.clock.secs()
    }

    /// Returns the current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    pub fn rig(&self) -> &RecordingRig {
        &self.rig
    }

    /// The step sequences the autopilot is playing.
    pub fn steps(&self) -> &TrajectorySteps {
        &self.steps
    }

    pub fn suspended_secs(&self) -> f64 {
        self.suspended_secs
    }

    pub fn updates_while_suspended(&self) -> u64 {
        self.updates_while_suspended
    }
}
