//! Flythru Deterministic Playback Harness
//!
//! Runs the autopilot headless, frame by frame, against a virtual clock and
//! a recording camera rig, then checks the trajectory invariants of the run.
//!
//! # Core Principle: Controlled Frame Time
//!
//! Every source of non-determinism in a render loop is replaced:
//! - **Time**: `SimClock` only moves when the harness advances it
//! - **Frame pacing**: frame lengths drawn from a ChaCha8 RNG seeded per run
//! - **Camera**: `RecordingRig` stands in for the host renderer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────┐   advance   ┌──────────────────────────┐  │
//! │  │ FramePacer   │────────────►│ SimClock → FrameTimer    │  │
//! │  │ (seeded RNG) │             └────────────┬─────────────┘  │
//! │  └──────────────┘                          │ elapsed        │
//! │                                   ┌────────▼────────┐       │
//! │                                   │    Autopilot    │       │
//! │                                   └────────┬────────┘       │
//! │                                            │ CameraUpdate   │
//! │                                   ┌────────▼────────┐       │
//! │                                   │  RecordingRig   │       │
//! │                                   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use flythru_sim::{ScenarioRunner, SimConfig};
//! use flythru_sim::scenarios::ScenarioId;
//!
//! let runner = ScenarioRunner::new(SimConfig {
//!     seed: 42,
//!     fps: 60.0,
//!     ..Default::default()
//! });
//! let result = runner.run(ScenarioId::FovZoom);
//! assert!(result.passed);
//! ```

mod clock;
mod error;
mod exporter;
mod pacer;
mod rig;
mod runner;
mod world;
pub mod scenarios;

pub use clock::SimClock;
pub use error::SimError;
pub use exporter::{write_steps, PlaybackExport, PlaybackFrame};
pub use pacer::FramePacer;
pub use rig::{RecordingRig, RigCalls};
pub use runner::{Recording, ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{FrameRecord, SimConfig, SimWorld, Takeover};
